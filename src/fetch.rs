use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache;
use crate::cycle::quantize;
use crate::domain::Outlook;
use crate::fs_util;
use crate::profile::DatasetProfile;
use crate::transport::{TransferError, Transport};

/// Terminal state of one `(cycle, outlook)` unit after a walk touched it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    /// A valid artifact was already on disk; the transport was not asked.
    Cached,
    Downloaded,
    Failed { error: TransferError },
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub cycle_time: DateTime<Utc>,
    pub outlook: Outlook,
    pub remote_path: String,
    pub local_path: Utf8PathBuf,
    #[serde(flatten)]
    pub status: UnitStatus,
}

/// Per-unit outcomes for one range walk. Failures are recorded here
/// instead of aborting the walk, so a caller can tell "fully cached" from
/// "some units failed" without scraping logs.
#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub dataset: String,
    pub outlook: Outlook,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step_seconds: i64,
    pub units: Vec<UnitOutcome>,
}

impl RangeReport {
    pub fn cached(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Cached))
    }

    pub fn downloaded(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Downloaded))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.status)).count()
    }
}

/// Walks the closed interval `[start, end]` at `step` over an already
/// open transport, resolving and fetching one unit at a time. A transfer
/// failure is isolated to its unit; the walk always completes.
pub fn walk_range<T: Transport>(
    transport: &mut T,
    profile: &DatasetProfile,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    outlook: Outlook,
    step: Duration,
) -> Vec<UnitOutcome> {
    let mut units = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let cycle = quantize(cursor, profile.cycle_interval, profile.quantize_policy);
        let paths = profile.resolve_paths(cycle, outlook);
        let status = if cache::needs_fetch(&paths.local) {
            fetch_unit(transport, &paths.remote, &paths.local)
        } else {
            debug!("cached: {}", paths.local);
            UnitStatus::Cached
        };
        units.push(UnitOutcome {
            cycle_time: cycle,
            outlook,
            remote_path: paths.remote,
            local_path: paths.local,
            status,
        });
        cursor += step;
    }
    units
}

/// One transfer attempt. Never propagates a failure past its own
/// boundary: every outcome, including a directory that could not be
/// created, ends in a returned `UnitStatus`.
pub fn fetch_unit<T: Transport>(transport: &mut T, remote: &str, local: &Utf8Path) -> UnitStatus {
    if let Some(parent) = local.parent() {
        if !fs_util::exists(parent) {
            match fs_util::make_dirs(parent) {
                Ok(()) => info!("created dir: {parent}"),
                // Non-fatal: the transfer is attempted anyway and fails
                // on its own if the directory really is unusable.
                Err(err) => warn!("could not create dir {parent}: {err}"),
            }
        }
    }

    info!("downloading: {remote}");
    match transport.download(remote, local) {
        Ok(()) => {
            info!("success: {local}");
            UnitStatus::Downloaded
        }
        Err(error) => {
            warn!("fail: {local}: {error}");
            // A failed transfer can leave an empty file behind; delete it
            // so the unit reads as pending on the next run.
            if fs_util::exists(local) && fs_util::file_size(local) == 0 {
                match fs_util::delete(local) {
                    Ok(()) => debug!("removed empty artifact: {local}"),
                    Err(err) => warn!("could not remove empty artifact {local}: {err}"),
                }
            }
            UnitStatus::Failed { error }
        }
    }
}
