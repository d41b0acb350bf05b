use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::Outlook;
use crate::error::MirrorError;
use crate::fetch::{self, RangeReport};
use crate::profile::DatasetProfile;
use crate::transport::{Connector, Transport};

/// Outcome of one `fetch_latest` run: the trailing window plus one range
/// report per configured outlook.
#[derive(Debug, Clone, Serialize)]
pub struct LatestReport {
    pub dataset: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub ranges: Vec<RangeReport>,
}

impl LatestReport {
    pub fn downloaded(&self) -> usize {
        self.ranges.iter().map(RangeReport::downloaded).sum()
    }

    pub fn cached(&self) -> usize {
        self.ranges.iter().map(RangeReport::cached).sum()
    }

    pub fn failed(&self) -> usize {
        self.ranges.iter().map(RangeReport::failed).sum()
    }
}

pub struct App<C: Connector> {
    connector: C,
}

impl<C: Connector> App<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Mirrors every unit of the closed interval `[start, end]` for one
    /// outlook. One transport serves the whole range and is closed exactly
    /// once; per-unit transfer failures are collected in the report, never
    /// propagated. Only a connection failure aborts the call.
    pub fn fetch_range(
        &self,
        profile: &DatasetProfile,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        outlook: Outlook,
        step: Duration,
    ) -> Result<RangeReport, MirrorError> {
        if step.num_seconds() <= 0 {
            return Err(MirrorError::InvalidRange(
                "step must be positive".to_string(),
            ));
        }

        info!(
            "fetching {} range {} .. {} outlook {}",
            profile.name, start, end, outlook
        );

        let mut transport = self.connector.connect(profile)?;
        let units = fetch::walk_range(&mut transport, profile, start, end, outlook, step);
        transport.close();

        let report = RangeReport {
            dataset: profile.name.clone(),
            outlook,
            start,
            end,
            step_seconds: step.num_seconds(),
            units,
        };
        info!(
            "{} outlook {}: {} downloaded, {} cached, {} failed",
            profile.name,
            outlook,
            report.downloaded(),
            report.cached(),
            report.failed()
        );
        Ok(report)
    }

    /// Cron entry point: mirrors the trailing 24 hours ending now, one
    /// range per valid outlook, stepping at the dataset's cycle interval.
    pub fn fetch_latest(&self, profile: &DatasetProfile) -> Result<LatestReport, MirrorError> {
        self.fetch_window_ending(profile, Utc::now())
    }

    /// Same as `fetch_latest` with an explicit window end, so the trailing
    /// window is testable without a hidden clock.
    pub fn fetch_window_ending(
        &self,
        profile: &DatasetProfile,
        end: DateTime<Utc>,
    ) -> Result<LatestReport, MirrorError> {
        let start = end - Duration::hours(24);
        let mut ranges = Vec::new();
        for outlook in &profile.valid_outlooks {
            ranges.push(self.fetch_range(profile, start, end, *outlook, profile.cycle_interval)?);
        }
        Ok(LatestReport {
            dataset: profile.name.clone(),
            window_start: start,
            window_end: end,
            ranges,
        })
    }
}
