use std::collections::BTreeSet;

use camino::Utf8PathBuf;
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::Serialize;

use crate::domain::{Outlook, QuantizePolicy};
use crate::error::MirrorError;

const PLACEHOLDERS: &[&str] = &["yyyy", "mm", "dd", "hh", "ff"];

/// Immutable description of one remote data product: where it lives, how
/// its cycles are spaced, and the filename grammar on both ends. Built
/// once at startup and passed by reference; two datasets never share an
/// instance.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    pub name: String,
    pub root_dir: Utf8PathBuf,
    pub remote_host: String,
    pub credential: String,
    #[serde(serialize_with = "serialize_seconds", rename = "cycle_interval_seconds")]
    pub cycle_interval: Duration,
    pub valid_outlooks: BTreeSet<Outlook>,
    pub remote_template: String,
    pub local_template: String,
    pub quantize_policy: QuantizePolicy,
}

fn serialize_seconds<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub remote: String,
    pub local: Utf8PathBuf,
}

impl DatasetProfile {
    /// GFS on the NCEP production server: four runs a day, pressure-level
    /// GRIB2 output.
    pub fn gfs() -> Self {
        Self {
            name: "gfs".to_string(),
            root_dir: Utf8PathBuf::from("/data/gfs"),
            remote_host: "ftpprd.ncep.noaa.gov".to_string(),
            credential: "yourname@yourorg.com".to_string(),
            cycle_interval: Duration::hours(6),
            valid_outlooks: outlook_set(&[0, 3, 6]),
            remote_template: "/pub/data/nccf/com/gfs/prod/gfs.{yyyy}{mm}{dd}{hh}/gfs.t{hh}z.pgrb2f{ff}"
                .to_string(),
            local_template: "{yyyy}/{yyyy}{mm}{dd}/gfs_{yyyy}{mm}{dd}_{hh}00_0{ff}.grb2".to_string(),
            quantize_policy: QuantizePolicy::Nearest,
        }
    }

    /// Rapid Refresh: hourly runs on the 130 lateral grid, isentropic
    /// (bgrb) vertical coordinate.
    pub fn rap() -> Self {
        Self {
            name: "rap".to_string(),
            root_dir: Utf8PathBuf::from("/data/ruc_wind_data"),
            remote_host: "ftpprd.ncep.noaa.gov".to_string(),
            credential: "yourname@yourorg.com".to_string(),
            cycle_interval: Duration::hours(1),
            valid_outlooks: outlook_set(&[0, 1, 2, 3, 6]),
            remote_template:
                "/pub/data/nccf/com/rap/prod/rap.{yyyy}{mm}{dd}/rap.t{hh}z.awp130bgrbf{ff}.grib2"
                    .to_string(),
            local_template: "{yyyy}/{yyyy}{mm}{dd}/rap_{yyyy}{mm}{dd}_{hh}00_0{ff}.grb2".to_string(),
            quantize_policy: QuantizePolicy::Nearest,
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::gfs(), Self::rap()]
    }

    pub fn validate(&self) -> Result<(), MirrorError> {
        if self.name.trim().is_empty() {
            return Err(MirrorError::InvalidProfile {
                name: self.name.clone(),
                reason: "name must not be empty".to_string(),
            });
        }
        if self.remote_host.trim().is_empty() {
            return Err(MirrorError::InvalidProfile {
                name: self.name.clone(),
                reason: "remote_host must not be empty".to_string(),
            });
        }
        if self.root_dir.as_str().is_empty() {
            return Err(MirrorError::InvalidProfile {
                name: self.name.clone(),
                reason: "root_dir must not be empty".to_string(),
            });
        }
        if self.cycle_interval.num_seconds() <= 0 {
            return Err(MirrorError::InvalidProfile {
                name: self.name.clone(),
                reason: "cycle_interval_seconds must be positive".to_string(),
            });
        }
        validate_template(&self.remote_template)?;
        validate_template(&self.local_template)?;
        Ok(())
    }

    /// Derives the remote and local paths for one `(cycle, outlook)` unit.
    /// Pure: identical inputs always yield identical strings. An outlook
    /// outside `valid_outlooks` still resolves to a syntactically valid
    /// path; it just will not exist on the remote side.
    pub fn resolve_paths(&self, cycle: DateTime<Utc>, outlook: Outlook) -> ResolvedPaths {
        ResolvedPaths {
            remote: render_template(&self.remote_template, cycle, outlook),
            local: self
                .root_dir
                .join(render_template(&self.local_template, cycle, outlook)),
        }
    }
}

fn outlook_set(hours: &[u8]) -> BTreeSet<Outlook> {
    hours.iter().filter_map(|h| Outlook::new(*h).ok()).collect()
}

/// Substitutes the zero-padded time fields into a template. Unknown
/// placeholders pass through verbatim; `validate_template` rejects them
/// up front so this stays infallible.
pub fn render_template(template: &str, cycle: DateTime<Utc>, outlook: Outlook) -> String {
    let mut rendered = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let token = &after[..close];
                match token {
                    "yyyy" => rendered.push_str(&format!("{:04}", cycle.year())),
                    "mm" => rendered.push_str(&format!("{:02}", cycle.month())),
                    "dd" => rendered.push_str(&format!("{:02}", cycle.day())),
                    "hh" => rendered.push_str(&format!("{:02}", cycle.hour())),
                    "ff" => rendered.push_str(&format!("{:02}", outlook.hours())),
                    other => {
                        rendered.push('{');
                        rendered.push_str(other);
                        rendered.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);
    rendered
}

pub fn validate_template(template: &str) -> Result<(), MirrorError> {
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            MirrorError::InvalidTemplate(format!("unclosed placeholder in {template}"))
        })?;
        let token = &after[..close];
        if !PLACEHOLDERS.contains(&token) {
            return Err(MirrorError::InvalidTemplate(format!(
                "unknown placeholder {{{token}}} in {template}"
            )));
        }
        rest = &after[close + 1..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    fn cycle() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn render_pads_every_field() {
        let outlook = Outlook::new(3).unwrap();
        let rendered = render_template("{yyyy}-{mm}-{dd}T{hh}+{ff}", cycle(), outlook);
        assert_eq!(rendered, "2012-06-01T00+03");
    }

    #[test]
    fn resolve_is_deterministic() {
        let profile = DatasetProfile::gfs();
        let outlook = Outlook::new(6).unwrap();
        let first = profile.resolve_paths(cycle(), outlook);
        let second = profile.resolve_paths(cycle(), outlook);
        assert_eq!(first, second);
    }

    #[test]
    fn gfs_filename_grammar() {
        let profile = DatasetProfile::gfs();
        let paths = profile.resolve_paths(cycle(), Outlook::new(3).unwrap());
        assert_eq!(
            paths.local.as_str(),
            "/data/gfs/2012/20120601/gfs_20120601_0000_003.grb2"
        );
        assert_eq!(
            paths.remote,
            "/pub/data/nccf/com/gfs/prod/gfs.2012060100/gfs.t00z.pgrb2f03"
        );
    }

    #[test]
    fn rap_filename_grammar() {
        let profile = DatasetProfile::rap();
        let at = Utc.with_ymd_and_hms(2013, 2, 9, 18, 0, 0).unwrap();
        let paths = profile.resolve_paths(at, Outlook::new(1).unwrap());
        assert_eq!(
            paths.local.as_str(),
            "/data/ruc_wind_data/2013/20130209/rap_20130209_1800_001.grb2"
        );
        assert_eq!(
            paths.remote,
            "/pub/data/nccf/com/rap/prod/rap.20130209/rap.t18z.awp130bgrbf01.grib2"
        );
    }

    #[test]
    fn builtin_profiles_validate() {
        for profile in DatasetProfile::builtin() {
            profile.validate().unwrap();
        }
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let err = validate_template("{yyyy}/{run}").unwrap_err();
        assert_matches!(err, MirrorError::InvalidTemplate(_));
    }

    #[test]
    fn unclosed_placeholder_is_rejected() {
        let err = validate_template("{yyyy}/{mm").unwrap_err();
        assert_matches!(err, MirrorError::InvalidTemplate(_));
    }
}
