use std::io::{self, Write};

use serde::Serialize;

use crate::app::LatestReport;
use crate::fetch::RangeReport;
use crate::profile::DatasetProfile;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_range(report: &RangeReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_latest(reports: &[LatestReport]) -> io::Result<()> {
        Self::print_json(&reports)
    }

    pub fn print_datasets(profiles: &[DatasetProfile]) -> io::Result<()> {
        Self::print_json(&profiles)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
