use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use camino::Utf8PathBuf;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::{Outlook, QuantizePolicy};
use crate::error::MirrorError;
use crate::profile::DatasetProfile;

const DEFAULT_CONFIG_FILE: &str = "grib-mirror.json";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DatasetEntry {
    pub name: String,
    pub root_dir: String,
    pub remote_host: String,
    #[serde(default)]
    pub credential: String,
    pub cycle_interval_seconds: i64,
    pub valid_outlooks: BTreeSet<Outlook>,
    pub remote_template: String,
    pub local_template: String,
    #[serde(default)]
    pub quantize_policy: QuantizePolicy,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub datasets: Vec<DatasetProfile>,
}

impl ResolvedConfig {
    pub fn find(&self, name: &str) -> Result<&DatasetProfile, MirrorError> {
        self.datasets
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| MirrorError::UnknownDataset(name.to_string()))
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolves the dataset profiles for this run. An explicit `--config`
    /// path must exist; without one, `grib-mirror.json` in the current
    /// directory is used when present and the built-in GFS/RAP profiles
    /// otherwise.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, MirrorError> {
        Self::resolve_from(Path::new("."), path)
    }

    /// Same as `resolve` with an explicit directory for the default-file
    /// lookup, so callers and tests do not depend on the process cwd.
    pub fn resolve_from(dir: &Path, path: Option<&str>) -> Result<ResolvedConfig, MirrorError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => dir.join(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig {
                schema_version: 1,
                datasets: DatasetProfile::builtin(),
            });
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| MirrorError::ConfigRead(config_path.clone()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|err| MirrorError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, MirrorError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let mut datasets = Vec::new();
        for entry in config.datasets {
            let profile = DatasetProfile {
                name: entry.name,
                root_dir: Utf8PathBuf::from(entry.root_dir),
                remote_host: entry.remote_host,
                credential: entry.credential,
                cycle_interval: Duration::seconds(entry.cycle_interval_seconds),
                valid_outlooks: entry.valid_outlooks,
                remote_template: entry.remote_template,
                local_template: entry.local_template,
                quantize_policy: entry.quantize_policy,
            };
            profile.validate()?;
            if datasets.iter().any(|p: &DatasetProfile| p.name == profile.name) {
                return Err(MirrorError::InvalidProfile {
                    name: profile.name.clone(),
                    reason: "duplicate dataset name".to_string(),
                });
            }
            datasets.push(profile);
        }

        Ok(ResolvedConfig {
            schema_version,
            datasets,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn entry(name: &str) -> DatasetEntry {
        DatasetEntry {
            name: name.to_string(),
            root_dir: "/data/test".to_string(),
            remote_host: "archive.example.org".to_string(),
            credential: "ops@example.org".to_string(),
            cycle_interval_seconds: 3600,
            valid_outlooks: [Outlook::new(0).unwrap(), Outlook::new(3).unwrap()].into(),
            remote_template: "/pub/{yyyy}{mm}{dd}/t{hh}z.f{ff}".to_string(),
            local_template: "{yyyy}/{yyyy}{mm}{dd}/f{ff}.grb2".to_string(),
            quantize_policy: QuantizePolicy::Floor,
        }
    }

    #[test]
    fn resolve_config_builds_profiles() {
        let config = Config {
            schema_version: None,
            datasets: vec![entry("test")],
        };

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.schema_version, 1);
        let profile = resolved.find("test").unwrap();
        assert_eq!(profile.cycle_interval, Duration::hours(1));
        assert_eq!(profile.quantize_policy, QuantizePolicy::Floor);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let config = Config {
            schema_version: Some(1),
            datasets: vec![entry("test"), entry("test")],
        };

        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, MirrorError::InvalidProfile { .. });
    }

    #[test]
    fn bad_template_is_rejected() {
        let mut bad = entry("test");
        bad.remote_template = "/pub/{cycle}".to_string();
        let config = Config {
            schema_version: Some(1),
            datasets: vec![bad],
        };

        let err = ConfigLoader::resolve_config(config).unwrap_err();
        assert_matches!(err, MirrorError::InvalidTemplate(_));
    }

    #[test]
    fn missing_default_config_falls_back_to_builtins() {
        let temp = tempfile::tempdir().unwrap();

        let resolved = ConfigLoader::resolve_from(temp.path(), None).unwrap();
        assert!(resolved.find("gfs").is_ok());
        assert!(resolved.find("rap").is_ok());
    }

    #[test]
    fn default_config_in_directory_is_used() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            schema_version: Some(1),
            datasets: vec![entry("local")],
        };
        std::fs::write(
            temp.path().join("grib-mirror.json"),
            serde_json::to_vec(&config).unwrap(),
        )
        .unwrap();

        let resolved = ConfigLoader::resolve_from(temp.path(), None).unwrap();
        assert!(resolved.find("local").is_ok());
        assert!(resolved.find("gfs").is_err());
    }
}
