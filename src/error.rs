use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MirrorError {
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("invalid outlook: {0}")]
    InvalidOutlook(String),

    #[error("outlook {outlook} is not valid for dataset {dataset}")]
    OutlookNotConfigured { outlook: u8, dataset: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid path template: {0}")]
    InvalidTemplate(String),

    #[error("invalid dataset profile {name}: {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("failed to connect to {host}: {message}")]
    Connect { host: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
