pub mod app;
pub mod cache;
pub mod config;
pub mod cycle;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod fs_util;
pub mod output;
pub mod profile;
pub mod transport;
