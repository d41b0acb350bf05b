use std::fs::File;
use std::thread;
use std::time::Duration;

use camino::Utf8Path;
use reqwest::blocking::Client;
use reqwest::header::{FROM, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use thiserror::Error;

use crate::error::MirrorError;
use crate::profile::DatasetProfile;

/// Per-transfer failure. A missing remote file is routine (not every
/// cycle/outlook combination exists on the archive), so it gets its own
/// variant instead of being folded into a blanket error.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TransferError {
    #[error("remote file not found")]
    NotFound,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),
}

/// One open connection to an archive server. A single transport serves an
/// entire range walk sequentially; `close` is called exactly once when the
/// walk finishes.
pub trait Transport {
    fn download(&mut self, remote: &str, destination: &Utf8Path) -> Result<(), TransferError>;

    fn close(&mut self) {}
}

/// Opens transports. Connection failure is fatal to the whole range call,
/// unlike per-unit transfer failures.
pub trait Connector {
    type Transport: Transport;

    fn connect(&self, profile: &DatasetProfile) -> Result<Self::Transport, MirrorError>;
}

/// Production connector: the NCEP archive serves the old FTP tree over
/// HTTPS, so one connected transport is a reqwest client pinned to the
/// profile's host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    type Transport = HttpTransport;

    fn connect(&self, profile: &DatasetProfile) -> Result<Self::Transport, MirrorError> {
        HttpTransport::connect(&profile.remote_host, &profile.credential)
    }
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn connect(host: &str, credential: &str) -> Result<Self, MirrorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("grib-mirror/{}", env!("CARGO_PKG_VERSION"))).map_err(
                |err| MirrorError::Connect {
                    host: host.to_string(),
                    message: err.to_string(),
                },
            )?,
        );
        // Contact address, the anonymous-FTP login convention carried over.
        if !credential.trim().is_empty() {
            headers.insert(
                FROM,
                HeaderValue::from_str(credential.trim()).map_err(|err| MirrorError::Connect {
                    host: host.to_string(),
                    message: err.to_string(),
                })?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| MirrorError::Connect {
                host: host.to_string(),
                message: err.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: format!("https://{host}"),
        })
    }

    fn send_with_retries(&self, url: &str) -> Result<reqwest::blocking::Response, TransferError> {
        const MAX_RETRIES: usize = 3;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(TransferError::Network(err.to_string()));
                }
            }
        }
    }
}

impl Transport for HttpTransport {
    fn download(&mut self, remote: &str, destination: &Utf8Path) -> Result<(), TransferError> {
        let url = format!("{}{}", self.base_url, remote);
        let mut response = self.send_with_retries(&url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                404 | 410 => TransferError::NotFound,
                401 | 403 => TransferError::Auth(format!("server returned {status}")),
                _ => TransferError::Network(format!("server returned {status}")),
            });
        }

        let mut file = File::create(destination.as_std_path())
            .map_err(|err| TransferError::Network(format!("create {destination}: {err}")))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| TransferError::Network(format!("write {destination}: {err}")))?;
        Ok(())
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
