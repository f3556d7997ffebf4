use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::domain::Catalog;
use crate::error::ScivisError;

pub const DEFAULT_CATALOG_URL: &str = "https://klacansky.com/open-scivis-datasets/datasets.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

const CONNECT_TIMEOUT_SECS: u64 = 30;

pub trait ScivisClient: Send + Sync {
    fn fetch_catalog(&self, url: &str) -> Result<Catalog, ScivisError>;
    /// Streams the body of `url` into `destination`, returning the byte count.
    fn download(&self, url: &str, destination: &Path) -> Result<u64, ScivisError>;
}

#[derive(Clone)]
pub struct ScivisHttpClient {
    client: Client,
}

impl ScivisHttpClient {
    pub fn with_timeout(timeout: Duration) -> Result<Self, ScivisError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("scivis-fetch/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ScivisError::Transport(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()
            .map_err(|err| ScivisError::Transport(err.to_string()))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<Response, ScivisError> {
        debug!(url, "http get");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ScivisError::Transport(err.to_string()))?;
        Self::handle_status(response)
    }

    fn handle_status(response: Response) -> Result<Response, ScivisError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "request failed".to_string());
        Err(ScivisError::Status { status, message })
    }
}

impl ScivisClient for ScivisHttpClient {
    fn fetch_catalog(&self, url: &str) -> Result<Catalog, ScivisError> {
        let response = self.get(url)?;
        let bytes = response
            .bytes()
            .map_err(|err| ScivisError::Transport(err.to_string()))?;
        let catalog = Catalog::from_slice(&bytes)?;
        debug!(entries = catalog.len(), "catalog decoded");
        Ok(catalog)
    }

    fn download(&self, url: &str, destination: &Path) -> Result<u64, ScivisError> {
        let mut response = self.get(url)?;
        let mut file =
            File::create(destination).map_err(|err| ScivisError::Filesystem(err.to_string()))?;
        response
            .copy_to(&mut file)
            .map_err(|err| ScivisError::Transport(err.to_string()))
    }
}
