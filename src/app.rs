use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{self, ListEntry};
use crate::client::ScivisClient;
use crate::domain::{Catalog, DatasetRecord};
use crate::error::ScivisError;
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub datasets: Vec<ListEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeAction {
    Download,
    Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeResult {
    pub action: VolumeAction,
    pub url: String,
    pub path: String,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub dataset: String,
    pub metadata: DatasetRecord,
    pub metadata_path: String,
    pub volume: VolumeResult,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<C: ScivisClient> {
    store: Store,
    client: C,
    catalog_url: String,
}

impl<C: ScivisClient> App<C> {
    pub fn new(store: Store, client: C, catalog_url: impl Into<String>) -> Self {
        Self {
            store,
            client,
            catalog_url: catalog_url.into(),
        }
    }

    pub fn catalog(&self, sink: &dyn ProgressSink) -> Result<Catalog, ScivisError> {
        sink.event(ProgressEvent {
            message: format!("fetching catalog from {}", self.catalog_url),
            elapsed: None,
        });
        let start = Instant::now();
        let catalog = self.client.fetch_catalog(&self.catalog_url)?;
        sink.event(ProgressEvent {
            message: format!("catalog lists {} datasets", catalog.len()),
            elapsed: Some(start.elapsed()),
        });
        Ok(catalog)
    }

    /// Fetches the catalog and sizes every entry. A single entry with an
    /// unknown element type fails the whole listing.
    pub fn list(&self, sink: &dyn ProgressSink) -> Result<ListResult, ScivisError> {
        let catalog = self.catalog(sink)?;
        let datasets = catalog::listing(&catalog).collect::<Result<Vec<_>, ScivisError>>()?;
        Ok(ListResult { datasets })
    }

    pub fn fetch(&self, name: &str, sink: &dyn ProgressSink) -> Result<FetchResult, ScivisError> {
        let catalog = self.catalog(sink)?;
        let record = catalog::resolve(&catalog, name)?.clone();
        info!(dataset = name, url = %record.url, "resolved dataset");

        self.store.ensure_root()?;
        let metadata_path = self.persist_metadata(&record, sink)?;
        let volume = self.fetch_volume(&record, sink)?;

        Ok(FetchResult {
            dataset: record.normalized_name(),
            metadata: record,
            metadata_path: metadata_path.to_string(),
            volume,
        })
    }

    pub fn persist_metadata(
        &self,
        record: &DatasetRecord,
        sink: &dyn ProgressSink,
    ) -> Result<Utf8PathBuf, ScivisError> {
        let path = self.store.metadata_path(record)?;
        Store::write_metadata(&path, record)?;
        sink.event(ProgressEvent {
            message: format!("wrote metadata to {path}"),
            elapsed: None,
        });
        Ok(path)
    }

    /// Downloads the payload unless a file with the same name is already in
    /// the store. Presence is the only check; contents are never inspected.
    pub fn fetch_volume(
        &self,
        record: &DatasetRecord,
        sink: &dyn ProgressSink,
    ) -> Result<VolumeResult, ScivisError> {
        let path = self.store.volume_path(record)?;

        if Store::exists(&path) {
            debug!(path = %path, "volume present, skipping download");
            sink.event(ProgressEvent {
                message: format!("file {path} already exists, not re-downloading"),
                elapsed: None,
            });
            return Ok(VolumeResult {
                action: VolumeAction::Skip,
                url: record.url.clone(),
                path: path.to_string(),
                bytes: None,
            });
        }

        sink.event(ProgressEvent {
            message: format!("fetching volume from {}", record.url),
            elapsed: None,
        });
        let start = Instant::now();
        let bytes =
            Store::write_file_atomic(&path, |temp| self.client.download(&record.url, temp))?;
        let elapsed = start.elapsed();
        info!(path = %path, bytes, elapsed_ms = elapsed.as_millis() as u64, "volume downloaded");
        sink.event(ProgressEvent {
            message: format!("wrote {bytes} bytes to {path}"),
            elapsed: Some(elapsed),
        });

        Ok(VolumeResult {
            action: VolumeAction::Download,
            url: record.url.clone(),
            path: path.to_string(),
            bytes: Some(bytes),
        })
    }
}
