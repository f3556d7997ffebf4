use std::fs;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use reqwest::Url;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::Builder;

use crate::domain::DatasetRecord;
use crate::error::ScivisError;

/// Output directory that receives `{normalized_name}.json` metadata files and
/// raw volume payloads.
#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

impl Store {
    pub fn new() -> Result<Self, ScivisError> {
        let cwd =
            std::env::current_dir().map_err(|err| ScivisError::Filesystem(err.to_string()))?;
        let root = Utf8PathBuf::from_path_buf(cwd)
            .map_err(|_| ScivisError::Filesystem("invalid working directory".to_string()))?;
        Ok(Self { root })
    }

    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn ensure_root(&self) -> Result<(), ScivisError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| ScivisError::Filesystem(err.to_string()))
    }

    pub fn metadata_path(&self, record: &DatasetRecord) -> Result<Utf8PathBuf, ScivisError> {
        let stem = record.normalized_name();
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(ScivisError::InvalidName(record.name.clone()));
        }
        Ok(self.root.join(format!("{stem}.json")))
    }

    pub fn volume_path(&self, record: &DatasetRecord) -> Result<Utf8PathBuf, ScivisError> {
        Ok(self.root.join(volume_file_name(&record.url)?))
    }

    pub fn exists(path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }

    pub fn write_metadata(path: &Utf8Path, record: &DatasetRecord) -> Result<(), ScivisError> {
        let content = metadata_json(record)?;
        Self::write_file_atomic(path, |temp| {
            fs::write(temp, &content).map_err(|err| ScivisError::Filesystem(err.to_string()))?;
            Ok(content.len() as u64)
        })?;
        Ok(())
    }

    pub fn read_metadata(path: &Utf8Path) -> Result<DatasetRecord, ScivisError> {
        let content = fs::read(path.as_std_path())
            .map_err(|err| ScivisError::Filesystem(format!("read {path}: {err}")))?;
        serde_json::from_slice(&content).map_err(|err| ScivisError::Decode(err.to_string()))
    }

    /// Runs `write` against a temp file next to `dest` and moves the result
    /// into place only once `write` succeeds. On failure the temp file is
    /// removed and `dest` is left as it was.
    pub fn write_file_atomic<F>(dest: &Utf8Path, write: F) -> Result<u64, ScivisError>
    where
        F: FnOnce(&Path) -> Result<u64, ScivisError>,
    {
        let parent = dest
            .parent()
            .ok_or_else(|| ScivisError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| ScivisError::Filesystem(err.to_string()))?;
        let temp = Builder::new()
            .prefix(".scivis-fetch")
            .suffix(".part")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| ScivisError::Filesystem(err.to_string()))?;
        let written = write(temp.path())?;
        temp.persist(dest.as_std_path())
            .map_err(|err| ScivisError::Filesystem(err.to_string()))?;
        Ok(written)
    }
}

/// Record as JSON indented by four spaces.
pub fn metadata_json(record: &DatasetRecord) -> Result<Vec<u8>, ScivisError> {
    let mut content = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut content, PrettyFormatter::with_indent(b"    "));
    record
        .serialize(&mut serializer)
        .map_err(|err| ScivisError::Filesystem(err.to_string()))?;
    Ok(content)
}

/// Final path segment of `url`, ignoring any query string or fragment.
pub fn volume_file_name(url: &str) -> Result<String, ScivisError> {
    let parsed = Url::parse(url).map_err(|err| ScivisError::InvalidUrl(format!("{url}: {err}")))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .ok_or_else(|| ScivisError::InvalidUrl(format!("{url}: no file name")))
}
