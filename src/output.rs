use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchResult, ListResult, ProgressEvent, ProgressSink, VolumeAction};
use crate::store::metadata_json;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_list(result: &ListResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Plain-text rendering: results on stdout, progress on stderr.
pub struct TextOutput;

impl TextOutput {
    pub fn print_list(result: &ListResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        Self::write_list(&mut stdout, result)
    }

    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        Self::write_fetch(&mut stdout, result)
    }

    pub fn write_list<W: Write>(out: &mut W, result: &ListResult) -> io::Result<()> {
        for entry in &result.datasets {
            writeln!(out, "{entry}")?;
        }
        Ok(())
    }

    pub fn write_fetch<W: Write>(out: &mut W, result: &FetchResult) -> io::Result<()> {
        let metadata = metadata_json(&result.metadata).map_err(io::Error::other)?;
        out.write_all(&metadata)?;
        writeln!(out)?;
        writeln!(out, "{}", result.dataset)?;
        writeln!(out, "  metadata: {}", result.metadata_path)?;
        match result.volume.action {
            VolumeAction::Download => writeln!(
                out,
                "  volume:   {} ({} bytes downloaded)",
                result.volume.path,
                result.volume.bytes.unwrap_or_default()
            ),
            VolumeAction::Skip => {
                writeln!(out, "  volume:   {} (already present)", result.volume.path)
            }
        }
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        tracing::debug!(elapsed = ?event.elapsed, "{}", event.message);
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}
