use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::snapshot::types::SnapshotResult;

/// Milliseconds since the epoch, used as the leading part of file names
pub fn generate_timestamp(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

/// Base file name (without extension) for one capture
pub fn generate_basename(timestamp: &str, counter: u64) -> String {
    format!("{}.{}", timestamp, counter)
}

/// Relative directory for a suite/test group.
///
/// Dots in the suite name become path separators, so `com.x.LoginTest`
/// files under `com/x/LoginTest/<test>`.
pub fn group_dir(suite_name: &str, test_name: &str) -> PathBuf {
    let mut dir: PathBuf = suite_name
        .split('.')
        .filter(|part| !part.is_empty())
        .map(sanitize_name)
        .collect();
    dir.push(sanitize_name(test_name));
    dir
}

/// Sanitize a name for use as a single path component
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '$' => c,
            _ => '_',
        })
        .collect()
}

/// Manifest written next to each capture
#[derive(Debug, Serialize)]
pub struct CaptureManifest<'a> {
    pub suite: Option<&'a str>,
    pub test: Option<&'a str>,
    pub url: Option<String>,
    pub host: Option<String>,
    pub timestamp: String,
    pub screenshot: Option<&'a Path>,
    pub page_source: Option<&'a Path>,
}

/// Write the JSON manifest for a capture
pub fn write_manifest(path: &Path, manifest: &CaptureManifest<'_>) -> SnapshotResult<()> {
    fs::write(path, serde_json::to_string_pretty(manifest)?)?;
    Ok(())
}

/// Name of the machine running the tests, when it can be determined
pub fn host_name() -> Option<String> {
    hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().into_owned())
}
