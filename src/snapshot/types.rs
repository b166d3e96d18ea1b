// Core types shared by the capture collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Files produced by one capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    /// Path to the PNG screenshot, if one was taken
    pub screenshot: Option<PathBuf>,

    /// Path to the saved page HTML, if it was saved
    pub page_source: Option<PathBuf>,

    /// When the capture happened
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
}

impl ArtifactReference {
    /// A reference to nothing, returned when there was nothing to capture
    pub fn empty() -> Self {
        Self {
            screenshot: None,
            page_source: None,
            captured_at: Utc::now(),
        }
    }

    /// True when no file was produced
    pub fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.page_source.is_none()
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::with_capacity(2);
        if let Some(path) = &self.screenshot {
            lines.push(format!("Screenshot: file:{}", path.display()));
        }
        if let Some(path) = &self.page_source {
            lines.push(format!("Page source: file:{}", path.display()));
        }
        f.write_str(&lines.join("\n"))
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error types for snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Error reported by the browser driver during capture
    #[error("Capture error: {0}")]
    Capture(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Image encoding or decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
