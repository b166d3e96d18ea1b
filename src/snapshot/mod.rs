pub mod backend;
pub mod store;
pub mod types;
pub mod utils;

pub use types::{ArtifactReference, SnapshotError, SnapshotResult};
pub use backend::{BrowserDriver, MockBrowser};
pub use store::{ArtifactGrouping, CaptureAction, ReportDestination, ScreenshotStore};
pub use utils::{generate_basename, generate_timestamp, group_dir, sanitize_name};
