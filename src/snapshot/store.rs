//! File-based artifact store.
//!
//! `ScreenshotStore` plays three collaborator roles for the lifecycle hooks:
//! - `ArtifactGrouping`: files captures under `<reports>/<suite path>/<test>/`
//! - `CaptureAction`: writes the screenshot, page source and manifest
//! - `ReportDestination`: owns the reports folder setting
//!
//! The group is store-wide state, not per thread. Suites that share one
//! store and run concurrently overwrite each other's group, so their
//! artifacts may be filed under the wrong suite. Give each concurrently
//! running suite its own store if that matters.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};
use tracing::debug;

use super::backend::BrowserDriver;
use super::types::{ArtifactReference, SnapshotResult};
use super::utils::{
    CaptureManifest, generate_basename, generate_timestamp, group_dir, host_name, write_manifest,
};
use crate::config::{self, ReportSettings};

/// Opens and closes the logical group that captures are filed under
pub trait ArtifactGrouping {
    /// Start filing captures under (suite, test)
    fn start_group(&self, suite_name: &str, test_name: &str);

    /// Close the current group, returning the screenshots taken inside it
    fn finish_group(&self) -> Vec<PathBuf>;
}

/// Produces diagnostic artifacts from the active browser
pub trait CaptureAction {
    /// Capture the browser state. `None` means no browser is open; the
    /// implementation decides whether that is an error or a no-op.
    fn capture(&self, driver: Option<&dyn BrowserDriver>) -> SnapshotResult<ArtifactReference>;
}

/// Where artifacts are written
pub trait ReportDestination {
    /// Replace the output folder. Takes effect for the next capture.
    fn set_reports_folder(&self, folder: PathBuf);
}

#[derive(Debug)]
struct ActiveGroup {
    suite: String,
    test: String,
    dir: PathBuf,
    screenshots: Vec<PathBuf>,
}

static SHARED: OnceLock<Arc<ScreenshotStore>> = OnceLock::new();

/// Writes captures to the local filesystem
#[derive(Debug)]
pub struct ScreenshotStore {
    settings: RwLock<ReportSettings>,
    group: Mutex<Option<ActiveGroup>>,
    counter: AtomicU64,
}

impl ScreenshotStore {
    /// Create a store with the given output settings
    pub fn new(settings: ReportSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            group: Mutex::new(None),
            counter: AtomicU64::new(0),
        }
    }

    /// Create a store writing to `folder` with default settings otherwise
    pub fn in_folder(folder: impl Into<PathBuf>) -> Self {
        let mut settings = ReportSettings::defaults();
        settings.folder = folder.into();
        Self::new(settings)
    }

    /// The process-wide store, built from [`config::get`] on first use.
    ///
    /// Every coordinator created without an explicit store shares this one.
    pub fn shared() -> Arc<Self> {
        SHARED
            .get_or_init(|| Arc::new(Self::new(config::get().reports.clone())))
            .clone()
    }

    /// Snapshot of the current output settings
    pub fn settings(&self) -> ReportSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current output folder
    pub fn reports_folder(&self) -> PathBuf {
        self.settings().folder
    }

    fn lock_group(&self) -> MutexGuard<'_, Option<ActiveGroup>> {
        self.group.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ScreenshotStore {
    fn default() -> Self {
        Self::new(config::get().reports.clone())
    }
}

impl ArtifactGrouping for ScreenshotStore {
    fn start_group(&self, suite_name: &str, test_name: &str) {
        let dir = group_dir(suite_name, test_name);
        debug!(suite = suite_name, test = test_name, dir = %dir.display(), "Starting screenshot group");
        *self.lock_group() = Some(ActiveGroup {
            suite: suite_name.to_string(),
            test: test_name.to_string(),
            dir,
            screenshots: Vec::new(),
        });
    }

    fn finish_group(&self) -> Vec<PathBuf> {
        match self.lock_group().take() {
            Some(group) => {
                debug!(
                    suite = %group.suite,
                    test = %group.test,
                    screenshots = group.screenshots.len(),
                    "Finished screenshot group"
                );
                group.screenshots
            }
            None => {
                debug!("No screenshot group to finish");
                Vec::new()
            }
        }
    }
}

impl CaptureAction for ScreenshotStore {
    fn capture(&self, driver: Option<&dyn BrowserDriver>) -> SnapshotResult<ArtifactReference> {
        let Some(driver) = driver else {
            debug!("No browser open, nothing to capture");
            return Ok(ArtifactReference::empty());
        };

        let settings = self.settings();
        if !settings.screenshots && !settings.save_page_source {
            debug!("Screenshots and page source are both disabled");
            return Ok(ArtifactReference::empty());
        }

        // Read everything from the driver before touching the filesystem, so a
        // failing driver leaves no partial capture behind.
        let png = if settings.screenshots {
            Some(driver.screenshot_png()?)
        } else {
            None
        };
        let html = if settings.save_page_source {
            Some(driver.page_source()?)
        } else {
            None
        };

        let captured_at = Utc::now();
        let timestamp = generate_timestamp(captured_at);
        let basename = generate_basename(&timestamp, self.counter.fetch_add(1, Ordering::Relaxed));

        let (dir, suite, test) = match self.lock_group().as_ref() {
            Some(group) => (
                settings.folder.join(&group.dir),
                Some(group.suite.clone()),
                Some(group.test.clone()),
            ),
            None => (settings.folder.clone(), None, None),
        };
        fs::create_dir_all(&dir)?;

        let screenshot = match png {
            Some(png) => {
                let path = dir.join(format!("{}.png", basename));
                fs::write(&path, png)?;
                if let Some(group) = self.lock_group().as_mut() {
                    group.screenshots.push(path.clone());
                }
                Some(path)
            }
            None => None,
        };

        let page_source = match html {
            Some(html) => {
                let path = dir.join(format!("{}.html", basename));
                fs::write(&path, html)?;
                Some(path)
            }
            None => None,
        };

        if settings.write_manifest {
            let manifest = CaptureManifest {
                suite: suite.as_deref(),
                test: test.as_deref(),
                url: driver.current_url(),
                host: host_name(),
                timestamp: captured_at.to_rfc3339(),
                screenshot: screenshot.as_deref().and_then(|p| p.file_name()).map(Path::new),
                page_source: page_source.as_deref().and_then(|p| p.file_name()).map(Path::new),
            };
            write_manifest(&dir.join(format!("{}.json", basename)), &manifest)?;
        }

        debug!(dir = %dir.display(), basename = %basename, "Captured browser state");

        Ok(ArtifactReference {
            screenshot,
            page_source,
            captured_at,
        })
    }
}

impl ReportDestination for ScreenshotStore {
    fn set_reports_folder(&self, folder: PathBuf) {
        debug!(folder = %folder.display(), "Reports folder set");
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .folder = folder;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MockBrowser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_capture_without_driver_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(dir.path());

        let reference = store.capture(None).unwrap();
        assert!(reference.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_capture_inside_group() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(dir.path());
        let browser = MockBrowser::new(64, 48).with_page("http://localhost/cart", "Cart");

        store.start_group("com.shop.CartTest", "emptyMethod");
        let reference = store.capture(Some(&browser)).unwrap();

        let group_path = dir.path().join("com/shop/CartTest/emptyMethod");
        let screenshot = reference.screenshot.clone().unwrap();
        let page_source = reference.page_source.clone().unwrap();
        assert_eq!(screenshot.parent().unwrap(), group_path.as_path());
        assert!(screenshot.exists());
        assert!(fs::read_to_string(&page_source).unwrap().contains("Cart"));

        let manifest_path = screenshot.with_extension("json");
        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(manifest_path).unwrap()).unwrap();
        assert_eq!(manifest["suite"], "com.shop.CartTest");
        assert_eq!(manifest["test"], "emptyMethod");
        assert_eq!(manifest["url"], "http://localhost/cart");

        assert_eq!(store.finish_group(), vec![screenshot]);
        assert!(store.finish_group().is_empty());
    }

    #[test]
    fn test_capture_outside_group_uses_reports_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(dir.path());
        let browser = MockBrowser::new(16, 16);

        let reference = store.capture(Some(&browser)).unwrap();
        assert_eq!(reference.screenshot.unwrap().parent().unwrap(), dir.path());
    }

    #[test]
    fn test_capture_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(dir.path());
        let browser = MockBrowser::new(16, 16);

        store.start_group("T", "m");
        let first = store.capture(Some(&browser)).unwrap();
        let second = store.capture(Some(&browser)).unwrap();
        assert_ne!(first.screenshot, second.screenshot);
        assert_eq!(store.finish_group().len(), 2);
    }

    #[test]
    fn test_capture_respects_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = ReportSettings::defaults();
        settings.folder = dir.path().to_path_buf();
        settings.save_page_source = false;
        settings.write_manifest = false;
        let store = ScreenshotStore::new(settings);

        let reference = store.capture(Some(&MockBrowser::new(16, 16))).unwrap();
        let screenshot = reference.screenshot.unwrap();
        assert!(reference.page_source.is_none());
        assert!(!screenshot.with_extension("json").exists());
        assert!(!screenshot.with_extension("html").exists());
    }

    #[test]
    fn test_capture_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(dir.path());
        let browser = MockBrowser::new(16, 16).failing("session deleted");

        store.start_group("T", "m");
        assert!(store.capture(Some(&browser)).is_err());
        assert!(store.finish_group().is_empty());
    }

    /// Screenshots work, but reading the page fails
    struct NoPageSource;

    impl BrowserDriver for NoPageSource {
        fn screenshot_png(&self) -> SnapshotResult<Vec<u8>> {
            MockBrowser::new(8, 8).to_png()
        }

        fn page_source(&self) -> SnapshotResult<String> {
            Err(crate::snapshot::SnapshotError::Capture("page crashed".to_string()))
        }
    }

    #[test]
    fn test_page_source_failure_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(dir.path());

        store.start_group("T", "m");
        assert!(store.capture(Some(&NoPageSource)).is_err());

        let group_path = dir.path().join("T/m");
        let files = fs::read_dir(&group_path).map(|entries| entries.count()).unwrap_or(0);
        assert_eq!(files, 0);
        assert!(store.finish_group().is_empty());
    }

    #[test]
    fn test_set_reports_folder() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::in_folder(first.path());

        store.set_reports_folder(second.path().to_path_buf());
        assert_eq!(store.reports_folder(), second.path());

        let reference = store.capture(Some(&MockBrowser::new(8, 8))).unwrap();
        assert!(reference.screenshot.unwrap().starts_with(second.path()));
    }
}
