//! Screen Shooter - screenshots of the browser when UI tests fail.
//!
//! This crate provides:
//! - Lifecycle hooks (suite start, test end, suite end) for test runners
//! - A capture policy: failures only, or every test
//! - Artifact grouping by suite and test, with fallback names for missing metadata
//! - A file-based store writing PNG screenshots, page HTML and JSON manifests
//! - A framebuffer-backed mock browser for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use screen_shooter::{LifecycleCallbacks, ScreenShooter, TestEvent};
//!
//! // Capture every test, not only failures, into a custom folder
//! let mut shooter = ScreenShooter::new(true).to("target/screens");
//! shooter.before_all(&TestEvent::for_class("com.shop.CheckoutTest")).unwrap();
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod snapshot;

// Re-export lifecycle types
pub use lifecycle::{ExtensionContext, LifecycleCallbacks, ScreenShooter, SuiteState, TestEvent};

// Re-export decision and naming types
pub use context::{ContextScope, EMPTY_CLASS, EMPTY_METHOD, RunContext};
pub use policy::{CapturePolicyConfig, Outcome, should_capture};

// Re-export errors
pub use error::{ShooterError, ShooterResult, TestFailure, UiAssertionError};

// Re-export snapshot types and collaborators
pub use snapshot::{
    ArtifactGrouping, ArtifactReference, BrowserDriver, CaptureAction, MockBrowser,
    ReportDestination, ScreenshotStore, SnapshotError, SnapshotResult,
};

// Re-export configuration
pub use config::{Config, ReportSettings};
