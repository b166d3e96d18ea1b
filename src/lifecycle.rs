//! Lifecycle hooks that capture the browser when a test fails.
//!
//! Register a [`ScreenShooter`] with the test runner as a
//! [`LifecycleCallbacks`] implementation:
//!
//! - `before_all` opens the suite's artifact group
//! - `after_each` captures when the policy says so and logs the reference
//! - `after_all` closes the group
//!
//! # Concurrency
//!
//! Coordinators built with [`ScreenShooter::new`] share
//! [`ScreenshotStore::shared`], whose active group is process-wide. If the
//! runner executes suites in parallel, one suite's `before_all` replaces
//! another's group and artifacts can land in the wrong folder. Use
//! [`ScreenShooter::with_store`] with a store per suite to avoid that.
//!
//! # Example
//!
//! ```rust,no_run
//! use screen_shooter::{LifecycleCallbacks, MockBrowser, ScreenShooter, TestEvent, TestFailure};
//!
//! let mut shooter = ScreenShooter::new(false).to("target/ui-reports");
//! let browser = MockBrowser::new(800, 600).with_page("http://localhost/", "Home");
//!
//! shooter.before_all(&TestEvent::for_class("com.shop.HomeTest"))?;
//! let failure = TestFailure::other("connection refused");
//! shooter.after_each(
//!     &TestEvent::for_class("com.shop.HomeTest")
//!         .method("opens")
//!         .failed(&failure)
//!         .driver(&browser),
//! )?;
//! shooter.after_all(&TestEvent::for_class("com.shop.HomeTest"))?;
//! # Ok::<(), screen_shooter::ShooterError>(())
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::context::{ContextScope, RunContext};
use crate::error::{ShooterError, ShooterResult, TestFailure};
use crate::policy::{CapturePolicyConfig, Outcome, should_capture};
use crate::snapshot::{
    ArtifactGrouping, BrowserDriver, CaptureAction, ReportDestination, ScreenshotStore,
};

/// What the test runner exposes about the current suite or test
pub trait ExtensionContext {
    /// Fully qualified name of the test class or module
    fn test_class(&self) -> Option<&str>;

    /// Test method name; usually absent at suite granularity
    fn test_method(&self) -> Option<&str>;

    /// Error the test ended with, if it failed
    fn execution_error(&self) -> Option<&TestFailure>;

    /// The browser the test is driving, if one is open
    fn driver(&self) -> Option<&dyn BrowserDriver>;
}

/// Suite-start, test-end and suite-end hooks
///
/// Errors returned from a hook belong to the runner's hook-error handling;
/// they never change the test's own result.
pub trait LifecycleCallbacks {
    fn before_all(&mut self, context: &dyn ExtensionContext) -> ShooterResult<()>;

    fn after_each(&mut self, context: &dyn ExtensionContext) -> ShooterResult<()>;

    fn after_all(&mut self, context: &dyn ExtensionContext) -> ShooterResult<()>;
}

/// Lifecycle event data assembled by a test runner
#[derive(Default, Clone, Copy)]
pub struct TestEvent<'a> {
    test_class: Option<&'a str>,
    test_method: Option<&'a str>,
    error: Option<&'a TestFailure>,
    driver: Option<&'a dyn BrowserDriver>,
}

impl<'a> TestEvent<'a> {
    /// Event with no metadata at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Event for the given test class
    pub fn for_class(test_class: &'a str) -> Self {
        Self {
            test_class: Some(test_class),
            ..Self::default()
        }
    }

    /// Set the test method
    pub fn method(mut self, test_method: &'a str) -> Self {
        self.test_method = Some(test_method);
        self
    }

    /// Mark the test as failed with the given error
    pub fn failed(mut self, error: &'a TestFailure) -> Self {
        self.error = Some(error);
        self
    }

    /// Attach the browser the test is driving
    pub fn driver(mut self, driver: &'a dyn BrowserDriver) -> Self {
        self.driver = Some(driver);
        self
    }
}

impl ExtensionContext for TestEvent<'_> {
    fn test_class(&self) -> Option<&str> {
        self.test_class
    }

    fn test_method(&self) -> Option<&str> {
        self.test_method
    }

    fn execution_error(&self) -> Option<&TestFailure> {
        self.error
    }

    fn driver(&self) -> Option<&dyn BrowserDriver> {
        self.driver
    }
}

/// Whether a suite is between `before_all` and `after_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    Idle,
    SuiteActive,
}

/// Captures screenshots and page source after failed (or all) tests
pub struct ScreenShooter<S = ScreenshotStore> {
    policy: CapturePolicyConfig,
    store: Arc<S>,
    scope: ContextScope<S>,
}

impl ScreenShooter<ScreenshotStore> {
    /// Coordinator on the shared store.
    ///
    /// With `capture_successful_tests` every test is captured, not only
    /// failures.
    pub fn new(capture_successful_tests: bool) -> Self {
        Self::with_store(
            CapturePolicyConfig {
                capture_successful_tests,
            },
            ScreenshotStore::shared(),
        )
    }

    /// Coordinator on a dedicated store built from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::with_store(
            config.policy,
            Arc::new(ScreenshotStore::new(config.reports.clone())),
        )
    }
}

impl Default for ScreenShooter<ScreenshotStore> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<S> ScreenShooter<S>
where
    S: ArtifactGrouping + CaptureAction + ReportDestination,
{
    /// Coordinator on an explicit store
    pub fn with_store(policy: CapturePolicyConfig, store: Arc<S>) -> Self {
        Self {
            policy,
            scope: ContextScope::new(store.clone()),
            store,
        }
    }

    /// Send artifacts to `folder`. The folder is not validated here.
    pub fn to(self, folder: impl Into<PathBuf>) -> Self {
        self.store.set_reports_folder(folder.into());
        self
    }

    pub fn policy(&self) -> CapturePolicyConfig {
        self.policy
    }

    pub fn state(&self) -> SuiteState {
        match self.scope.active() {
            Some(_) => SuiteState::SuiteActive,
            None => SuiteState::Idle,
        }
    }

    /// The active suite's naming context
    pub fn run_context(&self) -> Option<&RunContext> {
        self.scope.active()
    }
}

impl<S> LifecycleCallbacks for ScreenShooter<S>
where
    S: ArtifactGrouping + CaptureAction + ReportDestination,
{
    fn before_all(&mut self, context: &dyn ExtensionContext) -> ShooterResult<()> {
        let run = self
            .scope
            .enter_suite(context.test_class(), context.test_method());
        debug!(suite = %run.suite_name, test = %run.test_name, "Suite started");
        Ok(())
    }

    /// Requires a preceding `before_all`; otherwise returns
    /// [`ShooterError::NoActiveSuite`] without capturing.
    fn after_each(&mut self, context: &dyn ExtensionContext) -> ShooterResult<()> {
        let run = self.scope.active().ok_or(ShooterError::NoActiveSuite)?;

        let outcome = Outcome::classify(context.execution_error());
        if !should_capture(outcome, self.policy) {
            debug!(suite = %run.suite_name, ?outcome, "No capture needed");
            return Ok(());
        }

        let reference = self.store.capture(context.driver())?;
        info!(suite = %run.suite_name, test = %run.test_name, "{}", reference);
        Ok(())
    }

    fn after_all(&mut self, _context: &dyn ExtensionContext) -> ShooterResult<()> {
        let run = self.scope.exit_suite()?;
        debug!(suite = %run.suite_name, test = %run.test_name, "Suite finished");
        Ok(())
    }
}
