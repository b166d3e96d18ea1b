//! Error types for the lifecycle hooks and the failure payload reported by the host.

use std::any::Any;

use thiserror::Error;

use crate::snapshot::{ArtifactReference, SnapshotError};

/// Result type for lifecycle operations
pub type ShooterResult<T> = Result<T, ShooterError>;

/// Errors surfaced from the lifecycle callbacks to the host framework
#[derive(Debug, Error)]
pub enum ShooterError {
    /// A test-end or suite-end event arrived without a preceding suite-start.
    #[error("no active suite: before_all was not called or the suite already finished")]
    NoActiveSuite,

    /// The capture collaborator failed. Passed through unchanged.
    #[error("capture failed: {0}")]
    Capture(#[from] SnapshotError),
}

/// Execution error of a finished test, as reported by the host framework.
///
/// The host decides once, at the boundary, whether the failure came from the
/// browser library's own verification primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    /// Human-readable failure message
    pub message: String,
    /// Whether this is a [`UiAssertionError`]
    pub domain_assertion: bool,
}

impl TestFailure {
    /// A failure raised by a UI assertion, which already documents itself
    pub fn ui_assertion(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            domain_assertion: true,
        }
    }

    /// Any other failure (panic, unexpected error, plain `assert!`)
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            domain_assertion: false,
        }
    }

    /// Classify the payload of a caught panic.
    ///
    /// Tests that fail through [`std::panic::panic_any`] with a
    /// [`UiAssertionError`] are domain assertions; `&str` and `String`
    /// payloads from `panic!`/`assert!` and anything else are not.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(err) = payload.downcast_ref::<UiAssertionError>() {
            Self::ui_assertion(err.to_string())
        } else if let Some(msg) = payload.downcast_ref::<&str>() {
            Self::other(*msg)
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            Self::other(msg.clone())
        } else {
            Self::other("test panicked with a non-string payload")
        }
    }
}

impl From<&UiAssertionError> for TestFailure {
    fn from(err: &UiAssertionError) -> Self {
        Self::ui_assertion(err.to_string())
    }
}

/// A failed assertion made by browser verification primitives.
///
/// These errors carry their own screenshot reference, so the lifecycle hooks
/// do not capture again for them under the default policy.
#[derive(Debug, Clone, Error)]
#[error("{message}{}", screenshot_suffix(.screenshot))]
pub struct UiAssertionError {
    /// What was expected and what was found
    pub message: String,
    /// Screenshot taken when the assertion failed
    pub screenshot: Option<ArtifactReference>,
}

impl UiAssertionError {
    /// Create an assertion error without an attached screenshot
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            screenshot: None,
        }
    }

    /// Attach the screenshot taken at the point of failure
    pub fn with_screenshot(mut self, screenshot: ArtifactReference) -> Self {
        self.screenshot = Some(screenshot);
        self
    }
}

fn screenshot_suffix(screenshot: &Option<ArtifactReference>) -> String {
    match screenshot {
        Some(reference) if !reference.is_empty() => format!("\n{}", reference),
        _ => String::new(),
    }
}
