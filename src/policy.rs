//! Decides whether a finished test gets a screenshot.

use serde::{Deserialize, Serialize};

use crate::error::TestFailure;

/// How a test ended, from the point of view of capture decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No execution error
    Success,
    /// Failed through a UI assertion, which carries its own screenshot
    FailureDomainSpecific,
    /// Failed with any other error
    FailureOther,
}

impl Outcome {
    /// Classify the execution error reported with a test-end event
    pub fn classify(error: Option<&TestFailure>) -> Self {
        match error {
            None => Outcome::Success,
            Some(failure) if failure.domain_assertion => Outcome::FailureDomainSpecific,
            Some(_) => Outcome::FailureOther,
        }
    }
}

/// When to capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturePolicyConfig {
    /// Capture after every test regardless of outcome
    pub capture_successful_tests: bool,
}

/// Returns true when the test that just ended should be captured.
///
/// With `capture_successful_tests` every test is captured. Otherwise only
/// [`Outcome::FailureOther`] is: UI assertion failures already embed a
/// screenshot reference.
pub fn should_capture(outcome: Outcome, config: CapturePolicyConfig) -> bool {
    config.capture_successful_tests || outcome == Outcome::FailureOther
}
