//! Naming context for captured artifacts.
//!
//! A [`RunContext`] labels everything captured between suite start and suite
//! end. Missing test metadata never reaches the store as an empty name; it is
//! replaced by [`EMPTY_CLASS`] / [`EMPTY_METHOD`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::error::{ShooterError, ShooterResult};
use crate::snapshot::ArtifactGrouping;

/// Suite name used when the host reports no test class
pub const EMPTY_CLASS: &str = "EmptyClass";

/// Test name used when the host reports no test method
pub const EMPTY_METHOD: &str = "emptyMethod";

/// Resolved (suite, test) names used to label artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub suite_name: String,
    pub test_name: String,
}

impl RunContext {
    /// Resolve optional metadata, substituting sentinels for absent or empty values
    pub fn resolve(test_class: Option<&str>, test_method: Option<&str>) -> Self {
        Self {
            suite_name: or_sentinel(test_class, EMPTY_CLASS),
            test_name: or_sentinel(test_method, EMPTY_METHOD),
        }
    }
}

fn or_sentinel(value: Option<&str>, sentinel: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(sentinel)
        .to_string()
}

/// Tracks the active suite and opens/closes its artifact group
#[derive(Debug)]
pub struct ContextScope<G> {
    grouping: Arc<G>,
    active: Option<RunContext>,
}

impl<G: ArtifactGrouping> ContextScope<G> {
    pub fn new(grouping: Arc<G>) -> Self {
        Self {
            grouping,
            active: None,
        }
    }

    /// Resolve the names, start the group and make it the active scope.
    ///
    /// Must be called once per suite before any test-end event. A scope
    /// that is still active is replaced without finishing its group.
    pub fn enter_suite(&mut self, test_class: Option<&str>, test_method: Option<&str>) -> RunContext {
        let context = RunContext::resolve(test_class, test_method);
        if let Some(previous) = &self.active {
            warn!(
                suite = %previous.suite_name,
                test = %previous.test_name,
                "Suite entered while another was active; previous group left unfinished"
            );
        }
        self.grouping.start_group(&context.suite_name, &context.test_name);
        self.active = Some(context.clone());
        context
    }

    /// Finish the active group and clear the scope.
    ///
    /// Fails with [`ShooterError::NoActiveSuite`] when no suite was entered,
    /// leaving the grouping collaborator untouched.
    pub fn exit_suite(&mut self) -> ShooterResult<RunContext> {
        let context = self.active.take().ok_or(ShooterError::NoActiveSuite)?;
        self.grouping.finish_group();
        Ok(context)
    }

    /// The suite currently in scope
    pub fn active(&self) -> Option<&RunContext> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGroups {
        calls: Mutex<Vec<String>>,
    }

    impl ArtifactGrouping for RecordingGroups {
        fn start_group(&self, suite_name: &str, test_name: &str) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("start {}/{}", suite_name, test_name));
        }

        fn finish_group(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().push("finish".to_string());
            Vec::new()
        }
    }

    fn calls(groups: &RecordingGroups) -> Vec<String> {
        groups.calls.lock().unwrap().clone()
    }

    #[test]
    fn test_enter_suite_with_sentinels() {
        let mut scope = ContextScope::new(Arc::new(RecordingGroups::default()));
        let context = scope.enter_suite(None, None);
        assert_eq!(
            context,
            RunContext {
                suite_name: "EmptyClass".to_string(),
                test_name: "emptyMethod".to_string(),
            }
        );
    }

    #[test]
    fn test_enter_suite_with_metadata() {
        let groups = Arc::new(RecordingGroups::default());
        let mut scope = ContextScope::new(groups.clone());
        let context = scope.enter_suite(Some("com.x.T"), Some("m"));

        assert_eq!(context.suite_name, "com.x.T");
        assert_eq!(context.test_name, "m");
        assert_eq!(scope.active(), Some(&context));
        assert_eq!(calls(&groups), vec!["start com.x.T/m"]);
    }

    #[test]
    fn test_empty_metadata_is_treated_as_absent() {
        let context = RunContext::resolve(Some(""), Some(""));
        assert_eq!(context.suite_name, EMPTY_CLASS);
        assert_eq!(context.test_name, EMPTY_METHOD);
    }

    #[test]
    fn test_exit_suite_finishes_once() {
        let groups = Arc::new(RecordingGroups::default());
        let mut scope = ContextScope::new(groups.clone());

        scope.enter_suite(Some("A"), None);
        let finished = scope.exit_suite().unwrap();
        assert_eq!(finished.suite_name, "A");
        assert!(scope.active().is_none());

        assert!(matches!(scope.exit_suite(), Err(ShooterError::NoActiveSuite)));
        assert_eq!(calls(&groups), vec!["start A/emptyMethod", "finish"]);
    }

    #[test]
    fn test_reentering_replaces_scope_without_finishing() {
        let groups = Arc::new(RecordingGroups::default());
        let mut scope = ContextScope::new(groups.clone());

        scope.enter_suite(Some("A"), Some("a"));
        let second = scope.enter_suite(Some("B"), None);

        assert_eq!(scope.active(), Some(&second));
        assert_eq!(calls(&groups), vec!["start A/a", "start B/emptyMethod"]);

        // Only the replacement is finished
        assert_eq!(scope.exit_suite().unwrap().suite_name, "B");
        assert!(scope.active().is_none());
        assert_eq!(
            calls(&groups),
            vec!["start A/a", "start B/emptyMethod", "finish"]
        );
    }

    #[test]
    fn test_second_suite_starts_fresh() {
        let groups = Arc::new(RecordingGroups::default());
        let mut scope = ContextScope::new(groups.clone());

        scope.enter_suite(Some("A"), Some("a"));
        scope.exit_suite().unwrap();
        let second = scope.enter_suite(Some("B"), None);

        assert_eq!(second.suite_name, "B");
        assert_eq!(second.test_name, EMPTY_METHOD);
        assert_eq!(scope.active(), Some(&second));
        assert_eq!(
            calls(&groups),
            vec!["start A/a", "finish", "start B/emptyMethod"]
        );
    }
}
