//! Configuration management with environment variable support.
//!
//! This module provides centralized configuration for the screen shooter, supporting:
//! - Environment variables for all configurable values
//! - Sensible defaults for a typical browser test project layout
//! - Builder-style overrides for programmatic configuration
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SCREEN_SHOOTER_REPORTS_FOLDER` | Folder receiving screenshots and page sources | `build/reports/tests` |
//! | `SCREEN_SHOOTER_SCREENSHOTS` | Whether PNG screenshots are taken | `true` |
//! | `SCREEN_SHOOTER_SAVE_PAGE_SOURCE` | Whether the page HTML is saved next to the screenshot | `true` |
//! | `SCREEN_SHOOTER_MANIFEST` | Whether a JSON manifest is written per capture | `true` |
//! | `SCREEN_SHOOTER_CAPTURE_SUCCESSFUL` | Capture after every test, not only failures | `false` |
//!
//! # Example
//!
//! ```bash
//! # Keep artifacts next to the CI job output and capture everything
//! export SCREEN_SHOOTER_REPORTS_FOLDER="target/ui-reports"
//! export SCREEN_SHOOTER_CAPTURE_SUCCESSFUL=true
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::policy::CapturePolicyConfig;

// ============================================================================
// Default Values
// ============================================================================

/// Default folder for captured artifacts
pub const DEFAULT_REPORTS_FOLDER: &str = "build/reports/tests";

/// Screenshots are taken unless disabled
pub const DEFAULT_SCREENSHOTS: bool = true;

/// Page source is saved unless disabled
pub const DEFAULT_SAVE_PAGE_SOURCE: bool = true;

/// A manifest is written for each capture unless disabled
pub const DEFAULT_WRITE_MANIFEST: bool = true;

/// Only failures are captured by default
pub const DEFAULT_CAPTURE_SUCCESSFUL: bool = false;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for the reports folder
pub const ENV_REPORTS_FOLDER: &str = "SCREEN_SHOOTER_REPORTS_FOLDER";

/// Environment variable toggling screenshots
pub const ENV_SCREENSHOTS: &str = "SCREEN_SHOOTER_SCREENSHOTS";

/// Environment variable toggling page source capture
pub const ENV_SAVE_PAGE_SOURCE: &str = "SCREEN_SHOOTER_SAVE_PAGE_SOURCE";

/// Environment variable toggling the per-capture manifest
pub const ENV_WRITE_MANIFEST: &str = "SCREEN_SHOOTER_MANIFEST";

/// Environment variable for capturing successful tests
pub const ENV_CAPTURE_SUCCESSFUL: &str = "SCREEN_SHOOTER_CAPTURE_SUCCESSFUL";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration for the screen shooter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where and what to write when a capture happens
    pub reports: ReportSettings,
    /// When to capture
    pub policy: CapturePolicyConfig,
}

/// Artifact output settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Base folder for artifacts
    pub folder: PathBuf,
    /// Take PNG screenshots
    pub screenshots: bool,
    /// Save the page HTML
    pub save_page_source: bool,
    /// Write a JSON manifest beside each capture
    pub write_manifest: bool,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            reports: ReportSettings::from_env(),
            policy: CapturePolicyConfig {
                capture_successful_tests: env_flag(ENV_CAPTURE_SUCCESSFUL, DEFAULT_CAPTURE_SUCCESSFUL),
            },
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            reports: ReportSettings::defaults(),
            policy: CapturePolicyConfig::default(),
        }
    }

    /// Override the reports folder
    pub fn reports_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.reports.folder = folder.into();
        self
    }

    /// Override the capture policy
    pub fn capture_successful_tests(mut self, capture: bool) -> Self {
        self.policy.capture_successful_tests = capture;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ReportSettings {
    /// Create report settings from environment variables
    pub fn from_env() -> Self {
        Self {
            folder: env::var(ENV_REPORTS_FOLDER)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORTS_FOLDER)),
            screenshots: env_flag(ENV_SCREENSHOTS, DEFAULT_SCREENSHOTS),
            save_page_source: env_flag(ENV_SAVE_PAGE_SOURCE, DEFAULT_SAVE_PAGE_SOURCE),
            write_manifest: env_flag(ENV_WRITE_MANIFEST, DEFAULT_WRITE_MANIFEST),
        }
    }

    /// Create report settings with defaults
    pub fn defaults() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_REPORTS_FOLDER),
            screenshots: DEFAULT_SCREENSHOTS,
            save_page_source: DEFAULT_SAVE_PAGE_SOURCE,
            write_manifest: DEFAULT_WRITE_MANIFEST,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(default)
}

/// Parse a boolean flag
/// Supports: "1"/"0", "true"/"false", "yes"/"no", "on"/"off" (case-insensitive)
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
