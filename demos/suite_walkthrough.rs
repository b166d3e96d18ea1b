//! Walks one simulated suite through the screen shooter hooks.
//!
//! Run with `RUST_LOG=debug cargo run --example suite_walkthrough` to see
//! the group being opened and closed.

use screen_shooter::{LifecycleCallbacks, MockBrowser, ScreenShooter, TestEvent, TestFailure};
use tracing_subscriber::EnvFilter;

const SUITE: &str = "com.demo.LoginTest";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let reports = std::env::temp_dir().join("screen-shooter-demo");
    let mut shooter = ScreenShooter::new(false).to(&reports);
    let browser = MockBrowser::new(640, 400).with_page("http://localhost:8080/login", "Login");

    println!("Reports folder: {}", reports.display());
    shooter.before_all(&TestEvent::for_class(SUITE))?;

    let tests: [(&str, Option<TestFailure>); 3] = [
        ("opens_login_page", None),
        (
            "shows_error_banner",
            Some(TestFailure::ui_assertion("Element should be visible {.error-banner}")),
        ),
        ("submits_credentials", Some(TestFailure::other("connection reset by peer"))),
    ];

    for (name, failure) in &tests {
        let mut event = TestEvent::for_class(SUITE).method(name).driver(&browser);
        if let Some(failure) = failure {
            event = event.failed(failure);
        }
        println!("- {} ({})", name, if failure.is_some() { "failed" } else { "passed" });
        shooter.after_each(&event)?;
    }

    shooter.after_all(&TestEvent::for_class(SUITE))?;
    Ok(())
}
