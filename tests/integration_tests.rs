//! Tests against a real browser through `driver/page_driver.js`.
//!
//! They need Node.js with Playwright installed and a Chromium-based browser
//! started with `--remote-debugging-port=9222`. They are marked `#[ignore]`;
//! run them with:
//!
//! ```bash
//! cargo test -- --ignored
//! ```

use std::time::Duration;

use page_triage::browser::endpoint::{DEFAULT_DEBUG_PORTS, DebugEndpoint, discover_endpoint};
use page_triage::browser::handle::BrowserHandle;
use page_triage::browser::session::{DriverConfig, DriverSession};
use page_triage::button::button_model::ButtonCategory;
use page_triage::guard::clock::SystemClock;
use page_triage::orchestrator::orchestrator::{FieldValues, Orchestrator, OrchestratorConfig};
use page_triage::orchestrator::session::Session;

mod common;
use crate::common::pages::fixture;

const PAGE: &str = "consent_search.html";

fn endpoint() -> DebugEndpoint {
    discover_endpoint("localhost", &DEFAULT_DEBUG_PORTS, Duration::from_secs(2)).unwrap()
}

fn driver() -> DriverSession {
    DriverSession::connect(&DriverConfig::default(), &endpoint().http_url()).unwrap()
}

/// Orchestrator with short pauses so the suite stays quick.
fn fast_orchestrator() -> Orchestrator {
    Orchestrator::new(
        OrchestratorConfig {
            settle: Duration::from_millis(200),
            click_pause: Duration::from_millis(100),
            fill_pause: Duration::from_millis(50),
            key_delay: Duration::from_millis(10),
            ..OrchestratorConfig::default()
        },
        Default::default(),
    )
}

// ============================================================================
// Driver
// ============================================================================

#[test]
#[ignore]
fn test_endpoint_is_discovered() {
    let endpoint = endpoint();
    assert!(!endpoint.browser.is_empty());
}

#[test]
#[ignore]
fn test_navigate_and_snapshot() {
    let mut driver = driver();
    let url = fixture(PAGE);
    driver.navigate(&url, Duration::from_secs(30)).unwrap();
    let snapshot = driver.snapshot().unwrap();

    assert_eq!(snapshot.title, "Consent and Search");
    assert!(snapshot.count_tag("button") >= 3);
    assert_eq!(driver.last_url(), Some(url.as_str()));
    driver.disconnect().unwrap();
}

#[test]
#[ignore]
fn test_type_and_read_value() {
    let mut driver = driver();
    driver.navigate(&fixture(PAGE), Duration::from_secs(30)).unwrap();
    let snapshot = driver.snapshot().unwrap();
    let input = snapshot.elements().find(|el| el.attr("name") == Some("q")).unwrap().id();

    driver.fill(input, "").unwrap();
    driver.type_text(input, "lamp", Duration::from_millis(10)).unwrap();
    assert_eq!(driver.read_value(input).unwrap(), "lamp");
}

// ============================================================================
// Orchestrator
// ============================================================================

#[test]
#[ignore]
fn test_scan_fixture_page() {
    let mut session = Session::open(driver(), Box::new(SystemClock));
    let report = fast_orchestrator().scan(&mut session, &fixture(PAGE), &[]).unwrap();

    assert_eq!(report.buttons[0].category, ButtonCategory::CookieConsent);
    assert!(report.buttons.iter().any(|b| b.category == ButtonCategory::Submit));
    assert_eq!(report.buttons.last().map(|b| b.category), Some(ButtonCategory::Cancel));
    session.close().unwrap();
}

#[test]
#[ignore]
fn test_fill_then_process() {
    let mut session = Session::open(driver(), Box::new(SystemClock));
    let orchestrator = fast_orchestrator();
    let url = fixture(PAGE);

    let mut values = FieldValues([("q".to_string(), "lamp".to_string())].into_iter().collect());
    let fill = orchestrator.fill_form(&mut session, &url, &mut values).unwrap();
    assert_eq!(fill.filled_fields, 1);

    let report = orchestrator.process(&mut session, &url, &[]).unwrap();
    assert!(report.success);
    assert!(report.processed >= 1);
    session.close().unwrap();
}
