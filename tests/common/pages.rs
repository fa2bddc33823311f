use std::rc::Rc;

use page_triage::dom::dom_model::{DomNode, DomSnapshot};
use page_triage::guard::clock::ManualClock;
use page_triage::orchestrator::session::Session;

use crate::common::fake_browser::FakeBrowser;

pub fn snapshot(url: &str, nodes: Vec<DomNode>) -> DomSnapshot {
    DomSnapshot::new(url, "Test Page", nodes)
}

pub fn node(tag: &str) -> DomNode {
    DomNode::new(tag)
}

/// Single-node snapshot for element-level checks.
pub fn single(element: DomNode) -> DomSnapshot {
    snapshot("https://example.com/", vec![element])
}

/// Session over `browser` whose clock is shared with the test.
pub fn session_with_clock(browser: FakeBrowser) -> (Session<FakeBrowser>, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let session = Session::open(browser, Box::new(Rc::clone(&clock)));
    (session, clock)
}

/// ```text
/// 0 body
/// 1   div.cookie-banner
/// 2     button.btn.accept-cookies  "Accept All Cookies"
/// 3   form#search
/// 4     input[type=search][name=q]
/// 5     button[type=submit]        "Search"
/// 6   a[role=button]               "Next"
/// 7   button                       "Cancel"
/// ```
pub fn landing_page() -> DomSnapshot {
    snapshot(
        "https://example.com/",
        vec![
            node("body"),
            node("div").with_parent(0).with_attr("class", "cookie-banner"),
            node("button")
                .with_parent(1)
                .with_attr("class", "btn accept-cookies")
                .with_text("Accept All Cookies"),
            node("form").with_parent(0).with_attr("id", "search"),
            node("input")
                .with_parent(3)
                .with_attr("type", "search")
                .with_attr("name", "q")
                .with_value(""),
            node("button")
                .with_parent(3)
                .with_attr("type", "submit")
                .with_text("Search"),
            node("a").with_parent(0).with_attr("role", "button").with_text("Next"),
            node("button").with_parent(0).with_text("Cancel"),
        ],
    )
}

/// `file://` url of a page under `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    let path = std::env::current_dir()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name);
    format!("file://{}", path.display())
}
