use std::collections::BTreeMap;

use page_triage::analysis::analyzer::{ANALYZER_VERSION, ElementRow, analyze_snapshot};
use page_triage::analysis::page_structure::extract_page_structure;
use page_triage::dom::dom_model::DomSnapshot;
use page_triage::report::csv::generate_csv;
use page_triage::report::json::{export_analysis, export_id};

mod common;
use crate::common::pages::{node, snapshot};

const TIMESTAMP: u128 = 1_700_000_000_000;

/// ```text
///  0 html
///  1   head
///  2     title "Shop"
///  3     meta[name=description]
///  4   body
///  5     header
///  6       h1 "Welcome"
///  7     main
///  8       h2 "Deals"
///  9       h2 "News"
/// 10       h3 "Today"
/// 11       form#login
/// 12         input[type=email]#email
/// 13         button "Sign in"
/// 14       img
/// 15       a[href=/about] "About us"
/// 16       p "Short"
/// 17       p "A longer paragraph text"
/// 18     footer
/// ```
fn shop_page() -> DomSnapshot {
    snapshot(
        "https://shop.example.com/",
        vec![
            node("html"),
            node("head").with_parent(0),
            node("title").with_parent(1).with_text("Shop"),
            node("meta")
                .with_parent(1)
                .with_attr("name", "description")
                .with_attr("content", "Best shop"),
            node("body").with_parent(0),
            node("header").with_parent(4),
            node("h1").with_parent(5).with_text("Welcome"),
            node("main").with_parent(4),
            node("h2").with_parent(7).with_text("Deals"),
            node("h2").with_parent(7).with_text("News"),
            node("h3").with_parent(7).with_text("Today"),
            node("form").with_parent(7).with_attr("id", "login"),
            node("input").with_parent(11).with_attr("type", "email").with_attr("id", "email"),
            node("button").with_parent(11).with_text("Sign in"),
            node("img").with_parent(7).with_attr("src", "a.png"),
            node("a").with_parent(7).with_attr("href", "/about").with_text("About us"),
            node("p").with_parent(7).with_text("Short"),
            node("p").with_parent(7).with_text("A longer paragraph text"),
            node("footer").with_parent(4),
        ],
    )
}

fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

// ============================================================================
// Page structure
// ============================================================================

#[test]
fn heading_hierarchy_lists_every_level() {
    let page = snapshot(
        "https://example.com/",
        vec![node("h1"), node("h2"), node("h2"), node("h3")],
    );
    let structure = extract_page_structure(&page);
    assert_eq!(
        structure.headings_hierarchy,
        counts(&[("h1", 1), ("h2", 2), ("h3", 1), ("h4", 0), ("h5", 0), ("h6", 0)])
    );
}

#[test]
fn structure_counts_and_metadata() {
    let structure = extract_page_structure(&shop_page());

    assert_eq!(structure.page_title.as_deref(), Some("Shop"));
    assert_eq!(structure.meta_description.as_deref(), Some("Best shop"));
    assert_eq!(structure.forms_count, 1);
    assert_eq!(structure.tables_count, 0);
    assert_eq!(structure.images_count, 1);
    assert_eq!(structure.links_count, 1);
    assert_eq!(
        structure.sections,
        counts(&[
            ("article", 0),
            ("aside", 0),
            ("footer", 1),
            ("header", 1),
            ("main", 1),
            ("nav", 0),
            ("section", 0),
        ])
    );
}

#[test]
fn title_falls_back_to_document_title() {
    let structure = extract_page_structure(&snapshot("https://example.com/", vec![node("body")]));
    assert_eq!(structure.page_title.as_deref(), Some("Test Page"));
    assert_eq!(structure.meta_description, None);
}

// ============================================================================
// Element analysis
// ============================================================================

#[test]
fn summary_counts_by_category() {
    let analysis = analyze_snapshot(&shop_page(), TIMESTAMP);
    let summary = &analysis.elements_summary;

    assert_eq!(summary.total_elements, 19);
    assert_eq!(summary.interactive_elements, 4);
    assert_eq!(summary.media_elements, 1);
    assert_eq!(summary.text_elements, 6);
    assert_eq!(summary.high_priority_elements, 2);
    assert_eq!(
        summary.by_category,
        counts(&[("container", 8), ("interactive", 4), ("media", 1), ("text", 6)])
    );

    let meta = &analysis.analysis_metadata;
    assert_eq!(meta.timestamp_ms, TIMESTAMP);
    assert_eq!(meta.analyzer_version, ANALYZER_VERSION);
    assert_eq!(meta.analyzed_url, "https://shop.example.com/");
}

#[test]
fn detailed_elements_keep_the_interesting_ones() {
    let analysis = analyze_snapshot(&shop_page(), TIMESTAMP);
    let ids: Vec<usize> = analysis.detailed_elements.iter().map(|e| e.element_id).collect();
    // Headings, interactive and media elements, plus the long paragraph.
    assert_eq!(ids, vec![7, 9, 10, 11, 12, 13, 14, 15, 16, 18]);

    let form = &analysis.detailed_elements[4];
    assert_eq!(form.raw_attributes.get("id").map(String::as_str), Some("login"));
    assert_eq!(form.selectors.primary(), "#login");
}

#[test]
fn every_element_gets_a_row() {
    let analysis = analyze_snapshot(&shop_page(), TIMESTAMP);
    assert_eq!(analysis.csv_data.len(), 19);

    let html = &analysis.csv_data[0];
    assert_eq!(html.category, "container");
    assert_eq!(html.importance, "normal");
    assert!(!html.has_text);

    let button = &analysis.csv_data[13];
    assert_eq!(button.element_id, 14);
    assert_eq!(button.tag_name, "button");
    assert_eq!(button.text_content, "Sign in");
    assert_eq!(button.page_region, "main");
    assert!(button.is_interactive);

    let short = &analysis.csv_data[16];
    assert_eq!(short.importance, "medium");
    assert_eq!(analysis.csv_data[6].importance, "high");
}

#[test]
fn quick_view_limits_lists() {
    let analysis = analyze_snapshot(&shop_page(), TIMESTAMP);
    let quick = analysis.quick();

    assert_eq!(quick.interactive_elements.len(), 4);
    assert_eq!(quick.important_headings.len(), 4);
    assert_eq!(quick.page_structure.page_title.as_deref(), Some("Shop"));
    assert_eq!(quick.elements_summary, analysis.elements_summary);

    let many = snapshot(
        "https://example.com/",
        (0..12).map(|_| node("button")).chain((0..7).map(|_| node("h2"))).collect(),
    );
    let quick = analyze_snapshot(&many, TIMESTAMP).quick();
    assert_eq!(quick.interactive_elements.len(), 10);
    assert_eq!(quick.important_headings.len(), 5);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn csv_has_bom_header_and_crlf_rows() {
    let analysis = analyze_snapshot(&shop_page(), TIMESTAMP);
    let csv = generate_csv(&analysis.csv_data);

    assert!(csv.starts_with("\u{feff}element_id,tag_name,primary_selector,all_selectors,"));
    assert_eq!(csv.matches("\r\n").count(), 1 + 19);
    assert_eq!(ElementRow::HEADERS.len(), 13);
    // Selector JSON is quoted with doubled quotes.
    assert!(csv.contains("\"{\"\"id_selector\"\":\"\"#login\"\""));
}

#[test]
fn export_writes_json_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let analysis = analyze_snapshot(&shop_page(), TIMESTAMP);

    let paths = export_analysis(&analysis, &dir.path().join("out")).unwrap();

    assert_eq!(paths.session_id.len(), 8);
    assert_eq!(paths.session_id, export_id(&analysis));
    assert_eq!(
        paths.json.file_name().and_then(|n| n.to_str()),
        Some(format!("analysis_{}.json", paths.session_id).as_str())
    );

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
    assert_eq!(json["analysis_metadata"]["analyzer_version"], "2.0");
    assert_eq!(json["elements_summary"]["total_elements"], 19);
    assert_eq!(json["page_structure"]["headings_hierarchy"]["h2"], 2);

    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    assert_eq!(csv, generate_csv(&analysis.csv_data));
}

#[test]
fn export_id_depends_on_url_and_time() {
    let a = analyze_snapshot(&shop_page(), TIMESTAMP);
    let b = analyze_snapshot(&shop_page(), TIMESTAMP + 1);
    assert_eq!(export_id(&a), export_id(&a.clone()));
    assert_ne!(export_id(&a), export_id(&b));
}
