use crate::analysis::analyzer::PageAnalysis;
use crate::field::field_model::InputFieldRecord;
use crate::orchestrator::orchestrator::{ClickResult, FieldStatus, FillReport, ProcessReport, ScanReport};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

fn marker(success: bool) -> &'static str {
    if success { "\u{2713}" } else { "\u{2717}" }
}

/// ```text
/// === Buttons on Example (3 found) ===
///  10  cookie_consent   Cookie Consent Button: accept all   #accept
/// ```
pub fn format_scan_report(report: &ScanReport) -> String {
    let mut out = format!(
        "=== Buttons on {} ({} found) ===\n",
        if report.title.is_empty() { &report.url } else { &report.title },
        report.buttons.len()
    );

    for b in &report.buttons {
        out.push_str(&format!(
            "{:>3}  {:<16} {}  {}\n",
            b.priority,
            b.category.as_str(),
            b.description,
            b.selectors.primary()
        ));
        if let Some(input) = &b.associated_input {
            out.push_str(&format!("       input: {} (value: '{}')\n", input.selector, input.value));
        }
    }

    out
}

pub fn format_click_result(result: &ClickResult) -> String {
    let mut line = format!("{} {}", marker(result.success), result.message);
    if let Some(text) = &result.button_text {
        line.push_str(&format!(" [{}]", text));
    }
    if let Some(guard) = &result.guard {
        line.push_str(&format!(" (typing guard: {:?}, {})", guard.state, guard.exit));
    }
    line.push('\n');
    line
}

pub fn format_process_report(report: &ProcessReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        out.push_str(&format_click_result(result));
    }
    out.push_str(&format!(
        "\n=== {}: {} processed of {} ===\n",
        report.message, report.processed, report.total
    ));
    out
}

pub fn format_fields(fields: &[InputFieldRecord]) -> String {
    let mut out = format!("=== {} input field(s) ===\n", fields.len());
    for (i, f) in fields.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}  {}\n", i + 1, f.description(), f.selectors.primary()));
        if !f.placeholder.is_empty() {
            out.push_str(&format!("     placeholder: {}\n", f.placeholder));
        }
    }
    out
}

pub fn format_fill_report(report: &FillReport) -> String {
    let mut out = String::new();
    for outcome in &report.fields {
        let status = match &outcome.status {
            FieldStatus::Filled => "filled".to_string(),
            FieldStatus::Skipped => "skipped".to_string(),
            FieldStatus::Failed(e) => format!("failed: {}", e),
        };
        out.push_str(&format!("  {}  {}\n", outcome.field, status));
    }
    out.push_str(&format!(
        "\n=== {}: {} filled, {} skipped ({} total) ===\n",
        report.message, report.filled_fields, report.skipped_fields, report.total_fields
    ));
    out
}

pub fn format_analysis_summary(analysis: &PageAnalysis) -> String {
    let meta = &analysis.analysis_metadata;
    let summary = &analysis.elements_summary;
    let structure = &analysis.page_structure;

    let mut out = format!("=== Analysis of {} ===\n", meta.analyzed_url);
    if let Some(title) = &structure.page_title {
        out.push_str(&format!("Title: {}\n", title));
    }
    out.push_str(&format!(
        "Elements: {} total, {} interactive, {} media, {} text, {} with id\n",
        summary.total_elements,
        summary.interactive_elements,
        summary.media_elements,
        summary.text_elements,
        summary.high_priority_elements
    ));
    out.push_str(&format!(
        "Forms: {}  Tables: {}  Images: {}  Links: {}\n",
        structure.forms_count, structure.tables_count, structure.images_count, structure.links_count
    ));

    let headings: Vec<String> = structure
        .headings_hierarchy
        .iter()
        .map(|(h, n)| format!("{}={}", h, n))
        .collect();
    out.push_str(&format!("Headings: {}\n", headings.join(" ")));
    out.push_str(&format!("Detailed elements: {}\n", analysis.detailed_elements.len()));
    out
}
