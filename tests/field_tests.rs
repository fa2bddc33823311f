use page_triage::dom::dom_model::NodeId;
use page_triage::field::discovery::{detect_field_type, find_input_fields};
use page_triage::field::field_model::FieldType;

mod common;
use crate::common::pages::{node, snapshot};

// ============================================================================
// Type detection
// ============================================================================

#[test]
fn search_wins_over_everything_else() {
    let (kind, display) = detect_field_type("text", "Search by email", "q", "", false);
    assert_eq!(kind, FieldType::Search);
    assert_eq!(display, "Search Box");
}

#[test]
fn email_and_password_hints() {
    assert_eq!(detect_field_type("text", "", "user_mail", "", false).0, FieldType::Email);
    assert_eq!(detect_field_type("email", "", "", "", false).0, FieldType::Email);
    assert_eq!(detect_field_type("text", "", "passcode", "", false).0, FieldType::Password);
    assert_eq!(detect_field_type("text", "", "", "Password-Field", false).0, FieldType::Password);
}

#[test]
fn url_hint_from_placeholder() {
    let (kind, display) = detect_field_type("text", "Your website", "", "", false);
    assert_eq!(kind, FieldType::Url);
    assert_eq!(display, "URL Input");
}

#[test]
fn textarea_display_names() {
    assert_eq!(detect_field_type("text", "Leave a comment", "", "", true).1, "Comments Box");
    assert_eq!(detect_field_type("text", "", "message", "", true).1, "Message Box");
    assert_eq!(detect_field_type("text", "", "description", "", true).1, "Description Box");
    assert_eq!(detect_field_type("text", "", "", "", true), (FieldType::Textarea, "Text Area"));
}

#[test]
fn name_check_precedes_username() {
    // "username" contains "name", so the earlier check wins.
    assert_eq!(detect_field_type("text", "", "username", "", false).0, FieldType::Name);
    assert_eq!(detect_field_type("text", "", "user_id", "", false).0, FieldType::Username);
}

#[test]
fn typed_controls_and_fallback() {
    assert_eq!(detect_field_type("tel", "", "", "", false).0, FieldType::Phone);
    assert_eq!(detect_field_type("number", "", "", "", false).0, FieldType::Number);
    assert_eq!(detect_field_type("date", "", "", "", false).0, FieldType::Date);
    assert_eq!(detect_field_type("time", "", "", "", false).0, FieldType::Time);
    assert_eq!(detect_field_type("text", "Street address", "", "", false).0, FieldType::Address);
    assert_eq!(detect_field_type("text", "", "", "", false), (FieldType::Text, "Text Input"));
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn fields_are_grouped_by_probe_order() {
    let page = snapshot(
        "https://example.com/form",
        vec![
            node("form"),
            node("textarea").with_parent(0).with_attr("name", "comment"),
            node("input").with_parent(0).with_attr("type", "email").with_attr("id", "mail"),
            node("input").with_parent(0).with_attr("name", "city"),
            node("input").with_parent(0).with_attr("type", "text").with_attr("name", "full_name"),
            node("input").with_parent(0).with_attr("type", "checkbox"),
            node("input").with_parent(0).with_attr("type", "date"),
        ],
    );
    let fields = find_input_fields(&page);
    let nodes: Vec<usize> = fields.iter().map(|f| f.node.0).collect();
    // text, email, untyped, textarea, date; checkbox is not fillable.
    assert_eq!(nodes, vec![4, 2, 3, 1, 6]);

    let untyped = &fields[2];
    assert_eq!(untyped.input_type, "text");
    assert_eq!(untyped.field_type, FieldType::Text);
}

#[test]
fn hidden_and_disabled_fields_are_skipped() {
    let page = snapshot(
        "https://example.com/form",
        vec![
            node("form"),
            node("input").with_parent(0).with_attr("type", "text").hidden(),
            node("input").with_parent(0).with_attr("type", "text").disabled(),
            node("input").with_parent(0).with_attr("type", "text").with_value("prefilled"),
        ],
    );
    let fields = find_input_fields(&page);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].node, NodeId(3));
    assert_eq!(fields[0].current_value, "prefilled");
}

#[test]
fn description_prefers_name_then_id() {
    let page = snapshot(
        "https://example.com/form",
        vec![
            node("form"),
            node("input").with_parent(0).with_attr("type", "email").with_attr("name", "contact").with_attr("id", "c"),
            node("input").with_parent(0).with_attr("type", "password").with_attr("id", "pw"),
            node("input").with_parent(0).with_attr("type", "number"),
        ],
    );
    let fields = find_input_fields(&page);
    assert_eq!(fields[0].description(), "Email Input (name: contact)");
    assert_eq!(fields[1].description(), "Password Input (id: pw)");
    assert_eq!(fields[2].description(), "Number Input");
}

#[test]
fn prompts_mention_the_display_name() {
    assert_eq!(
        FieldType::Email.prompt("Email Input"),
        "Enter email address for Email Input (or press Enter to skip): "
    );
    assert!(FieldType::Date.prompt("Date Input").contains("YYYY-MM-DD"));
}

#[test]
fn input_type_matching_ignores_case() {
    let page = snapshot(
        "https://example.com/form",
        vec![node("form"), node("input").with_parent(0).with_attr("type", "EMAIL")],
    );
    let fields = find_input_fields(&page);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_type, FieldType::Email);
    assert_eq!(fields[0].input_type, "email");
}
