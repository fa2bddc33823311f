use tracing::debug;

use crate::dom::dom_model::{DomSnapshot, ElementRef};
use crate::element::selector::build_selectors;
use crate::field::field_model::{FieldType, InputFieldRecord};

#[derive(Debug, Clone, Copy)]
enum FieldProbe {
    /// `input[type=…]`
    Typed(&'static str),
    /// `input:not([type])`
    Untyped,
    Textarea,
}

impl FieldProbe {
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        match *self {
            FieldProbe::Typed(t) => el.tag() == "input" && el.type_is(t),
            FieldProbe::Untyped => el.tag() == "input" && !el.has_attr("type"),
            FieldProbe::Textarea => el.tag() == "textarea",
        }
    }
}

const FIELD_PROBES: [FieldProbe; 11] = [
    FieldProbe::Typed("text"),
    FieldProbe::Typed("email"),
    FieldProbe::Typed("password"),
    FieldProbe::Typed("search"),
    FieldProbe::Typed("url"),
    FieldProbe::Typed("tel"),
    FieldProbe::Typed("number"),
    FieldProbe::Untyped,
    FieldProbe::Textarea,
    FieldProbe::Typed("date"),
    FieldProbe::Typed("time"),
];

/// All visible, enabled fillable fields, grouped by probe order.
pub fn find_input_fields(snapshot: &DomSnapshot) -> Vec<InputFieldRecord> {
    let mut fields = Vec::new();
    for probe in FIELD_PROBES.iter() {
        for el in snapshot.elements().filter(|el| probe.matches(el)) {
            if el.is_visible() && el.is_enabled() {
                let record = analyze_field(&el);
                debug!(node = el.id().0, field_type = record.field_type.as_str(), "field discovered");
                fields.push(record);
            }
        }
    }
    fields
}

pub fn analyze_field(el: &ElementRef<'_>) -> InputFieldRecord {
    let input_type = el.attr("type").unwrap_or("text").to_ascii_lowercase();
    let (field_type, display_name) = detect_field_type(
        &input_type,
        el.attr_or_empty("placeholder"),
        el.attr_or_empty("name"),
        el.attr_or_empty("class"),
        el.tag() == "textarea",
    );

    InputFieldRecord {
        node: el.id(),
        selectors: build_selectors(el),
        field_type,
        display_name: display_name.to_string(),
        placeholder: el.attr_or_empty("placeholder").to_string(),
        name: el.attr_or_empty("name").to_string(),
        id: el.attr_or_empty("id").to_string(),
        class: el.attr_or_empty("class").to_string(),
        input_type,
        current_value: el.value().to_string(),
    }
}

/// Decide a field's type from its attributes. Checks run in a fixed order
/// and the first hit wins, so e.g. a "username" name is caught by the
/// earlier "name" check.
pub fn detect_field_type(
    input_type: &str,
    placeholder: &str,
    name: &str,
    class: &str,
    is_textarea: bool,
) -> (FieldType, &'static str) {
    let input_type = input_type.to_lowercase();
    let placeholder = placeholder.to_lowercase();
    let name = name.to_lowercase();
    let class = class.to_lowercase();

    if input_type.contains("search")
        || placeholder.contains("search")
        || name.contains("search")
        || class.contains("search")
    {
        return (FieldType::Search, "Search Box");
    }
    if input_type == "email"
        || placeholder.contains("email")
        || name.contains("mail")
        || class.contains("email")
    {
        return (FieldType::Email, "Email Input");
    }
    if input_type == "password"
        || placeholder.contains("password")
        || name.contains("pass")
        || class.contains("password")
    {
        return (FieldType::Password, "Password Input");
    }
    if input_type == "url" || placeholder.contains("url") || placeholder.contains("website") {
        return (FieldType::Url, "URL Input");
    }
    if is_textarea {
        let mentions = |word: &str| placeholder.contains(word) || name.contains(word);
        let display = if mentions("comment") {
            "Comments Box"
        } else if mentions("message") {
            "Message Box"
        } else if mentions("description") {
            "Description Box"
        } else {
            "Text Area"
        };
        return (FieldType::Textarea, display);
    }
    if input_type == "tel" || placeholder.contains("phone") || name.contains("tel") {
        return (FieldType::Phone, "Phone Number Input");
    }
    if input_type == "number" || placeholder.contains("number") {
        return (FieldType::Number, "Number Input");
    }
    if input_type == "date" {
        return (FieldType::Date, "Date Input");
    }
    if input_type == "time" {
        return (FieldType::Time, "Time Input");
    }

    let mentions = |word: &str| placeholder.contains(word) || name.contains(word);
    if mentions("name") {
        return (FieldType::Name, "Name Input");
    }
    if mentions("username") || name.contains("user") {
        return (FieldType::Username, "Username Input");
    }
    if mentions("address") {
        return (FieldType::Address, "Address Input");
    }
    if mentions("age") {
        return (FieldType::Age, "Age Input");
    }
    if mentions("title") {
        return (FieldType::Title, "Title Input");
    }

    (FieldType::Text, "Text Input")
}
