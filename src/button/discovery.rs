use std::collections::HashSet;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::button::button_model::{ButtonRecord, InputRef};
use crate::button::prioritizer::{categorize, combined_text};
use crate::dom::dom_model::{DomSnapshot, ElementRef};
use crate::element::selector::build_selectors;

/// One way of recognising a clickable element, modelled on a CSS selector.
#[derive(Debug, Clone, Copy)]
pub enum ButtonProbe {
    /// `tag`
    Tag(&'static str),
    /// `input[type=…]`
    InputType(&'static str),
    /// `tag[role=button]`
    RoleButton(&'static str),
    /// `tag[onclick]`
    TagWithOnclick(&'static str),
    /// `[onclick]`
    AnyOnclick,
    /// `.class`
    Class(&'static str),
}

impl ButtonProbe {
    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        match *self {
            ButtonProbe::Tag(tag) => el.tag() == tag,
            ButtonProbe::InputType(t) => el.tag() == "input" && el.type_is(t),
            ButtonProbe::RoleButton(tag) => el.tag() == tag && el.attr("role") == Some("button"),
            ButtonProbe::TagWithOnclick(tag) => el.tag() == tag && el.has_attr("onclick"),
            ButtonProbe::AnyOnclick => el.has_attr("onclick"),
            ButtonProbe::Class(class) => el.has_class(class),
        }
    }
}

/// Probes in the order they are run; this order is the discovery order.
pub const BUTTON_PROBES: [ButtonProbe; 26] = [
    ButtonProbe::Tag("button"),
    ButtonProbe::InputType("button"),
    ButtonProbe::InputType("submit"),
    ButtonProbe::InputType("reset"),
    ButtonProbe::RoleButton("a"),
    ButtonProbe::TagWithOnclick("a"),
    ButtonProbe::RoleButton("div"),
    ButtonProbe::RoleButton("span"),
    ButtonProbe::AnyOnclick,
    ButtonProbe::Class("btn"),
    ButtonProbe::Class("button"),
    ButtonProbe::Class("click"),
    ButtonProbe::Class("submit"),
    ButtonProbe::Class("send"),
    ButtonProbe::Class("next"),
    ButtonProbe::Class("continue"),
    ButtonProbe::Class("accept"),
    ButtonProbe::Class("agree"),
    ButtonProbe::Class("confirm"),
    ButtonProbe::Class("ok"),
    ButtonProbe::Class("yes"),
    ButtonProbe::Class("no"),
    ButtonProbe::Class("cancel"),
    ButtonProbe::Class("close"),
    ButtonProbe::Class("dismiss"),
    ButtonProbe::Class("skip"),
];

/// Input types a typing guard can watch.
const TEXT_LIKE_INPUTS: [&str; 4] = ["text", "search", "email", "url"];

/// Find every visible, enabled clickable element, in discovery order.
///
/// Elements matched by several probes are reported once; identity is a
/// fingerprint of tag, class attribute and text, so visually identical
/// duplicates collapse as well.
pub fn find_buttons(snapshot: &DomSnapshot) -> Vec<ButtonRecord> {
    let mut seen = HashSet::new();
    let mut buttons = Vec::new();

    for probe in BUTTON_PROBES.iter() {
        for el in snapshot.elements().filter(|el| probe.matches(el)) {
            if !el.is_visible() || !el.is_enabled() {
                continue;
            }
            if !seen.insert(button_fingerprint(&el)) {
                continue;
            }
            let record = analyze_button(&el);
            debug!(
                node = el.id().0,
                probe = ?probe,
                category = %record.category,
                priority = record.priority,
                "button discovered"
            );
            buttons.push(record);
        }
    }

    buttons
}

/// SHA-1 over `tag-class-text`.
pub fn button_fingerprint(el: &ElementRef<'_>) -> String {
    let key = format!("{}-{}-{}", el.tag(), el.attr_or_empty("class"), el.text());
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Build the full button record for one element.
pub fn analyze_button(el: &ElementRef<'_>) -> ButtonRecord {
    let text = el.text_lower();
    let type_attr = el.attr_or_empty("type").to_ascii_lowercase();
    let combined = combined_text([
        text.as_str(),
        el.attr_or_empty("class"),
        el.attr_or_empty("id"),
        el.attr_or_empty("title"),
        el.attr_or_empty("aria-label"),
        el.attr_or_empty("onclick"),
    ]);

    let verdict = categorize(&combined, &type_attr, el.tag());
    let associated_input = if verdict.category.guards_input() {
        find_associated_input(el)
    } else {
        None
    };

    ButtonRecord {
        node: el.id(),
        selectors: build_selectors(el),
        text,
        tag_name: el.tag().to_string(),
        type_attr,
        combined_text: combined,
        category: verdict.category,
        priority: verdict.priority,
        description: verdict.description,
        associated_input,
    }
}

/// First visible, enabled text-like input sharing the button's parent.
pub fn find_associated_input(button: &ElementRef<'_>) -> Option<InputRef> {
    let container = button.parent()?;

    container
        .descendants()
        .into_iter()
        .filter(|el| matches!(el.tag(), "input" | "textarea"))
        .filter(|el| el.is_visible() && el.is_enabled())
        .find(|el| !el.has_attr("type") || TEXT_LIKE_INPUTS.iter().any(|t| el.type_is(t)))
        .map(|input| InputRef {
            node: input.id(),
            selector: build_selectors(&input).primary().to_string(),
            input_type: input.attr("type").unwrap_or("text").to_ascii_lowercase(),
            placeholder: input.attr_or_empty("placeholder").to_string(),
            value: input.value().to_string(),
        })
}
