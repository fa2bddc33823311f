use serde::{Deserialize, Serialize};

use crate::dom::dom_model::{ElementRef, SURROUNDING_TEXT_CHARS};

pub const LANDMARK_TAGS: [&str; 7] = ["header", "main", "footer", "nav", "aside", "section", "article"];

const MAX_SIBLINGS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurroundingText {
    pub before: String,
    pub after: String,
}

/// Where an element sits in the page: parent, neighbours and landmark region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_tag: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_classes: Vec<String>,

    pub next_siblings: Vec<String>,

    pub surrounding_text: SurroundingText,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_region: Option<String>,
}

pub fn extract_context(el: &ElementRef<'_>) -> ElementContext {
    let parent = el.parent();

    let next_siblings = el
        .next_siblings()
        .into_iter()
        .take(MAX_SIBLINGS)
        .map(|s| s.tag().to_string())
        .collect();

    let page_region = el
        .ancestors()
        .find(|a| LANDMARK_TAGS.contains(&a.tag()))
        .map(|a| a.tag().to_string());

    ElementContext {
        parent_tag: parent.map(|p| p.tag().to_string()),
        parent_classes: parent
            .map(|p| p.classes().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        next_siblings,
        surrounding_text: SurroundingText {
            before: truncate_chars(el.text_before().unwrap_or("").trim(), SURROUNDING_TEXT_CHARS),
            after: truncate_chars(el.text_after().unwrap_or("").trim(), SURROUNDING_TEXT_CHARS),
        },
        page_region,
    }
}

/// Character-safe truncation (never splits a multi-byte code point).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
