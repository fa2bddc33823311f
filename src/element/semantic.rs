use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dom::dom_model::ElementRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    Login,
    Search,
    Submit,
    Cancel,
    Numeric,
    Email,
    Url,
}

impl TextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextType::Login => "login",
            TextType::Search => "search",
            TextType::Submit => "submit",
            TextType::Cancel => "cancel",
            TextType::Numeric => "numeric",
            TextType::Email => "email",
            TextType::Url => "url",
        }
    }
}

/// Human/machine-readable meaning pulled from an element's text and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_type: Option<TextType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

enum TextProbe {
    /// Matched against the lower-cased text.
    Lowered(Regex),
    /// Matched against the text as written.
    Raw(Regex),
    Prefix(&'static str),
}

impl TextProbe {
    fn matches(&self, text: &str, lowered: &str) -> bool {
        match self {
            TextProbe::Lowered(re) => re.is_match(lowered),
            TextProbe::Raw(re) => re.is_match(text),
            TextProbe::Prefix(p) => text.starts_with(p),
        }
    }
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Evaluated top to bottom; first hit wins.
static TEXT_PROBES: LazyLock<Vec<(TextType, TextProbe)>> = LazyLock::new(|| {
    vec![
        (TextType::Login, TextProbe::Lowered(regex(r"\b(تسجيل دخول|login|sign in)\b"))),
        (TextType::Search, TextProbe::Lowered(regex(r"\b(بحث|search)\b"))),
        (TextType::Submit, TextProbe::Lowered(regex(r"\b(إرسال|submit|send)\b"))),
        (TextType::Cancel, TextProbe::Lowered(regex(r"\b(إلغاء|cancel|close)\b"))),
        (TextType::Numeric, TextProbe::Raw(regex(r"^\d+$"))),
        (TextType::Email, TextProbe::Raw(regex(r"@.*\.(com|org|net)"))),
        (TextType::Url, TextProbe::Prefix("http")),
    ]
});

pub fn detect_text_type(text: &str) -> Option<TextType> {
    let lowered = text.to_lowercase();
    TEXT_PROBES
        .iter()
        .find(|(_, probe)| probe.matches(text, &lowered))
        .map(|(kind, _)| *kind)
}

pub fn extract_semantics(el: &ElementRef<'_>) -> SemanticInfo {
    let text = el.text();
    let owned = |name: &str| el.attr(name).map(str::to_string);

    let mut info = SemanticInfo {
        placeholder: owned("placeholder"),
        title: owned("title"),
        alt_text: owned("alt"),
        aria_label: owned("aria-label"),
        role: owned("role"),
        ..SemanticInfo::default()
    };

    if !text.is_empty() {
        info.text_content = Some(text.to_string());
        info.text_length = Some(text.chars().count());
        info.text_type = detect_text_type(text);
    }

    info
}
