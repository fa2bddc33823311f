use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::dom_model::NodeId;
use crate::element::selector::SelectorSet;

/// Semantic role of a clickable element. Each category has a fixed priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonCategory {
    CookieConsent,
    TermsAgreement,
    Submit,
    Navigation,
    Search,
    Choice,
    Cancel,
    General,
}

impl ButtonCategory {
    pub const ALL: [ButtonCategory; 8] = [
        ButtonCategory::CookieConsent,
        ButtonCategory::TermsAgreement,
        ButtonCategory::Submit,
        ButtonCategory::Navigation,
        ButtonCategory::Search,
        ButtonCategory::Choice,
        ButtonCategory::Cancel,
        ButtonCategory::General,
    ];

    pub fn priority(&self) -> u8 {
        match self {
            ButtonCategory::CookieConsent => 10,
            ButtonCategory::TermsAgreement => 9,
            ButtonCategory::Submit => 8,
            ButtonCategory::Navigation => 7,
            ButtonCategory::Search => 6,
            ButtonCategory::Choice => 5,
            ButtonCategory::General => 3,
            ButtonCategory::Cancel => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonCategory::CookieConsent => "cookie_consent",
            ButtonCategory::TermsAgreement => "terms_agreement",
            ButtonCategory::Submit => "submit",
            ButtonCategory::Navigation => "navigation",
            ButtonCategory::Search => "search",
            ButtonCategory::Choice => "choice",
            ButtonCategory::Cancel => "cancel",
            ButtonCategory::General => "general",
        }
    }

    /// Clicking these usually submits or leaves the page.
    pub fn transitions_page(&self) -> bool {
        matches!(self, ButtonCategory::Submit | ButtonCategory::Navigation)
    }

    /// Categories whose click should wait for a linked input to settle.
    pub fn guards_input(&self) -> bool {
        matches!(
            self,
            ButtonCategory::Submit | ButtonCategory::Search | ButtonCategory::Navigation
        )
    }
}

impl fmt::Display for ButtonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ButtonCategory::ALL
            .iter()
            .find(|c| c.as_str() == wanted)
            .copied()
            .ok_or_else(|| {
                let known: Vec<&str> = ButtonCategory::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown button category '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Text-like input found next to a button, used by the typing guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    pub node: NodeId,
    pub selector: String,
    pub input_type: String,
    pub placeholder: String,
    /// Value at scan time.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRecord {
    pub node: NodeId,
    pub selectors: SelectorSet,
    pub text: String,
    pub tag_name: String,
    #[serde(rename = "type")]
    pub type_attr: String,
    pub combined_text: String,
    pub category: ButtonCategory,
    pub priority: u8,
    pub description: String,
    pub associated_input: Option<InputRef>,
}

impl ButtonRecord {
    pub fn has_associated_input(&self) -> bool {
        self.associated_input.is_some()
    }
}

/// Stable sort, highest priority first; discovery order breaks ties.
pub fn sort_by_priority(buttons: &mut [ButtonRecord]) {
    buttons.sort_by(|a, b| b.priority.cmp(&a.priority));
}

/// Keep only buttons whose category is in `filter`; an empty filter keeps all.
pub fn filter_categories(buttons: Vec<ButtonRecord>, filter: &[ButtonCategory]) -> Vec<ButtonRecord> {
    if filter.is_empty() {
        return buttons;
    }
    buttons
        .into_iter()
        .filter(|b| filter.contains(&b.category))
        .collect()
}
