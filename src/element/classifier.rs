use serde::{Deserialize, Serialize};

use crate::dom::dom_model::ElementRef;

// ============================================================================
// Tag partitions
// ============================================================================

pub const MEDIA_TAGS: [&str; 8] = ["img", "video", "audio", "source", "picture", "iframe", "embed", "object"];
pub const INTERACTIVE_TAGS: [&str; 8] = ["a", "button", "input", "select", "textarea", "form", "details", "summary"];
pub const TEXT_TAGS: [&str; 13] = [
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "span", "div", "article", "section",
];
pub const NAVIGATION_TAGS: [&str; 3] = ["nav", "menu", "menuitem"];
pub const LIST_TAGS: [&str; 3] = ["ul", "ol", "dl"];

/// Input `type` → (English label, Arabic label).
const INPUT_TYPE_LABELS: [(&str, &str, &str); 15] = [
    ("text", "Text", "نص"),
    ("email", "Email", "بريد إلكتروني"),
    ("password", "Password", "كلمة مرور"),
    ("number", "Number", "رقم"),
    ("tel", "Phone", "هاتف"),
    ("url", "URL", "رابط"),
    ("search", "Search", "بحث"),
    ("date", "Date", "تاريخ"),
    ("time", "Time", "وقت"),
    ("checkbox", "Checkbox", "مربع اختيار"),
    ("radio", "Radio", "اختيار واحد"),
    ("file", "File", "ملف"),
    ("submit", "Submit", "إرسال"),
    ("reset", "Reset", "إعادة تعيين"),
    ("button", "Button", "زر"),
];

// ============================================================================
// Category record
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryType {
    Media,
    Interactive,
    Text,
    Navigation,
    List,
    Container,
}

impl PrimaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryType::Media => "media",
            PrimaryType::Interactive => "interactive",
            PrimaryType::Text => "text",
            PrimaryType::Navigation => "navigation",
            PrimaryType::List => "list",
            PrimaryType::Container => "container",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    InternalAnchor,
    Email,
    Phone,
    Javascript,
    External,
    Internal,
}

/// Type-specific extras attached to a `CategoryRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryDetail {
    Media {
        #[serde(skip_serializing_if = "Option::is_none")]
        source_url: Option<String>,
    },
    Input {
        input_type: String,
        label_en: String,
        label_ar: String,
    },
    Link {
        link_url: String,
        link_type: LinkType,
    },
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading_level: Option<u8>,
        importance: Importance,
    },
    List {
        items_count: usize,
    },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub primary_type: PrimaryType,
    pub subtype: String,
    pub detail: CategoryDetail,
}

impl CategoryRecord {
    pub fn importance(&self) -> Option<Importance> {
        match &self.detail {
            CategoryDetail::Text { importance, .. } => Some(*importance),
            _ => None,
        }
    }

    pub fn link_type(&self) -> Option<LinkType> {
        match &self.detail {
            CategoryDetail::Link { link_type, .. } => Some(*link_type),
            _ => None,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Assign the primary category of an element. First matching branch wins.
pub fn classify_element(el: &ElementRef<'_>) -> CategoryRecord {
    let tag = el.tag();
    let record = |primary_type, detail| CategoryRecord {
        primary_type,
        subtype: tag.to_string(),
        detail,
    };

    if MEDIA_TAGS.contains(&tag) {
        return record(
            PrimaryType::Media,
            CategoryDetail::Media {
                source_url: el.attr("src").map(str::to_string),
            },
        );
    }

    if INTERACTIVE_TAGS.contains(&tag) || el.has_attr("onclick") {
        return record(PrimaryType::Interactive, interactive_detail(el));
    }

    if TEXT_TAGS.contains(&tag) {
        let heading_level = heading_level(tag);
        let importance = match (heading_level, tag) {
            (Some(_), _) => Importance::High,
            (None, "p") => Importance::Medium,
            _ => Importance::Low,
        };
        return record(
            PrimaryType::Text,
            CategoryDetail::Text {
                heading_level,
                importance,
            },
        );
    }

    if NAVIGATION_TAGS.contains(&tag) {
        return record(PrimaryType::Navigation, CategoryDetail::None);
    }

    if LIST_TAGS.contains(&tag) {
        let items_count = el.descendants().iter().filter(|d| d.tag() == "li").count();
        return record(PrimaryType::List, CategoryDetail::List { items_count });
    }

    record(PrimaryType::Container, CategoryDetail::None)
}

fn interactive_detail(el: &ElementRef<'_>) -> CategoryDetail {
    match el.tag() {
        "input" => {
            let input_type = el.attr("type").unwrap_or("text");
            let (label_en, label_ar) = input_type_labels(input_type);
            CategoryDetail::Input {
                input_type: input_type.to_string(),
                label_en: label_en.to_string(),
                label_ar: label_ar.to_string(),
            }
        }
        "a" => match el.attr("href") {
            Some(href) => CategoryDetail::Link {
                link_url: href.to_string(),
                link_type: classify_link(href),
            },
            None => CategoryDetail::None,
        },
        _ => CategoryDetail::None,
    }
}

/// Display labels for an input type; unknown types label as themselves.
pub fn input_type_labels(input_type: &str) -> (&str, &str) {
    INPUT_TYPE_LABELS
        .iter()
        .find(|(t, _, _)| *t == input_type)
        .map(|(_, en, ar)| (*en, *ar))
        .unwrap_or((input_type, input_type))
}

pub fn classify_link(href: &str) -> LinkType {
    if href.starts_with('#') {
        LinkType::InternalAnchor
    } else if href.starts_with("mailto:") {
        LinkType::Email
    } else if href.starts_with("tel:") {
        LinkType::Phone
    } else if href.contains("javascript:") {
        LinkType::Javascript
    } else if href.contains("http") {
        LinkType::External
    } else {
        LinkType::Internal
    }
}

/// `h1`..`h6` → 1..6.
pub fn heading_level(tag: &str) -> Option<u8> {
    let digit = tag.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) if digit.len() == 1 => Some(level),
        _ => None,
    }
}
