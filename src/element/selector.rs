use serde::{Deserialize, Serialize};

use crate::dom::dom_model::ElementRef;

/// Maximum number of ancestor descriptors in a hierarchical path.
pub const MAX_PATH_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorPriority {
    High,
}

/// Every selector we can derive for an element, strongest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_selector: Option<String>,

    /// Present only when the element can be addressed by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<SelectorPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_selector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_selector: Option<String>,

    pub tag_selector: String,

    pub hierarchical_path: String,
}

impl SelectorSet {
    /// id > class > tag.
    pub fn primary(&self) -> &str {
        self.id_selector
            .as_deref()
            .or(self.class_selector.as_deref())
            .unwrap_or(&self.tag_selector)
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Some(SelectorPriority::High)
    }
}

pub fn build_selectors(el: &ElementRef<'_>) -> SelectorSet {
    let tag = el.tag();

    let id_selector = el.attr("id").map(|id| format!("#{}", id));
    let priority = id_selector.as_ref().map(|_| SelectorPriority::High);

    let classes: Vec<String> = el.classes().into_iter().map(str::to_string).collect();
    let class_selector = (!classes.is_empty()).then(|| format!("{}.{}", tag, classes.join(".")));

    let name_selector = el.attr("name").map(|n| format!("{}[name='{}']", tag, n));
    let type_selector = el.attr("type").map(|t| format!("{}[type='{}']", tag, t));

    SelectorSet {
        id_selector,
        priority,
        class_selector,
        classes,
        name_selector,
        type_selector,
        tag_selector: tag.to_string(),
        hierarchical_path: hierarchical_path(el).join(" > "),
    }
}

/// Path parts from the outermost ancestor down to the element itself.
pub fn hierarchical_path(el: &ElementRef<'_>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = Some(*el);

    while let Some(node) = current {
        if parts.len() == MAX_PATH_DEPTH {
            break;
        }
        if let Some(id) = node.attr("id") {
            parts.push(format!("{}#{}", node.tag(), id));
            break;
        }
        match node.classes().first() {
            Some(first) => parts.push(format!("{}.{}", node.tag(), first)),
            None => parts.push(node.tag().to_string()),
        }
        current = node.parent();
    }

    parts.reverse();
    parts
}
