use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::dom_model::DomSnapshot;
use crate::element::context::LANDMARK_TAGS;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Page-level counts: forms, media, headings and landmark sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStructure {
    pub page_title: Option<String>,
    pub meta_description: Option<String>,
    pub sections: BTreeMap<String, usize>,
    pub forms_count: usize,
    pub tables_count: usize,
    pub images_count: usize,
    pub links_count: usize,
    /// `h1`..`h6`, every key present even when zero.
    pub headings_hierarchy: BTreeMap<String, usize>,
}

pub fn extract_page_structure(snapshot: &DomSnapshot) -> PageStructure {
    let page_title = snapshot
        .elements()
        .find(|el| el.tag() == "title")
        .map(|el| el.text().to_string())
        .or_else(|| (!snapshot.title.is_empty()).then(|| snapshot.title.clone()));

    let meta_description = snapshot
        .elements()
        .find(|el| el.tag() == "meta" && el.attr("name") == Some("description"))
        .and_then(|el| el.attr("content"))
        .map(str::to_string);

    let headings_hierarchy = HEADING_TAGS
        .iter()
        .map(|h| (h.to_string(), snapshot.count_tag(h)))
        .collect();

    let sections = LANDMARK_TAGS
        .iter()
        .map(|s| (s.to_string(), snapshot.count_tag(s)))
        .collect();

    PageStructure {
        page_title,
        meta_description,
        sections,
        forms_count: snapshot.count_tag("form"),
        tables_count: snapshot.count_tag("table"),
        images_count: snapshot.count_tag("img"),
        links_count: snapshot.count_tag("a"),
        headings_hierarchy,
    }
}
