use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::page_structure::{PageStructure, extract_page_structure};
use crate::dom::dom_model::{DomSnapshot, ElementRef};
use crate::element::classifier::{CategoryRecord, Importance, PrimaryType, classify_element};
use crate::element::context::{ElementContext, extract_context};
use crate::element::selector::{SelectorSet, build_selectors};
use crate::element::semantic::{SemanticInfo, extract_semantics};

pub const ANALYZER_VERSION: &str = "2.0";
pub const ANALYSIS_PURPOSE: &str = "Enhanced data for AI model analysis";

/// Elements with at least this many characters of text are kept in the
/// detailed list regardless of category.
const DETAIL_TEXT_THRESHOLD: usize = 10;
const QUICK_INTERACTIVE_LIMIT: usize = 10;
const QUICK_HEADING_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub timestamp_ms: u128,
    pub analyzer_version: String,
    pub purpose: String,
    pub analyzed_url: String,
    pub page_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementsSummary {
    pub total_elements: usize,
    pub by_category: BTreeMap<String, usize>,
    pub interactive_elements: usize,
    pub media_elements: usize,
    pub text_elements: usize,
    /// Elements addressable by id.
    pub high_priority_elements: usize,
}

/// Full record of one element worth a closer look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedElement {
    /// 1-based position in document order.
    pub element_id: usize,
    pub selectors: SelectorSet,
    pub category: CategoryRecord,
    pub semantic_info: SemanticInfo,
    pub element_context: ElementContext,
    pub raw_attributes: BTreeMap<String, String>,
}

/// Flat, one-per-element row for tabular export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRow {
    pub element_id: usize,
    pub tag_name: String,
    pub primary_selector: String,
    /// The full selector set as JSON.
    pub all_selectors: String,
    pub category: String,
    pub subcategory: String,
    pub text_content: String,
    pub semantic_type: String,
    pub importance: String,
    pub page_region: String,
    pub is_interactive: bool,
    pub has_text: bool,
    /// Raw attributes as JSON.
    pub element_attributes: String,
}

impl ElementRow {
    pub const HEADERS: [&'static str; 13] = [
        "element_id",
        "tag_name",
        "primary_selector",
        "all_selectors",
        "category",
        "subcategory",
        "text_content",
        "semantic_type",
        "importance",
        "page_region",
        "is_interactive",
        "has_text",
        "element_attributes",
    ];

    pub fn fields(&self) -> [String; 13] {
        [
            self.element_id.to_string(),
            self.tag_name.clone(),
            self.primary_selector.clone(),
            self.all_selectors.clone(),
            self.category.clone(),
            self.subcategory.clone(),
            self.text_content.clone(),
            self.semantic_type.clone(),
            self.importance.clone(),
            self.page_region.clone(),
            self.is_interactive.to_string(),
            self.has_text.to_string(),
            self.element_attributes.clone(),
        ]
    }
}

/// Fixed hints telling a downstream consumer how to read the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantGuide {
    pub element_identification: String,
    pub interaction_priority: String,
    pub context_usage: String,
    pub text_content_guidance: String,
}

impl Default for AssistantGuide {
    fn default() -> Self {
        Self {
            element_identification: "Use 'id_selector' first, then 'class_selector' for precise targeting".into(),
            interaction_priority: "Elements with 'priority': 'high' take precedence for interaction".into(),
            context_usage: "Use 'element_context' and 'semantic_info' to understand an element's purpose".into(),
            text_content_guidance: "Text with 'importance': 'high' marks the main headings".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub analysis_metadata: AnalysisMetadata,
    pub page_structure: PageStructure,
    pub elements_summary: ElementsSummary,
    pub detailed_elements: Vec<DetailedElement>,
    pub csv_data: Vec<ElementRow>,
    pub ai_assistant_guide: AssistantGuide,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStructure {
    pub page_title: Option<String>,
    pub forms_count: usize,
    pub images_count: usize,
    pub links_count: usize,
}

/// Summary plus the most useful detailed elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAnalysis {
    pub analysis_metadata: AnalysisMetadata,
    pub page_structure: QuickStructure,
    pub elements_summary: ElementsSummary,
    pub interactive_elements: Vec<DetailedElement>,
    pub important_headings: Vec<DetailedElement>,
}

impl PageAnalysis {
    pub fn quick(&self) -> QuickAnalysis {
        let interactive_elements = self
            .detailed_elements
            .iter()
            .filter(|e| e.category.primary_type == PrimaryType::Interactive)
            .take(QUICK_INTERACTIVE_LIMIT)
            .cloned()
            .collect();
        let important_headings = self
            .detailed_elements
            .iter()
            .filter(|e| e.category.importance() == Some(Importance::High))
            .take(QUICK_HEADING_LIMIT)
            .cloned()
            .collect();

        QuickAnalysis {
            analysis_metadata: self.analysis_metadata.clone(),
            page_structure: QuickStructure {
                page_title: self.page_structure.page_title.clone(),
                forms_count: self.page_structure.forms_count,
                images_count: self.page_structure.images_count,
                links_count: self.page_structure.links_count,
            },
            elements_summary: self.elements_summary.clone(),
            interactive_elements,
            important_headings,
        }
    }
}

/// Analyze every element of `snapshot`. Pure apart from the supplied timestamp.
pub fn analyze_snapshot(snapshot: &DomSnapshot, timestamp_ms: u128) -> PageAnalysis {
    let page_structure = extract_page_structure(snapshot);

    let mut summary = ElementsSummary {
        total_elements: snapshot.len(),
        ..ElementsSummary::default()
    };
    let mut detailed_elements = Vec::new();
    let mut csv_data = Vec::with_capacity(snapshot.len());

    for (index, el) in snapshot.elements().enumerate() {
        let element_id = index + 1;
        let selectors = build_selectors(&el);
        let context = extract_context(&el);
        let semantic = extract_semantics(&el);
        let category = classify_element(&el);

        let primary = category.primary_type;
        *summary.by_category.entry(primary.as_str().to_string()).or_default() += 1;
        match primary {
            PrimaryType::Interactive => summary.interactive_elements += 1,
            PrimaryType::Media => summary.media_elements += 1,
            PrimaryType::Text => summary.text_elements += 1,
            _ => {}
        }
        if selectors.is_high_priority() {
            summary.high_priority_elements += 1;
        }

        csv_data.push(element_row(element_id, &el, &selectors, &category, &semantic, &context));

        if is_detailed(&category, &semantic) {
            detailed_elements.push(DetailedElement {
                element_id,
                selectors,
                category,
                semantic_info: semantic,
                element_context: context,
                raw_attributes: el.attributes().clone(),
            });
        }
    }

    info!(
        url = %snapshot.url,
        total = summary.total_elements,
        detailed = detailed_elements.len(),
        "page analyzed"
    );

    PageAnalysis {
        analysis_metadata: AnalysisMetadata {
            timestamp_ms,
            analyzer_version: ANALYZER_VERSION.to_string(),
            purpose: ANALYSIS_PURPOSE.to_string(),
            analyzed_url: snapshot.url.clone(),
            page_title: snapshot.title.clone(),
        },
        page_structure,
        elements_summary: summary,
        detailed_elements,
        csv_data,
        ai_assistant_guide: AssistantGuide::default(),
    }
}

fn is_detailed(category: &CategoryRecord, semantic: &SemanticInfo) -> bool {
    matches!(category.primary_type, PrimaryType::Interactive | PrimaryType::Media)
        || category.importance() == Some(Importance::High)
        || semantic.text_length.is_some_and(|n| n > DETAIL_TEXT_THRESHOLD)
}

fn element_row(
    element_id: usize,
    el: &ElementRef<'_>,
    selectors: &SelectorSet,
    category: &CategoryRecord,
    semantic: &SemanticInfo,
    context: &ElementContext,
) -> ElementRow {
    ElementRow {
        element_id,
        tag_name: el.tag().to_string(),
        primary_selector: selectors.primary().to_string(),
        all_selectors: serde_json::to_string(selectors).unwrap_or_default(),
        category: category.primary_type.as_str().to_string(),
        subcategory: category.subtype.clone(),
        text_content: semantic.text_content.clone().unwrap_or_default(),
        semantic_type: semantic.text_type.map(|t| t.as_str()).unwrap_or("").to_string(),
        importance: category.importance().map(|i| i.as_str()).unwrap_or("normal").to_string(),
        page_region: context.page_region.clone().unwrap_or_default(),
        is_interactive: category.primary_type == PrimaryType::Interactive,
        has_text: semantic.text_content.is_some(),
        element_attributes: serde_json::to_string(el.attributes()).unwrap_or_default(),
    }
}
