use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw page snapshot produced by the browser driver
// ============================================================================

/// Longest sibling text kept per side of a node.
pub const SURROUNDING_TEXT_CHARS: usize = 100;

/// Position of a node in a `DomSnapshot` (document order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// One element of the page as captured by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomNode {
    pub tag: String,

    /// Full text content of the element (descendants included).
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Live value of form controls at snapshot time.
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub parent: Option<NodeId>,

    /// Raw text of the previous / next sibling node, element or text.
    #[serde(default, rename = "textBefore")]
    pub text_before: Option<String>,
    #[serde(default, rename = "textAfter")]
    pub text_after: Option<String>,

    #[serde(skip)]
    children: Vec<NodeId>,
}

fn default_true() -> bool {
    true
}

impl DomNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            text: String::new(),
            attributes: BTreeMap::new(),
            visible: true,
            enabled: true,
            value: None,
            parent: None,
            text_before: None,
            text_after: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_text_around(mut self, before: &str, after: &str) -> Self {
        self.text_before = Some(before.to_string());
        self.text_after = Some(after.to_string());
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(NodeId(parent));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Element tree of one page, flattened in document order.
///
/// Nodes reference their parent by index; child lists are rebuilt by
/// `DomSnapshot::new` so that traversal in both directions is cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct DomSnapshot {
    pub url: String,
    pub title: String,
    pub nodes: Vec<DomNode>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    nodes: Vec<DomNode>,
}

impl From<RawSnapshot> for DomSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        DomSnapshot::new(&raw.url, &raw.title, raw.nodes)
    }
}

impl DomSnapshot {
    pub fn new(url: &str, title: &str, mut nodes: Vec<DomNode>) -> Self {
        for node in nodes.iter_mut() {
            node.tag = node.tag.to_lowercase();
            node.children.clear();
            for side in [&mut node.text_before, &mut node.text_after] {
                if let Some(text) = side.as_mut() {
                    *text = text.trim().chars().take(SURROUNDING_TEXT_CHARS).collect();
                }
            }
        }

        let len = nodes.len();
        for index in 0..len {
            // Drop dangling or forward-cycling parent links.
            match nodes[index].parent {
                Some(NodeId(p)) if p < index => nodes[p].children.push(NodeId(index)),
                Some(_) => nodes[index].parent = None,
                None => {}
            }
        }

        Self {
            url: url.to_string(),
            title: title.to_string(),
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<ElementRef<'_>> {
        (id.0 < self.nodes.len()).then_some(ElementRef { snapshot: self, id })
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        (0..self.nodes.len()).map(move |i| ElementRef {
            snapshot: self,
            id: NodeId(i),
        })
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        self.nodes.iter().filter(|n| n.tag == tag).count()
    }
}

// ============================================================================
// ElementRef: read-only descriptor view over one node
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    snapshot: &'a DomSnapshot,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    fn node(&self) -> &'a DomNode {
        &self.snapshot.nodes[self.id.0]
    }

    fn at(&self, id: NodeId) -> ElementRef<'a> {
        ElementRef {
            snapshot: self.snapshot,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tag(&self) -> &'a str {
        &self.node().tag
    }

    /// Attribute value, `None` when the attribute is absent.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node().attributes.get(name).map(String::as_str)
    }

    /// Attribute value with absence collapsed to the empty string.
    pub fn attr_or_empty(&self, name: &str) -> &'a str {
        self.attr(name).unwrap_or("")
    }

    /// `type` attribute equality, ASCII case-insensitive as in HTML.
    pub fn type_is(&self, wanted: &str) -> bool {
        self.attr("type").is_some_and(|t| t.eq_ignore_ascii_case(wanted))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node().attributes.contains_key(name)
    }

    pub fn attributes(&self) -> &'a BTreeMap<String, String> {
        &self.node().attributes
    }

    /// Non-empty class tokens in declaration order.
    pub fn classes(&self) -> Vec<&'a str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| *c == class)
    }

    /// Trimmed text content, original case.
    pub fn text(&self) -> &'a str {
        self.node().text.trim()
    }

    /// Trimmed, lower-cased text content.
    pub fn text_lower(&self) -> String {
        self.text().to_lowercase()
    }

    pub fn is_visible(&self) -> bool {
        self.node().visible
    }

    pub fn is_enabled(&self) -> bool {
        self.node().enabled
    }

    pub fn value(&self) -> &'a str {
        self.node().value.as_deref().unwrap_or("")
    }

    pub fn text_before(&self) -> Option<&'a str> {
        self.node().text_before.as_deref()
    }

    pub fn text_after(&self) -> Option<&'a str> {
        self.node().text_after.as_deref()
    }

    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.node().parent.map(|p| self.at(p))
    }

    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        let this = *self;
        self.node().children.iter().map(move |c| this.at(*c))
    }

    /// Element siblings following this one, nearest first.
    pub fn next_siblings(&self) -> Vec<ElementRef<'a>> {
        match self.parent() {
            Some(parent) => parent
                .children()
                .skip_while(|c| c.id != self.id)
                .skip(1)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        std::iter::successors(self.parent(), |e| e.parent())
    }

    /// All descendants in document order.
    pub fn descendants(&self) -> Vec<ElementRef<'a>> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementRef<'a>> = self.children().collect();
        stack.reverse();
        while let Some(el) = stack.pop() {
            out.push(el);
            let mut kids: Vec<ElementRef<'a>> = el.children().collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }
}
