use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use page_triage::browser::error::BrowserError;
use page_triage::browser::handle::BrowserHandle;
use page_triage::dom::dom_model::{DomSnapshot, NodeId};

/// Every call the orchestrator made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    Snapshot,
    Click(NodeId),
    Fill(NodeId, String),
    Type(NodeId, String, Duration),
    ReadValue(NodeId),
    WaitIdle,
    Disconnect,
}

/// Scripted in-memory browser.
///
/// Pages are keyed by url; navigating anywhere else fails. Value streams
/// are consumed one read at a time and the last value repeats.
#[derive(Debug, Default)]
pub struct FakeBrowser {
    pages: HashMap<String, DomSnapshot>,
    current: Option<String>,
    values: HashMap<NodeId, VecDeque<String>>,
    stale: HashSet<NodeId>,
    unreadable: HashSet<NodeId>,
    pub idle_fails: bool,
    pub calls: Vec<Call>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, snapshot: DomSnapshot) -> Self {
        self.pages.insert(snapshot.url.clone(), snapshot);
        self
    }

    pub fn with_values(mut self, node: usize, values: &[&str]) -> Self {
        self.values
            .insert(NodeId(node), values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Element-level calls on `node` fail as stale.
    pub fn with_stale(mut self, node: usize) -> Self {
        self.stale.insert(NodeId(node));
        self
    }

    /// `read_value` on `node` fails with a protocol error.
    pub fn with_unreadable(mut self, node: usize) -> Self {
        self.unreadable.insert(NodeId(node));
        self
    }

    pub fn clicks(&self) -> Vec<NodeId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Click(node) => Some(*node),
                _ => None,
            })
            .collect()
    }

    pub fn typed(&self) -> Vec<(NodeId, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Type(node, text, _) => Some((*node, text.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::ReadValue(_))).count()
    }

    fn check_live(&self, node: NodeId) -> Result<(), BrowserError> {
        if self.stale.contains(&node) {
            Err(BrowserError::ElementStale { node })
        } else {
            Ok(())
        }
    }
}

impl BrowserHandle for FakeBrowser {
    fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.calls.push(Call::Navigate(url.to_string()));
        if !self.pages.contains_key(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".into(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    fn snapshot(&mut self) -> Result<DomSnapshot, BrowserError> {
        self.calls.push(Call::Snapshot);
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| BrowserError::Protocol {
                command: "snapshot".into(),
                error: "no page loaded".into(),
            })
    }

    fn click(&mut self, node: NodeId) -> Result<(), BrowserError> {
        self.calls.push(Call::Click(node));
        self.check_live(node)
    }

    fn fill(&mut self, node: NodeId, value: &str) -> Result<(), BrowserError> {
        self.calls.push(Call::Fill(node, value.to_string()));
        self.check_live(node)
    }

    fn type_text(&mut self, node: NodeId, text: &str, delay: Duration) -> Result<(), BrowserError> {
        self.calls.push(Call::Type(node, text.to_string(), delay));
        self.check_live(node)
    }

    fn read_value(&mut self, node: NodeId) -> Result<String, BrowserError> {
        self.calls.push(Call::ReadValue(node));
        self.check_live(node)?;
        if self.unreadable.contains(&node) {
            return Err(BrowserError::Protocol {
                command: "read_value".into(),
                error: "execution context was destroyed".into(),
            });
        }
        let stream = self.values.entry(node).or_default();
        let value = if stream.len() > 1 {
            stream.pop_front().unwrap_or_default()
        } else {
            stream.front().cloned().unwrap_or_default()
        };
        Ok(value)
    }

    fn wait_for_network_idle(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        self.calls.push(Call::WaitIdle);
        if self.idle_fails {
            return Err(BrowserError::Protocol {
                command: "wait_idle".into(),
                error: "Timeout 5000ms exceeded".into(),
            });
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BrowserError> {
        self.calls.push(Call::Disconnect);
        Ok(())
    }
}
