use std::time::Duration;

use crate::browser::error::BrowserError;
use crate::dom::dom_model::{DomSnapshot, NodeId};

/// The browser capability the orchestrator drives.
///
/// One handle is one attached page. Calls are blocking and must not be
/// issued concurrently; `Session` enforces that. Element-level calls address
/// nodes of the most recent `snapshot()`; after a page change they fail with
/// `BrowserError::ElementStale`.
pub trait BrowserHandle {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    fn snapshot(&mut self) -> Result<DomSnapshot, BrowserError>;

    fn click(&mut self, node: NodeId) -> Result<(), BrowserError>;

    /// Replace the field's value in one step.
    fn fill(&mut self, node: NodeId, value: &str) -> Result<(), BrowserError>;

    /// Type key by key with `delay` between keystrokes.
    fn type_text(&mut self, node: NodeId, text: &str, delay: Duration) -> Result<(), BrowserError>;

    fn read_value(&mut self, node: NodeId) -> Result<String, BrowserError>;

    fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    /// Detach from the browser. The browser itself keeps running.
    fn disconnect(&mut self) -> Result<(), BrowserError>;
}
