use std::time::Duration;

use thiserror::Error;

use crate::dom::dom_model::NodeId;

const REMEDIATION: &str = "start Chrome or Edge with --remote-debugging-port=9222 \
(e.g. `google-chrome --remote-debugging-port=9222`) and retry";

/// Failures surfaced by the browser capability and the session around it.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// A debug endpoint was found but attaching to it failed.
    #[error("failed to connect to browser at {endpoint}: {reason}; {}", REMEDIATION)]
    Connection { endpoint: String, reason: String },

    /// None of the probed ports answered as a remote-debugging endpoint.
    #[error("no browser with remote debugging found on {host} ports {ports:?}; {}", REMEDIATION)]
    NoDebugEndpoint { host: String, ports: Vec<u16> },

    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout:?} loading {url}")]
    NavigationTimeout { url: String, timeout: Duration },

    /// The element is gone, usually because the page changed since the scan.
    #[error("element {node:?} is no longer attached to the page")]
    ElementStale { node: NodeId },

    #[error("failed to spawn browser driver {script} (is Node.js installed?): {source}")]
    DriverSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("browser driver I/O: {0}")]
    DriverIo(String),

    #[error("driver command '{command}' failed: {error}")]
    Protocol { command: String, error: String },

    #[error("JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("session is busy with another operation")]
    SessionBusy,

    #[error("session is closed")]
    SessionClosed,
}
