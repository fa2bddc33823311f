use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::browser::error::BrowserError;
use crate::browser::handle::BrowserHandle;
use crate::dom::dom_model::{DomSnapshot, NodeId};

/// How to launch the driver process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub node_binary: String,
    pub script: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            node_binary: "node".into(),
            script: "driver/page_driver.js".into(),
        }
    }
}

/// Request written to the driver's stdin, one JSON object per line.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DriverRequest<'a> {
    Connect { endpoint: &'a str },
    Navigate { url: &'a str, timeout_ms: u64 },
    Snapshot,
    Click { node: NodeId },
    Fill { node: NodeId, value: &'a str },
    Type { node: NodeId, text: &'a str, delay_ms: u64 },
    ReadValue { node: NodeId },
    WaitIdle { timeout_ms: u64 },
    Quit,
}

impl DriverRequest<'_> {
    fn name(&self) -> &'static str {
        match self {
            DriverRequest::Connect { .. } => "connect",
            DriverRequest::Navigate { .. } => "navigate",
            DriverRequest::Snapshot => "snapshot",
            DriverRequest::Click { .. } => "click",
            DriverRequest::Fill { .. } => "fill",
            DriverRequest::Type { .. } => "type",
            DriverRequest::ReadValue { .. } => "read_value",
            DriverRequest::WaitIdle { .. } => "wait_idle",
            DriverRequest::Quit => "quit",
        }
    }
}

/// Failure class reported by the driver alongside `ok: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverErrorKind {
    Stale,
    Timeout,
    Navigation,
    #[serde(other)]
    Other,
}

/// Response line read from the driver's stdout.
#[derive(Debug, Deserialize)]
pub struct DriverResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_kind: Option<DriverErrorKind>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub value: Option<String>,
}

/// A page attached through a long-lived Node.js Playwright driver.
///
/// The driver attaches to an already running browser over CDP and keeps
/// the page open between commands. Commands go out as NDJSON on stdin and
/// one response line comes back per command.
pub struct DriverSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    endpoint: String,
    current_url: Option<String>,
    closed: bool,
}

impl DriverSession {
    /// Spawn the driver and attach it to the debug endpoint at `endpoint`.
    pub fn connect(config: &DriverConfig, endpoint: &str) -> Result<Self, BrowserError> {
        let mut child = Command::new(&config.node_binary)
            .arg(&config.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| BrowserError::DriverSpawn {
                script: config.script.clone(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BrowserError::DriverIo("failed to capture driver stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BrowserError::DriverIo("failed to capture driver stdout".into()))?;

        let mut session = DriverSession {
            child,
            stdin,
            reader: BufReader::new(stdout),
            endpoint: endpoint.to_string(),
            current_url: None,
            closed: false,
        };

        let ready = session.read_response("ready signal")?;
        if !ready.ok || ready.ready != Some(true) {
            return Err(BrowserError::Protocol {
                command: "launch".into(),
                error: "driver did not send a ready signal".into(),
            });
        }

        session
            .send_ok(&DriverRequest::Connect { endpoint })
            .map_err(|e| BrowserError::Connection {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        info!(endpoint, "attached to browser");

        Ok(session)
    }

    /// Last URL navigated to (cached, no driver call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    fn read_response(&mut self, context: &str) -> Result<DriverResponse, BrowserError> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| BrowserError::DriverIo(format!("failed to read {}: {}", context, e)))?;

        if line.trim().is_empty() {
            return Err(BrowserError::DriverIo(format!(
                "empty {} from driver (process may have died)",
                context
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| BrowserError::Json {
            context: format!("driver {}", context),
            source: e,
        })
    }

    fn send(&mut self, request: &DriverRequest<'_>) -> Result<DriverResponse, BrowserError> {
        if self.closed {
            return Err(BrowserError::SessionClosed);
        }

        let json = serde_json::to_string(request).map_err(|e| BrowserError::Json {
            context: "driver request".into(),
            source: e,
        })?;
        debug!(cmd = request.name(), "driver request");

        writeln!(self.stdin, "{}", json)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| BrowserError::DriverIo(format!("failed to write to driver stdin: {}", e)))?;

        self.read_response("response")
    }

    /// Send `request` and turn `ok: false` into the matching error.
    fn send_ok(&mut self, request: &DriverRequest<'_>) -> Result<DriverResponse, BrowserError> {
        let response = self.send(request)?;
        if response.ok {
            return Ok(response);
        }

        let error = response.error.unwrap_or_else(|| "unknown error".into());
        Err(match (response.error_kind, request) {
            (Some(DriverErrorKind::Stale), DriverRequest::Click { node })
            | (Some(DriverErrorKind::Stale), DriverRequest::Fill { node, .. })
            | (Some(DriverErrorKind::Stale), DriverRequest::Type { node, .. })
            | (Some(DriverErrorKind::Stale), DriverRequest::ReadValue { node }) => {
                BrowserError::ElementStale { node: *node }
            }
            (Some(DriverErrorKind::Timeout), DriverRequest::Navigate { url, timeout_ms }) => {
                BrowserError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: Duration::from_millis(*timeout_ms),
                }
            }
            (_, DriverRequest::Navigate { url, .. }) => BrowserError::Navigation {
                url: url.to_string(),
                reason: error,
            },
            _ => BrowserError::Protocol {
                command: request.name().into(),
                error,
            },
        })
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl BrowserHandle for DriverSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.send_ok(&DriverRequest::Navigate {
            url,
            timeout_ms: millis(timeout),
        })?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    fn snapshot(&mut self) -> Result<DomSnapshot, BrowserError> {
        let response = self.send_ok(&DriverRequest::Snapshot)?;
        let data = response.data.ok_or_else(|| BrowserError::Protocol {
            command: "snapshot".into(),
            error: "no data in snapshot response".into(),
        })?;
        serde_json::from_value(data).map_err(|e| BrowserError::Json {
            context: "page snapshot".into(),
            source: e,
        })
    }

    fn click(&mut self, node: NodeId) -> Result<(), BrowserError> {
        self.send_ok(&DriverRequest::Click { node })?;
        Ok(())
    }

    fn fill(&mut self, node: NodeId, value: &str) -> Result<(), BrowserError> {
        self.send_ok(&DriverRequest::Fill { node, value })?;
        Ok(())
    }

    fn type_text(&mut self, node: NodeId, text: &str, delay: Duration) -> Result<(), BrowserError> {
        self.send_ok(&DriverRequest::Type {
            node,
            text,
            delay_ms: millis(delay),
        })?;
        Ok(())
    }

    fn read_value(&mut self, node: NodeId) -> Result<String, BrowserError> {
        let response = self.send_ok(&DriverRequest::ReadValue { node })?;
        Ok(response.value.unwrap_or_default())
    }

    fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        self.send_ok(&DriverRequest::WaitIdle {
            timeout_ms: millis(timeout),
        })?;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        // The driver may already be gone; quitting is best-effort.
        if let Err(e) = self.send(&DriverRequest::Quit) {
            warn!(error = %e, "driver quit failed");
        }
        self.closed = true;
        let _ = self.child.wait();
        info!(endpoint = %self.endpoint, "detached from browser");
        Ok(())
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}
