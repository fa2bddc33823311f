use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::browser::error::BrowserError;

pub const DEFAULT_DEBUG_PORTS: [u16; 3] = [9222, 9223, 9224];

/// Response of the DevTools `/json/version` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

/// A reachable remote-debugging endpoint.
#[derive(Debug, Clone)]
pub struct DebugEndpoint {
    pub host: String,
    pub port: u16,
    pub browser: String,
    pub ws_url: Option<String>,
}

impl DebugEndpoint {
    /// HTTP base URL, the form CDP attach calls expect.
    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Probe `ports` on `host` in order and return the first live endpoint.
pub fn discover_endpoint(host: &str, ports: &[u16], timeout: Duration) -> Result<DebugEndpoint, BrowserError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .no_proxy()
        .build()
        .map_err(|e| BrowserError::Connection {
            endpoint: host.to_string(),
            reason: e.to_string(),
        })?;

    for &port in ports {
        let url = format!("http://{}:{}/json/version", host, port);
        let info = match client.get(&url).send().and_then(|r| r.error_for_status()) {
            Ok(response) => response.json::<VersionInfo>(),
            Err(e) => {
                debug!(port, error = %e, "no debug endpoint");
                continue;
            }
        };

        match info {
            Ok(info) => {
                info!(port, browser = %info.browser, "found remote debugging endpoint");
                return Ok(DebugEndpoint {
                    host: host.to_string(),
                    port,
                    browser: info.browser,
                    ws_url: info.web_socket_debugger_url,
                });
            }
            Err(e) => debug!(port, error = %e, "port answered but not as a DevTools endpoint"),
        }
    }

    Err(BrowserError::NoDebugEndpoint {
        host: host.to_string(),
        ports: ports.to_vec(),
    })
}
