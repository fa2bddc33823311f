use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::browser::endpoint::DEFAULT_DEBUG_PORTS;
use crate::browser::session::DriverConfig;
use crate::button::button_model::ButtonCategory;
use crate::guard::typing_guard::GuardConfig;
use crate::orchestrator::orchestrator::OrchestratorConfig;

pub const DEFAULT_CONFIG_FILE: &str = "page-triage.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "page-triage",
    version,
    about = "Classify, prioritize and click page elements in a running browser"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: page-triage.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Remote-debugging port to attach to (overrides the configured port list)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Append one JSON line per click attempt to this file
    #[arg(long, global = true)]
    pub trace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a browser with remote debugging is reachable
    Health,

    /// List the buttons on a page in priority order without clicking
    Scan {
        #[arg(long)]
        url: String,

        /// Only keep these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<ButtonCategory>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Click the buttons on a page in priority order
    Process {
        #[arg(long)]
        url: String,

        #[arg(long = "category")]
        categories: Vec<ButtonCategory>,

        #[arg(long)]
        json: bool,
    },

    /// Click the first button matching a category or text
    Click {
        #[arg(long)]
        url: String,

        #[arg(long)]
        category: Option<ButtonCategory>,

        /// Case-insensitive substring of the button text
        #[arg(long)]
        text: Option<String>,
    },

    /// List the fillable input fields on a page
    Fields {
        #[arg(long)]
        url: String,

        #[arg(long)]
        json: bool,
    },

    /// Fill a page's input fields; prompts for each field unless values are given
    Fill {
        #[arg(long)]
        url: String,

        /// KEY=VALUE where KEY is a field name, id or type (repeatable)
        #[arg(long = "value", value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },

    /// Analyze every element of a page
    Analyze {
        #[arg(long)]
        url: String,

        /// Print only the summary and the most relevant elements
        #[arg(long)]
        quick: bool,

        /// Write JSON and CSV files to the export directory
        #[arg(long)]
        export: bool,

        /// Export directory (overrides config)
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Classify elements of a saved snapshot file (no browser needed)
    Classify {
        /// Snapshot JSON as produced by the driver
        #[arg(long)]
        snapshot: String,

        /// Only this node index
        #[arg(long)]
        node: Option<usize>,
    },
}

pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `page-triage.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserSection,
    #[serde(default)]
    pub guard: GuardSection,
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,

    #[serde(default = "default_node")]
    pub node_binary: String,

    #[serde(default = "default_driver_script")]
    pub driver_script: String,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Timeout of each endpoint probe.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            ports: default_ports(),
            node_binary: default_node(),
            driver_script: default_driver_script(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_empty_wait_ms")]
    pub empty_wait_ms: u64,

    #[serde(default = "default_stable_polls")]
    pub stable_polls: u32,

    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    #[serde(default = "default_typing_window_ms")]
    pub typing_window_ms: u64,
}

impl Default for GuardSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            empty_wait_ms: default_empty_wait_ms(),
            stable_polls: default_stable_polls(),
            max_cycles: default_max_cycles(),
            typing_window_ms: default_typing_window_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorSection {
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_click_pause_ms")]
    pub click_pause_ms: u64,

    #[serde(default = "default_key_delay_ms")]
    pub key_delay_ms: u64,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            click_pause_ms: default_click_pause_ms(),
            key_delay_ms: default_key_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSection {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

// Serde default helpers
fn default_host() -> String { "localhost".to_string() }
fn default_ports() -> Vec<u16> { DEFAULT_DEBUG_PORTS.to_vec() }
fn default_node() -> String { "node".to_string() }
fn default_driver_script() -> String { "driver/page_driver.js".to_string() }
fn default_navigation_timeout_ms() -> u64 { 30_000 }
fn default_probe_timeout_ms() -> u64 { 2_000 }
fn default_poll_interval_ms() -> u64 { 1_000 }
fn default_empty_wait_ms() -> u64 { 5_000 }
fn default_stable_polls() -> u32 { 3 }
fn default_max_cycles() -> u32 { 30 }
fn default_typing_window_ms() -> u64 { 3_000 }
fn default_settle_ms() -> u64 { 2_000 }
fn default_idle_timeout_ms() -> u64 { 5_000 }
fn default_click_pause_ms() -> u64 { 1_000 }
fn default_key_delay_ms() -> u64 { 100 }
fn default_output_dir() -> String { "exports".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (config file → runtime settings)
// ============================================================================

impl AppConfig {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            node_binary: self.browser.node_binary.clone(),
            script: self.browser.driver_script.clone(),
        }
    }

    /// Ports to probe; a CLI `--port` replaces the configured list.
    pub fn debug_ports(&self, cli_port: Option<u16>) -> Vec<u16> {
        match cli_port {
            Some(port) => vec![port],
            None => self.browser.ports.clone(),
        }
    }

    /// Zero poll intervals fall back to the default; at least one stable
    /// poll is always required.
    pub fn guard_config(&self) -> GuardConfig {
        let poll_interval_ms = if self.guard.poll_interval_ms == 0 {
            warn!(default = default_poll_interval_ms(), "guard.poll_interval_ms must be positive, using default");
            default_poll_interval_ms()
        } else {
            self.guard.poll_interval_ms
        };
        if self.guard.stable_polls == 0 {
            warn!("guard.stable_polls must be at least 1, using 1");
        }

        GuardConfig {
            poll_interval: Duration::from_millis(poll_interval_ms),
            empty_wait: Duration::from_millis(self.guard.empty_wait_ms),
            stable_polls: self.guard.stable_polls.max(1),
            max_cycles: self.guard.max_cycles,
        }
    }

    pub fn typing_window(&self) -> Duration {
        Duration::from_millis(self.guard.typing_window_ms)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            navigation_timeout: Duration::from_millis(self.browser.navigation_timeout_ms),
            settle: Duration::from_millis(self.orchestrator.settle_ms),
            idle_timeout: Duration::from_millis(self.orchestrator.idle_timeout_ms),
            click_pause: Duration::from_millis(self.orchestrator.click_pause_ms),
            key_delay: Duration::from_millis(self.orchestrator.key_delay_ms),
            ..OrchestratorConfig::default()
        }
    }
}
