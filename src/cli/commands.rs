use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::analysis::analyzer::analyze_snapshot;
use crate::browser::endpoint::discover_endpoint;
use crate::browser::session::DriverSession;
use crate::button::button_model::ButtonCategory;
use crate::cli::config::AppConfig;
use crate::dom::dom_model::{DomSnapshot, NodeId};
use crate::element::context::extract_context;
use crate::element::selector::build_selectors;
use crate::element::semantic::extract_semantics;
use crate::field::field_model::InputFieldRecord;
use crate::guard::clock::SystemClock;
use crate::guard::typing_guard::TypingGuard;
use crate::orchestrator::orchestrator::{FieldValueSource, FieldValues, Orchestrator, classify};
use crate::orchestrator::session::Session;
use crate::report::console::{
    format_analysis_summary, format_click_result, format_fields, format_fill_report, format_process_report,
    format_scan_report,
};
use crate::report::json::{export_analysis, to_pretty_json};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::now_ms;

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Settings shared by every browser-backed command.
pub struct CommandContext<'a> {
    pub config: &'a AppConfig,
    pub port: Option<u16>,
    pub trace: Option<&'a str>,
}

impl CommandContext<'_> {
    fn open_session(&self) -> CmdResult<Session<DriverSession>> {
        let ports = self.config.debug_ports(self.port);
        let endpoint = discover_endpoint(
            &self.config.browser.host,
            &ports,
            Duration::from_millis(self.config.browser.probe_timeout_ms),
        )?;
        let driver = DriverSession::connect(&self.config.driver_config(), &endpoint.http_url())?;
        Ok(Session::open(driver, Box::new(SystemClock)).with_typing_window(self.config.typing_window()))
    }

    fn orchestrator(&self) -> Orchestrator {
        let orchestrator = Orchestrator::new(
            self.config.orchestrator_config(),
            TypingGuard::new(self.config.guard_config()),
        );
        match self.trace {
            Some(path) => orchestrator.with_tracer(TraceLogger::new(path)),
            None => orchestrator,
        }
    }

    /// Open a session, run `op` and always close the session afterwards.
    fn with_session<T>(
        &self,
        op: impl FnOnce(&Orchestrator, &mut Session<DriverSession>) -> CmdResult<T>,
    ) -> CmdResult<T> {
        let orchestrator = self.orchestrator();
        let mut session = self.open_session()?;
        let result = op(&orchestrator, &mut session);
        let closed = session.close();
        let value = result?;
        closed?;
        Ok(value)
    }
}

// ============================================================================
// health subcommand
// ============================================================================

pub fn cmd_health(ctx: &CommandContext<'_>) -> CmdResult<bool> {
    let ports = ctx.config.debug_ports(ctx.port);
    let timeout = Duration::from_millis(ctx.config.browser.probe_timeout_ms);
    match discover_endpoint(&ctx.config.browser.host, &ports, timeout) {
        Ok(endpoint) => {
            println!("healthy: {} at {}", endpoint.browser, endpoint.http_url());
            if let Some(ws) = &endpoint.ws_url {
                println!("  websocket: {}", ws);
            }
            Ok(true)
        }
        Err(e) => {
            println!("unhealthy: {}", e);
            Ok(false)
        }
    }
}

// ============================================================================
// button subcommands
// ============================================================================

pub fn cmd_scan(ctx: &CommandContext<'_>, url: &str, categories: &[ButtonCategory], json: bool) -> CmdResult {
    ctx.with_session(|orchestrator, session| {
        let report = orchestrator.scan(session, url, categories)?;
        if json {
            println!("{}", to_pretty_json(&report)?);
        } else {
            print!("{}", format_scan_report(&report));
        }
        Ok(())
    })
}

/// Returns the report's success flag.
pub fn cmd_process(ctx: &CommandContext<'_>, url: &str, categories: &[ButtonCategory], json: bool) -> CmdResult<bool> {
    ctx.with_session(|orchestrator, session| {
        let report = orchestrator.process(session, url, categories)?;
        if json {
            println!("{}", to_pretty_json(&report)?);
        } else {
            print!("{}", format_process_report(&report));
        }
        Ok(report.success)
    })
}

pub fn cmd_click(
    ctx: &CommandContext<'_>,
    url: &str,
    category: Option<ButtonCategory>,
    text: Option<&str>,
) -> CmdResult<bool> {
    ctx.with_session(|orchestrator, session| {
        let result = orchestrator.click_specific(session, url, category, text)?;
        print!("{}", format_click_result(&result));
        Ok(result.success)
    })
}

// ============================================================================
// field subcommands
// ============================================================================

pub fn cmd_fields(ctx: &CommandContext<'_>, url: &str, json: bool) -> CmdResult {
    ctx.with_session(|orchestrator, session| {
        let fields = orchestrator.fields(session, url)?;
        if json {
            println!("{}", to_pretty_json(&fields)?);
        } else {
            print!("{}", format_fields(&fields));
        }
        Ok(())
    })
}

/// Asks on the terminal for each field's value; an empty answer skips it.
struct TerminalPrompt<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    fn ask(&mut self, field: &InputFieldRecord) -> std::io::Result<()> {
        writeln!(self.output, "\n{}", field.description())?;
        if !field.placeholder.is_empty() {
            writeln!(self.output, "  placeholder: {}", field.placeholder)?;
        }
        write!(self.output, "{}", field.field_type.prompt(&field.display_name))?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> FieldValueSource for TerminalPrompt<R, W> {
    /// A prompt that cannot be shown skips the field.
    fn value_for(&mut self, field: &InputFieldRecord) -> Option<String> {
        if let Err(e) = self.ask(field) {
            warn!(field = %field.description(), error = %e, "could not show prompt, skipping field");
            return None;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()).filter(|v| !v.is_empty()),
        }
    }
}

pub fn cmd_fill(ctx: &CommandContext<'_>, url: &str, values: &[(String, String)]) -> CmdResult<bool> {
    ctx.with_session(|orchestrator, session| {
        let report = if values.is_empty() {
            let stdin = std::io::stdin();
            let mut prompt = TerminalPrompt {
                input: stdin.lock(),
                output: std::io::stdout(),
            };
            orchestrator.fill_form(session, url, &mut prompt)?
        } else {
            let map: BTreeMap<String, String> = values.iter().cloned().collect();
            orchestrator.fill_form(session, url, &mut FieldValues(map))?
        };
        print!("{}", format_fill_report(&report));
        Ok(report.success)
    })
}

// ============================================================================
// analysis subcommands
// ============================================================================

pub fn cmd_analyze(
    ctx: &CommandContext<'_>,
    url: &str,
    quick: bool,
    export: bool,
    output_dir: Option<&str>,
) -> CmdResult {
    ctx.with_session(|orchestrator, session| {
        let analysis = orchestrator.analyze(session, url)?;

        if export {
            let dir = output_dir.unwrap_or(&ctx.config.export.output_dir);
            let paths = export_analysis(&analysis, Path::new(dir))?;
            eprintln!("Exported {} and {}", paths.json.display(), paths.csv.display());
        }

        if quick {
            println!("{}", to_pretty_json(&analysis.quick())?);
        } else {
            print!("{}", format_analysis_summary(&analysis));
        }
        Ok(())
    })
}

/// Offline classification of a saved snapshot.
pub fn cmd_classify(snapshot_path: &str, node: Option<usize>) -> CmdResult {
    let content = std::fs::read_to_string(snapshot_path)?;
    let snapshot: DomSnapshot = serde_json::from_str(&content)?;

    match node {
        Some(index) => {
            let el = snapshot
                .get(NodeId(index))
                .ok_or_else(|| format!("node {} not in snapshot ({} nodes)", index, snapshot.len()))?;
            let detail = serde_json::json!({
                "category": classify(&el),
                "selectors": build_selectors(&el),
                "semantic_info": extract_semantics(&el),
                "element_context": extract_context(&el),
            });
            println!("{}", to_pretty_json(&detail)?);
        }
        None => {
            let analysis = analyze_snapshot(&snapshot, now_ms());
            println!("{}", to_pretty_json(&analysis.csv_data)?);
        }
    }
    Ok(())
}
