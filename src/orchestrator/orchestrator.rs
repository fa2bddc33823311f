use std::cell::Cell;
use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::analyzer::{PageAnalysis, analyze_snapshot};
use crate::browser::error::BrowserError;
use crate::browser::handle::BrowserHandle;
use crate::button::button_model::{ButtonCategory, ButtonRecord, filter_categories, sort_by_priority};
use crate::button::discovery::find_buttons;
use crate::dom::dom_model::{DomSnapshot, ElementRef};
use crate::element::classifier::{CategoryRecord, classify_element};
use crate::field::discovery::find_input_fields;
use crate::field::field_model::InputFieldRecord;
use crate::guard::typing_guard::{GuardReport, TypingGuard};
use crate::orchestrator::session::Session;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{TraceEvent, now_ms};

// ============================================================================
// Configuration and results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub navigation_timeout: Duration,
    /// Pause after each click for the page to react.
    pub settle: Duration,
    pub idle_timeout: Duration,
    /// Extra pause after a successful click before the next one.
    pub click_pause: Duration,
    pub key_delay: Duration,
    pub fill_pause: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            settle: Duration::from_secs(2),
            idle_timeout: Duration::from_secs(5),
            click_pause: Duration::from_secs(1),
            key_delay: Duration::from_millis(100),
            fill_pause: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub url: String,
    pub title: String,
    pub buttons: Vec<ButtonRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickResult {
    pub success: bool,
    pub category: Option<ButtonCategory>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardReport>,
}

impl ClickResult {
    fn failed(category: Option<ButtonCategory>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            category,
            message: message.into(),
            button_text: None,
            guard: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessReport {
    pub success: bool,
    pub message: String,
    /// Buttons clicked successfully.
    pub processed: usize,
    /// Buttons queued after filtering.
    pub total: usize,
    pub results: Vec<ClickResult>,
}

impl ProcessReport {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            processed: 0,
            total: 0,
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum FieldStatus {
    Filled,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: String,
    pub status: FieldStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub success: bool,
    pub message: String,
    pub total_fields: usize,
    pub filled_fields: usize,
    pub skipped_fields: usize,
    pub fields: Vec<FieldOutcome>,
}

impl FillReport {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            total_fields: 0,
            filled_fields: 0,
            skipped_fields: 0,
            fields: Vec::new(),
        }
    }
}

/// Supplies the value to type into a discovered field; `None` skips it.
pub trait FieldValueSource {
    fn value_for(&mut self, field: &InputFieldRecord) -> Option<String>;
}

impl<F: FnMut(&InputFieldRecord) -> Option<String>> FieldValueSource for F {
    fn value_for(&mut self, field: &InputFieldRecord) -> Option<String> {
        self(field)
    }
}

/// Values keyed by field `name`, then `id`, then field type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(pub BTreeMap<String, String>);

impl FieldValueSource for FieldValues {
    fn value_for(&mut self, field: &InputFieldRecord) -> Option<String> {
        [field.name.as_str(), field.id.as_str(), field.field_type.as_str()]
            .into_iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| self.0.get(key).cloned())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives scans, clicks and fills against one `Session` at a time.
#[derive(Default)]
pub struct Orchestrator {
    pub config: OrchestratorConfig,
    pub guard: TypingGuard,
    tracer: Option<TraceLogger>,
    step: Cell<u64>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, guard: TypingGuard) -> Self {
        Self {
            config,
            guard,
            tracer: None,
            step: Cell::new(0),
        }
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Navigate and take a snapshot. A missed network-idle wait is not an error.
    fn load_page<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
    ) -> Result<DomSnapshot, BrowserError> {
        info!(url, "loading page");
        session.browser_mut().navigate(url, self.config.navigation_timeout)?;
        if let Err(e) = session.browser_mut().wait_for_network_idle(self.config.idle_timeout) {
            debug!(error = %e, "network did not go idle after navigation");
        }
        session.browser_mut().snapshot()
    }

    /// Discover buttons on `url`, keep the requested categories and sort by
    /// priority. Nothing is clicked.
    pub fn scan<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
        filter: &[ButtonCategory],
    ) -> Result<ScanReport, BrowserError> {
        session.run(|s| {
            let snapshot = self.load_page(s, url)?;
            let mut buttons = filter_categories(find_buttons(&snapshot), filter);
            sort_by_priority(&mut buttons);
            info!(count = buttons.len(), "scan complete");
            Ok(ScanReport {
                url: snapshot.url.clone(),
                title: snapshot.title.clone(),
                buttons,
            })
        })
    }

    /// Click the page's buttons in priority order.
    ///
    /// Stops right after a `navigation` or `submit` button, since the page
    /// has probably changed and the remaining records are stale. Load and
    /// discovery failures come back as an unsuccessful report; only session
    /// misuse is an `Err`.
    pub fn process<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
        filter: &[ButtonCategory],
    ) -> Result<ProcessReport, BrowserError> {
        session.run(|s| {
            let snapshot = match self.load_page(s, url) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(url, error = %e, "failed to load page");
                    return Ok(ProcessReport::failed("Failed to load page"));
                }
            };

            let found = find_buttons(&snapshot);
            if found.is_empty() {
                return Ok(ProcessReport::failed("No buttons found on this page"));
            }
            info!(count = found.len(), "buttons found");

            let mut buttons = filter_categories(found, filter);
            if !filter.is_empty() {
                info!(count = buttons.len(), ?filter, "filtered buttons by category");
            }
            sort_by_priority(&mut buttons);

            let mut results = Vec::with_capacity(buttons.len());
            let mut processed = 0;

            for (i, button) in buttons.iter().enumerate() {
                info!(
                    index = i + 1,
                    total = buttons.len(),
                    category = %button.category,
                    priority = button.priority,
                    description = %button.description,
                    "processing button"
                );

                let result = self.click_button(s, &snapshot.url, button);
                if result.success {
                    processed += 1;
                    s.sleep(self.config.click_pause);
                }
                results.push(result);

                if button.category.transitions_page() {
                    info!(category = %button.category, "page may have changed, stopping");
                    s.sleep(self.config.settle);
                    break;
                }
            }

            Ok(ProcessReport {
                success: true,
                message: format!("Processed {} buttons successfully", processed),
                processed,
                total: buttons.len(),
                results,
            })
        })
    }

    /// Click the first button (discovery order) of `category`, or failing
    /// that whose text contains `text` (case-insensitive).
    pub fn click_specific<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
        category: Option<ButtonCategory>,
        text: Option<&str>,
    ) -> Result<ClickResult, BrowserError> {
        if category.is_none() && text.is_none() {
            return Ok(ClickResult::failed(None, "Provide a button category or text"));
        }
        let needle = text.map(str::to_lowercase);

        session.run(|s| {
            let snapshot = match self.load_page(s, url) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(url, error = %e, "failed to load page");
                    return Ok(ClickResult::failed(category, "Failed to load page"));
                }
            };

            let buttons = find_buttons(&snapshot);
            let target = buttons.iter().find(|b| {
                category == Some(b.category)
                    || needle.as_deref().is_some_and(|n| b.text.to_lowercase().contains(n))
            });

            match target {
                Some(button) => Ok(self.click_button(s, &snapshot.url, button)),
                None => Ok(ClickResult::failed(category, "Button not found")),
            }
        })
    }

    /// Gate on the typing guard when needed, click, then let the page settle.
    fn click_button<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
        button: &ButtonRecord,
    ) -> ClickResult {
        let step = self.step.get() + 1;
        self.step.set(step);
        let mut event = TraceEvent::click(step, url, button);

        let mut guard = None;
        if let Some(input) = &button.associated_input {
            debug!(value = %input.value, "button has an associated input");
            if input.value.trim().is_empty() || session.typing_recently_observed() {
                let report = session.watch_input(&self.guard, input.node);
                event = event.with_guard(&report);
                guard = Some(report);
            }
        }

        let result = match session.browser_mut().click(button.node) {
            Ok(()) => {
                session.sleep(self.config.settle);
                if let Err(e) = session.browser_mut().wait_for_network_idle(self.config.idle_timeout) {
                    debug!(error = %e, "network did not go idle after click");
                }
                info!(category = %button.category, "clicked button");
                ClickResult {
                    success: true,
                    category: Some(button.category),
                    message: format!("Successfully clicked {} button", button.category),
                    button_text: Some(button.text.clone()),
                    guard,
                }
            }
            Err(e) => {
                warn!(category = %button.category, error = %e, "click failed");
                ClickResult {
                    guard,
                    ..ClickResult::failed(Some(button.category), format!("Error clicking button: {}", e))
                }
            }
        };

        if let Some(tracer) = &self.tracer {
            tracer.log(&event.with_outcome(result.success, &result.message));
        }
        result
    }

    pub fn fields<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
    ) -> Result<Vec<InputFieldRecord>, BrowserError> {
        session.run(|s| {
            let snapshot = self.load_page(s, url)?;
            let fields = find_input_fields(&snapshot);
            info!(count = fields.len(), "input fields found");
            Ok(fields)
        })
    }

    /// Fill every discovered field with the value `source` supplies.
    ///
    /// Each field is focused, cleared and typed into key by key. Every
    /// completed fill marks the session as recently typed into, which arms
    /// the typing guard for the next guarded click.
    pub fn fill_form<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
        source: &mut dyn FieldValueSource,
    ) -> Result<FillReport, BrowserError> {
        session.run(|s| {
            let snapshot = match self.load_page(s, url) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(url, error = %e, "failed to load page");
                    return Ok(FillReport::failed("Failed to load page"));
                }
            };

            let fields = find_input_fields(&snapshot);
            if fields.is_empty() {
                return Ok(FillReport::failed("No input fields found"));
            }

            let mut outcomes = Vec::with_capacity(fields.len());
            let (mut filled, mut skipped) = (0, 0);

            for field in &fields {
                let status = match source.value_for(field).filter(|v| !v.trim().is_empty()) {
                    None => {
                        debug!(field = %field.description(), "skipped field");
                        skipped += 1;
                        FieldStatus::Skipped
                    }
                    Some(value) => match self.fill_field(s, field, value.trim()) {
                        Ok(()) => {
                            filled += 1;
                            s.mark_filled();
                            s.sleep(self.config.fill_pause);
                            FieldStatus::Filled
                        }
                        Err(e) => {
                            warn!(field = %field.description(), error = %e, "failed to fill field");
                            FieldStatus::Failed(e.to_string())
                        }
                    },
                };
                outcomes.push(FieldOutcome {
                    field: field.description(),
                    status,
                });
            }

            info!(filled, skipped, total = fields.len(), "form processing complete");
            Ok(FillReport {
                success: true,
                message: "Form filling completed".into(),
                total_fields: fields.len(),
                filled_fields: filled,
                skipped_fields: skipped,
                fields: outcomes,
            })
        })
    }

    fn fill_field<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        field: &InputFieldRecord,
        value: &str,
    ) -> Result<(), BrowserError> {
        let browser = session.browser_mut();
        browser.click(field.node)?;
        browser.fill(field.node, "")?;
        browser.type_text(field.node, value, self.config.key_delay)
    }

    /// Full element analysis of `url`.
    pub fn analyze<B: BrowserHandle>(
        &self,
        session: &mut Session<B>,
        url: &str,
    ) -> Result<PageAnalysis, BrowserError> {
        session.run(|s| {
            let snapshot = self.load_page(s, url)?;
            Ok(analyze_snapshot(&snapshot, now_ms()))
        })
    }
}

/// Category of a single element; needs no session.
pub fn classify(el: &ElementRef<'_>) -> CategoryRecord {
    classify_element(el)
}
