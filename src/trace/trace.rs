use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::button::button_model::ButtonRecord;
use crate::guard::typing_guard::GuardReport;

pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// One click attempt as written to the JSONL trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: u64,
    pub url: String,

    pub category: String,
    pub priority: u8,
    pub button_text: String,
    pub selector: String,

    pub guard_state: Option<String>,
    pub guard_exit: Option<String>,
    pub guard_polls: Option<u32>,

    pub success: Option<bool>,
    pub message: Option<String>,
}

impl TraceEvent {
    pub fn click(step: u64, url: &str, button: &ButtonRecord) -> Self {
        Self {
            timestamp_ms: now_ms(),
            step,
            url: url.to_string(),
            category: button.category.to_string(),
            priority: button.priority,
            button_text: button.text.clone(),
            selector: button.selectors.primary().to_string(),
            guard_state: None,
            guard_exit: None,
            guard_polls: None,
            success: None,
            message: None,
        }
    }

    pub fn with_guard(mut self, report: &GuardReport) -> Self {
        self.guard_state = Some(format!("{:?}", report.state));
        self.guard_exit = Some(report.exit.to_string());
        self.guard_polls = Some(report.polls);
        self
    }

    pub fn with_outcome(mut self, success: bool, message: impl ToString) -> Self {
        self.success = Some(success);
        self.message = Some(message.to_string());
        self
    }
}
