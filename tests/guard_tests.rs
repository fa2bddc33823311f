use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use page_triage::dom::dom_model::NodeId;
use page_triage::guard::clock::ManualClock;
use page_triage::guard::typing_guard::{GuardConfig, GuardExit, GuardState, TypingGuard};

mod common;
use crate::common::fake_browser::FakeBrowser;
use crate::common::pages::session_with_clock;

/// Probe that replays `values` one per call and repeats the last one.
fn stream(values: &[&str]) -> impl FnMut() -> Result<String, String> {
    let mut queue: VecDeque<String> = values.iter().map(|v| v.to_string()).collect();
    move || {
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn settles_after_third_repeat_of_value() {
    let clock = ManualClock::new();
    let guard = TypingGuard::default();

    let report = guard.watch(&clock, stream(&["", "", "", "a", "ab", "ab", "ab", "ab"]));

    assert_eq!(report.state, GuardState::Stable);
    assert_eq!(report.exit, GuardExit::Settled);
    assert_eq!(report.polls, 8);
    assert_eq!(report.elapsed, Duration::from_secs(7));
    assert_eq!(
        report.path,
        vec![GuardState::Idle, GuardState::Monitoring, GuardState::Stable]
    );
    assert!(report.proceed());
}

#[test]
fn never_settles_before_third_repeat() {
    // Same prefix cut one sample short: the stream ends on a changing value.
    let clock = ManualClock::new();
    let guard = TypingGuard::new(GuardConfig {
        max_cycles: 4,
        ..GuardConfig::default()
    });

    let samples = Rc::new(RefCell::new(0u32));
    let seen = Rc::clone(&samples);
    let values = ["", "", "", "a", "ab", "ab", "ab", "abc"];
    let report = guard.watch(&clock, move || {
        let i = *seen.borrow() as usize;
        *seen.borrow_mut() += 1;
        Ok::<_, String>(values[i.min(values.len() - 1)].to_string())
    });

    assert_eq!(report.state, GuardState::Timeout);
    assert_eq!(report.exit, GuardExit::CycleLimit);
    assert_eq!(*samples.borrow(), 8);
}

#[test]
fn empty_input_goes_straight_to_stable() {
    let clock = ManualClock::new();
    let report = TypingGuard::default().watch(&clock, stream(&[""]));

    assert_eq!(report.state, GuardState::Stable);
    assert_eq!(report.exit, GuardExit::NothingTyped);
    assert_eq!(report.path, vec![GuardState::Idle, GuardState::Stable]);
    assert_eq!(report.elapsed, Duration::from_secs(5));
    assert_eq!(report.polls, 6);
}

#[test]
fn whitespace_counts_as_empty() {
    let clock = ManualClock::new();
    let report = TypingGuard::default().watch(&clock, stream(&["   "]));
    assert_eq!(report.exit, GuardExit::NothingTyped);
}

#[test]
fn prefilled_value_only_needs_stability() {
    let clock = ManualClock::new();
    let report = TypingGuard::default().watch(&clock, stream(&["hello"]));

    assert_eq!(report.state, GuardState::Stable);
    assert_eq!(report.polls, 4);
    assert_eq!(clock.elapsed(), Duration::from_secs(3));
}

#[test]
fn cycle_limit_times_out_but_proceeds() {
    let clock = ManualClock::new();
    let mut n = 0;
    let report = TypingGuard::default().watch(&clock, || {
        n += 1;
        Ok::<_, String>(format!("value-{}", n))
    });

    assert_eq!(report.state, GuardState::Timeout);
    assert_eq!(report.exit, GuardExit::CycleLimit);
    assert_eq!(report.polls, 31);
    assert_eq!(report.elapsed, Duration::from_secs(30));
    assert!(report.proceed());
}

#[test]
fn probe_failure_while_monitoring_fails_open() {
    let clock = ManualClock::new();
    let mut calls = 0;
    let report = TypingGuard::default().watch(&clock, || {
        calls += 1;
        if calls < 3 {
            Ok("typing".to_string())
        } else {
            Err("element detached")
        }
    });

    assert_eq!(report.state, GuardState::Timeout);
    assert_eq!(report.exit, GuardExit::ProbeFailed("element detached".into()));
    assert!(report.proceed());
}

#[test]
fn probe_failure_while_waiting_for_input_fails_open() {
    let clock = ManualClock::new();
    let mut calls = 0;
    let report = TypingGuard::default().watch(&clock, || {
        calls += 1;
        if calls == 1 { Ok(String::new()) } else { Err("gone") }
    });

    assert_eq!(report.state, GuardState::Timeout);
    assert!(matches!(report.exit, GuardExit::ProbeFailed(_)));
    assert_eq!(report.path, vec![GuardState::Idle, GuardState::Timeout]);
}

#[test]
fn custom_poll_interval_is_honoured() {
    let clock = ManualClock::new();
    let guard = TypingGuard::new(GuardConfig {
        poll_interval: Duration::from_millis(250),
        ..GuardConfig::default()
    });
    let report = guard.watch(&clock, stream(&["x"]));
    assert_eq!(report.elapsed, Duration::from_millis(750));
}

// ============================================================================
// Session integration
// ============================================================================

#[test]
fn session_watch_reads_live_value_from_browser() {
    let browser = FakeBrowser::new().with_values(4, &["", "a", "ab", "ab", "ab", "ab"]);
    let (mut session, clock) = session_with_clock(browser);

    let report = session.watch_input(&TypingGuard::default(), NodeId(4));

    assert_eq!(report.exit, GuardExit::Settled);
    assert_eq!(session.browser().reads() as u32, report.polls);
    assert_eq!(clock.elapsed(), report.elapsed);
}

#[test]
fn typing_window_expires_after_three_seconds() {
    let (mut session, clock) = session_with_clock(FakeBrowser::new());
    assert!(!session.typing_recently_observed());

    session.mark_filled();
    assert!(session.typing_recently_observed());

    clock.advance(Duration::from_millis(2_999));
    assert!(session.typing_recently_observed());

    clock.advance(Duration::from_millis(1));
    assert!(!session.typing_recently_observed());
}

#[test]
fn zero_interval_and_zero_stable_polls_still_wait() {
    let clock = ManualClock::new();
    let guard = TypingGuard::new(GuardConfig {
        poll_interval: Duration::ZERO,
        stable_polls: 0,
        ..GuardConfig::default()
    });

    let report = guard.watch(&clock, stream(&[""]));
    assert_eq!(report.exit, GuardExit::NothingTyped);
    assert_eq!(report.elapsed, Duration::from_secs(5));

    let report = guard.watch(&clock, stream(&["partial"]));
    assert_eq!(report.exit, GuardExit::Settled);
    assert_eq!(report.polls, 2);
    assert!(report.elapsed > Duration::ZERO);
}
