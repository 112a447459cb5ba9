use urlscan_rs::progress::ProgressTracker;
use urlscan_rs::steps::{target_percent, STEP_TABLE, TERMINAL_STEP};
use urlscan_rs::types::ProgressEvent;

fn ev(step: &str, detail: &str) -> ProgressEvent {
    ProgressEvent {
        step: step.into(),
        detail: detail.into(),
    }
}

#[test]
fn full_step_sequence_walks_target_to_100() {
    let mut tracker = ProgressTracker::new();
    let mut last_target = 0;
    for (name, pct) in STEP_TABLE {
        tracker.on_event(&ev(name, "running"));
        assert_eq!(tracker.target(), *pct);
        assert!(tracker.target() >= last_target);
        last_target = tracker.target();
    }
    assert_eq!(tracker.target(), 100);
    assert_eq!(target_percent(TERMINAL_STEP), Some(100));
}

#[test]
fn displayed_climbs_one_unit_per_tick_and_stops_at_target() {
    let mut tracker = ProgressTracker::new();
    tracker.on_event(&ev("Analyzing Domain Age", "whois lookup"));
    assert_eq!(tracker.target(), 30);

    let mut moved = 0;
    while tracker.tick() {
        moved += 1;
        assert!(tracker.displayed() <= tracker.target());
    }
    assert_eq!(moved, 30);
    assert_eq!(tracker.displayed(), 30);
    // Further ticks are no-ops until a new target arrives.
    assert!(!tracker.tick());
    assert_eq!(tracker.displayed(), 30);
}

#[test]
fn interleaved_events_and_ticks_stay_monotone() {
    let mut tracker = ProgressTracker::new();
    let bursts = [
        "Validating URL",
        "Checking Threat Databases",
        "Checking SSL Certificate", // late, lower percentage
        "Checking DNS Records",
    ];
    let mut last_displayed = 0;
    for step in bursts {
        tracker.on_event(&ev(step, "x"));
        for _ in 0..7 {
            tracker.tick();
            assert!(tracker.displayed() >= last_displayed);
            assert!(tracker.displayed() <= tracker.target());
            last_displayed = tracker.displayed();
        }
    }
    assert_eq!(tracker.target(), 90);
}

#[test]
fn settle_before_events_finish_forces_exactly_100() {
    let mut tracker = ProgressTracker::new();
    tracker.on_event(&ev("Checking SSL Certificate", "handshake"));
    tracker.tick();
    assert!(tracker.displayed() < 100);

    tracker.force_complete();
    assert_eq!(tracker.displayed(), 100);
    assert_eq!(tracker.target(), 100);
    assert_eq!(tracker.label(), TERMINAL_STEP);
}

#[test]
fn new_scan_resets_to_zero() {
    let mut tracker = ProgressTracker::new();
    tracker.on_event(&ev("Checking IP Reputation", "abuse lookup"));
    for _ in 0..10 {
        tracker.tick();
    }
    tracker.reset();
    assert_eq!(tracker.displayed(), 0);
    assert_eq!(tracker.target(), 0);
    assert!(!tracker.tick());
}
