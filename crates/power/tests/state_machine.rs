//! Power state machine driven through its public API with recording
//! listeners standing in for the display, sensors and UI.
//!
//! Run with: cargo test -p power --test state_machine
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::cell::RefCell;

use power::{
    Event, Handler, PowerEvent, PowerLoop, PowerManager, PowerRequest, PowerRequests, PowerState,
    Tick,
};

// -- Recording listener ---------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Event(&'static str, &'static str),
    Loop(&'static str, PowerState),
}

struct Recorder<'l> {
    name: &'static str,
    log: &'l RefCell<Vec<Seen>>,
}

impl Handler<PowerEvent> for Recorder<'_> {
    fn on_event(&self, event: &PowerEvent) -> bool {
        self.log.borrow_mut().push(Seen::Event(self.name, event.as_str()));
        true
    }
}

impl Handler<PowerLoop> for Recorder<'_> {
    fn on_event(&self, event: &PowerLoop) -> bool {
        self.log.borrow_mut().push(Seen::Loop(self.name, event.state));
        true
    }
}

fn at(uptime_ms: u64, idle_ms: u32) -> Tick {
    Tick {
        uptime_ms,
        idle_ms,
        unix_time: 1_700_000_000,
    }
}

fn events(log: &RefCell<Vec<Seen>>) -> Vec<&'static str> {
    log.borrow()
        .iter()
        .filter_map(|s| match s {
            Seen::Event(_, e) => Some(*e),
            Seen::Loop(..) => None,
        })
        .collect()
}

/// Records the idle time each loop callback was handed.
struct IdleLog<'l> {
    seen: &'l RefCell<Vec<u32>>,
}

impl Handler<PowerLoop> for IdleLog<'_> {
    fn on_event(&self, event: &PowerLoop) -> bool {
        self.seen.borrow_mut().push(event.tick.idle_ms);
        true
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[test]
fn test_boots_active_with_no_broadcast() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let rec = Recorder { name: "rec", log: &log };
    pm.register(PowerEvent::ALL, &rec, "rec").unwrap();

    let report = pm.tick(at(0, 0), Some(15_000));
    assert_eq!(report.transition, None);
    assert_eq!(pm.state(), PowerState::Active);
    assert!(events(&log).is_empty());
}

#[test]
fn test_standby_request_broadcasts_in_registration_order() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let display = Recorder { name: "display", log: &log };
    let motion = Recorder { name: "motion", log: &log };
    let gui = Recorder { name: "gui", log: &log };
    pm.register(PowerEvent::TRANSITIONS, &display, "display").unwrap();
    pm.register(PowerEvent::TRANSITIONS, &motion, "motion").unwrap();
    pm.register(PowerEvent::WAKEUP, &gui, "gui").unwrap();

    requests.raise(PowerRequest::Standby);
    let report = pm.tick(at(10, 0), None);

    assert_eq!(report.transition, Some(PowerState::Standby));
    assert_eq!(pm.state(), PowerState::Standby);
    assert_eq!(
        *log.borrow(),
        vec![
            Seen::Event("display", "STANDBY"),
            Seen::Event("motion", "STANDBY"),
        ]
    );
}

#[test]
fn test_standby_then_wakeup_reaches_each_interested_listener() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let l1 = Recorder { name: "l1", log: &log };
    let l2 = Recorder { name: "l2", log: &log };
    pm.register(PowerEvent::STANDBY | PowerEvent::WAKEUP, &l1, "l1").unwrap();
    pm.register(PowerEvent::WAKEUP, &l2, "l2").unwrap();

    assert_eq!(pm.standby(), 1);
    assert_eq!(*log.borrow(), vec![Seen::Event("l1", "STANDBY")]);

    log.borrow_mut().clear();
    assert_eq!(pm.wakeup(), 2);
    assert_eq!(
        *log.borrow(),
        vec![Seen::Event("l1", "WAKEUP"), Seen::Event("l2", "WAKEUP")]
    );
}

#[test]
fn test_wakeup_settles_to_active_after_one_tick() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let rec = Recorder { name: "rec", log: &log };
    pm.register(PowerEvent::ALL, &rec, "rec").unwrap();
    pm.register_loop(PowerEvent::TRANSITIONS, &rec, "rec").unwrap();

    pm.standby();
    log.borrow_mut().clear();

    requests.raise(PowerRequest::Wakeup);
    let report = pm.tick(at(100, 0), None);

    assert_eq!(report.transition, Some(PowerState::Wakeup));
    assert_eq!(report.state, PowerState::Active);
    assert_eq!(
        *log.borrow(),
        vec![
            Seen::Event("rec", "WAKEUP"),
            Seen::Loop("rec", PowerState::Wakeup),
        ]
    );

    log.borrow_mut().clear();
    pm.tick(at(110, 0), None);
    assert_eq!(*log.borrow(), vec![Seen::Loop("rec", PowerState::Active)]);
}

#[test]
fn test_power_button_toggles_both_ways() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);

    requests.raise(PowerRequest::PowerButton);
    pm.tick(at(0, 0), None);
    assert_eq!(pm.state(), PowerState::Standby);

    requests.raise(PowerRequest::PowerButton);
    let report = pm.tick(at(10, 0), None);
    assert_eq!(report.transition, Some(PowerState::Wakeup));
    assert_eq!(pm.state(), PowerState::Active);
}

#[test]
fn test_repeated_standby_requests_broadcast_once() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let rec = Recorder { name: "rec", log: &log };
    pm.register(PowerEvent::STANDBY, &rec, "rec").unwrap();

    requests.raise(PowerRequest::Standby);
    pm.tick(at(0, 0), None);
    requests.raise(PowerRequest::Standby);
    pm.tick(at(10, 0), None);
    assert_eq!(pm.standby(), 0);

    assert_eq!(events(&log), vec!["STANDBY"]);
}

#[test]
fn test_wakeup_raised_with_standby_is_not_lost() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let rec = Recorder { name: "rec", log: &log };
    pm.register(PowerEvent::TRANSITIONS, &rec, "rec").unwrap();

    requests.raise(PowerRequest::Standby);
    requests.raise(PowerRequest::Wakeup);
    pm.tick(at(0, 0), None);
    assert_eq!(pm.state(), PowerState::Standby);
    pm.tick(at(10, 0), None);
    assert_eq!(pm.state(), PowerState::Active);

    assert_eq!(events(&log), vec!["STANDBY", "WAKEUP"]);
}

#[test]
fn test_silence_wakeup_then_full_wakeup() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let rec = Recorder { name: "rec", log: &log };
    pm.register(PowerEvent::TRANSITIONS, &rec, "rec").unwrap();
    pm.register_loop(PowerEvent::SILENCE_WAKEUP, &rec, "rec").unwrap();

    pm.standby();
    requests.raise(PowerRequest::SilenceWakeup);
    pm.tick(at(0, 0), None);
    assert_eq!(pm.state(), PowerState::SilenceWakeup);

    requests.raise(PowerRequest::Wakeup);
    pm.tick(at(10, 0), None);
    assert_eq!(pm.state(), PowerState::Active);

    assert_eq!(
        *log.borrow(),
        vec![
            Seen::Event("rec", "STANDBY"),
            Seen::Event("rec", "SILENCE_WAKEUP"),
            Seen::Loop("rec", PowerState::SilenceWakeup),
            Seen::Event("rec", "WAKEUP"),
        ]
    );
}

#[test]
fn test_silence_wakeup_ignored_while_active() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    requests.raise(PowerRequest::SilenceWakeup);
    let report = pm.tick(at(0, 0), None);
    assert_eq!(report.transition, None);
    assert_eq!(pm.state(), PowerState::Active);
    assert!(!requests.is_pending());
}

// ---------------------------------------------------------------------------
// Inactivity
// ---------------------------------------------------------------------------

#[test]
fn test_inactivity_timeout_enters_standby() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);

    assert_eq!(pm.tick(at(1_000, 14_999), Some(15_000)).transition, None);
    assert_eq!(pm.tick(at(1_010, 15_000), Some(15_000)).transition, None);
    assert_eq!(
        pm.tick(at(1_020, 15_001), Some(15_000)).transition,
        Some(PowerState::Standby)
    );
}

#[test]
fn test_no_timeout_means_stay_awake() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    assert_eq!(pm.tick(at(0, u32::MAX), None).transition, None);
    assert_eq!(pm.state(), PowerState::Active);
}

#[test]
fn test_silence_wakeup_gets_its_own_timeout_window() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    pm.standby();

    // User has been idle for ages; the background wakeup still gets 15 s.
    requests.raise(PowerRequest::SilenceWakeup);
    pm.tick(at(100_000, 90_000), Some(15_000));
    assert_eq!(pm.state(), PowerState::SilenceWakeup);

    pm.tick(at(110_000, 100_000), Some(15_000));
    assert_eq!(pm.state(), PowerState::SilenceWakeup);

    pm.tick(at(115_001, 105_001), Some(15_000));
    assert_eq!(pm.state(), PowerState::Standby);
}

#[test]
fn test_direct_silence_wakeup_gets_its_own_timeout_window() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    pm.standby();
    pm.silence_wakeup();

    let report = pm.tick(at(100_000, 90_000), Some(15_000));
    assert_eq!(report.transition, None);
    assert_eq!(report.idle_ms, 0);
    assert_eq!(pm.state(), PowerState::SilenceWakeup);

    pm.tick(at(115_000, 105_000), Some(15_000));
    assert_eq!(pm.state(), PowerState::SilenceWakeup);

    pm.tick(at(115_001, 105_001), Some(15_000));
    assert_eq!(pm.state(), PowerState::Standby);
}

#[test]
fn test_direct_wakeup_restarts_active_timeout() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    pm.standby();
    pm.wakeup();

    pm.tick(at(200_000, 190_000), Some(15_000));
    assert_eq!(pm.state(), PowerState::Active);
    pm.tick(at(214_000, 204_000), Some(15_000));
    assert_eq!(pm.state(), PowerState::Active);
    pm.tick(at(215_001, 205_001), Some(15_000));
    assert_eq!(pm.state(), PowerState::Standby);
}

#[test]
fn test_loop_sees_zero_idle_on_wake_tick() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let seen = RefCell::new(Vec::new());
    let idle = IdleLog { seen: &seen };
    pm.register_loop(PowerEvent::WAKEUP, &idle, "idle").unwrap();

    pm.tick(at(1_000, 700), None);
    pm.standby();

    requests.raise(PowerRequest::PowerButton);
    let report = pm.tick(at(50_000, 40_000), None);
    assert_eq!(report.transition, Some(PowerState::Wakeup));
    assert_eq!(report.idle_ms, 0);
    pm.tick(at(50_500, 40_500), None);

    assert_eq!(*seen.borrow(), vec![700, 0, 500]);
}

// ---------------------------------------------------------------------------
// Loop callbacks and interrupt toggles
// ---------------------------------------------------------------------------

#[test]
fn test_loop_callbacks_follow_state_mask() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let awake = Recorder { name: "awake", log: &log };
    let asleep = Recorder { name: "asleep", log: &log };
    pm.register_loop(PowerEvent::WAKEUP, &awake, "awake").unwrap();
    pm.register_loop(PowerEvent::STANDBY, &asleep, "asleep").unwrap();

    pm.tick(at(0, 0), None);
    pm.standby();
    pm.tick(at(10, 0), None);

    assert_eq!(
        *log.borrow(),
        vec![
            Seen::Loop("awake", PowerState::Active),
            Seen::Loop("asleep", PowerState::Standby),
        ]
    );
}

#[test]
fn test_interrupt_toggles_keep_state() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let log = RefCell::new(Vec::new());
    let rec = Recorder { name: "rec", log: &log };
    pm.register(PowerEvent::INTERRUPTS, &rec, "rec").unwrap();

    assert_eq!(pm.disable_interrupts(), 1);
    assert_eq!(pm.enable_interrupts(), 1);
    assert_eq!(pm.state(), PowerState::Active);
    assert_eq!(events(&log), vec!["DISABLE_INTERRUPTS", "ENABLE_INTERRUPTS"]);
}

// A listener that asks for standby from inside a loop callback: the request
// is honoured on the following tick, never mid-broadcast.
struct SleepyApp<'p> {
    pm: &'p PowerManager<'p>,
}

impl Handler<PowerLoop> for SleepyApp<'_> {
    fn on_event(&self, _event: &PowerLoop) -> bool {
        self.pm.request(PowerRequest::Standby);
        true
    }
}

#[test]
fn test_request_from_listener_applies_next_tick() {
    let requests = PowerRequests::new();
    let pm = PowerManager::new(&requests);
    let app = SleepyApp { pm: &pm };
    pm.register_loop(PowerEvent::WAKEUP, &app, "app").unwrap();

    let first = pm.tick(at(0, 0), None);
    assert_eq!(first.transition, None);
    assert_eq!(pm.state(), PowerState::Active);

    let second = pm.tick(at(10, 0), None);
    assert_eq!(second.transition, Some(PowerState::Standby));
}
