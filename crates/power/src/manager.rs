//! Power state machine.
//!
//! [`PowerManager::tick`] is called once per main-loop iteration:
//!
//! 1. Drain pending [`PowerRequest`]s and resolve at most one transition.
//!    Requests ranked below the winner are carried to the next tick.
//! 2. If no request won, check the inactivity timeout.
//! 3. Broadcast the transition (`STANDBY`, `WAKEUP`, `SILENCE_WAKEUP`).
//! 4. Deliver the loop callback for the current state.
//! 5. `WAKEUP` settles to `ACTIVE`.
//!
//! A wake restarts the inactivity window, whether it came from a request
//! or from [`PowerManager::wakeup`] / [`PowerManager::silence_wakeup`]:
//! the idle time seen by the timeout and the loop callbacks is capped at
//! the time since the wake.
//!
//! ```text
//!            POWER_BUTTON / STANDBY_REQUEST / timeout
//!   ACTIVE ────────────────────────────────────────▶ STANDBY
//!     ▲                                                │ │
//!     │ (same tick)      POWER_BUTTON / WAKEUP_REQUEST │ │ SILENCE_WAKEUP_REQUEST
//!   WAKEUP ◀───────────────────────────────────────────┘ ▼
//!     ▲                                           SILENCE_WAKEUP
//!     └──────── POWER_BUTTON / WAKEUP_REQUEST ──────────┘ │
//!                                   STANDBY ◀── timeout ──┘
//! ```

use core::cell::Cell;

use crate::error::RegistryError;
use crate::event::EventMask;
use crate::registry::{Handler, Registry};
use crate::request::{PendingRequests, PowerRequest, PowerRequests};
use crate::state::{PowerEvent, PowerLoop, PowerState, Tick};

/// Listener capacity of each power registry.
pub const POWER_LISTENERS: usize = 16;

/// What one [`PowerManager::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// State entered this tick, if any.
    pub transition: Option<PowerState>,
    /// State at the end of the tick.
    pub state: PowerState,
    /// Loop callbacks invoked.
    pub looped: usize,
    /// Idle time the tick ran with, capped at the time since the last wake.
    pub idle_ms: u32,
}

/// Owns the power state and the two power registries.
pub struct PowerManager<'a> {
    state: Cell<PowerState>,
    // Uptime of the last wake; `None` before the first wake and in standby.
    woke_ms: Cell<Option<u64>>,
    // A wake was entered outside `tick`; stamped with the next tick's uptime.
    wake_unstamped: Cell<bool>,
    requests: &'a PowerRequests,
    notify: Registry<'a, PowerEvent, POWER_LISTENERS>,
    looping: Registry<'a, PowerLoop, POWER_LISTENERS>,
}

impl<'a> PowerManager<'a> {
    /// Boot in `ACTIVE`, draining requests from `requests`.
    pub fn new(requests: &'a PowerRequests) -> Self {
        Self {
            state: Cell::new(PowerState::Active),
            woke_ms: Cell::new(None),
            wake_unstamped: Cell::new(false),
            requests,
            notify: Registry::new("powermgm"),
            looping: Registry::new("powermgm_loop"),
        }
    }

    /// Current state.
    pub fn state(&self) -> PowerState {
        self.state.get()
    }

    /// Subscribe to transition and interrupt-toggle events.
    pub fn register(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<PowerEvent>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        self.notify.register(mask, handler, id)
    }

    /// Subscribe to per-tick callbacks for the states in `mask`.
    pub fn register_loop(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<PowerLoop>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        self.looping.register(mask, handler, id)
    }

    /// Queue a request for the next tick.
    ///
    /// This is the only way handlers should ask for a transition; calling
    /// [`standby`](Self::standby) from inside a broadcast would nest one
    /// transition inside another.
    pub fn request(&self, request: PowerRequest) {
        self.requests.raise(request);
    }

    /// Broadcast an arbitrary power event without touching the state.
    pub fn send(&self, event: PowerEvent) -> usize {
        self.notify.send(&event)
    }

    /// Enter `STANDBY` now. Returns the number of listeners notified, zero
    /// if already in standby.
    pub fn standby(&self) -> usize {
        self.enter(PowerState::Standby)
    }

    /// Enter `WAKEUP` now. No-op while the display is already on.
    pub fn wakeup(&self) -> usize {
        if self.state.get().is_display_on() {
            return 0;
        }
        self.enter(PowerState::Wakeup)
    }

    /// Enter `SILENCE_WAKEUP` now. Only valid from standby.
    pub fn silence_wakeup(&self) -> usize {
        if self.state.get() != PowerState::Standby {
            return 0;
        }
        self.enter(PowerState::SilenceWakeup)
    }

    /// Tell every listener to re-attach its interrupt lines.
    pub fn enable_interrupts(&self) -> usize {
        crate::debug!("powermgm: enable interrupts");
        self.notify.send(&PowerEvent::EnableInterrupts)
    }

    /// Tell every listener to detach its interrupt lines, e.g. around a
    /// flash write that cannot tolerate ISR latency.
    pub fn disable_interrupts(&self) -> usize {
        crate::debug!("powermgm: disable interrupts");
        self.notify.send(&PowerEvent::DisableInterrupts)
    }

    /// Run one main-loop iteration.
    ///
    /// `standby_after_ms` is the inactivity timeout, `None` to stay awake
    /// indefinitely.
    pub fn tick(&self, tick: Tick, standby_after_ms: Option<u32>) -> TickReport {
        self.stamp_wake(tick.uptime_ms);
        let pending = self.requests.take_all();
        let state = self.state.get();
        let (mut target, carry) = resolve(state, pending);
        self.requests.restore(carry);

        if target.is_none() && self.timed_out(state, tick, standby_after_ms) {
            crate::info!("powermgm: inactivity timeout in {}", state.as_str());
            target = Some(PowerState::Standby);
        }

        let transition = target.filter(|next| *next != state);
        if let Some(next) = transition {
            self.enter(next);
            self.stamp_wake(tick.uptime_ms);
        }

        let current = self.state.get();
        let tick = Tick {
            idle_ms: self.idle_ms(tick),
            ..tick
        };
        let looped = self.looping.send(&PowerLoop { state: current, tick });

        if current == PowerState::Wakeup {
            self.state.set(PowerState::Active);
        }

        TickReport {
            transition,
            state: self.state.get(),
            looped,
            idle_ms: tick.idle_ms,
        }
    }

    fn stamp_wake(&self, uptime_ms: u64) {
        if self.wake_unstamped.replace(false) {
            self.woke_ms.set(Some(uptime_ms));
        }
    }

    fn idle_ms(&self, tick: Tick) -> u32 {
        match self.woke_ms.get() {
            Some(woke) => {
                let since_wake = tick.uptime_ms.saturating_sub(woke);
                u32::try_from(since_wake).map_or(tick.idle_ms, |ms| ms.min(tick.idle_ms))
            }
            None => tick.idle_ms,
        }
    }

    fn timed_out(&self, state: PowerState, tick: Tick, standby_after_ms: Option<u32>) -> bool {
        let Some(limit) = standby_after_ms else {
            return false;
        };
        state != PowerState::Standby && self.idle_ms(tick) > limit
    }

    fn enter(&self, next: PowerState) -> usize {
        let previous = self.state.get();
        if previous == next {
            return 0;
        }
        crate::info!("powermgm: {} -> {}", previous.as_str(), next.as_str());
        self.state.set(next);
        if next == PowerState::Standby {
            self.woke_ms.set(None);
            self.wake_unstamped.set(false);
        } else {
            self.wake_unstamped.set(true);
        }
        match PowerEvent::entering(next) {
            Some(event) => self.notify.send(&event),
            None => 0,
        }
    }
}

/// Pick the winning request for `state`.
///
/// Requests that are meaningless in `state` are dropped. Wake requests
/// ranked behind the winner are returned for the next tick; other losers
/// are dropped.
fn resolve(state: PowerState, pending: PendingRequests) -> (Option<PowerState>, PendingRequests) {
    let mut rest = pending;
    for request in PowerRequest::PRIORITY {
        if !pending.contains(request) {
            continue;
        }
        rest = rest.without(request);
        if let Some(next) = honour(state, request) {
            crate::debug!("powermgm: {} in {}", request.as_str(), state.as_str());
            let carry = PowerRequest::WAKE
                .into_iter()
                .filter(|r| rest.contains(*r))
                .fold(PendingRequests::NONE, PendingRequests::with);
            return (Some(next), carry);
        }
        crate::trace!("powermgm: dropped {} in {}", request.as_str(), state.as_str());
    }
    (None, PendingRequests::NONE)
}

fn honour(state: PowerState, request: PowerRequest) -> Option<PowerState> {
    match request {
        PowerRequest::PowerButton if state.is_display_on() => Some(PowerState::Standby),
        PowerRequest::PowerButton => Some(PowerState::Wakeup),
        PowerRequest::Standby if state != PowerState::Standby => Some(PowerState::Standby),
        PowerRequest::Wakeup if !state.is_display_on() => Some(PowerState::Wakeup),
        PowerRequest::SilenceWakeup if state == PowerState::Standby => {
            Some(PowerState::SilenceWakeup)
        }
        _ => None,
    }
}
