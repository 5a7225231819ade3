//! Power states and the two event families the power manager emits.
//!
//! - [`PowerEvent`] is sent once per transition (or interrupt toggle).
//! - [`PowerLoop`] is sent on every tick, tagged with the current state, so
//!   subsystems can do periodic work that depends on being awake or asleep.
//!
//! Both families share one bit layout: `PowerEvent::STANDBY` selects the
//! STANDBY transition in the notify registry and the standby tick in the
//! loop registry.

use crate::event::{Event, EventMask};

/// The device power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Fully awake, display on.
    #[default]
    Active,
    /// Display off, low-power mode, wake sources armed.
    Standby,
    /// Coming back from standby with the display on. Lasts one tick.
    Wakeup,
    /// Awake for background work with the display off.
    SilenceWakeup,
}

impl PowerState {
    /// Stable name for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::Active => "ACTIVE",
            PowerState::Standby => "STANDBY",
            PowerState::Wakeup => "WAKEUP",
            PowerState::SilenceWakeup => "SILENCE_WAKEUP",
        }
    }

    /// `true` while the display is meant to be on.
    pub fn is_display_on(self) -> bool {
        matches!(self, PowerState::Active | PowerState::Wakeup)
    }

    /// Loop-event bit delivered on ticks spent in this state.
    ///
    /// ACTIVE shares the WAKEUP bit: a listener that wants to run while the
    /// watch is awake subscribes to `PowerEvent::WAKEUP`.
    pub fn loop_mask(self) -> EventMask {
        match self {
            PowerState::Active | PowerState::Wakeup => PowerEvent::WAKEUP,
            PowerState::Standby => PowerEvent::STANDBY,
            PowerState::SilenceWakeup => PowerEvent::SILENCE_WAKEUP,
        }
    }
}

/// Transition and interrupt-control notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    /// Entering standby.
    Standby,
    /// Waking with the display on.
    Wakeup,
    /// Waking with the display off.
    SilenceWakeup,
    /// Re-attach hardware interrupt lines.
    EnableInterrupts,
    /// Detach hardware interrupt lines.
    DisableInterrupts,
}

impl PowerEvent {
    /// STANDBY bit.
    pub const STANDBY: EventMask = EventMask::bit(0);
    /// WAKEUP bit.
    pub const WAKEUP: EventMask = EventMask::bit(1);
    /// SILENCE_WAKEUP bit.
    pub const SILENCE_WAKEUP: EventMask = EventMask::bit(2);
    /// ENABLE_INTERRUPTS bit.
    pub const ENABLE_INTERRUPTS: EventMask = EventMask::bit(3);
    /// DISABLE_INTERRUPTS bit.
    pub const DISABLE_INTERRUPTS: EventMask = EventMask::bit(4);

    /// The three state transitions.
    pub const TRANSITIONS: EventMask = Self::STANDBY
        .union(Self::WAKEUP)
        .union(Self::SILENCE_WAKEUP);
    /// Both interrupt toggles.
    pub const INTERRUPTS: EventMask = Self::ENABLE_INTERRUPTS.union(Self::DISABLE_INTERRUPTS);
    /// Every power event.
    pub const ALL: EventMask = Self::TRANSITIONS.union(Self::INTERRUPTS);

    /// The event announcing entry into `state`, if that state is announced.
    pub fn entering(state: PowerState) -> Option<Self> {
        match state {
            PowerState::Standby => Some(PowerEvent::Standby),
            PowerState::Wakeup => Some(PowerEvent::Wakeup),
            PowerState::SilenceWakeup => Some(PowerEvent::SilenceWakeup),
            PowerState::Active => None,
        }
    }
}

impl Event for PowerEvent {
    fn mask(&self) -> EventMask {
        match self {
            PowerEvent::Standby => Self::STANDBY,
            PowerEvent::Wakeup => Self::WAKEUP,
            PowerEvent::SilenceWakeup => Self::SILENCE_WAKEUP,
            PowerEvent::EnableInterrupts => Self::ENABLE_INTERRUPTS,
            PowerEvent::DisableInterrupts => Self::DISABLE_INTERRUPTS,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PowerEvent::Standby => "STANDBY",
            PowerEvent::Wakeup => "WAKEUP",
            PowerEvent::SilenceWakeup => "SILENCE_WAKEUP",
            PowerEvent::EnableInterrupts => "ENABLE_INTERRUPTS",
            PowerEvent::DisableInterrupts => "DISABLE_INTERRUPTS",
        }
    }
}

/// Per-tick clock readings handed to loop callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Monotonic milliseconds since boot.
    pub uptime_ms: u64,
    /// Milliseconds since the last user interaction.
    pub idle_ms: u32,
    /// Wall-clock time, Unix seconds UTC.
    pub unix_time: i64,
}

/// Loop callback payload: the state this tick runs in plus its clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerLoop {
    /// State during this tick.
    pub state: PowerState,
    /// Clock readings.
    pub tick: Tick,
}

impl Event for PowerLoop {
    fn mask(&self) -> EventMask {
        self.state.loop_mask()
    }

    fn as_str(&self) -> &'static str {
        self.state.as_str()
    }
}
