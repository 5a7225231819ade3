//! Pending power requests.
//!
//! Anything that wants a power transition (the power-button ISR, a motion
//! gesture, an incoming notification, an alarm) raises a [`PowerRequest`].
//! Requests are plain bits: raising one twice before the next tick is the
//! same as raising it once. [`PowerManager::tick`](crate::PowerManager::tick)
//! drains them with [`PowerRequests::take_all`].

use core::sync::atomic::{AtomicU8, Ordering};

/// A request for a power transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerRequest {
    /// Power key pressed: toggle between awake and standby.
    PowerButton,
    /// Wake with the display on.
    Wakeup,
    /// Wake without turning the display on. Only honoured from standby.
    SilenceWakeup,
    /// Enter standby.
    Standby,
}

impl PowerRequest {
    /// All requests in resolution priority order.
    pub const PRIORITY: [PowerRequest; 4] = [
        PowerRequest::PowerButton,
        PowerRequest::Standby,
        PowerRequest::Wakeup,
        PowerRequest::SilenceWakeup,
    ];

    /// Requests that bring the watch out of standby. These survive a tick
    /// in which a higher-priority request won.
    pub const WAKE: [PowerRequest; 2] = [PowerRequest::Wakeup, PowerRequest::SilenceWakeup];

    const fn bit(self) -> u8 {
        match self {
            PowerRequest::PowerButton => 1 << 0,
            PowerRequest::Wakeup => 1 << 1,
            PowerRequest::SilenceWakeup => 1 << 2,
            PowerRequest::Standby => 1 << 3,
        }
    }

    /// Stable name for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            PowerRequest::PowerButton => "POWER_BUTTON",
            PowerRequest::Wakeup => "WAKEUP_REQUEST",
            PowerRequest::SilenceWakeup => "SILENCE_WAKEUP_REQUEST",
            PowerRequest::Standby => "STANDBY_REQUEST",
        }
    }
}

/// Snapshot of requests taken by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingRequests(u8);

impl PendingRequests {
    /// No requests.
    pub const NONE: Self = Self(0);

    /// `true` if `request` is in the snapshot.
    pub fn contains(self, request: PowerRequest) -> bool {
        self.0 & request.bit() != 0
    }

    /// `true` if the snapshot holds no requests.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Snapshot with `request` added.
    #[must_use]
    pub fn with(self, request: PowerRequest) -> Self {
        Self(self.0 | request.bit())
    }

    /// Snapshot with `request` removed.
    #[must_use]
    pub fn without(self, request: PowerRequest) -> Self {
        Self(self.0 & !request.bit())
    }
}

/// Interrupt-safe set of pending [`PowerRequest`]s.
pub struct PowerRequests {
    bits: AtomicU8,
}

impl PowerRequests {
    /// No pending requests. `const` so it can back a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
        }
    }

    /// Add `request` to the pending set. Safe to call from interrupt context.
    pub fn raise(&self, request: PowerRequest) {
        critical_section::with(|_| {
            let bits = self.bits.load(Ordering::Acquire);
            self.bits.store(bits | request.bit(), Ordering::Release);
        });
    }

    /// Add every request in `pending` back to the set.
    ///
    /// Used for requests a tick could not honour yet; they are resolved on
    /// the next tick together with anything raised meanwhile.
    pub fn restore(&self, pending: PendingRequests) {
        if pending.is_empty() {
            return;
        }
        critical_section::with(|_| {
            let bits = self.bits.load(Ordering::Acquire);
            self.bits.store(bits | pending.0, Ordering::Release);
        });
    }

    /// Copy and clear the pending set in one critical section.
    pub fn take_all(&self) -> PendingRequests {
        critical_section::with(|_| {
            let bits = self.bits.load(Ordering::Acquire);
            self.bits.store(0, Ordering::Release);
            PendingRequests(bits)
        })
    }

    /// `true` if any request is pending.
    pub fn is_pending(&self) -> bool {
        self.bits.load(Ordering::Acquire) != 0
    }
}

impl Default for PowerRequests {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{PendingRequests, PowerRequest, PowerRequests};

    #[test]
    fn test_take_all_clears() {
        let req = PowerRequests::new();
        req.raise(PowerRequest::Wakeup);
        req.raise(PowerRequest::PowerButton);
        let pending = req.take_all();
        assert!(pending.contains(PowerRequest::Wakeup));
        assert!(pending.contains(PowerRequest::PowerButton));
        assert!(!pending.contains(PowerRequest::Standby));
        assert!(req.take_all().is_empty());
    }

    #[test]
    fn test_duplicate_raise_is_single_request() {
        let req = PowerRequests::new();
        req.raise(PowerRequest::Standby);
        req.raise(PowerRequest::Standby);
        assert_eq!(req.take_all(), PendingRequests::NONE.with(PowerRequest::Standby));
    }

    #[test]
    fn test_restore_merges_with_new_requests() {
        let req = PowerRequests::new();
        req.raise(PowerRequest::SilenceWakeup);
        req.restore(PendingRequests::NONE.with(PowerRequest::Wakeup));
        let pending = req.take_all();
        assert!(pending.contains(PowerRequest::Wakeup));
        assert!(pending.contains(PowerRequest::SilenceWakeup));
    }

    #[test]
    fn test_without_removes_only_one() {
        let p = PendingRequests::NONE
            .with(PowerRequest::Wakeup)
            .with(PowerRequest::Standby)
            .without(PowerRequest::Standby);
        assert!(p.contains(PowerRequest::Wakeup));
        assert!(!p.contains(PowerRequest::Standby));
    }
}
