//! Interrupt-to-loop handoff flag.
//!
//! An ISR must not call into a [`Registry`](crate::Registry): handlers may
//! touch buses, log, or take locks. Instead the ISR raises an [`IrqFlag`]
//! and the owning subsystem's loop callback takes it on the next tick.
//!
//! ```text
//!   ISR:  flag.raise()                       (bounded, cannot fail)
//!   loop: if flag.take() { read status... }  (copy + clear atomically)
//! ```
//!
//! Any number of raises between two takes collapse into one `true`, which
//! is the contract edge-triggered hardware needs: a raise that lands after
//! `take` returned is never lost, it is seen on the following tick.

use core::sync::atomic::{AtomicBool, Ordering};

/// A single pending-interrupt bit shared between one ISR and the main loop.
///
/// Usually declared as a `static` next to the ISR:
///
/// ```
/// use power::IrqFlag;
///
/// static MOTION_IRQ: IrqFlag = IrqFlag::new();
///
/// fn motion_isr() {
///     MOTION_IRQ.raise();
/// }
/// # motion_isr();
/// assert!(MOTION_IRQ.take());
/// assert!(!MOTION_IRQ.take());
/// ```
pub struct IrqFlag {
    pending: AtomicBool,
}

impl IrqFlag {
    /// A cleared flag. `const` so it can back a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Mark the interrupt as pending. Safe to call from interrupt context.
    #[inline]
    pub fn raise(&self) {
        critical_section::with(|_| self.pending.store(true, Ordering::Release));
    }

    /// Return whether the interrupt fired since the last call, clearing it.
    ///
    /// Load and clear happen inside one critical section so a concurrent
    /// `raise` lands either before (and is returned now) or after (and is
    /// returned next time). Targets without atomic swap are fine: only
    /// plain loads and stores are used.
    pub fn take(&self) -> bool {
        critical_section::with(|_| {
            let pending = self.pending.load(Ordering::Acquire);
            if pending {
                self.pending.store(false, Ordering::Release);
            }
            pending
        })
    }

    /// Peek without clearing.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for IrqFlag {
    fn default() -> Self {
        Self::new()
    }
}
