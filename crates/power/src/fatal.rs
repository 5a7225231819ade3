//! Unrecoverable boot failures.
//!
//! There is no allocator to fall back on and no supervisor to restart a
//! subsystem, so a registry that cannot take its boot-time listeners leaves
//! the firmware in an undefined wiring. The watchdog (or the user) resets
//! the device; until then the core parks here.

/// Log `reason` and spin forever.
pub fn halt(reason: &str) -> ! {
    crate::error!("halt: {}", reason);
    loop {
        core::hint::spin_loop();
    }
}
