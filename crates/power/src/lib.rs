//! Power-management core for the wristwatch firmware.
//!
//! Everything in the firmware that cares about the power state (display,
//! motion sensor, RTC, radio, UI) talks to everything else through the
//! pieces in this crate instead of calling each other directly:
//!
//! ```text
//!  ISR context                 main loop (cooperative, single-threaded)
//!  ───────────                 ─────────────────────────────────────────
//!  IrqFlag::raise()  ──────▶  subsystem loop callback: IrqFlag::take()
//!  PowerRequests::raise() ──▶ PowerManager::tick()
//!                                   │ one transition at most
//!                                   ▼
//!                             Registry<PowerEvent>::send()  (STANDBY, WAKEUP, ...)
//!                             Registry<PowerLoop>::send()   (per-tick callbacks)
//! ```
//!
//! - [`Registry`]: bounded, ordered list of `(mask, handler, id)` listeners.
//!   Every subsystem owns one for its own events.
//! - [`IrqFlag`] / [`PowerRequests`]: interrupt-safe pending bits. ISRs only
//!   ever set bits; the main loop copies and clears them.
//! - [`PowerManager`]: the `ACTIVE / STANDBY / WAKEUP / SILENCE_WAKEUP`
//!   state machine that turns requests into broadcasts.
//!
//! # Logging
//!
//! The crate exports `trace!`, `debug!`, `info!`, `warn!` and `error!`.
//! They forward to `defmt` (feature `defmt`), to `tracing` (feature
//! `tracing`) or compile to nothing. Format strings must only use `{}`
//! placeholders so that both backends accept them.
//!
//! # Features
//!
//! - `defmt`: defmt log backend and `defmt::Format` derives
//! - `tracing`: tracing log backend (desktop simulator)
//! - `std`: host builds

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod log;

pub mod error;
pub mod event;
pub mod fatal;
pub mod irq;
pub mod manager;
pub mod registry;
pub mod request;
pub mod state;

pub use error::RegistryError;
pub use event::{Event, EventMask};
pub use fatal::halt;
pub use irq::IrqFlag;
pub use manager::{PowerManager, TickReport, POWER_LISTENERS};
pub use registry::{FnHandler, Handler, Registry};
pub use request::{PendingRequests, PowerRequest, PowerRequests};
pub use state::{PowerEvent, PowerLoop, PowerState, Tick};

#[doc(hidden)]
pub mod __log {
    #[cfg(feature = "defmt")]
    pub use defmt;
    #[cfg(feature = "tracing")]
    pub use tracing;
}
