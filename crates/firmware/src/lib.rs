//! Wristwatch firmware: subsystem adapters and the watch context.
//!
//! # Architecture
//!
//! ```text
//! Watch (watch.rs)          boot order, main-loop tick
//!         ↓
//! Subsystem adapters        display · motion · rtc · bluetooth · gui
//!         ↓
//! power crate               registries, IRQ flags, power state machine
//!         ↓
//! platform crate            driver traits (real board or mocks)
//! ```
//!
//! Subsystems never call each other. They talk through the power manager's
//! STANDBY / WAKEUP / SILENCE_WAKEUP broadcasts and through each other's
//! registries, wired once in [`Watch::new`].
//!
//! # Features
//!
//! - `emulator` - desktop simulator binary (`watch-sim`): mock board, tokio
//!   timer loop, tracing output
//! - `std` - Enable standard library (for emulator and testing)
//! - `defmt` / `tracing` - log backend, see the `power` crate

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod alarm;
pub mod config;
pub mod display;
pub mod error;
pub mod gui;
pub mod irq;
pub mod motion;
pub mod rtc;
pub mod watch;

pub use config::{AlarmRecord, ConfigError, DisplayConfig, MotionConfig};
pub use display::{Display, DisplayEvent};
pub use error::FirmwareError;
pub use gui::Gui;
pub use motion::{Motion, MotionEvent, RetainedSteps};
pub use rtc::{Rtc, RtcEvent};
pub use watch::{split, Drivers, Subsystems, Watch, Wiring, INIT_ORDER};
