//! Hardware Abstraction Layer (HAL) for the wristwatch firmware
//!
//! This crate provides trait-based abstractions for the watch peripherals,
//! enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: adapters, watch context)
//!         ↓
//! Feature Layers (power, bluetooth, ui)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Board support (sensor / RTC / panel drivers)
//! ```
//!
//! # Peripherals
//!
//! - [`DisplayPanel`] - LCD panel and backlight
//! - [`Accelerometer`] - motion sensor: step counter, double tap, tilt
//! - [`RtcClock`] - wall clock and alarm registers
//! - [`InterruptLine`] - GPIO interrupt / wake line of a peripheral
//! - [`ConfigStore`] - key/value settings storage
//!
//! All traits are synchronous: the firmware runs one cooperative main loop
//! and ISRs never call into drivers.
//!
//! # Features
//!
//! - `std`: Enable the [`mocks`] module outside of this crate's tests
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```
//! use platform::{DisplayPanel, Rotation};
//!
//! fn blank<P: DisplayPanel>(panel: &mut P) -> Result<(), P::Error> {
//!     panel.set_backlight(0)?;
//!     panel.sleep()
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod board;
pub mod config;
pub mod display;
pub mod gpio;
pub mod motion;
pub mod rtc;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use board::{Board, Peripherals};
pub use display::{DisplayPanel, Rotation};
pub use gpio::{InterruptLine, InterruptMode, PinState, WakeLevel};
pub use motion::{Accelerometer, AxesRemap, InterruptStatus, MotionFeature};
pub use rtc::{AlarmRegisters, RtcClock};
pub use storage::ConfigStore;
