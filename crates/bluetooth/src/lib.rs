//! Bluetooth subsystem for the wristwatch firmware.
//!
//! The BLE stack runs in its own context (radio task or interrupt) and must
//! not call into the main loop's registries. It posts
//! [`BluetoothEvent`]s into a bounded [`Inbox`]; the [`Bluetooth`] adapter
//! drains one per loop tick, updates the [`BluetoothState`] and forwards the
//! event on its own registry. Incoming messages wake the watch.
//!
//! This crate is `no_std`; it only uses `core`, `heapless` and
//! `embassy-sync`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod adapter;
pub mod event;
pub mod state;

pub use adapter::{Bluetooth, Inbox, BLUETOOTH_LISTENERS, INBOX_DEPTH};
pub use event::{BluetoothEvent, Message, MESSAGE_LEN};
pub use state::BluetoothState;
