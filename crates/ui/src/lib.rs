//! Watch UI models: tiles, tile navigation, main tile content.
//!
//! No rendering lives here. The firmware feeds subsystem events into these
//! models and a renderer draws whatever they hold.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod main_tile;
pub mod navigation;
pub mod tile;

pub use main_tile::MainTile;
pub use navigation::{FocusChange, Navigator, TileHooks, NAV_DEPTH};
pub use tile::Tile;
