//! Tile navigation: a bounded stack of [`Tile`]s with focus hooks.
//!
//! The stack is capped at [`NAV_DEPTH`] entries (embedded-safe, no heap).
//! Pushing when the stack is full is a silent no-op. Every operation that
//! moves the focus returns a [`FocusChange`]; dispatching it calls
//! `hibernate` on the tile losing focus, then `activate` on the tile
//! gaining it.

use heapless::Vec;

use crate::tile::Tile;

/// Maximum navigation depth, root included.
pub const NAV_DEPTH: usize = 8;

/// Per-tile focus callbacks, implemented by whoever owns the tile widgets.
pub trait TileHooks {
    /// `tile` gained focus.
    fn activate(&mut self, tile: Tile);
    /// `tile` lost focus.
    fn hibernate(&mut self, tile: Tile);
}

/// Focus moved from one tile to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// Tile that lost focus.
    pub left: Tile,
    /// Tile that gained focus.
    pub entered: Tile,
}

impl FocusChange {
    /// Run the hooks: hibernate first, then activate.
    pub fn dispatch(self, hooks: &mut impl TileHooks) {
        hooks.hibernate(self.left);
        hooks.activate(self.entered);
    }
}

/// Navigation stack bounded at [`NAV_DEPTH`] entries, rooted at the main tile.
pub struct Navigator {
    stack: Vec<Tile, NAV_DEPTH>,
    block_return_maintile: bool,
}

impl Navigator {
    /// Create a new navigator showing the main tile.
    pub fn new() -> Self {
        let mut stack = Vec::new();
        // This push always succeeds: the stack starts empty.
        stack.push(Tile::Main).ok();
        Navigator {
            stack,
            block_return_maintile: false,
        }
    }

    /// Return the tile currently in focus.
    #[must_use]
    pub fn current(&self) -> Tile {
        match self.stack.last() {
            Some(t) => *t,
            None => Tile::Main, // unreachable by construction
        }
    }

    /// Return the number of entries currently on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Open `tile` on top of the current one.
    pub fn push(&mut self, tile: Tile) -> Option<FocusChange> {
        let left = self.current();
        if left == tile || self.stack.push(tile).is_err() {
            return None;
        }
        Some(FocusChange { left, entered: tile })
    }

    /// Close the top tile. Does nothing on the main tile.
    pub fn back(&mut self) -> Option<FocusChange> {
        if self.stack.len() <= 1 {
            return None;
        }
        let left = self.stack.pop()?;
        Some(FocusChange {
            left,
            entered: self.current(),
        })
    }

    /// Drop everything above the main tile.
    pub fn jump_main(&mut self) -> Option<FocusChange> {
        let left = self.current();
        self.stack.truncate(1);
        (left != Tile::Main).then_some(FocusChange {
            left,
            entered: Tile::Main,
        })
    }

    /// Keep the current tile across wakeups instead of returning to main.
    pub fn set_block_return_maintile(&mut self, block: bool) {
        self.block_return_maintile = block;
    }

    /// Whether wakeups keep the current tile.
    #[must_use]
    pub fn block_return_maintile(&self) -> bool {
        self.block_return_maintile
    }

    /// The watch woke up: return to the main tile unless blocked.
    pub fn on_wakeup(&mut self) -> Option<FocusChange> {
        if self.block_return_maintile {
            return None;
        }
        self.jump_main()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
