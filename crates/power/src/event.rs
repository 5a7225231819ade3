//! Event bitmasks.
//!
//! Every event kind owns exactly one bit. Listeners subscribe with a mask
//! that may cover several kinds; delivery tests `listener_mask & event_bit`.

use core::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of event bits. At most 32 kinds per event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventMask(u32);

impl EventMask {
    /// No bits set.
    pub const EMPTY: Self = Self(0);
    /// Every bit set.
    pub const ALL: Self = Self(u32::MAX);

    /// Mask with the single bit `n` set. `n` is taken modulo 32.
    #[must_use]
    pub const fn bit(n: u32) -> Self {
        Self(1u32.wrapping_shl(n))
    }

    /// Construct from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Union of two masks, usable in `const` items.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `true` if the masks share at least one bit.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// `true` if every bit of `other` is also in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for EventMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// An event that can travel through a [`Registry`](crate::Registry).
pub trait Event {
    /// The single bit identifying this event's kind.
    fn mask(&self) -> EventMask;

    /// Stable name for log lines.
    fn as_str(&self) -> &'static str;
}
