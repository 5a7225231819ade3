//! Bluetooth notifications.

use power::{Event, EventMask};

/// Longest message payload kept from the phone. Longer messages are cut.
pub const MESSAGE_LEN: usize = 128;

/// Message payload as received from the phone.
pub type Message = heapless::Vec<u8, MESSAGE_LEN>;

/// Connection and message notifications from the BLE stack.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BluetoothEvent {
    /// A peer connected.
    Connected([u8; 6]),
    /// The peer disconnected.
    Disconnected,
    /// The phone sent a message.
    Message(Message),
}

impl BluetoothEvent {
    /// CONNECTED bit.
    pub const CONNECTED: EventMask = EventMask::bit(0);
    /// DISCONNECTED bit.
    pub const DISCONNECTED: EventMask = EventMask::bit(1);
    /// MESSAGE bit.
    pub const MESSAGE: EventMask = EventMask::bit(2);

    /// Build a message event, keeping the first [`MESSAGE_LEN`] bytes.
    pub fn message(bytes: &[u8]) -> Self {
        let kept = bytes.get(..MESSAGE_LEN).unwrap_or(bytes);
        let mut payload = Message::new();
        // Cannot fail: `kept` is at most MESSAGE_LEN bytes.
        let _ = payload.extend_from_slice(kept);
        Self::Message(payload)
    }
}

impl Event for BluetoothEvent {
    fn mask(&self) -> EventMask {
        match self {
            Self::Connected(_) => Self::CONNECTED,
            Self::Disconnected => Self::DISCONNECTED,
            Self::Message(_) => Self::MESSAGE,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Connected(_) => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
            Self::Message(_) => "MESSAGE",
        }
    }
}

// Device builds log both types through defmt.
#[cfg(feature = "defmt")]
const _: fn() = || {
    fn loggable<T: defmt::Format>() {}
    loggable::<BluetoothEvent>();
    loggable::<crate::BluetoothState>();
};
