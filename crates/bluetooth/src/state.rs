//! Bluetooth connection state tracker.

/// Tracks whether a BLE peer is connected, its address, and whether the
/// radio should sit in low-power advertising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BluetoothState {
    peer_address: Option<[u8; 6]>,
    low_power: bool,
}

impl BluetoothState {
    /// Create a new, disconnected, full-power state.
    pub const fn new() -> Self {
        BluetoothState {
            peer_address: None,
            low_power: false,
        }
    }

    /// Record a successful connection from `address`.
    pub fn on_connected(&mut self, address: [u8; 6]) {
        self.peer_address = Some(address);
    }

    /// Record that the peer has disconnected.
    pub fn on_disconnected(&mut self) {
        self.peer_address = None;
    }

    /// Switch between low-power and normal advertising.
    pub fn set_low_power(&mut self, low_power: bool) {
        self.low_power = low_power;
    }

    /// Returns `true` if a peer is currently connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.peer_address.is_some()
    }

    /// Returns the peer's 6-byte Bluetooth address, or `None` when disconnected.
    #[must_use]
    pub fn peer_address(&self) -> Option<[u8; 6]> {
        self.peer_address
    }

    /// Returns `true` while the watch is in standby and the radio should
    /// advertise at its slowest interval.
    #[must_use]
    pub fn low_power(&self) -> bool {
        self.low_power
    }
}
