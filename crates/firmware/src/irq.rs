//! Interrupt entry points
//!
//! The board's GPIO interrupt handlers call these functions and nothing
//! else. They only set flags; the main loop does the work on its next tick.
//! No logging here.

use bluetooth::Inbox;
use power::{IrqFlag, PowerRequest, PowerRequests};

/// Raised by the motion sensor INT line.
pub static MOTION_IRQ: IrqFlag = IrqFlag::new();

/// Raised by the RTC INT line.
pub static RTC_IRQ: IrqFlag = IrqFlag::new();

/// Pending power requests, drained by the power manager every tick.
pub static POWER_REQUESTS: PowerRequests = PowerRequests::new();

/// Notifications from the BLE stack, drained by the bluetooth adapter.
pub static BLE_INBOX: Inbox = Inbox::new();

/// Motion sensor INT rising edge.
pub fn on_motion_irq() {
    MOTION_IRQ.raise();
}

/// RTC INT falling edge.
pub fn on_rtc_irq() {
    RTC_IRQ.raise();
}

/// Power key short press.
pub fn on_power_button() {
    POWER_REQUESTS.raise(PowerRequest::PowerButton);
}
