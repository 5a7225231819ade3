//! Board description
//!
//! A [`Board`] names the concrete driver types of one hardware revision (or
//! of the simulator). Firmware code is generic over `B: Board` instead of
//! over each peripheral separately.

use crate::display::DisplayPanel;
use crate::gpio::InterruptLine;
use crate::motion::Accelerometer;
use crate::rtc::RtcClock;
use crate::storage::ConfigStore;

/// Driver types of one board.
pub trait Board {
    /// LCD panel and backlight
    type Panel: DisplayPanel;
    /// Motion sensor
    type Accel: Accelerometer;
    /// Motion sensor INT line
    type AccelIrq: InterruptLine;
    /// Real-time clock
    type Rtc: RtcClock;
    /// RTC INT line
    type RtcIrq: InterruptLine;
    /// Settings storage
    type Store: ConfigStore;
}

/// Owned driver instances of a board, handed out once at boot.
pub struct Peripherals<B: Board> {
    /// LCD panel and backlight
    pub panel: B::Panel,
    /// Motion sensor
    pub accel: B::Accel,
    /// Motion sensor INT line
    pub accel_irq: B::AccelIrq,
    /// Real-time clock
    pub rtc: B::Rtc,
    /// RTC INT line
    pub rtc_irq: B::RtcIrq,
    /// Settings storage
    pub store: B::Store,
}
