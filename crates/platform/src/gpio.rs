//! GPIO interrupt lines
//!
//! Every watch peripheral that can wake the SoC (motion sensor, RTC, PMU)
//! reports through one GPIO line. Drivers only need to attach/detach the
//! edge interrupt and arm the line as a light-sleep wake source.

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

/// External interrupt configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptMode {
    /// Trigger on rising edge
    RisingEdge,
    /// Trigger on falling edge
    FallingEdge,
    /// Trigger on both edges
    BothEdges,
}

/// Level that wakes the SoC from light sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeLevel {
    /// Wake while the line is high (motion sensor INT1).
    High,
    /// Wake while the line is low (open-drain RTC INT).
    Low,
}

impl WakeLevel {
    /// The pin state that triggers the wake.
    pub fn pin_state(self) -> PinState {
        match self {
            Self::High => PinState::High,
            Self::Low => PinState::Low,
        }
    }
}

/// A peripheral's interrupt line.
///
/// Errors come from `embedded_hal::digital::ErrorType` so board crates can
/// reuse their HAL's pin error directly.
pub trait InterruptLine: embedded_hal::digital::ErrorType {
    /// Attach the edge interrupt. The ISR itself is wired by the board.
    fn attach(&mut self, mode: InterruptMode) -> Result<(), Self::Error>;

    /// Detach the edge interrupt.
    fn detach(&mut self) -> Result<(), Self::Error>;

    /// Arm the line as a light-sleep wake source.
    fn enable_wakeup(&mut self, level: WakeLevel) -> Result<(), Self::Error>;

    /// Disarm the light-sleep wake source.
    fn disable_wakeup(&mut self) -> Result<(), Self::Error>;
}
