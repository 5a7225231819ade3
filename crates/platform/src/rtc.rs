//! Real-time clock abstraction
//!
//! The RTC keeps UTC. Its alarm compares hour, minute and day-of-month
//! only, so the firmware converts a local-time alarm into those three UTC
//! fields before programming it.

/// Alarm compare registers, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRegisters {
    /// Hour, 0..=23
    pub hour: u8,
    /// Minute, 0..=59
    pub minute: u8,
    /// Day of month, 1..=31
    pub day: u8,
}

/// Battery-backed real-time clock with one alarm.
pub trait RtcClock {
    /// Error type
    type Error: core::fmt::Debug;

    /// Current time, Unix seconds UTC.
    fn now(&mut self) -> Result<i64, Self::Error>;

    /// Program the alarm registers. `None` clears them.
    fn set_alarm(&mut self, alarm: Option<AlarmRegisters>) -> Result<(), Self::Error>;

    /// Gate the alarm interrupt output.
    fn enable_alarm(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Stop the countdown timer. Leftover timer interrupts share the INT
    /// line with the alarm.
    fn disable_timer(&mut self) -> Result<(), Self::Error>;

    /// Stop the clock-out square wave.
    fn disable_clock_out(&mut self) -> Result<(), Self::Error>;
}
