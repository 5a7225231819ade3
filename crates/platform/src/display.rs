//! Display abstraction layer

/// LCD panel with a PWM backlight.
///
/// The backlight level and the backlight power switch are separate: a level
/// of zero still leaves the LED driver powered, which is how the firmware
/// fades out before cutting power in standby.
pub trait DisplayPanel {
    /// Error type for panel operations
    type Error: core::fmt::Debug;

    /// Set backlight PWM duty, 0 (dark) to 255 (full).
    fn set_backlight(&mut self, level: u8) -> Result<(), Self::Error>;

    /// Switch the backlight LED driver on or off.
    fn backlight_power(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Put the panel controller into sleep mode.
    fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Wake the panel controller.
    fn wake(&mut self) -> Result<(), Self::Error>;

    /// Rotate the scan direction.
    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error>;
}

/// Screen rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// Upright
    #[default]
    Deg0,
    /// 90° clockwise
    Deg90,
    /// Upside down
    Deg180,
    /// 270° clockwise
    Deg270,
}

impl Rotation {
    /// Map degrees to a rotation. Only exact multiples of 90 below 360 are
    /// accepted.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Number of clockwise quarter turns, 0..=3.
    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }
}
