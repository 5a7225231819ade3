//! Motion sensor abstraction
//!
//! The watch uses a wrist-worn accelerometer with on-chip step counting and
//! gesture detection. All three features share one interrupt line; the
//! firmware reads [`InterruptStatus`] to find out which one fired.

use crate::display::Rotation;

/// On-chip motion features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionFeature {
    /// Pedometer
    StepCounter,
    /// Double tap on the case (wakeup gesture)
    DoubleClick,
    /// Wrist tilt towards the face
    Tilt,
}

/// Latched interrupt causes, cleared by reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Double tap detected
    pub double_click: bool,
    /// Tilt gesture detected
    pub tilt: bool,
    /// Step counter advanced past its watermark
    pub step_counter: bool,
}

impl InterruptStatus {
    /// `true` if nothing fired.
    pub fn is_empty(&self) -> bool {
        !(self.double_click || self.tilt || self.step_counter)
    }
}

/// Sensor axis remapping so gestures follow the screen rotation.
///
/// Axis indices are 0 = X, 1 = Y, 2 = Z; a `true` sign keeps the axis
/// direction, `false` inverts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxesRemap {
    /// Sensor axis reported as X
    pub x_axis: u8,
    /// X direction kept
    pub x_positive: bool,
    /// Sensor axis reported as Y
    pub y_axis: u8,
    /// Y direction kept
    pub y_positive: bool,
    /// Sensor axis reported as Z
    pub z_axis: u8,
    /// Z direction kept
    pub z_positive: bool,
}

impl AxesRemap {
    /// Remap table for a screen rotation.
    pub fn for_rotation(rotation: Rotation) -> Self {
        let (x_axis, x_positive, y_axis, y_positive) = match rotation {
            Rotation::Deg0 => (0, true, 1, true),
            Rotation::Deg90 => (1, true, 0, false),
            Rotation::Deg180 => (0, true, 1, false),
            Rotation::Deg270 => (1, true, 0, true),
        };
        Self {
            x_axis,
            x_positive,
            y_axis,
            y_positive,
            z_axis: 2,
            z_positive: true,
        }
    }
}

/// Accelerometer with step counter and gesture engine.
pub trait Accelerometer {
    /// Error type
    type Error: core::fmt::Debug;

    /// Load the feature firmware and configure the interrupt pin.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Read and clear the latched interrupt causes.
    fn read_interrupt_status(&mut self) -> Result<InterruptStatus, Self::Error>;

    /// Hardware step counter. Resets to zero on power loss.
    fn step_count(&mut self) -> Result<u32, Self::Error>;

    /// Zero the hardware step counter.
    fn reset_step_counter(&mut self) -> Result<(), Self::Error>;

    /// Enable or disable a feature engine.
    fn set_feature(&mut self, feature: MotionFeature, enabled: bool) -> Result<(), Self::Error>;

    /// Route or unroute a feature's interrupt to the INT pin.
    fn set_interrupt(&mut self, feature: MotionFeature, enabled: bool)
        -> Result<(), Self::Error>;

    /// Apply an axis remap.
    fn remap_axes(&mut self, remap: AxesRemap) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_empty() {
        assert!(InterruptStatus::default().is_empty());
        let s = InterruptStatus {
            tilt: true,
            ..InterruptStatus::default()
        };
        assert!(!s.is_empty());
    }

    #[test]
    fn test_remap_keeps_z_axis() {
        for r in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            let remap = AxesRemap::for_rotation(r);
            assert_eq!(remap.z_axis, 2);
            assert!(remap.z_positive);
            assert_ne!(remap.x_axis, remap.y_axis);
        }
    }

    #[test]
    fn test_remap_quarter_turn_swaps_axes() {
        let remap = AxesRemap::for_rotation(Rotation::Deg90);
        assert_eq!((remap.x_axis, remap.y_axis), (1, 0));
        assert!(!remap.y_positive);
    }
}
