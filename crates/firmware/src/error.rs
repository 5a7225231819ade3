//! Firmware error types

use power::RegistryError;

use crate::config::ConfigError;

/// Errors surfaced while bringing the watch up or changing settings.
///
/// Driver errors are reduced to the device and operation that failed; the
/// driver's own error value stays inside the adapter that logged it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareError {
    /// A peripheral driver call failed.
    Hardware {
        /// Peripheral name
        device: &'static str,
        /// Operation that failed
        op: &'static str,
    },
    /// Listener registration failed.
    Registry(RegistryError),
    /// Settings storage failed.
    Config(ConfigError),
}

impl FirmwareError {
    /// Shorthand for [`FirmwareError::Hardware`].
    pub const fn hardware(device: &'static str, op: &'static str) -> Self {
        Self::Hardware { device, op }
    }

    /// Stable name for log lines and [`power::halt`].
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Hardware { op, .. } => op,
            Self::Registry(e) => e.as_str(),
            Self::Config(e) => e.as_str(),
        }
    }
}

impl From<RegistryError> for FirmwareError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<ConfigError> for FirmwareError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl core::fmt::Display for FirmwareError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hardware { device, op } => write!(f, "Hardware error: {device} {op}"),
            Self::Registry(e) => write!(f, "{e}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FirmwareError {}
