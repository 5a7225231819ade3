//! Persisted settings and build-time constants
//!
//! Each settings record is a small serde struct stored under a fixed key in
//! a [`ConfigStore`]. On flash a record is framed as
//!
//! ```text
//! +---------------------------+------------------+
//! | postcard payload (<= 92)  | CRC32 LE (4)     |
//! +---------------------------+------------------+
//! ```
//!
//! A record that fails the CRC, fails to decode, or violates its range rules
//! is rejected as a whole; callers keep whatever they had in memory.

use heapless::Vec;
use platform::ConfigStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Firmware name, shared with the platform crate.
pub const FIRMWARE_NAME: &str = platform::config::APP_NAME;

/// Firmware version (synchronized with Cargo.toml)
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Shortest display timeout in seconds.
pub const DISPLAY_MIN_TIMEOUT_S: u32 = 15;

/// Longest display timeout in seconds. This value means "never".
pub const DISPLAY_MAX_TIMEOUT_S: u32 = 300;

/// Backlight level after a fresh install.
pub const DISPLAY_DEFAULT_BRIGHTNESS: u8 = 128;

/// Backlight levels moved per WAKEUP loop tick while ramping.
pub const BRIGHTNESS_RAMP_STEP: u8 = 1;

/// Timeout dimming: one backlight level per this many idle milliseconds.
pub const DIM_MS_PER_LEVEL: u32 = 8;

// ---------------------------------------------------------------------------
// Motion constants
// ---------------------------------------------------------------------------

/// Marker stored next to the retained step counter. Any other value after a
/// reset means the counter RAM was lost.
pub const STEPCOUNTER_VALID: u32 = 0xA5A5_A5A5;

// ---------------------------------------------------------------------------
// Record framing
// ---------------------------------------------------------------------------

/// Largest encoded record payload.
pub const RECORD_PAYLOAD_LEN: usize = 92;

/// Length of the CRC32 trailer.
pub const CRC_LEN: usize = 4;

/// Buffer size holding one framed record.
pub const RECORD_BUF_LEN: usize = 96;

/// Settings storage errors. Every variant names the record key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Nothing stored under the key.
    NotFound {
        /// Record key
        key: &'static str,
    },
    /// CRC trailer does not match the payload.
    Corrupt {
        /// Record key
        key: &'static str,
    },
    /// Payload is not a valid record.
    Decode {
        /// Record key
        key: &'static str,
    },
    /// Record does not fit [`RECORD_PAYLOAD_LEN`].
    Encode {
        /// Record key
        key: &'static str,
    },
    /// The store reported an I/O error.
    Store {
        /// Record key
        key: &'static str,
    },
    /// A field is out of range.
    Invalid {
        /// Record key
        key: &'static str,
        /// Offending field
        field: &'static str,
    },
}

impl ConfigError {
    /// Record key the error refers to.
    pub fn key(&self) -> &'static str {
        match self {
            Self::NotFound { key }
            | Self::Corrupt { key }
            | Self::Decode { key }
            | Self::Encode { key }
            | Self::Store { key }
            | Self::Invalid { key, .. } => *key,
        }
    }

    /// Stable name for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not found",
            Self::Corrupt { .. } => "crc mismatch",
            Self::Decode { .. } => "decode failed",
            Self::Encode { .. } => "encode failed",
            Self::Store { .. } => "store error",
            Self::Invalid { .. } => "invalid field",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Invalid { key, field } => write!(f, "Config '{key}': invalid field '{field}'"),
            other => write!(f, "Config '{}': {}", other.key(), other.as_str()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// A settings record with a fixed storage key.
pub trait Record: Serialize + DeserializeOwned + Default {
    /// Storage key.
    const KEY: &'static str;

    /// Range rules. Returns the name of the first offending field.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Display settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Backlight level when awake.
    pub brightness: u8,
    /// Inactivity timeout in seconds; [`DISPLAY_MAX_TIMEOUT_S`] means never.
    pub timeout_s: u32,
    /// Panel rotation in degrees (0, 90, 180 or 270).
    pub rotation: u16,
    /// Stay on the current tile after wakeup instead of returning to the
    /// main tile.
    pub block_return_maintile: bool,
    /// Background image index.
    pub background_image: u8,
    /// Vibrate on touch.
    pub vibe: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness: DISPLAY_DEFAULT_BRIGHTNESS,
            timeout_s: DISPLAY_MIN_TIMEOUT_S,
            rotation: 0,
            block_return_maintile: false,
            background_image: 2,
            vibe: true,
        }
    }
}

impl Record for DisplayConfig {
    const KEY: &'static str = "display";

    fn validate(&self) -> Result<(), &'static str> {
        if !(DISPLAY_MIN_TIMEOUT_S..=DISPLAY_MAX_TIMEOUT_S).contains(&self.timeout_s) {
            return Err("timeout_s");
        }
        if platform::Rotation::from_degrees(self.rotation).is_none() {
            return Err("rotation");
        }
        Ok(())
    }
}

/// Motion sensor feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Step counter engine and its interrupt.
    pub stepcounter: bool,
    /// Double-tap detection (wakes the watch).
    pub doubleclick: bool,
    /// Wrist-tilt detection (wakes the watch).
    pub tilt: bool,
    /// Reset the step counter on the first wakeup of a new day.
    pub daily_stepcounter: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            stepcounter: true,
            doubleclick: true,
            tilt: true,
            daily_stepcounter: false,
        }
    }
}

impl Record for MotionConfig {
    const KEY: &'static str = "motion";
}

/// Alarm clock settings, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRecord {
    /// Alarm armed.
    pub enabled: bool,
    /// Hour, 0..24.
    pub hour: u8,
    /// Minute, 0..60.
    pub minute: u8,
    /// Selected weekdays, index 0 is Sunday. None selected means every day.
    pub week_days: [bool; 7],
}

impl AlarmRecord {
    /// Whether the alarm may ring on `weekday` (0 = Sunday).
    pub fn rings_on(&self, weekday: u32) -> bool {
        let any = self.week_days.iter().any(|d| *d);
        let day = usize::try_from(weekday)
            .ok()
            .and_then(|i| self.week_days.get(i))
            .copied()
            .unwrap_or(false);
        day || !any
    }
}

impl Record for AlarmRecord {
    const KEY: &'static str = "alarm";

    fn validate(&self) -> Result<(), &'static str> {
        if self.hour >= 24 {
            return Err("hour");
        }
        if self.minute >= 60 {
            return Err("minute");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// A framed record: postcard payload plus CRC32 trailer.
pub type Framed = Vec<u8, RECORD_BUF_LEN>;

/// Frame `record` for storage.
pub fn encode<R: Record>(record: &R) -> Result<Framed, ConfigError> {
    let key = R::KEY;
    let mut payload = [0u8; RECORD_PAYLOAD_LEN];
    let body = postcard::to_slice(record, &mut payload).map_err(|_| ConfigError::Encode { key })?;
    let crc = crc32fast::hash(body);

    let mut framed = Framed::new();
    framed
        .extend_from_slice(body)
        .map_err(|_| ConfigError::Encode { key })?;
    framed
        .extend_from_slice(&crc.to_le_bytes())
        .map_err(|_| ConfigError::Encode { key })?;
    Ok(framed)
}

/// Check the CRC trailer, decode and validate.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, ConfigError> {
    let key = R::KEY;
    let split = bytes
        .len()
        .checked_sub(CRC_LEN)
        .ok_or(ConfigError::Corrupt { key })?;
    let (payload, trailer) = bytes.split_at(split);
    let stored = <[u8; CRC_LEN]>::try_from(trailer).map_err(|_| ConfigError::Corrupt { key })?;
    if crc32fast::hash(payload) != u32::from_le_bytes(stored) {
        return Err(ConfigError::Corrupt { key });
    }
    let record: R = postcard::from_bytes(payload).map_err(|_| ConfigError::Decode { key })?;
    record
        .validate()
        .map_err(|field| ConfigError::Invalid { key, field })?;
    Ok(record)
}

/// Read one record from `store`.
pub fn load<R: Record, S: ConfigStore>(store: &mut S) -> Result<R, ConfigError> {
    let key = R::KEY;
    let mut buf = [0u8; RECORD_BUF_LEN];
    match store.read(key, &mut buf) {
        Ok(Some(len)) => decode(buf.get(..len).ok_or(ConfigError::Corrupt { key })?),
        Ok(None) => Err(ConfigError::NotFound { key }),
        Err(_) => Err(ConfigError::Store { key }),
    }
}

/// Read one record, falling back to its default on any error.
pub fn load_or_default<R: Record, S: ConfigStore>(store: &mut S) -> R {
    load(store).unwrap_or_else(|e| {
        power::warn!("config: {} {}, using defaults", e.key(), e.as_str());
        R::default()
    })
}

/// Validate and write one record to `store`.
pub fn save<R: Record, S: ConfigStore>(store: &mut S, record: &R) -> Result<(), ConfigError> {
    let key = R::KEY;
    record
        .validate()
        .map_err(|field| ConfigError::Invalid { key, field })?;
    let framed = encode(record)?;
    store.write(key, &framed).map_err(|_| ConfigError::Store { key })
}
