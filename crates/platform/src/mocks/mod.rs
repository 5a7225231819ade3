//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests and in the desktop simulator.
//! Every mock records the writes it receives so tests can assert on the
//! exact hardware sequence, and can be switched into a failing mode.

#![cfg(any(test, feature = "std"))]

use crate::*;

/// Maximum number of operations a mock remembers. Later ones are dropped.
pub const OP_LOG_CAPACITY: usize = 256;

/// Error returned by a mock switched into failing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MockError {
    /// Simulated bus failure
    Bus,
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Mock bus error")
    }
}

impl embedded_hal::digital::Error for MockError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

fn record<T, const N: usize>(log: &mut heapless::Vec<T, N>, op: T) {
    // Full log: drop silently, like a ring that stopped recording.
    let _ = log.push(op);
}

// ---------------------------------------------------------------------------
// Display panel
// ---------------------------------------------------------------------------

/// Operations received by [`MockPanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOp {
    /// `set_backlight(level)`
    Backlight(u8),
    /// `backlight_power(on)`
    BacklightPower(bool),
    /// `sleep()`
    Sleep,
    /// `wake()`
    Wake,
    /// `set_rotation(r)`
    Rotate(Rotation),
}

/// Mock LCD panel
pub struct MockPanel {
    backlight: u8,
    backlight_on: bool,
    asleep: bool,
    rotation: Rotation,
    failing: bool,
    ops: heapless::Vec<PanelOp, OP_LOG_CAPACITY>,
}

impl MockPanel {
    /// Create an awake panel with the backlight powered at level 0.
    pub fn new() -> Self {
        Self {
            backlight: 0,
            backlight_on: true,
            asleep: false,
            rotation: Rotation::Deg0,
            failing: false,
            ops: heapless::Vec::new(),
        }
    }

    /// Current PWM level
    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    /// Backlight driver powered
    pub fn backlight_on(&self) -> bool {
        self.backlight_on
    }

    /// Panel controller asleep
    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Current rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> &[PanelOp] {
        &self.ops
    }

    /// Forget recorded operations
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Make every following call fail with [`MockError::Bus`]
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<(), MockError> {
        if self.failing {
            Err(MockError::Bus)
        } else {
            Ok(())
        }
    }
}

impl Default for MockPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPanel for MockPanel {
    type Error = MockError;

    fn set_backlight(&mut self, level: u8) -> Result<(), Self::Error> {
        self.check()?;
        self.backlight = level;
        record(&mut self.ops, PanelOp::Backlight(level));
        Ok(())
    }

    fn backlight_power(&mut self, on: bool) -> Result<(), Self::Error> {
        self.check()?;
        self.backlight_on = on;
        record(&mut self.ops, PanelOp::BacklightPower(on));
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.asleep = true;
        record(&mut self.ops, PanelOp::Sleep);
        Ok(())
    }

    fn wake(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.asleep = false;
        record(&mut self.ops, PanelOp::Wake);
        Ok(())
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Self::Error> {
        self.check()?;
        self.rotation = rotation;
        record(&mut self.ops, PanelOp::Rotate(rotation));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Motion sensor
// ---------------------------------------------------------------------------

/// Operations received by [`MockAccelerometer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelOp {
    /// `init()`
    Init,
    /// `reset_step_counter()`
    ResetSteps,
    /// `set_feature(feature, enabled)`
    Feature(MotionFeature, bool),
    /// `set_interrupt(feature, enabled)`
    Interrupt(MotionFeature, bool),
    /// `remap_axes(remap)`
    Remap(AxesRemap),
}

/// Mock accelerometer with injectable interrupts and step count
pub struct MockAccelerometer {
    pending: InterruptStatus,
    steps: u32,
    features: [bool; 3],
    interrupts: [bool; 3],
    remap: Option<AxesRemap>,
    status_reads: usize,
    failing: bool,
    ops: heapless::Vec<AccelOp, OP_LOG_CAPACITY>,
}

fn feature_slot(feature: MotionFeature) -> usize {
    match feature {
        MotionFeature::StepCounter => 0,
        MotionFeature::DoubleClick => 1,
        MotionFeature::Tilt => 2,
    }
}

impl MockAccelerometer {
    /// Create a sensor with no features enabled and a zero step count.
    pub fn new() -> Self {
        Self {
            pending: InterruptStatus::default(),
            steps: 0,
            features: [false; 3],
            interrupts: [false; 3],
            remap: None,
            status_reads: 0,
            failing: false,
            ops: heapless::Vec::new(),
        }
    }

    /// Latch interrupt causes, as the sensor would before pulling INT.
    pub fn trigger(&mut self, status: InterruptStatus) {
        self.pending.double_click |= status.double_click;
        self.pending.tilt |= status.tilt;
        self.pending.step_counter |= status.step_counter;
    }

    /// Set the hardware step counter.
    pub fn set_steps(&mut self, steps: u32) {
        self.steps = steps;
    }

    /// Feature engine enabled
    pub fn feature_enabled(&self, feature: MotionFeature) -> bool {
        self.features.get(feature_slot(feature)).copied().unwrap_or(false)
    }

    /// Feature interrupt routed to INT
    pub fn interrupt_enabled(&self, feature: MotionFeature) -> bool {
        self.interrupts.get(feature_slot(feature)).copied().unwrap_or(false)
    }

    /// Last applied axis remap
    pub fn remap(&self) -> Option<AxesRemap> {
        self.remap
    }

    /// Number of interrupt-status reads
    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> &[AccelOp] {
        &self.ops
    }

    /// Forget recorded operations
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Make every following call fail with [`MockError::Bus`]
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<(), MockError> {
        if self.failing {
            Err(MockError::Bus)
        } else {
            Ok(())
        }
    }
}

impl Default for MockAccelerometer {
    fn default() -> Self {
        Self::new()
    }
}

impl Accelerometer for MockAccelerometer {
    type Error = MockError;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        record(&mut self.ops, AccelOp::Init);
        Ok(())
    }

    fn read_interrupt_status(&mut self) -> Result<InterruptStatus, Self::Error> {
        self.check()?;
        self.status_reads = self.status_reads.saturating_add(1);
        Ok(core::mem::take(&mut self.pending))
    }

    fn step_count(&mut self) -> Result<u32, Self::Error> {
        self.check()?;
        Ok(self.steps)
    }

    fn reset_step_counter(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.steps = 0;
        record(&mut self.ops, AccelOp::ResetSteps);
        Ok(())
    }

    fn set_feature(&mut self, feature: MotionFeature, enabled: bool) -> Result<(), Self::Error> {
        self.check()?;
        if let Some(slot) = self.features.get_mut(feature_slot(feature)) {
            *slot = enabled;
        }
        record(&mut self.ops, AccelOp::Feature(feature, enabled));
        Ok(())
    }

    fn set_interrupt(&mut self, feature: MotionFeature, enabled: bool) -> Result<(), Self::Error> {
        self.check()?;
        if let Some(slot) = self.interrupts.get_mut(feature_slot(feature)) {
            *slot = enabled;
        }
        record(&mut self.ops, AccelOp::Interrupt(feature, enabled));
        Ok(())
    }

    fn remap_axes(&mut self, remap: AxesRemap) -> Result<(), Self::Error> {
        self.check()?;
        self.remap = Some(remap);
        record(&mut self.ops, AccelOp::Remap(remap));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Interrupt line
// ---------------------------------------------------------------------------

/// Operations received by [`MockInterruptLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    /// `attach(mode)`
    Attach(InterruptMode),
    /// `detach()`
    Detach,
    /// `enable_wakeup(level)`
    EnableWakeup(WakeLevel),
    /// `disable_wakeup()`
    DisableWakeup,
}

/// Mock GPIO interrupt line
pub struct MockInterruptLine {
    attached: Option<InterruptMode>,
    wakeup: Option<WakeLevel>,
    failing: bool,
    ops: heapless::Vec<LineOp, OP_LOG_CAPACITY>,
}

impl MockInterruptLine {
    /// Create a detached line with no wake source armed.
    pub fn new() -> Self {
        Self {
            attached: None,
            wakeup: None,
            failing: false,
            ops: heapless::Vec::new(),
        }
    }

    /// Attached interrupt mode
    pub fn attached(&self) -> Option<InterruptMode> {
        self.attached
    }

    /// Armed wake level
    pub fn wakeup(&self) -> Option<WakeLevel> {
        self.wakeup
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> &[LineOp] {
        &self.ops
    }

    /// Forget recorded operations
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Make every following call fail with [`MockError::Bus`]
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<(), MockError> {
        if self.failing {
            Err(MockError::Bus)
        } else {
            Ok(())
        }
    }
}

impl Default for MockInterruptLine {
    fn default() -> Self {
        Self::new()
    }
}

impl embedded_hal::digital::ErrorType for MockInterruptLine {
    type Error = MockError;
}

impl InterruptLine for MockInterruptLine {
    fn attach(&mut self, mode: InterruptMode) -> Result<(), Self::Error> {
        self.check()?;
        self.attached = Some(mode);
        record(&mut self.ops, LineOp::Attach(mode));
        Ok(())
    }

    fn detach(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.attached = None;
        record(&mut self.ops, LineOp::Detach);
        Ok(())
    }

    fn enable_wakeup(&mut self, level: WakeLevel) -> Result<(), Self::Error> {
        self.check()?;
        self.wakeup = Some(level);
        record(&mut self.ops, LineOp::EnableWakeup(level));
        Ok(())
    }

    fn disable_wakeup(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.wakeup = None;
        record(&mut self.ops, LineOp::DisableWakeup);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RTC
// ---------------------------------------------------------------------------

/// Operations received by [`MockRtc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcOp {
    /// `set_alarm(alarm)`
    SetAlarm(Option<AlarmRegisters>),
    /// `enable_alarm(enabled)`
    EnableAlarm(bool),
    /// `disable_timer()`
    DisableTimer,
    /// `disable_clock_out()`
    DisableClockOut,
}

/// Mock real-time clock with a settable time
pub struct MockRtc {
    now: i64,
    alarm: Option<AlarmRegisters>,
    alarm_enabled: bool,
    failing: bool,
    ops: heapless::Vec<RtcOp, OP_LOG_CAPACITY>,
}

impl MockRtc {
    /// Create a clock reading `now` (Unix seconds UTC).
    pub fn new(now: i64) -> Self {
        Self {
            now,
            alarm: None,
            alarm_enabled: false,
            failing: false,
            ops: heapless::Vec::new(),
        }
    }

    /// Set the current time.
    pub fn set_now(&mut self, now: i64) {
        self.now = now;
    }

    /// Move the clock forward.
    pub fn advance(&mut self, seconds: i64) {
        self.now = self.now.saturating_add(seconds);
    }

    /// Programmed alarm registers
    pub fn alarm(&self) -> Option<AlarmRegisters> {
        self.alarm
    }

    /// Alarm interrupt gated on
    pub fn alarm_enabled(&self) -> bool {
        self.alarm_enabled
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> &[RtcOp] {
        &self.ops
    }

    /// Forget recorded operations
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Make every following call fail with [`MockError::Bus`]
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<(), MockError> {
        if self.failing {
            Err(MockError::Bus)
        } else {
            Ok(())
        }
    }
}

impl RtcClock for MockRtc {
    type Error = MockError;

    fn now(&mut self) -> Result<i64, Self::Error> {
        self.check()?;
        Ok(self.now)
    }

    fn set_alarm(&mut self, alarm: Option<AlarmRegisters>) -> Result<(), Self::Error> {
        self.check()?;
        self.alarm = alarm;
        record(&mut self.ops, RtcOp::SetAlarm(alarm));
        Ok(())
    }

    fn enable_alarm(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.check()?;
        self.alarm_enabled = enabled;
        record(&mut self.ops, RtcOp::EnableAlarm(enabled));
        Ok(())
    }

    fn disable_timer(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        record(&mut self.ops, RtcOp::DisableTimer);
        Ok(())
    }

    fn disable_clock_out(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        record(&mut self.ops, RtcOp::DisableClockOut);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Settings store
// ---------------------------------------------------------------------------

/// Maximum key length of [`MemoryStore`]
pub const STORE_KEY_LEN: usize = 16;
/// Maximum record length of [`MemoryStore`]
pub const STORE_RECORD_LEN: usize = 128;
/// Maximum number of records of [`MemoryStore`]
pub const STORE_RECORDS: usize = 8;

struct Entry {
    key: heapless::String<STORE_KEY_LEN>,
    data: heapless::Vec<u8, STORE_RECORD_LEN>,
}

/// RAM-backed settings store
pub struct MemoryStore {
    entries: heapless::Vec<Entry, STORE_RECORDS>,
    writes: usize,
    failing: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
            writes: 0,
            failing: false,
        }
    }

    /// Stored bytes for `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.key.as_str() == key)
            .map(|e| e.data.as_slice())
    }

    /// Flip every bit of the last stored byte of `key`.
    pub fn corrupt(&mut self, key: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key.as_str() == key) {
            if let Some(last) = entry.data.last_mut() {
                *last = !*last;
            }
        }
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Make every following call fail with [`MockError::Bus`]
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemoryStore {
    type Error = MockError;

    fn read(&mut self, key: &str, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        if self.failing {
            return Err(MockError::Bus);
        }
        let Some(data) = self.get(key) else {
            return Ok(None);
        };
        let dest = buf.get_mut(..data.len()).ok_or(MockError::Bus)?;
        dest.copy_from_slice(data);
        Ok(Some(data.len()))
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error> {
        if self.failing {
            return Err(MockError::Bus);
        }
        let mut bytes = heapless::Vec::new();
        if bytes.extend_from_slice(data).is_err() {
            return Err(MockError::Bus);
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key.as_str() == key) {
            entry.data = bytes;
        } else {
            let mut name = heapless::String::new();
            if name.push_str(key).is_err() {
                return Err(MockError::Bus);
            }
            if self.entries.push(Entry { key: name, data: bytes }).is_err() {
                return Err(MockError::Bus);
            }
        }
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Board made entirely of mocks
pub struct MockBoard;

impl Board for MockBoard {
    type Panel = MockPanel;
    type Accel = MockAccelerometer;
    type AccelIrq = MockInterruptLine;
    type Rtc = MockRtc;
    type RtcIrq = MockInterruptLine;
    type Store = MemoryStore;
}

impl MockBoard {
    /// Fresh mock peripherals with the clock at `now`.
    pub fn peripherals(now: i64) -> Peripherals<MockBoard> {
        Peripherals {
            panel: MockPanel::new(),
            accel: MockAccelerometer::new(),
            accel_irq: MockInterruptLine::new(),
            rtc: MockRtc::new(now),
            rtc_irq: MockInterruptLine::new(),
            store: MemoryStore::new(),
        }
    }
}
