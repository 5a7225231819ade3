//! Main tile model: time label, step count, alarm and bluetooth indicators.

use core::fmt::Write;

use heapless::String;

/// Content of the watch face.
pub struct MainTile {
    time: String<5>,
    minute_of_day: Option<u16>,
    steps: u32,
    alarm: bool,
    bluetooth: bool,
    dirty: bool,
}

impl MainTile {
    /// Blank face: `--:--`, zero steps, no indicators.
    pub fn new() -> Self {
        let mut time = String::new();
        time.push_str("--:--").ok();
        MainTile {
            time,
            minute_of_day: None,
            steps: 0,
            alarm: false,
            bluetooth: false,
            dirty: true,
        }
    }

    /// Show `hour:minute` (local time). Only marks the tile dirty when the
    /// label changes.
    pub fn set_time(&mut self, hour: u8, minute: u8) {
        let minute_of_day = u16::from(hour)
            .saturating_mul(60)
            .saturating_add(u16::from(minute));
        if self.minute_of_day == Some(minute_of_day) {
            return;
        }
        self.minute_of_day = Some(minute_of_day);
        self.time.clear();
        // "HH:MM" is exactly five bytes for hour < 100.
        write!(self.time, "{hour:02}:{minute:02}").ok();
        self.dirty = true;
    }

    /// Show `steps`.
    pub fn set_steps(&mut self, steps: u32) {
        self.dirty |= self.steps != steps;
        self.steps = steps;
    }

    /// Step counter restarted.
    pub fn reset_steps(&mut self) {
        self.set_steps(0);
    }

    /// Show or hide the alarm indicator.
    pub fn set_alarm(&mut self, enabled: bool) {
        self.dirty |= self.alarm != enabled;
        self.alarm = enabled;
    }

    /// Show or hide the bluetooth indicator.
    pub fn set_bluetooth(&mut self, connected: bool) {
        self.dirty |= self.bluetooth != connected;
        self.bluetooth = connected;
    }

    /// Time label.
    #[must_use]
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Step count.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Alarm indicator shown.
    #[must_use]
    pub fn alarm(&self) -> bool {
        self.alarm
    }

    /// Bluetooth indicator shown.
    #[must_use]
    pub fn bluetooth(&self) -> bool {
        self.bluetooth
    }

    /// Force a redraw, e.g. when the tile regains focus.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Return and clear the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }
}

impl Default for MainTile {
    fn default() -> Self {
        Self::new()
    }
}
