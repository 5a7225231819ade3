//! Display adapter: backlight ramp, timeout dimming, panel sleep
//!
//! Listens for `STANDBY`, `WAKEUP` and `SILENCE_WAKEUP`, and runs in the
//! `WAKEUP` loop. Each awake tick moves the backlight one
//! [`BRIGHTNESS_RAMP_STEP`] toward its destination. Near the inactivity
//! timeout the destination fades to zero at one level per
//! [`DIM_MS_PER_LEVEL`] idle milliseconds, so the screen is already dark
//! when the power manager drops into standby.
//!
//! Settings changes are announced on the display registry as
//! [`DisplayEvent`]s.

use core::cell::{Cell, Ref, RefCell, RefMut};

use platform::{ConfigStore, DisplayPanel, Rotation};
use power::{Event, EventMask, Handler, PowerEvent, PowerLoop, PowerManager, Registry, RegistryError, Tick};

use crate::config::{
    self, ConfigError, DisplayConfig, BRIGHTNESS_RAMP_STEP, DIM_MS_PER_LEVEL,
    DISPLAY_MAX_TIMEOUT_S, DISPLAY_MIN_TIMEOUT_S,
};
use crate::error::FirmwareError;

/// Listener capacity of the display registry.
pub const DISPLAY_LISTENERS: usize = 8;

/// Display settings change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayEvent {
    /// New backlight level.
    Brightness(u8),
    /// New timeout in seconds.
    Timeout(u32),
    /// Panel rotated.
    Rotation(Rotation),
    /// Return-to-main-tile policy changed.
    BlockReturnMaintile(bool),
}

impl DisplayEvent {
    /// BRIGHTNESS bit.
    pub const BRIGHTNESS: EventMask = EventMask::bit(0);
    /// TIMEOUT bit.
    pub const TIMEOUT: EventMask = EventMask::bit(1);
    /// ROTATION bit.
    pub const ROTATION: EventMask = EventMask::bit(2);
    /// BLOCK_RETURN_MAINTILE bit.
    pub const BLOCK_RETURN_MAINTILE: EventMask = EventMask::bit(3);
}

impl Event for DisplayEvent {
    fn mask(&self) -> EventMask {
        match self {
            Self::Brightness(_) => Self::BRIGHTNESS,
            Self::Timeout(_) => Self::TIMEOUT,
            Self::Rotation(_) => Self::ROTATION,
            Self::BlockReturnMaintile(_) => Self::BLOCK_RETURN_MAINTILE,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Brightness(_) => "BRIGHTNESS",
            Self::Timeout(_) => "TIMEOUT",
            Self::Rotation(_) => "ROTATION",
            Self::BlockReturnMaintile(_) => "BLOCK_RETURN_MAINTILE",
        }
    }
}

/// Destination backlight level for `idle_ms` of inactivity.
///
/// Inside the last `brightness * DIM_MS_PER_LEVEL` milliseconds before the
/// timeout the level falls linearly to zero.
pub fn dimmed_level(brightness: u8, timeout_ms: u32, idle_ms: u32) -> u8 {
    let window = u32::from(brightness).saturating_mul(DIM_MS_PER_LEVEL);
    if idle_ms <= timeout_ms.saturating_sub(window) {
        return brightness;
    }
    let remaining = timeout_ms
        .saturating_sub(idle_ms)
        .checked_div(DIM_MS_PER_LEVEL)
        .unwrap_or(0);
    u8::try_from(remaining).unwrap_or(brightness).min(brightness)
}

fn step_toward(level: u8, target: u8) -> u8 {
    match level.cmp(&target) {
        core::cmp::Ordering::Less => level.saturating_add(BRIGHTNESS_RAMP_STEP).min(target),
        core::cmp::Ordering::Greater => level.saturating_sub(BRIGHTNESS_RAMP_STEP).max(target),
        core::cmp::Ordering::Equal => level,
    }
}

/// Panel and backlight owner.
pub struct Display<'a, P: DisplayPanel, S: ConfigStore> {
    panel: RefCell<P>,
    store: &'a RefCell<S>,
    config: Cell<DisplayConfig>,
    level: Cell<u8>,
    target: Cell<u8>,
    asleep: Cell<bool>,
    listeners: Registry<'a, DisplayEvent, DISPLAY_LISTENERS>,
}

impl<'a, P: DisplayPanel, S: ConfigStore> Display<'a, P, S> {
    /// Take ownership of the panel. Settings are read in [`setup`](Self::setup).
    pub fn new(panel: P, store: &'a RefCell<S>) -> Self {
        Self {
            panel: RefCell::new(panel),
            store,
            config: Cell::new(DisplayConfig::default()),
            level: Cell::new(0),
            target: Cell::new(0),
            asleep: Cell::new(false),
            listeners: Registry::new("display"),
        }
    }

    /// Load settings, power the backlight at level 0 and apply the rotation.
    /// The backlight then ramps up to the configured brightness.
    pub fn setup(&self) -> Result<(), FirmwareError> {
        if let Err(e) = self.reload() {
            power::warn!("display: {} {}, keeping defaults", e.key(), e.as_str());
        }
        let config = self.config.get();
        {
            let mut panel = self.panel.borrow_mut();
            panel
                .backlight_power(true)
                .map_err(|_| FirmwareError::hardware("panel", "backlight power"))?;
            panel
                .set_backlight(0)
                .map_err(|_| FirmwareError::hardware("panel", "backlight"))?;
            panel
                .set_rotation(self.rotation())
                .map_err(|_| FirmwareError::hardware("panel", "rotation"))?;
        }
        self.level.set(0);
        self.target.set(config.brightness);
        self.asleep.set(false);
        power::info!(
            "display: brightness {} timeout {}s rotation {}",
            config.brightness,
            config.timeout_s,
            config.rotation
        );
        Ok(())
    }

    /// Hook into the power manager: transitions plus the `WAKEUP` loop.
    pub fn register_power(&'a self, manager: &PowerManager<'a>) -> Result<(), RegistryError>
    where
        P: 'a,
    {
        manager.register(PowerEvent::TRANSITIONS, self, "display")?;
        manager.register_loop(PowerEvent::WAKEUP, self, "display loop")
    }

    /// Subscribe to display setting changes.
    pub fn register(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<DisplayEvent>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        self.listeners.register(mask, handler, id)
    }

    // ── Settings ───────────────────────────────────────────────────────────

    /// Current settings.
    pub fn config(&self) -> DisplayConfig {
        self.config.get()
    }

    /// Configured backlight level.
    pub fn brightness(&self) -> u8 {
        self.config.get().brightness
    }

    /// Configured timeout in seconds.
    pub fn timeout_s(&self) -> u32 {
        self.config.get().timeout_s
    }

    /// Inactivity limit for the power manager, `None` if the timeout is set
    /// to never.
    pub fn standby_timeout_ms(&self) -> Option<u32> {
        let timeout_s = self.config.get().timeout_s;
        if timeout_s >= DISPLAY_MAX_TIMEOUT_S {
            return None;
        }
        Some(timeout_s.saturating_mul(1000))
    }

    /// Configured rotation.
    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.config.get().rotation).unwrap_or_default()
    }

    /// Stay on the current tile after wakeup.
    pub fn block_return_maintile(&self) -> bool {
        self.config.get().block_return_maintile
    }

    /// Background image index.
    pub fn background_image(&self) -> u8 {
        self.config.get().background_image
    }

    /// Vibrate on touch.
    pub fn vibe(&self) -> bool {
        self.config.get().vibe
    }

    /// Set the backlight level and ramp toward it.
    pub fn set_brightness(&self, brightness: u8) {
        self.update(|c| c.brightness = brightness);
        if !self.asleep.get() {
            self.target.set(brightness);
        }
        self.listeners.send(&DisplayEvent::Brightness(brightness));
    }

    /// Set the timeout, clamped to the supported range.
    pub fn set_timeout(&self, timeout_s: u32) {
        let timeout_s = timeout_s.clamp(DISPLAY_MIN_TIMEOUT_S, DISPLAY_MAX_TIMEOUT_S);
        self.update(|c| c.timeout_s = timeout_s);
        self.listeners.send(&DisplayEvent::Timeout(timeout_s));
    }

    /// Rotate the panel.
    pub fn set_rotation(&self, rotation: Rotation) -> Result<(), FirmwareError> {
        self.panel
            .borrow_mut()
            .set_rotation(rotation)
            .map_err(|_| FirmwareError::hardware("panel", "rotation"))?;
        self.update(|c| c.rotation = rotation.degrees());
        self.listeners.send(&DisplayEvent::Rotation(rotation));
        Ok(())
    }

    /// Set the return-to-main-tile policy.
    pub fn set_block_return_maintile(&self, block: bool) {
        self.update(|c| c.block_return_maintile = block);
        self.listeners.send(&DisplayEvent::BlockReturnMaintile(block));
    }

    /// Select the background image.
    pub fn set_background_image(&self, image: u8) {
        self.update(|c| c.background_image = image);
    }

    /// Enable or disable touch vibration.
    pub fn set_vibe(&self, vibe: bool) {
        self.update(|c| c.vibe = vibe);
    }

    /// Persist the current settings.
    pub fn save(&self) -> Result<(), ConfigError> {
        config::save(&mut *self.store.borrow_mut(), &self.config.get())
    }

    /// Replace the in-memory settings with the stored record. On error the
    /// current settings stay untouched.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let loaded: DisplayConfig = config::load(&mut *self.store.borrow_mut())?;
        self.config.set(loaded);
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut DisplayConfig)) {
        let mut config = self.config.get();
        f(&mut config);
        self.config.set(config);
    }

    // ── Power ──────────────────────────────────────────────────────────────

    /// Current backlight level.
    pub fn level(&self) -> u8 {
        self.level.get()
    }

    /// Level the ramp is heading to.
    pub fn target(&self) -> u8 {
        self.target.get()
    }

    /// Panel asleep and backlight off.
    pub fn is_asleep(&self) -> bool {
        self.asleep.get()
    }

    /// Backlight to 0, panel to sleep, backlight off. Does nothing if
    /// already asleep.
    pub fn standby(&self) -> Result<(), P::Error> {
        if self.asleep.get() {
            return Ok(());
        }
        power::info!("display: standby");
        let mut panel = self.panel.borrow_mut();
        panel.set_backlight(0)?;
        panel.sleep()?;
        panel.backlight_power(false)?;
        self.level.set(0);
        self.target.set(0);
        self.asleep.set(true);
        Ok(())
    }

    /// Wake the panel with the backlight powered at level 0. A normal wakeup
    /// then ramps to the configured brightness; a silent one stays dark.
    ///
    /// Calling this on an awake panel only updates the destination.
    pub fn wakeup(&self, silent: bool) -> Result<(), P::Error> {
        if self.asleep.get() {
            power::info!("display: wakeup silent={}", silent);
            let mut panel = self.panel.borrow_mut();
            panel.backlight_power(true)?;
            panel.wake()?;
            panel.set_backlight(0)?;
            self.level.set(0);
            self.asleep.set(false);
        }
        self.target.set(if silent { 0 } else { self.brightness() });
        Ok(())
    }

    /// One awake tick: update the dimming destination and ramp one step.
    pub fn service(&self, tick: Tick) -> Result<(), P::Error> {
        if self.asleep.get() {
            return Ok(());
        }
        let brightness = self.brightness();
        let target = match self.standby_timeout_ms() {
            Some(timeout_ms) => dimmed_level(brightness, timeout_ms, tick.idle_ms),
            None => brightness,
        };
        self.target.set(target);

        let level = self.level.get();
        let next = step_toward(level, target);
        if next != level {
            self.panel.borrow_mut().set_backlight(next)?;
            self.level.set(next);
        }
        Ok(())
    }

    // ── Test and board access ──────────────────────────────────────────────

    /// Borrow the panel driver.
    pub fn panel(&self) -> Ref<'_, P> {
        self.panel.borrow()
    }

    /// Mutably borrow the panel driver.
    pub fn panel_mut(&self) -> RefMut<'_, P> {
        self.panel.borrow_mut()
    }
}

impl<P: DisplayPanel, S: ConfigStore> Handler<PowerEvent> for Display<'_, P, S> {
    fn on_event(&self, event: &PowerEvent) -> bool {
        let result = match event {
            PowerEvent::Standby => self.standby(),
            PowerEvent::Wakeup => self.wakeup(false),
            PowerEvent::SilenceWakeup => self.wakeup(true),
            PowerEvent::EnableInterrupts | PowerEvent::DisableInterrupts => return false,
        };
        if result.is_err() {
            power::error!("display: panel error on {}", event.as_str());
            return false;
        }
        true
    }
}

impl<P: DisplayPanel, S: ConfigStore> Handler<PowerLoop> for Display<'_, P, S> {
    fn on_event(&self, event: &PowerLoop) -> bool {
        if self.service(event.tick).is_err() {
            power::warn!("display: backlight write failed");
            return false;
        }
        true
    }
}
