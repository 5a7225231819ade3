//! Motion sensor adapter: step counter, double tap, tilt
//!
//! The sensor INT line only raises an [`IrqFlag`]. Every loop tick, in any
//! power state, the adapter drains the flag, reads the interrupt status and
//! latches the causes. Double tap and tilt also queue a wakeup request. On
//! awake ticks at most one latched event is forwarded, double tap first,
//! then tilt, then the step count.
//!
//! # Retained step counter
//!
//! The sensor's own counter restarts whenever the sensor is reinitialised,
//! so the firmware keeps a running total in RAM that survives a soft reset
//! ([`RetainedSteps`]). A wrong validity marker means the RAM was lost: the
//! total restarts at zero and `StepCounterReset` is published on the first
//! loop tick.

use core::cell::{Cell, Ref, RefCell, RefMut};

use platform::{
    Accelerometer, AxesRemap, ConfigStore, InterruptLine, InterruptMode, InterruptStatus,
    MotionFeature, Rotation, WakeLevel,
};
use power::{
    Event, EventMask, Handler, IrqFlag, PowerEvent, PowerLoop, PowerManager, PowerRequest,
    PowerRequests, Registry, RegistryError,
};

use crate::alarm;
use crate::config::{self, ConfigError, MotionConfig, STEPCOUNTER_VALID};
use crate::display::DisplayEvent;
use crate::error::FirmwareError;

/// Listener capacity of the motion registry.
pub const MOTION_LISTENERS: usize = 8;

/// Motion notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionEvent {
    /// Total steps.
    StepCounter(u32),
    /// The total restarted at zero.
    StepCounterReset,
    /// Double tap detected.
    DoubleClick,
    /// Wrist tilt detected.
    Tilt,
}

impl MotionEvent {
    /// STEPCOUNTER bit.
    pub const STEPCOUNTER: EventMask = EventMask::bit(0);
    /// STEPCOUNTER_RESET bit.
    pub const STEPCOUNTER_RESET: EventMask = EventMask::bit(1);
    /// DOUBLECLICK bit.
    pub const DOUBLECLICK: EventMask = EventMask::bit(2);
    /// TILT bit.
    pub const TILT: EventMask = EventMask::bit(3);
}

impl Event for MotionEvent {
    fn mask(&self) -> EventMask {
        match self {
            Self::StepCounter(_) => Self::STEPCOUNTER,
            Self::StepCounterReset => Self::STEPCOUNTER_RESET,
            Self::DoubleClick => Self::DOUBLECLICK,
            Self::Tilt => Self::TILT,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::StepCounter(_) => "STEPCOUNTER",
            Self::StepCounterReset => "STEPCOUNTER_RESET",
            Self::DoubleClick => "DOUBLECLICK",
            Self::Tilt => "TILT",
        }
    }
}

/// Step counter state kept in RAM that is not cleared on soft reset.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetainedSteps {
    /// [`STEPCOUNTER_VALID`] when the other fields are meaningful.
    pub valid: u32,
    /// Sensor counter at the last read.
    pub before_reset: u32,
    /// Steps accumulated before the sensor counter last restarted.
    pub counter: u32,
}

impl RetainedSteps {
    /// Valid and zero.
    pub const ZERO: Self = Self {
        valid: STEPCOUNTER_VALID,
        before_reset: 0,
        counter: 0,
    };

    /// Marker intact.
    pub fn is_valid(&self) -> bool {
        self.valid == STEPCOUNTER_VALID
    }

    /// Total steps.
    pub fn total(&self) -> u32 {
        self.counter.saturating_add(self.before_reset)
    }
}

fn accel_err<E>(op: &'static str) -> impl FnOnce(E) -> FirmwareError {
    move |_| FirmwareError::hardware("accelerometer", op)
}

fn line_err<E>(op: &'static str) -> impl FnOnce(E) -> FirmwareError {
    move |_| FirmwareError::hardware("accelerometer int", op)
}

/// Accelerometer and INT line owner.
pub struct Motion<'a, A: Accelerometer, L: InterruptLine, S: ConfigStore> {
    accel: RefCell<A>,
    line: RefCell<L>,
    irq: &'a IrqFlag,
    requests: &'a PowerRequests,
    store: &'a RefCell<S>,
    config: Cell<MotionConfig>,
    steps: Cell<RetainedSteps>,
    announce_reset: Cell<bool>,
    latched: Cell<InterruptStatus>,
    first_tick: Cell<bool>,
    refresh: Cell<bool>,
    standby: Cell<bool>,
    last_day: Cell<Option<(i32, u32)>>,
    utc_offset_s: Cell<i32>,
    listeners: Registry<'a, MotionEvent, MOTION_LISTENERS>,
}

impl<'a, A: Accelerometer, L: InterruptLine, S: ConfigStore> Motion<'a, A, L, S> {
    /// `irq` is raised by the INT line ISR; wake requests go to `requests`.
    pub fn new(
        accel: A,
        line: L,
        irq: &'a IrqFlag,
        requests: &'a PowerRequests,
        store: &'a RefCell<S>,
    ) -> Self {
        Self {
            accel: RefCell::new(accel),
            line: RefCell::new(line),
            irq,
            requests,
            store,
            config: Cell::new(MotionConfig::default()),
            steps: Cell::new(RetainedSteps::ZERO),
            announce_reset: Cell::new(false),
            latched: Cell::new(InterruptStatus::default()),
            first_tick: Cell::new(true),
            refresh: Cell::new(false),
            standby: Cell::new(false),
            last_day: Cell::new(None),
            utc_offset_s: Cell::new(0),
            listeners: Registry::new("motion"),
        }
    }

    /// Restore the retained counter, load settings, initialise the sensor
    /// for `rotation` and attach the INT line.
    pub fn setup(&self, retained: RetainedSteps, rotation: Rotation) -> Result<(), FirmwareError> {
        let mut steps = retained;
        if !steps.is_valid() {
            power::info!("motion: stepcounter not valid, reset");
            steps = RetainedSteps::ZERO;
            self.announce_reset.set(true);
        }
        // The sensor restarts at zero after init; fold its last reading in.
        steps.counter = steps.total();
        steps.before_reset = 0;
        self.steps.set(steps);

        if let Err(e) = self.reload_config() {
            power::warn!("motion: {} {}, keeping defaults", e.key(), e.as_str());
        }
        {
            let mut accel = self.accel.borrow_mut();
            accel.init().map_err(accel_err("init"))?;
            accel
                .remap_axes(AxesRemap::for_rotation(rotation))
                .map_err(accel_err("remap"))?;
        }
        self.apply_features()?;
        self.line
            .borrow_mut()
            .attach(InterruptMode::RisingEdge)
            .map_err(line_err("attach"))?;
        Ok(())
    }

    /// Transitions and interrupt toggles, plus the loop in every state.
    pub fn register_power(&'a self, manager: &PowerManager<'a>) -> Result<(), RegistryError>
    where
        A: 'a,
        L: 'a,
    {
        manager.register(PowerEvent::ALL, self, "motion")?;
        manager.register_loop(PowerEvent::TRANSITIONS, self, "motion loop")
    }

    /// Subscribe to motion events.
    pub fn register(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<MotionEvent>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        self.listeners.register(mask, handler, id)
    }

    // ── Steps ──────────────────────────────────────────────────────────────

    /// Total steps as of the last sensor read.
    pub fn steps(&self) -> u32 {
        self.steps.get().total()
    }

    /// Counter state to write back to retained RAM.
    pub fn retained(&self) -> RetainedSteps {
        self.steps.get()
    }

    /// Zero the sensor and the running total, then publish the count.
    pub fn reset_stepcounter(&self) -> Result<(), FirmwareError> {
        power::info!("motion: reset step counter");
        self.accel
            .borrow_mut()
            .reset_step_counter()
            .map_err(accel_err("reset steps"))?;
        self.steps.set(RetainedSteps::ZERO);
        self.notify_steps()
    }

    fn notify_steps(&self) -> Result<(), FirmwareError> {
        let reading = self
            .accel
            .borrow_mut()
            .step_count()
            .map_err(accel_err("step count"))?;
        let mut steps = self.steps.get();
        steps.before_reset = reading;
        self.steps.set(steps);
        self.listeners.send(&MotionEvent::StepCounter(steps.total()));
        Ok(())
    }

    fn new_day(&self, unix_time: i64) -> Result<(), FirmwareError> {
        if !self.config.get().daily_stepcounter {
            return Ok(());
        }
        let Some(today) = alarm::local_day(unix_time, self.utc_offset_s.get()) else {
            return Ok(());
        };
        match self.last_day.replace(Some(today)) {
            Some(previous) if previous != today => {
                power::info!("motion: new day {}, reset step counter", today.1);
                self.accel
                    .borrow_mut()
                    .reset_step_counter()
                    .map_err(accel_err("reset steps"))?;
                self.steps.set(RetainedSteps::ZERO);
                self.listeners.send(&MotionEvent::StepCounterReset);
            }
            _ => {}
        }
        Ok(())
    }

    // ── Settings ───────────────────────────────────────────────────────────

    /// Current feature switches.
    pub fn config(&self) -> MotionConfig {
        self.config.get()
    }

    /// Persist new feature switches and apply them to the sensor. On error
    /// the current switches stay in effect.
    pub fn set_config(&self, config: MotionConfig) -> Result<(), FirmwareError> {
        config::save(&mut *self.store.borrow_mut(), &config)?;
        let previous = self.config.replace(config);
        if let Err(e) = self.apply_features() {
            self.config.set(previous);
            return Err(e);
        }
        Ok(())
    }

    /// Replace the in-memory switches with the stored record. On error the
    /// current switches stay untouched.
    pub fn reload_config(&self) -> Result<(), ConfigError> {
        let loaded: MotionConfig = config::load(&mut *self.store.borrow_mut())?;
        self.config.set(loaded);
        Ok(())
    }

    /// Local time offset used for the daily reset, seconds east of UTC.
    pub fn set_utc_offset(&self, utc_offset_s: i32) {
        self.utc_offset_s.set(utc_offset_s);
    }

    fn apply_features(&self) -> Result<(), FirmwareError> {
        let config = self.config.get();
        let mut accel = self.accel.borrow_mut();
        for (feature, enabled) in [
            (MotionFeature::StepCounter, config.stepcounter),
            (MotionFeature::DoubleClick, config.doubleclick),
            (MotionFeature::Tilt, config.tilt),
        ] {
            accel
                .set_feature(feature, enabled)
                .map_err(accel_err("feature"))?;
            accel
                .set_interrupt(feature, enabled)
                .map_err(accel_err("interrupt"))?;
        }
        Ok(())
    }

    // ── Power ──────────────────────────────────────────────────────────────

    /// Stop step interrupts and arm the INT line as a wake source.
    pub fn standby(&self) -> Result<(), FirmwareError> {
        if self.standby.get() {
            return Ok(());
        }
        power::debug!("motion: standby");
        if self.config.get().stepcounter {
            self.accel
                .borrow_mut()
                .set_interrupt(MotionFeature::StepCounter, false)
                .map_err(accel_err("interrupt"))?;
        }
        self.line
            .borrow_mut()
            .enable_wakeup(WakeLevel::High)
            .map_err(line_err("wakeup"))?;
        self.standby.set(true);
        Ok(())
    }

    /// Undo [`standby`](Self::standby) and refresh the count on the next
    /// loop tick.
    pub fn wakeup(&self) -> Result<(), FirmwareError> {
        self.refresh.set(true);
        if !self.standby.get() {
            return Ok(());
        }
        power::debug!("motion: wakeup");
        if self.config.get().stepcounter {
            self.accel
                .borrow_mut()
                .set_interrupt(MotionFeature::StepCounter, true)
                .map_err(accel_err("interrupt"))?;
        }
        self.line
            .borrow_mut()
            .disable_wakeup()
            .map_err(line_err("wakeup"))?;
        self.standby.set(false);
        Ok(())
    }

    fn drain_irq(&self) -> Result<(), FirmwareError> {
        if !self.irq.take() {
            return Ok(());
        }
        let status = self
            .accel
            .borrow_mut()
            .read_interrupt_status()
            .map_err(accel_err("status"))?;
        let mut latched = self.latched.get();
        if status.double_click {
            self.requests.raise(PowerRequest::Wakeup);
            latched.double_click = true;
        }
        if status.tilt {
            self.requests.raise(PowerRequest::Wakeup);
            latched.tilt = true;
        }
        latched.step_counter |= status.step_counter;
        self.latched.set(latched);
        Ok(())
    }

    fn forward_latched(&self) -> Result<(), FirmwareError> {
        let mut latched = self.latched.get();
        if latched.double_click {
            latched.double_click = false;
            self.latched.set(latched);
            self.listeners.send(&MotionEvent::DoubleClick);
        } else if latched.tilt {
            latched.tilt = false;
            self.latched.set(latched);
            self.listeners.send(&MotionEvent::Tilt);
        } else if latched.step_counter {
            latched.step_counter = false;
            self.latched.set(latched);
            self.notify_steps()?;
        }
        Ok(())
    }

    /// One loop tick.
    pub fn service(&self, tick: &PowerLoop) -> Result<(), FirmwareError> {
        self.drain_irq()?;

        let refresh = self.refresh.replace(false);
        if refresh {
            self.new_day(tick.tick.unix_time)?;
        }
        if tick.state.is_display_on() {
            self.forward_latched()?;
        }
        if self.first_tick.replace(false) {
            if self.announce_reset.replace(false) {
                self.listeners.send(&MotionEvent::StepCounterReset);
            }
            self.notify_steps()?;
        } else if refresh {
            self.notify_steps()?;
        }
        Ok(())
    }

    // ── Test and board access ──────────────────────────────────────────────

    /// Borrow the sensor driver.
    pub fn accel(&self) -> Ref<'_, A> {
        self.accel.borrow()
    }

    /// Mutably borrow the sensor driver.
    pub fn accel_mut(&self) -> RefMut<'_, A> {
        self.accel.borrow_mut()
    }

    /// Borrow the INT line.
    pub fn line(&self) -> Ref<'_, L> {
        self.line.borrow()
    }
}

impl<A: Accelerometer, L: InterruptLine, S: ConfigStore> Handler<PowerEvent> for Motion<'_, A, L, S> {
    fn on_event(&self, event: &PowerEvent) -> bool {
        let result = match event {
            PowerEvent::Standby => self.standby(),
            PowerEvent::Wakeup | PowerEvent::SilenceWakeup => self.wakeup(),
            PowerEvent::EnableInterrupts => self
                .line
                .borrow_mut()
                .attach(InterruptMode::RisingEdge)
                .map_err(line_err("attach")),
            PowerEvent::DisableInterrupts => self
                .line
                .borrow_mut()
                .detach()
                .map_err(line_err("detach")),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                power::error!("motion: {} failed on {}", e.as_str(), event.as_str());
                false
            }
        }
    }
}

impl<A: Accelerometer, L: InterruptLine, S: ConfigStore> Handler<PowerLoop> for Motion<'_, A, L, S> {
    fn on_event(&self, event: &PowerLoop) -> bool {
        match self.service(event) {
            Ok(()) => true,
            Err(e) => {
                power::warn!("motion: {} failed in loop", e.as_str());
                false
            }
        }
    }
}

impl<A: Accelerometer, L: InterruptLine, S: ConfigStore> Handler<DisplayEvent> for Motion<'_, A, L, S> {
    fn on_event(&self, event: &DisplayEvent) -> bool {
        let DisplayEvent::Rotation(rotation) = *event else {
            return false;
        };
        if self
            .accel
            .borrow_mut()
            .remap_axes(AxesRemap::for_rotation(rotation))
            .is_err()
        {
            power::warn!("motion: remap failed for {}", rotation.degrees());
            return false;
        }
        true
    }
}
