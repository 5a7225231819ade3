//! RTC adapter: alarm clock
//!
//! The alarm is stored as an [`AlarmRecord`] in local time. Whenever it
//! changes, or the wall clock is synced, the next ring is computed and
//! programmed into the RTC match registers in UTC. The RTC INT line raises
//! an [`IrqFlag`]; the loop drains it in every power state, publishes
//! `AlarmOccurred`, wakes the watch and programs the following ring.

use core::cell::{Cell, Ref, RefCell, RefMut};

use platform::{ConfigStore, InterruptLine, InterruptMode, RtcClock, WakeLevel};
use power::{
    Event, EventMask, Handler, IrqFlag, PowerEvent, PowerLoop, PowerManager, PowerRequest,
    PowerRequests, Registry, RegistryError,
};

use crate::alarm;
use crate::config::{self, AlarmRecord, ConfigError, Record};
use crate::error::FirmwareError;

/// Listener capacity of the RTC registry.
pub const RTC_LISTENERS: usize = 8;

/// Alarm notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcEvent {
    /// The alarm rang.
    AlarmOccurred,
    /// The alarm was switched on.
    AlarmEnabled,
    /// The alarm was switched off.
    AlarmDisabled,
    /// The RTC match registers were rewritten.
    AlarmTermSet,
}

impl RtcEvent {
    /// ALARM_OCCURRED bit.
    pub const ALARM_OCCURRED: EventMask = EventMask::bit(0);
    /// ALARM_ENABLED bit.
    pub const ALARM_ENABLED: EventMask = EventMask::bit(1);
    /// ALARM_DISABLED bit.
    pub const ALARM_DISABLED: EventMask = EventMask::bit(2);
    /// ALARM_TERM_SET bit.
    pub const ALARM_TERM_SET: EventMask = EventMask::bit(3);
}

impl Event for RtcEvent {
    fn mask(&self) -> EventMask {
        match self {
            Self::AlarmOccurred => Self::ALARM_OCCURRED,
            Self::AlarmEnabled => Self::ALARM_ENABLED,
            Self::AlarmDisabled => Self::ALARM_DISABLED,
            Self::AlarmTermSet => Self::ALARM_TERM_SET,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::AlarmOccurred => "ALARM_OCCURRED",
            Self::AlarmEnabled => "ALARM_ENABLED",
            Self::AlarmDisabled => "ALARM_DISABLED",
            Self::AlarmTermSet => "ALARM_TERM_SET",
        }
    }
}

fn clock_err<E>(op: &'static str) -> impl FnOnce(E) -> FirmwareError {
    move |_| FirmwareError::hardware("rtc", op)
}

fn line_err<E>(op: &'static str) -> impl FnOnce(E) -> FirmwareError {
    move |_| FirmwareError::hardware("rtc int", op)
}

/// RTC and RTC INT line owner.
pub struct Rtc<'a, C: RtcClock, L: InterruptLine, S: ConfigStore> {
    clock: RefCell<C>,
    line: RefCell<L>,
    irq: &'a IrqFlag,
    requests: &'a PowerRequests,
    store: &'a RefCell<S>,
    alarm: Cell<AlarmRecord>,
    next: Cell<Option<i64>>,
    utc_offset_s: Cell<i32>,
    standby: Cell<bool>,
    listeners: Registry<'a, RtcEvent, RTC_LISTENERS>,
}

impl<'a, C: RtcClock, L: InterruptLine, S: ConfigStore> Rtc<'a, C, L, S> {
    /// `irq` is raised by the INT line ISR; wake requests go to `requests`.
    pub fn new(
        clock: C,
        line: L,
        irq: &'a IrqFlag,
        requests: &'a PowerRequests,
        store: &'a RefCell<S>,
    ) -> Self {
        Self {
            clock: RefCell::new(clock),
            line: RefCell::new(line),
            irq,
            requests,
            store,
            alarm: Cell::new(AlarmRecord::default()),
            next: Cell::new(None),
            utc_offset_s: Cell::new(0),
            standby: Cell::new(false),
            listeners: Registry::new("rtcctl"),
        }
    }

    /// Stop the periodic timer and clock output, attach the INT line and
    /// program the stored alarm.
    pub fn setup(&self) -> Result<(), FirmwareError> {
        {
            let mut clock = self.clock.borrow_mut();
            clock.disable_timer().map_err(clock_err("disable timer"))?;
            clock
                .disable_clock_out()
                .map_err(clock_err("disable clock out"))?;
        }
        self.line
            .borrow_mut()
            .attach(InterruptMode::FallingEdge)
            .map_err(line_err("attach"))?;

        let stored = config::load::<AlarmRecord, _>(&mut *self.store.borrow_mut()).unwrap_or_else(|e| {
            if !matches!(e, ConfigError::NotFound { .. }) {
                power::warn!("rtc: {} {}, alarm off", e.key(), e.as_str());
            }
            AlarmRecord::default()
        });
        self.alarm.set(stored);
        self.program()
    }

    /// Transitions and interrupt toggles, plus the loop in every state.
    pub fn register_power(&'a self, manager: &PowerManager<'a>) -> Result<(), RegistryError>
    where
        C: 'a,
        L: 'a,
    {
        manager.register(PowerEvent::ALL, self, "rtcctl")?;
        manager.register_loop(PowerEvent::TRANSITIONS, self, "rtcctl loop")
    }

    /// Subscribe to alarm events.
    pub fn register(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<RtcEvent>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        self.listeners.register(mask, handler, id)
    }

    /// Current alarm settings.
    pub fn alarm(&self) -> AlarmRecord {
        self.alarm.get()
    }

    /// Validate, persist and program new alarm settings. On error the
    /// current settings stay in effect.
    ///
    /// Publishes `AlarmEnabled` or `AlarmDisabled` when the enable switch
    /// flips, after `AlarmTermSet`.
    pub fn set_alarm(&self, record: AlarmRecord) -> Result<(), FirmwareError> {
        record.validate().map_err(|field| ConfigError::Invalid {
            key: AlarmRecord::KEY,
            field,
        })?;
        config::save(&mut *self.store.borrow_mut(), &record)?;
        let previous = self.alarm.replace(record);
        if let Err(e) = self.program() {
            self.alarm.set(previous);
            return Err(e);
        }

        match (previous.enabled, record.enabled) {
            (false, true) => {
                self.listeners.send(&RtcEvent::AlarmEnabled);
            }
            (true, false) => {
                self.listeners.send(&RtcEvent::AlarmDisabled);
            }
            _ => {}
        }
        Ok(())
    }

    /// Wall clock was set: recompute the next ring.
    pub fn on_time_synced(&self, utc_offset_s: i32) -> Result<(), FirmwareError> {
        self.utc_offset_s.set(utc_offset_s);
        self.program()
    }

    /// Unix time of the next programmed ring.
    pub fn next_alarm(&self) -> Option<i64> {
        self.next.get()
    }

    /// Local weekday of the next ring, 0 = Sunday. `None` while disabled.
    pub fn next_alarm_weekday(&self) -> Option<u8> {
        if !self.alarm.get().enabled {
            return None;
        }
        alarm::local_weekday(self.next.get()?, self.utc_offset_s.get())
    }

    fn program(&self) -> Result<(), FirmwareError> {
        let record = self.alarm.get();
        let mut clock = self.clock.borrow_mut();
        let now = clock.now().map_err(clock_err("read time"))?;
        let next = alarm::next_alarm(&record, now, self.utc_offset_s.get());
        let registers = next.and_then(alarm::alarm_registers);

        clock.enable_alarm(false).map_err(clock_err("disable alarm"))?;
        clock.set_alarm(registers).map_err(clock_err("set alarm"))?;
        if registers.is_some() {
            clock.enable_alarm(true).map_err(clock_err("enable alarm"))?;
        }
        drop(clock);

        self.next.set(next);
        match registers {
            Some(r) => power::info!("rtc: next alarm {}:{} day {} UTC", r.hour, r.minute, r.day),
            None => power::debug!("rtc: alarm cleared"),
        }
        self.listeners.send(&RtcEvent::AlarmTermSet);
        Ok(())
    }

    fn service(&self) -> Result<(), FirmwareError> {
        if !self.irq.take() {
            return Ok(());
        }
        power::info!("rtc: alarm occurred");
        self.listeners.send(&RtcEvent::AlarmOccurred);
        self.requests.raise(PowerRequest::Wakeup);
        self.program()
    }

    /// Borrow the clock driver.
    pub fn clock(&self) -> Ref<'_, C> {
        self.clock.borrow()
    }

    /// Mutably borrow the clock driver.
    pub fn clock_mut(&self) -> RefMut<'_, C> {
        self.clock.borrow_mut()
    }

    /// Borrow the INT line.
    pub fn line(&self) -> Ref<'_, L> {
        self.line.borrow()
    }
}

impl<C: RtcClock, L: InterruptLine, S: ConfigStore> Handler<PowerEvent> for Rtc<'_, C, L, S> {
    fn on_event(&self, event: &PowerEvent) -> bool {
        let mut line = self.line.borrow_mut();
        let result = match event {
            PowerEvent::Standby if !self.standby.replace(true) => {
                line.enable_wakeup(WakeLevel::Low).map_err(line_err("wakeup"))
            }
            PowerEvent::Wakeup | PowerEvent::SilenceWakeup if self.standby.replace(false) => {
                line.disable_wakeup().map_err(line_err("wakeup"))
            }
            PowerEvent::EnableInterrupts => line
                .attach(InterruptMode::FallingEdge)
                .map_err(line_err("attach")),
            PowerEvent::DisableInterrupts => line.detach().map_err(line_err("detach")),
            _ => Ok(()),
        };
        if let Err(e) = result {
            power::error!("rtc: {} failed on {}", e.as_str(), event.as_str());
            return false;
        }
        true
    }
}

impl<C: RtcClock, L: InterruptLine, S: ConfigStore> Handler<PowerLoop> for Rtc<'_, C, L, S> {
    fn on_event(&self, _event: &PowerLoop) -> bool {
        match self.service() {
            Ok(()) => true,
            Err(e) => {
                power::warn!("rtc: {} failed in loop", e.as_str());
                false
            }
        }
    }
}
