//! Watch context: the subsystems and the power manager wired together.
//!
//! # Boot sequence
//!
//! ```text
//! 1. Subsystems::new        move drivers into the adapters (no I/O)
//! 2. Watch::new
//!    a. setup, in INIT_ORDER          display → motion → rtc → bluetooth
//!    b. register_power, in INIT_ORDER the power registries deliver in
//!                                     registration order, so STANDBY turns
//!                                     the backlight off before the sensors
//!                                     arm their wake lines
//!    c. cross-subsystem listeners     motion ← display rotation
//!                                     gui ← display / motion / rtc / ble
//!    d. gui seeded from settings
//! 3. Watch::tick, once per main-loop iteration
//! ```
//!
//! Nothing after step 2 registers a listener. A registration failure during
//! step 2 leaves the wiring incomplete; [`Watch::boot`] halts on it, while
//! [`Watch::new`] returns it for tests.

use core::cell::{Cell, RefCell};

use bluetooth::{Bluetooth, BluetoothEvent, Inbox};
use platform::{Board, Peripherals};
use power::{
    IrqFlag, PowerEvent, PowerManager, PowerRequest, PowerRequests, PowerState, Tick, TickReport,
};

use crate::config;
use crate::display::{Display, DisplayEvent};
use crate::error::FirmwareError;
use crate::gui::Gui;
use crate::irq;
use crate::motion::{Motion, MotionEvent, RetainedSteps};
use crate::rtc::{Rtc, RtcEvent};

/// Subsystem setup and registration order.
pub const INIT_ORDER: [&str; 4] = ["display", "motion", "rtc", "bluetooth"];

/// Shared flags and queues the ISRs and the BLE stack write into.
#[derive(Clone, Copy)]
pub struct Wiring<'a> {
    /// Motion sensor INT.
    pub motion_irq: &'a IrqFlag,
    /// RTC INT.
    pub rtc_irq: &'a IrqFlag,
    /// Power requests from any context.
    pub requests: &'a PowerRequests,
    /// BLE stack notifications.
    pub inbox: &'a Inbox,
}

impl Wiring<'static> {
    /// The statics in [`irq`] that the board's interrupt vectors raise.
    pub fn statics() -> Self {
        Self {
            motion_irq: &irq::MOTION_IRQ,
            rtc_irq: &irq::RTC_IRQ,
            requests: &irq::POWER_REQUESTS,
            inbox: &irq::BLE_INBOX,
        }
    }
}

/// Board drivers minus the settings store, which the adapters share.
pub struct Drivers<B: Board> {
    /// LCD panel and backlight
    pub panel: B::Panel,
    /// Motion sensor
    pub accel: B::Accel,
    /// Motion sensor INT line
    pub accel_irq: B::AccelIrq,
    /// Real-time clock
    pub rtc: B::Rtc,
    /// RTC INT line
    pub rtc_irq: B::RtcIrq,
}

/// Split the store off so it can be wrapped in a `RefCell` that outlives
/// the adapters.
pub fn split<B: Board>(peripherals: Peripherals<B>) -> (Drivers<B>, B::Store) {
    let Peripherals {
        panel,
        accel,
        accel_irq,
        rtc,
        rtc_irq,
        store,
    } = peripherals;
    (
        Drivers {
            panel,
            accel,
            accel_irq,
            rtc,
            rtc_irq,
        },
        store,
    )
}

/// Every adapter plus the GUI glue.
pub struct Subsystems<'a, B: Board> {
    /// Panel and backlight.
    pub display: Display<'a, B::Panel, B::Store>,
    /// Accelerometer.
    pub motion: Motion<'a, B::Accel, B::AccelIrq, B::Store>,
    /// Alarm clock.
    pub rtc: Rtc<'a, B::Rtc, B::RtcIrq, B::Store>,
    /// Radio.
    pub bluetooth: Bluetooth<'a>,
    /// Tile models.
    pub gui: Gui,
    requests: &'a PowerRequests,
}

impl<'a, B: Board> Subsystems<'a, B> {
    /// Move the drivers into their adapters. No hardware access.
    pub fn new(drivers: Drivers<B>, store: &'a RefCell<B::Store>, wiring: Wiring<'a>) -> Self {
        Self {
            display: Display::new(drivers.panel, store),
            motion: Motion::new(
                drivers.accel,
                drivers.accel_irq,
                wiring.motion_irq,
                wiring.requests,
                store,
            ),
            rtc: Rtc::new(
                drivers.rtc,
                drivers.rtc_irq,
                wiring.rtc_irq,
                wiring.requests,
                store,
            ),
            bluetooth: Bluetooth::new(wiring.inbox, wiring.requests),
            gui: Gui::new(),
            requests: wiring.requests,
        }
    }
}

/// The running watch.
pub struct Watch<'a, B: Board> {
    sys: &'a Subsystems<'a, B>,
    power: PowerManager<'a>,
    last_activity_ms: Cell<u64>,
}

impl<'a, B: Board> Watch<'a, B>
where
    B: 'a,
{
    /// Set up and wire every subsystem. See the module docs for the order.
    pub fn new(sys: &'a Subsystems<'a, B>, retained: RetainedSteps) -> Result<Self, FirmwareError> {
        power::info!(
            "watch: {} v{} boot",
            config::FIRMWARE_NAME,
            config::FIRMWARE_VERSION
        );
        sys.display.setup()?;
        sys.motion.setup(retained, sys.display.rotation())?;
        sys.rtc.setup()?;

        let manager = PowerManager::new(sys.requests);
        sys.display.register_power(&manager)?;
        sys.motion.register_power(&manager)?;
        sys.rtc.register_power(&manager)?;
        sys.bluetooth.register_power(&manager)?;
        manager.register(PowerEvent::WAKEUP, &sys.gui, "gui")?;
        manager.register_loop(PowerEvent::WAKEUP, &sys.gui, "gui loop")?;

        sys.display
            .register(DisplayEvent::ROTATION, &sys.motion, "motion")?;
        sys.display
            .register(DisplayEvent::BLOCK_RETURN_MAINTILE, &sys.gui, "gui")?;
        sys.motion.register(
            MotionEvent::STEPCOUNTER | MotionEvent::STEPCOUNTER_RESET,
            &sys.gui,
            "gui",
        )?;
        sys.rtc.register(
            RtcEvent::ALARM_ENABLED | RtcEvent::ALARM_DISABLED,
            &sys.gui,
            "gui",
        )?;
        sys.bluetooth.register(
            BluetoothEvent::CONNECTED | BluetoothEvent::DISCONNECTED,
            &sys.gui,
            "gui",
        )?;

        sys.gui
            .sync(sys.rtc.alarm().enabled, sys.display.block_return_maintile());
        power::info!("watch: {} subsystems up", INIT_ORDER.len());
        Ok(Self {
            sys,
            power: manager,
            last_activity_ms: Cell::new(0),
        })
    }

    /// [`new`](Self::new), halting on failure.
    pub fn boot(sys: &'a Subsystems<'a, B>, retained: RetainedSteps) -> Self {
        match Self::new(sys, retained) {
            Ok(watch) => watch,
            Err(e) => power::halt(e.as_str()),
        }
    }

    /// The adapters.
    pub fn subsystems(&self) -> &'a Subsystems<'a, B> {
        self.sys
    }

    /// The power manager, for listeners added by the application.
    pub fn power(&self) -> &PowerManager<'a> {
        &self.power
    }

    /// Current power state.
    pub fn state(&self) -> PowerState {
        self.power.state()
    }

    /// Queue a power request for the next tick.
    pub fn request(&self, request: PowerRequest) {
        self.power.request(request);
    }

    /// Local time offset changed after a time sync.
    pub fn on_time_synced(&self, utc_offset_s: i32) -> Result<(), FirmwareError> {
        self.sys.motion.set_utc_offset(utc_offset_s);
        self.sys.gui.set_utc_offset(utc_offset_s);
        self.sys.rtc.on_time_synced(utc_offset_s)
    }

    /// The user touched the screen or pressed a key.
    pub fn user_activity(&self, uptime_ms: u64) {
        self.last_activity_ms.set(uptime_ms);
    }

    /// Milliseconds since the last user activity or wakeup.
    pub fn idle_ms(&self, uptime_ms: u64) -> u32 {
        let idle = uptime_ms.saturating_sub(self.last_activity_ms.get());
        u32::try_from(idle).unwrap_or(u32::MAX)
    }

    /// Run one main-loop iteration at `uptime_ms` (monotonic) and
    /// `unix_time` (wall clock, UTC seconds).
    ///
    /// The inactivity timeout comes from the display settings. A wakeup
    /// restarts the inactivity window.
    pub fn tick(&self, uptime_ms: u64, unix_time: i64) -> TickReport {
        let tick = Tick {
            uptime_ms,
            idle_ms: self.idle_ms(uptime_ms),
            unix_time,
        };
        let report = self.power.tick(tick, self.sys.display.standby_timeout_ms());
        // A wake, whoever triggered it, counts as activity.
        let woke_at = uptime_ms.saturating_sub(u64::from(report.idle_ms));
        if woke_at > self.last_activity_ms.get() {
            self.user_activity(woke_at);
        }
        report
    }
}
