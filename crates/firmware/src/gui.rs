//! GUI glue: feeds subsystem events into the tile models.
//!
//! [`Gui`] is one listener on every registry the watch face cares about.
//! It only updates the models in the `ui` crate; drawing them is the
//! renderer's business.

use core::cell::{Cell, Ref, RefCell};

use bluetooth::BluetoothEvent;
use power::{Event, Handler, PowerEvent, PowerLoop};
use ui::{MainTile, Navigator, Tile, TileHooks};

use crate::alarm;
use crate::display::DisplayEvent;
use crate::motion::MotionEvent;
use crate::rtc::RtcEvent;

/// Focus hooks for the tiles this crate owns.
struct Focus<'g> {
    main: &'g mut MainTile,
}

impl TileHooks for Focus<'_> {
    fn activate(&mut self, tile: Tile) {
        power::debug!("gui: activate {}", tile.as_str());
        if tile == Tile::Main {
            self.main.invalidate();
        }
    }

    fn hibernate(&mut self, tile: Tile) {
        power::debug!("gui: hibernate {}", tile.as_str());
    }
}

/// Main tile and navigation state.
pub struct Gui {
    main: RefCell<MainTile>,
    nav: RefCell<Navigator>,
    utc_offset_s: Cell<i32>,
}

impl Gui {
    /// Blank main tile in focus.
    pub fn new() -> Self {
        Self {
            main: RefCell::new(MainTile::new()),
            nav: RefCell::new(Navigator::new()),
            utc_offset_s: Cell::new(0),
        }
    }

    /// Local time offset for the time label, seconds east of UTC.
    pub fn set_utc_offset(&self, utc_offset_s: i32) {
        self.utc_offset_s.set(utc_offset_s);
    }

    /// Seed the indicators that have no event of their own at boot.
    pub fn sync(&self, alarm_enabled: bool, block_return_maintile: bool) {
        self.main.borrow_mut().set_alarm(alarm_enabled);
        self.nav
            .borrow_mut()
            .set_block_return_maintile(block_return_maintile);
    }

    /// Open `tile` on top of the current one.
    pub fn open(&self, tile: Tile) {
        let change = self.nav.borrow_mut().push(tile);
        self.dispatch(change);
    }

    /// Close the top tile.
    pub fn back(&self) {
        let change = self.nav.borrow_mut().back();
        self.dispatch(change);
    }

    /// Tile in focus.
    pub fn current(&self) -> Tile {
        self.nav.borrow().current()
    }

    /// Borrow the main tile model.
    pub fn main_tile(&self) -> Ref<'_, MainTile> {
        self.main.borrow()
    }

    /// Return and clear the main tile redraw flag.
    pub fn take_dirty(&self) -> bool {
        self.main.borrow_mut().take_dirty()
    }

    fn dispatch(&self, change: Option<ui::FocusChange>) {
        if let Some(change) = change {
            let mut main = self.main.borrow_mut();
            change.dispatch(&mut Focus { main: &mut main });
        }
    }

    fn refresh_time(&self, unix_time: i64) {
        if let Some((hour, minute)) = alarm::local_time(unix_time, self.utc_offset_s.get()) {
            self.main.borrow_mut().set_time(hour, minute);
        }
    }
}

impl Default for Gui {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler<PowerEvent> for Gui {
    fn on_event(&self, event: &PowerEvent) -> bool {
        if *event != PowerEvent::Wakeup {
            return false;
        }
        let change = self.nav.borrow_mut().on_wakeup();
        self.dispatch(change);
        true
    }
}

impl Handler<PowerLoop> for Gui {
    fn on_event(&self, event: &PowerLoop) -> bool {
        self.refresh_time(event.tick.unix_time);
        true
    }
}

impl Handler<MotionEvent> for Gui {
    fn on_event(&self, event: &MotionEvent) -> bool {
        let mut main = self.main.borrow_mut();
        match *event {
            MotionEvent::StepCounter(steps) => main.set_steps(steps),
            MotionEvent::StepCounterReset => main.reset_steps(),
            MotionEvent::DoubleClick | MotionEvent::Tilt => return false,
        }
        true
    }
}

impl Handler<RtcEvent> for Gui {
    fn on_event(&self, event: &RtcEvent) -> bool {
        let mut main = self.main.borrow_mut();
        match event {
            RtcEvent::AlarmEnabled => main.set_alarm(true),
            RtcEvent::AlarmDisabled => main.set_alarm(false),
            _ => return false,
        }
        true
    }
}

impl Handler<DisplayEvent> for Gui {
    fn on_event(&self, event: &DisplayEvent) -> bool {
        let DisplayEvent::BlockReturnMaintile(block) = *event else {
            return false;
        };
        self.nav.borrow_mut().set_block_return_maintile(block);
        true
    }
}

impl Handler<BluetoothEvent> for Gui {
    fn on_event(&self, event: &BluetoothEvent) -> bool {
        match event {
            BluetoothEvent::Connected(_) => self.main.borrow_mut().set_bluetooth(true),
            BluetoothEvent::Disconnected => self.main.borrow_mut().set_bluetooth(false),
            BluetoothEvent::Message(_) => {
                power::debug!("gui: {}", event.as_str());
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use power::{PowerState, Tick};

    fn awake_tick(unix_time: i64) -> PowerLoop {
        PowerLoop {
            state: PowerState::Active,
            tick: Tick { uptime_ms: 0, idle_ms: 0, unix_time },
        }
    }

    #[test]
    fn test_time_label_follows_loop() {
        let gui = Gui::new();
        gui.set_utc_offset(3_600);
        // 2024-01-03 10:00:00 UTC
        gui.on_event(&awake_tick(1_704_276_000));
        assert_eq!(gui.main_tile().time(), "11:00");
    }

    #[test]
    fn test_steps_and_reset() {
        let gui = Gui::new();
        gui.on_event(&MotionEvent::StepCounter(420));
        assert_eq!(gui.main_tile().steps(), 420);
        gui.on_event(&MotionEvent::StepCounterReset);
        assert_eq!(gui.main_tile().steps(), 0);
        assert!(!gui.on_event(&MotionEvent::Tilt));
    }

    #[test]
    fn test_alarm_indicator() {
        let gui = Gui::new();
        gui.on_event(&RtcEvent::AlarmEnabled);
        assert!(gui.main_tile().alarm());
        assert!(!gui.on_event(&RtcEvent::AlarmTermSet));
        gui.on_event(&RtcEvent::AlarmDisabled);
        assert!(!gui.main_tile().alarm());
    }

    #[test]
    fn test_wakeup_returns_to_main_unless_blocked() {
        let gui = Gui::new();
        gui.open(Tile::Setup(0));
        gui.on_event(&PowerEvent::Wakeup);
        assert_eq!(gui.current(), Tile::Main);

        gui.on_event(&DisplayEvent::BlockReturnMaintile(true));
        gui.open(Tile::Note);
        gui.take_dirty();
        gui.on_event(&PowerEvent::Wakeup);
        assert_eq!(gui.current(), Tile::Note);
        assert!(!gui.take_dirty());
    }

    #[test]
    fn test_returning_to_main_redraws() {
        let gui = Gui::new();
        gui.open(Tile::App(1));
        gui.take_dirty();
        gui.back();
        assert!(gui.take_dirty());
    }

    #[test]
    fn test_bluetooth_indicator() {
        let gui = Gui::new();
        gui.on_event(&BluetoothEvent::Connected([1, 2, 3, 4, 5, 6]));
        assert!(gui.main_tile().bluetooth());
        gui.on_event(&BluetoothEvent::Disconnected);
        assert!(!gui.main_tile().bluetooth());
    }
}
