//! Bluetooth adapter: inbox draining, state tracking, power hooks.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use power::{
    Event, EventMask, Handler, PowerEvent, PowerLoop, PowerManager, PowerRequest, PowerRequests,
    Registry, RegistryError,
};

use crate::event::BluetoothEvent;
use crate::state::BluetoothState;

/// Notifications the inbox holds before the BLE stack starts dropping.
pub const INBOX_DEPTH: usize = 8;

/// Listener capacity of the bluetooth registry.
pub const BLUETOOTH_LISTENERS: usize = 8;

/// Bounded queue from the BLE stack context to the main loop.
pub type Inbox = Channel<CriticalSectionRawMutex, BluetoothEvent, INBOX_DEPTH>;

/// Radio owner on the main-loop side.
pub struct Bluetooth<'a> {
    inbox: &'a Inbox,
    requests: &'a PowerRequests,
    state: Cell<BluetoothState>,
    listeners: Registry<'a, BluetoothEvent, BLUETOOTH_LISTENERS>,
}

impl<'a> Bluetooth<'a> {
    /// Drain `inbox`; messages queue wake requests on `requests`.
    pub fn new(inbox: &'a Inbox, requests: &'a PowerRequests) -> Self {
        Self {
            inbox,
            requests,
            state: Cell::new(BluetoothState::new()),
            listeners: Registry::new("blectl"),
        }
    }

    /// Post a notification from the BLE stack context. Returns `false` and
    /// drops the event when the inbox is full.
    pub fn post(inbox: &Inbox, event: BluetoothEvent) -> bool {
        inbox.try_send(event).is_ok()
    }

    /// Transitions, plus the loop in every state.
    pub fn register_power(&'a self, manager: &PowerManager<'a>) -> Result<(), RegistryError> {
        manager.register(PowerEvent::TRANSITIONS, self, "blectl")?;
        manager.register_loop(PowerEvent::TRANSITIONS, self, "blectl loop")
    }

    /// Subscribe to bluetooth events.
    pub fn register(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<BluetoothEvent>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        self.listeners.register(mask, handler, id)
    }

    /// Current connection state.
    pub fn state(&self) -> BluetoothState {
        self.state.get()
    }

    /// Handle at most one queued notification. Returns `true` if one was
    /// handled.
    pub fn service(&self) -> bool {
        let Ok(event) = self.inbox.try_receive() else {
            return false;
        };
        let mut state = self.state.get();
        match &event {
            BluetoothEvent::Connected(address) => state.on_connected(*address),
            BluetoothEvent::Disconnected => state.on_disconnected(),
            BluetoothEvent::Message(payload) => {
                power::debug!("blectl: message, {} bytes", payload.len());
                self.requests.raise(PowerRequest::Wakeup);
            }
        }
        self.state.set(state);
        power::info!("blectl: {}", event.as_str());
        self.listeners.send(&event);
        true
    }
}

impl Handler<PowerEvent> for Bluetooth<'_> {
    fn on_event(&self, event: &PowerEvent) -> bool {
        let low_power = match event {
            PowerEvent::Standby => true,
            PowerEvent::Wakeup | PowerEvent::SilenceWakeup => false,
            PowerEvent::EnableInterrupts | PowerEvent::DisableInterrupts => return false,
        };
        let mut state = self.state.get();
        state.set_low_power(low_power);
        self.state.set(state);
        true
    }
}

impl Handler<PowerLoop> for Bluetooth<'_> {
    fn on_event(&self, _event: &PowerLoop) -> bool {
        self.service()
    }
}
