//! Ordered callback registry.
//!
//! A [`Registry`] is a fixed-capacity list of `(mask, handler, id)` entries.
//! [`Registry::send`] walks the list in registration order and calls every
//! handler whose mask intersects the event's bit. Delivery is synchronous:
//! when `send` returns, every matching handler has run.
//!
//! # Capacity and lifetime
//!
//! Storage is an inline array sized by the const parameter `N`, so the
//! registry never allocates and has no drop glue. Subsystems can therefore
//! hold references to each other through their registries while living on
//! the same stack frame. Registering past `N` returns
//! [`RegistryError::Full`]; boot code treats that as fatal (see
//! [`halt`](crate::halt)).
//!
//! # Re-entrancy
//!
//! Handlers may call `send` on any registry, including the one currently
//! delivering: the nested event is fully delivered before the outer walk
//! resumes. Handlers may **not** register on the registry that is
//! delivering; that returns [`RegistryError::Busy`].

use core::cell::{Cell, RefCell};

use crate::error::RegistryError;
use crate::event::{Event, EventMask};

/// A listener callback.
///
/// The return value is advisory: `false` means the handler did not act on
/// the event. It never stops delivery to later listeners.
pub trait Handler<E: Event> {
    /// Handle one event.
    fn on_event(&self, event: &E) -> bool;
}

/// Adapts a closure into a [`Handler`].
///
/// ```
/// use power::{Event, EventMask, FnHandler, Handler};
///
/// struct Ping;
/// impl Event for Ping {
///     fn mask(&self) -> EventMask { EventMask::bit(0) }
///     fn as_str(&self) -> &'static str { "ping" }
/// }
///
/// let h = FnHandler(|_: &Ping| true);
/// assert!(h.on_event(&Ping));
/// ```
pub struct FnHandler<F>(pub F);

impl<E, F> Handler<E> for FnHandler<F>
where
    E: Event,
    F: Fn(&E) -> bool,
{
    fn on_event(&self, event: &E) -> bool {
        (self.0)(event)
    }
}

struct Listener<'a, E: Event> {
    mask: EventMask,
    handler: &'a dyn Handler<E>,
    id: &'static str,
}

// Manual impls: derive would demand `E: Copy`.
impl<E: Event> Clone for Listener<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Event> Copy for Listener<'_, E> {}

/// Fixed-capacity, ordered list of listeners for events of type `E`.
pub struct Registry<'a, E: Event, const N: usize> {
    name: &'static str,
    slots: RefCell<[Option<Listener<'a, E>>; N]>,
    len: Cell<usize>,
}

impl<'a, E: Event, const N: usize> Registry<'a, E, N> {
    /// Create an empty registry. `name` appears in log lines and errors.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: RefCell::new([None; N]),
            len: Cell::new(0),
        }
    }

    /// Append a listener.
    ///
    /// Listeners are called in the order they were registered.
    pub fn register(
        &self,
        mask: EventMask,
        handler: &'a dyn Handler<E>,
        id: &'static str,
    ) -> Result<(), RegistryError> {
        let registry = self.name;
        if mask.is_empty() {
            crate::warn!("{}: '{}' registered with an empty mask", registry, id);
            return Err(RegistryError::EmptyMask { registry, id });
        }
        let Ok(mut slots) = self.slots.try_borrow_mut() else {
            crate::warn!("{}: '{}' registered during delivery", registry, id);
            return Err(RegistryError::Busy { registry, id });
        };
        let len = self.len.get();
        let Some(slot) = slots.get_mut(len) else {
            crate::error!("{}: no room for '{}' ({} listeners)", registry, id, N);
            return Err(RegistryError::Full { registry, id });
        };
        *slot = Some(Listener { mask, handler, id });
        self.len.set(len.saturating_add(1));
        crate::debug!("{}: registered '{}' mask={}", registry, id, mask.bits());
        Ok(())
    }

    /// Deliver `event` to every listener whose mask intersects its bit.
    ///
    /// Returns the number of handlers invoked.
    pub fn send(&self, event: &E) -> usize {
        let bit = event.mask();
        let slots = self.slots.borrow();
        let mut delivered: usize = 0;
        for listener in slots.iter().take(self.len.get()).flatten() {
            if !listener.mask.intersects(bit) {
                continue;
            }
            delivered = delivered.saturating_add(1);
            if !listener.handler.on_event(event) {
                crate::trace!("{}: '{}' ignored {}", self.name, listener.id, event.as_str());
            }
        }
        crate::trace!("{}: {} -> {} listeners", self.name, event.as_str(), delivered);
        delivered
    }

    /// Registry name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.len.get()
    }

    /// `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }

    /// Maximum number of listeners.
    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use std::cell::RefCell as StdRefCell;
    use std::vec::Vec;

    #[derive(Clone, Copy)]
    enum Ping {
        A,
        B,
    }

    impl Event for Ping {
        fn mask(&self) -> EventMask {
            match self {
                Ping::A => EventMask::bit(0),
                Ping::B => EventMask::bit(1),
            }
        }

        fn as_str(&self) -> &'static str {
            match self {
                Ping::A => "a",
                Ping::B => "b",
            }
        }
    }

    struct Recorder<'l> {
        tag: u8,
        log: &'l StdRefCell<Vec<u8>>,
        result: bool,
    }

    impl Handler<Ping> for Recorder<'_> {
        fn on_event(&self, _event: &Ping) -> bool {
            self.log.borrow_mut().push(self.tag);
            self.result
        }
    }

    #[test]
    fn test_send_to_empty_registry_delivers_nothing() {
        let reg: Registry<'_, Ping, 4> = Registry::new("empty");
        assert_eq!(reg.send(&Ping::A), 0);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let log = StdRefCell::new(Vec::new());
        let first = Recorder { tag: 1, log: &log, result: true };
        let second = Recorder { tag: 2, log: &log, result: true };
        let third = Recorder { tag: 3, log: &log, result: true };
        let reg: Registry<'_, Ping, 4> = Registry::new("order");
        reg.register(EventMask::bit(0), &first, "first").unwrap();
        reg.register(EventMask::bit(0), &second, "second").unwrap();
        reg.register(EventMask::bit(0), &third, "third").unwrap();

        assert_eq!(reg.send(&Ping::A), 3);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mask_filters_listeners() {
        let log = StdRefCell::new(Vec::new());
        let only_a = Recorder { tag: 1, log: &log, result: true };
        let only_b = Recorder { tag: 2, log: &log, result: true };
        let both = Recorder { tag: 3, log: &log, result: true };
        let reg: Registry<'_, Ping, 4> = Registry::new("mask");
        reg.register(EventMask::bit(0), &only_a, "a").unwrap();
        reg.register(EventMask::bit(1), &only_b, "b").unwrap();
        reg.register(EventMask::bit(0) | EventMask::bit(1), &both, "ab").unwrap();

        assert_eq!(reg.send(&Ping::B), 2);
        assert_eq!(*log.borrow(), vec![2, 3]);
    }

    #[test]
    fn test_declining_handler_does_not_stop_delivery() {
        let log = StdRefCell::new(Vec::new());
        let declines = Recorder { tag: 1, log: &log, result: false };
        let accepts = Recorder { tag: 2, log: &log, result: true };
        let reg: Registry<'_, Ping, 2> = Registry::new("advisory");
        reg.register(EventMask::bit(0), &declines, "declines").unwrap();
        reg.register(EventMask::bit(0), &accepts, "accepts").unwrap();

        assert_eq!(reg.send(&Ping::A), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_register_past_capacity_is_full() {
        let h = FnHandler(|_: &Ping| true);
        let reg: Registry<'_, Ping, 2> = Registry::new("small");
        reg.register(EventMask::bit(0), &h, "one").unwrap();
        reg.register(EventMask::bit(0), &h, "two").unwrap();
        let err = reg.register(EventMask::bit(0), &h, "three").unwrap_err();
        assert_eq!(err, RegistryError::Full { registry: "small", id: "three" });
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.send(&Ping::A), 2);
    }

    #[test]
    fn test_empty_mask_rejected() {
        let h = FnHandler(|_: &Ping| true);
        let reg: Registry<'_, Ping, 2> = Registry::new("reg");
        let err = reg.register(EventMask::EMPTY, &h, "nothing").unwrap_err();
        assert!(matches!(err, RegistryError::EmptyMask { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_same_handler_registered_twice_runs_twice() {
        let log = StdRefCell::new(Vec::new());
        let r = Recorder { tag: 7, log: &log, result: true };
        let reg: Registry<'_, Ping, 4> = Registry::new("dup");
        reg.register(EventMask::bit(0), &r, "x").unwrap();
        reg.register(EventMask::bit(0), &r, "x").unwrap();
        assert_eq!(reg.send(&Ping::A), 2);
        assert_eq!(*log.borrow(), vec![7, 7]);
    }

    // ---------------------------------------------------------------------------
    // Re-entrancy
    // ---------------------------------------------------------------------------

    struct Relay<'r> {
        target: &'r Registry<'r, Ping, 4>,
        log: &'r StdRefCell<Vec<u8>>,
    }

    impl Handler<Ping> for Relay<'_> {
        fn on_event(&self, event: &Ping) -> bool {
            if matches!(event, Ping::A) {
                self.log.borrow_mut().push(10);
                self.target.send(&Ping::B);
            } else {
                self.log.borrow_mut().push(20);
            }
            true
        }
    }

    #[test]
    fn test_nested_send_completes_before_outer_continues() {
        let log = StdRefCell::new(Vec::new());
        let tail = Recorder { tag: 3, log: &log, result: true };
        let reg: Registry<'_, Ping, 4> = Registry::new("nested");
        let relay = Relay { target: &reg, log: &log };
        reg.register(EventMask::bit(0) | EventMask::bit(1), &relay, "relay").unwrap();
        reg.register(EventMask::bit(0), &tail, "tail").unwrap();

        reg.send(&Ping::A);
        // relay(A) -> relay(B) -> tail(A)
        assert_eq!(*log.borrow(), vec![10, 20, 3]);
    }

    struct SelfRegistering<'r> {
        target: &'r Registry<'r, Ping, 4>,
        extra: &'r FnHandler<fn(&Ping) -> bool>,
        result: &'r StdRefCell<Option<RegistryError>>,
    }

    impl Handler<Ping> for SelfRegistering<'_> {
        fn on_event(&self, _event: &Ping) -> bool {
            let r = self.target.register(EventMask::bit(0), self.extra, "late");
            *self.result.borrow_mut() = r.err();
            true
        }
    }

    #[test]
    fn test_register_during_send_is_busy() {
        fn noop(_: &Ping) -> bool {
            true
        }
        let extra = FnHandler(noop as fn(&Ping) -> bool);
        let result = StdRefCell::new(None);
        let reg: Registry<'_, Ping, 4> = Registry::new("busy");
        let h = SelfRegistering { target: &reg, extra: &extra, result: &result };
        reg.register(EventMask::bit(0), &h, "self").unwrap();

        reg.send(&Ping::A);
        assert_eq!(
            *result.borrow(),
            Some(RegistryError::Busy { registry: "busy", id: "late" })
        );
        assert_eq!(reg.len(), 1);
    }
}
