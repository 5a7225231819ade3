//! Property-based tests for registry delivery and ISR flag coalescing.
//! Run with: cargo test -p power --test registry_proptest
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use std::cell::RefCell;

use power::{Event, EventMask, Handler, IrqFlag, Registry};

#[derive(Clone, Copy)]
struct Bit(u32);

impl Event for Bit {
    fn mask(&self) -> EventMask {
        EventMask::bit(self.0)
    }

    fn as_str(&self) -> &'static str {
        "bit"
    }
}

struct Recorder<'l> {
    index: usize,
    log: &'l RefCell<Vec<usize>>,
}

impl Handler<Bit> for Recorder<'_> {
    fn on_event(&self, _event: &Bit) -> bool {
        self.log.borrow_mut().push(self.index);
        true
    }
}

#[derive(Clone, Copy, Debug)]
enum IrqOp {
    Raise,
    Take,
}

fn irq_op() -> impl proptest::strategy::Strategy<Value = IrqOp> {
    use proptest::prelude::*;
    prop_oneof![Just(IrqOp::Raise), Just(IrqOp::Take)]
}

proptest::proptest! {
    /// Every listener whose mask covers the event runs exactly once, in
    /// registration order; no other listener runs.
    #[test]
    fn send_reaches_matching_listeners_in_order(
        masks in proptest::collection::vec(1u32..32, 0..16),
        bit in 0u32..5,
    ) {
        let log = RefCell::new(Vec::new());
        let recorders: Vec<Recorder<'_>> = (0..masks.len())
            .map(|index| Recorder { index, log: &log })
            .collect();
        let registry: Registry<'_, Bit, 16> = Registry::new("prop");
        for (mask, recorder) in masks.iter().zip(recorders.iter()) {
            registry.register(EventMask::from_bits(*mask), recorder, "rec").unwrap();
        }

        let delivered = registry.send(&Bit(bit));

        let expected: Vec<usize> = masks
            .iter()
            .enumerate()
            .filter(|(_, m)| *m & (1 << bit) != 0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(*log.borrow(), expected);
        assert_eq!(delivered, expected.len());
    }

    /// Registration never exceeds capacity and reports exactly the overflow.
    #[test]
    fn register_past_capacity_fails_exactly_at_capacity(count in 0usize..12) {
        let log = RefCell::new(Vec::new());
        let recorder = Recorder { index: 0, log: &log };
        let registry: Registry<'_, Bit, 6> = Registry::new("cap");
        let mut accepted = 0;
        for _ in 0..count {
            if registry.register(EventMask::bit(0), &recorder, "rec").is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, count.min(6));
        assert_eq!(registry.len(), count.min(6));
    }

    /// `take` reports true exactly when at least one raise happened since
    /// the previous take.
    #[test]
    fn irq_flag_coalesces_raises(ops in proptest::collection::vec(irq_op(), 0..64)) {
        let flag = IrqFlag::new();
        let mut raised_since_take = false;
        for op in ops {
            match op {
                IrqOp::Raise => {
                    flag.raise();
                    raised_since_take = true;
                }
                IrqOp::Take => {
                    assert_eq!(flag.take(), raised_since_take);
                    raised_since_take = false;
                }
            }
        }
        assert_eq!(flag.take(), raised_since_take);
    }
}
