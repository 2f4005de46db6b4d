//! Property tests for contact routing and the deferred-task scheduler.
//!
//! Validates:
//! 1. Over any contact sequence, a chip is reported landed at most once, at
//!    the first sensor it touched, and gets no peg hit after that
//! 2. The scheduler fires tasks in (tick, scheduling order) and cancellation
//!    drops exactly the cancelled chip's tasks

use std::collections::HashMap;

use plinko_engine::chip::{Chip, ChipRegistry};
use plinko_engine::clock::Scheduler;
use plinko_engine::prelude::*;
use plinko_engine::physics::Contact;
use plinko_engine::router::{route, Routed};
use proptest::prelude::*;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

const CHIPS: usize = 4;

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Touch {
    Peg,
    Wall,
    Divider,
    Sensor(usize),
    OtherChip(usize),
}

fn touch() -> impl Strategy<Value = Touch> {
    prop_oneof![
        3 => Just(Touch::Peg),
        1 => Just(Touch::Wall),
        1 => Just(Touch::Divider),
        2 => (0usize..9).prop_map(Touch::Sensor),
        1 => (0usize..CHIPS).prop_map(Touch::OtherChip),
    ]
}

/// Steps of contacts: `(chip, what it touched, chip on side b)`.
fn contact_steps() -> impl Strategy<Value = Vec<Vec<(usize, Touch, bool)>>> {
    prop::collection::vec(
        prop::collection::vec((0usize..CHIPS, touch(), any::<bool>()), 0..8),
        1..40,
    )
}

fn falling_chip(reg: &mut ChipRegistry) -> ChipId {
    let id = reg.allocate();
    reg.insert(Chip {
        id,
        body: RigidBodyHandle::invalid(),
        collider: ColliderHandle::invalid(),
        mode: DropMode::Physics,
        target_slot: None,
        steering: None,
        landed: false,
        created_at: 0.0,
        last_position: Point { x: 0.0, y: 0.0 },
        stuck_since: None,
    });
    id
}

fn contact(chip: ChipId, touch: Touch, ids: &[ChipId], flip: bool) -> Contact {
    let other = match touch {
        Touch::Peg => BodyTag::Peg,
        Touch::Wall => BodyTag::Wall,
        Touch::Divider => BodyTag::Divider,
        Touch::Sensor(slot) => BodyTag::SlotSensor(slot),
        Touch::OtherChip(i) => BodyTag::Chip(ids[i]),
    };
    let me = BodyTag::Chip(chip);
    if flip {
        Contact { a: other, b: me }
    } else {
        Contact { a: me, b: other }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn each_chip_lands_once_at_its_first_sensor(steps in contact_steps()) {
        let mut reg = ChipRegistry::new();
        let ids: Vec<ChipId> = (0..CHIPS).map(|_| falling_chip(&mut reg)).collect();
        let mut first_sensor: HashMap<ChipId, usize> = HashMap::new();
        let mut landed: HashMap<ChipId, usize> = HashMap::new();

        for step in steps {
            let contacts: Vec<Contact> = step
                .iter()
                .map(|&(i, t, flip)| contact(ids[i], t, &ids, flip))
                .collect();
            for &(i, t, _) in &step {
                if let Touch::Sensor(slot) = t {
                    first_sensor.entry(ids[i]).or_insert(slot);
                }
            }

            for routed in route(&contacts, &mut reg) {
                match routed {
                    Routed::PegHit(id) => {
                        prop_assert!(!landed.contains_key(&id), "{} hit after landing", id);
                    }
                    Routed::Landed { chip, slot } => {
                        prop_assert!(landed.insert(chip, slot).is_none(), "{} landed twice", chip);
                    }
                }
            }
            for id in landed.keys() {
                prop_assert!(reg.get(*id).is_some_and(|c| c.landed));
            }
        }
        prop_assert_eq!(landed, first_sensor);
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Op {
    Schedule { delay: u64, chip: u32 },
    Cancel(u32),
    Advance(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u64..10, 0u32..5).prop_map(|(delay, chip)| Op::Schedule { delay, chip }),
        1 => (0u32..5).prop_map(Op::Cancel),
        2 => (0u64..6).prop_map(Op::Advance),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn scheduler_fires_in_tick_then_fifo_order(ops in prop::collection::vec(op(), 1..100)) {
        // Payload is the scheduling sequence number.
        let mut scheduler: Scheduler<u64> = Scheduler::new();
        let mut pending: Vec<(u64, u64, ChipId)> = Vec::new();
        let (mut now, mut seq) = (0u64, 0u64);

        for op in ops {
            match op {
                Op::Schedule { delay, chip } => {
                    let id = ChipId::new(chip, 0);
                    scheduler.schedule(now + delay, id, seq);
                    pending.push((now + delay, seq, id));
                    seq += 1;
                }
                Op::Cancel(chip) => {
                    let id = ChipId::new(chip, 0);
                    let before = pending.len();
                    pending.retain(|&(_, _, owner)| owner != id);
                    prop_assert_eq!(scheduler.cancel_chip(id), before - pending.len());
                    prop_assert_eq!(scheduler.pending_for(id), 0);
                }
                Op::Advance(ticks) => {
                    now += ticks;
                    let fired: Vec<(u64, u64, ChipId)> = scheduler
                        .take_due(now)
                        .into_iter()
                        .map(|t| (t.due, t.task, t.chip))
                        .collect();
                    let mut expected: Vec<_> = pending.iter().copied().filter(|t| t.0 <= now).collect();
                    expected.sort();
                    pending.retain(|t| t.0 > now);
                    prop_assert_eq!(fired, expected);
                }
            }
            prop_assert_eq!(scheduler.len(), pending.len());
        }
    }
}
