// Visibility gate: creation, pause/resume and the running cap.

use hero_core::{GateState, HeroControls, VisibilityGate};
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

type Journal = Rc<RefCell<Vec<String>>>;

/// Records every call it receives in a shared journal.
struct FakeHero {
    id: u32,
    journal: Journal,
}

impl HeroControls for FakeHero {
    fn pause(&self) {
        self.journal.borrow_mut().push(format!("pause {}", self.id));
    }

    fn resume(&self) {
        self.journal.borrow_mut().push(format!("resume {}", self.id));
    }

    fn destroy(&self) {
        self.journal.borrow_mut().push(format!("destroy {}", self.id));
    }
}

fn gate(cap: usize) -> (VisibilityGate<u32, FakeHero>, Journal) {
    let journal: Journal = Rc::default();
    let log = Rc::clone(&journal);
    let gate = VisibilityGate::with_cap(cap, move |id: &u32| {
        log.borrow_mut().push(format!("create {id}"));
        FakeHero {
            id: *id,
            journal: Rc::clone(&log),
        }
    });
    (gate, journal)
}

fn registered(ids: &[u32]) -> (VisibilityGate<u32, FakeHero>, Journal) {
    let (mut gate, journal) = gate(2);
    for id in ids {
        gate.register(*id);
    }
    (gate, journal)
}

#[test]
fn registered_canvases_start_without_instances() {
    let (gate, journal) = registered(&[1, 2, 3]);
    assert_eq!(gate.state(&1), Some(GateState::NoInstance));
    assert_eq!(gate.state(&9), None);
    assert_eq!(gate.running_count(), 0);
    assert!(journal.borrow().is_empty());
}

#[test]
fn two_visible_at_once_both_run() {
    let (mut gate, journal) = registered(&[1, 2]);
    gate.handle_batch([(1, true), (2, true)]);
    assert_eq!(gate.state(&1), Some(GateState::Running));
    assert_eq!(gate.state(&2), Some(GateState::Running));
    assert_eq!(gate.running_count(), 2);
    assert_eq!(*journal.borrow(), vec!["create 1", "create 2"]);
}

#[test]
fn third_visible_waits_then_takes_the_free_slot() {
    let (mut gate, journal) = registered(&[1, 2, 3]);
    gate.handle_batch([(1, true), (2, true)]);
    gate.handle_batch([(3, true)]);
    assert_eq!(gate.state(&3), Some(GateState::Pending));
    assert!(gate.instance(&3).is_none());

    gate.handle_batch([(1, false)]);
    assert_eq!(gate.state(&1), Some(GateState::Paused));
    assert_eq!(gate.state(&3), Some(GateState::Running));
    assert_eq!(gate.running_count(), 2);
    assert_eq!(
        *journal.borrow(),
        vec!["create 1", "create 2", "pause 1", "create 3"]
    );
}

#[test]
fn paused_instance_resumes_instead_of_recreating() {
    let (mut gate, journal) = registered(&[1]);
    gate.handle_batch([(1, true)]);
    gate.handle_batch([(1, false)]);
    gate.handle_batch([(1, true)]);
    assert_eq!(gate.state(&1), Some(GateState::Running));
    assert_eq!(*journal.borrow(), vec!["create 1", "pause 1", "resume 1"]);
}

#[test]
fn repeated_intersecting_entry_is_a_no_op() {
    let (mut gate, journal) = registered(&[1, 2, 3]);
    gate.handle_batch([(1, true), (2, true)]);
    gate.handle_batch([(1, true)]);
    assert_eq!(gate.state(&1), Some(GateState::Running));
    assert_eq!(journal.borrow().len(), 2);

    // A running record re-reporting must not push it into pending.
    gate.handle_batch([(3, true), (2, true)]);
    assert_eq!(gate.state(&2), Some(GateState::Running));
    assert_eq!(gate.state(&3), Some(GateState::Pending));
}

#[test]
fn leaving_while_pending_clears_the_wait() {
    let (mut gate, _journal) = registered(&[1, 2, 3]);
    gate.handle_batch([(1, true), (2, true), (3, true)]);
    assert_eq!(gate.state(&3), Some(GateState::Pending));
    gate.handle_batch([(3, false)]);
    assert_eq!(gate.state(&3), Some(GateState::NoInstance));

    gate.handle_batch([(2, false)]);
    assert_eq!(gate.state(&3), Some(GateState::NoInstance));
    assert_eq!(gate.running_count(), 1);
}

#[test]
fn pending_records_are_promoted_in_registration_order() {
    let (mut gate, journal) = registered(&[1, 2, 3, 4]);
    gate.handle_batch([(1, true), (2, true)]);
    gate.handle_batch([(4, true), (3, true)]);
    gate.handle_batch([(1, false), (2, false)]);
    assert_eq!(gate.state(&3), Some(GateState::Running));
    assert_eq!(gate.state(&4), Some(GateState::Running));
    let journal = journal.borrow();
    let created: Vec<_> = journal.iter().filter(|e| e.starts_with("create")).collect();
    assert_eq!(created, vec!["create 1", "create 2", "create 3", "create 4"]);
}

#[test]
fn unregistered_target_is_tracked_on_first_notification() {
    let (mut gate, _journal) = gate(2);
    gate.handle_batch([(42, true)]);
    assert_eq!(gate.state(&42), Some(GateState::Running));
}

#[test]
fn never_more_than_cap_running() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    for canvases in 3..=6u32 {
        let ids: Vec<u32> = (0..canvases).collect();
        let (mut gate, _journal) = registered(&ids);
        for _ in 0..400 {
            let batch: Vec<(u32, bool)> = (0..rng.gen_range(1..=canvases))
                .map(|_| (rng.gen_range(0..canvases), rng.gen_bool(0.6)))
                .collect();
            gate.handle_batch(batch);
            assert!(gate.running_count() <= 2);
            // A free slot never coexists with a waiting canvas.
            let pending = ids
                .iter()
                .filter(|id| gate.state(id) == Some(GateState::Pending))
                .count();
            if pending > 0 {
                assert_eq!(gate.running_count(), 2);
            }
        }
    }
}

#[test]
fn destroy_all_destroys_created_instances_only() {
    let (mut gate, journal) = registered(&[1, 2, 3]);
    gate.handle_batch([(1, true), (2, true), (3, true)]);
    gate.destroy_all();
    let journal = journal.borrow();
    let destroyed: Vec<_> = journal.iter().filter(|e| e.starts_with("destroy")).collect();
    assert_eq!(destroyed, vec!["destroy 1", "destroy 2"]);
    assert_eq!(gate.running_count(), 0);
}
