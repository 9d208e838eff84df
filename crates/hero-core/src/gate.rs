//! Caps how many hero instances animate at once.
//!
//! Every candidate surface gets a record in registration order. Visibility
//! changes arrive in batches; after each batch pending records are promoted
//! in that same order until the cap is reached. Leaving the viewport pauses
//! an instance but keeps it (and its GPU resources) alive.

use crate::constants::MAX_RUNNING_HEROES;
use crate::engine::HeroControls;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    NoInstance,
    Running,
    Paused,
    Pending,
}

struct Record<K, C> {
    key: K,
    instance: Option<C>,
    running: bool,
    pending: bool,
}

impl<K, C> Record<K, C> {
    fn state(&self) -> GateState {
        match (&self.instance, self.running, self.pending) {
            (_, _, true) => GateState::Pending,
            (None, _, _) => GateState::NoInstance,
            (Some(_), true, _) => GateState::Running,
            (Some(_), false, _) => GateState::Paused,
        }
    }
}

pub struct VisibilityGate<K, C> {
    records: Vec<Record<K, C>>,
    cap: usize,
    factory: Box<dyn FnMut(&K) -> C>,
}

impl<K: PartialEq, C: HeroControls> VisibilityGate<K, C> {
    /// Gate with the default cap. `factory` creates an instance the first
    /// time its surface may run.
    pub fn new(factory: impl FnMut(&K) -> C + 'static) -> Self {
        Self::with_cap(MAX_RUNNING_HEROES, factory)
    }

    pub fn with_cap(cap: usize, factory: impl FnMut(&K) -> C + 'static) -> Self {
        Self {
            records: Vec::new(),
            cap,
            factory: Box::new(factory),
        }
    }

    /// Track a surface. Registering twice is a no-op.
    pub fn register(&mut self, key: K) {
        if self.position(&key).is_none() {
            self.records.push(Record {
                key,
                instance: None,
                running: false,
                pending: false,
            });
        }
    }

    /// Apply one batch of `(surface, intersecting)` notifications, then fill
    /// free slots from the pending records.
    pub fn handle_batch(&mut self, entries: impl IntoIterator<Item = (K, bool)>) {
        for (key, intersecting) in entries {
            let index = match self.position(&key) {
                Some(i) => i,
                None => {
                    self.register(key);
                    self.records.len() - 1
                }
            };
            if intersecting {
                self.enter(index);
            } else {
                self.leave(index);
            }
        }
        self.promote_pending();
    }

    fn enter(&mut self, index: usize) {
        if self.records[index].running {
            return;
        }
        if self.running_count() < self.cap {
            self.activate(index);
        } else {
            self.records[index].pending = true;
            log::debug!("[gate] cap reached, hero {index} pending");
        }
    }

    fn leave(&mut self, index: usize) {
        let record = &mut self.records[index];
        if record.running {
            if let Some(instance) = &record.instance {
                instance.pause();
            }
            record.running = false;
        }
        record.pending = false;
    }

    fn activate(&mut self, index: usize) {
        let record = &mut self.records[index];
        match &record.instance {
            Some(instance) => instance.resume(),
            None => {
                record.instance = Some((self.factory)(&record.key));
                log::debug!("[gate] hero {index} created");
            }
        }
        record.running = true;
        record.pending = false;
    }

    fn promote_pending(&mut self) {
        for index in 0..self.records.len() {
            if self.running_count() >= self.cap {
                break;
            }
            let record = &self.records[index];
            if record.pending && !record.running {
                self.activate(index);
            }
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.records.iter().position(|r| &r.key == key)
    }

    pub fn running_count(&self) -> usize {
        self.records.iter().filter(|r| r.running).count()
    }

    pub fn state(&self, key: &K) -> Option<GateState> {
        self.position(key).map(|i| self.records[i].state())
    }

    pub fn instance(&self, key: &K) -> Option<&C> {
        self.position(key)
            .and_then(|i| self.records[i].instance.as_ref())
    }

    /// Destroy every created instance and forget all records.
    pub fn destroy_all(&mut self) {
        for record in self.records.drain(..) {
            if let Some(instance) = record.instance {
                instance.destroy();
            }
        }
    }
}
