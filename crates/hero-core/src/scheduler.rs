//! Per-frame scheduling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle for a scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub i32);

/// Host primitive that runs a callback once before the next repaint with a
/// millisecond timestamp (`requestAnimationFrame` in the browser).
pub trait FrameScheduler {
    fn schedule_frame(&self, callback: Box<dyn FnOnce(f64)>) -> FrameToken;
    fn cancel(&self, token: FrameToken);
}

struct LoopState {
    scheduler: Rc<dyn FrameScheduler>,
    step: RefCell<Box<dyn FnMut(f64) -> bool>>,
    alive: Cell<bool>,
    pending: Cell<Option<FrameToken>>,
}

/// Self-rescheduling frame loop.
///
/// `step` runs once per frame and returns whether the loop should continue.
/// A callback that was already queued when [`FrameLoop::stop`] ran still
/// fires on some hosts; it checks the alive flag first and does nothing.
pub struct FrameLoop {
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn start(scheduler: Rc<dyn FrameScheduler>, step: impl FnMut(f64) -> bool + 'static) -> Self {
        let state = Rc::new(LoopState {
            scheduler,
            step: RefCell::new(Box::new(step)),
            alive: Cell::new(true),
            pending: Cell::new(None),
        });
        request_frame(&state);
        Self { state }
    }

    pub fn is_running(&self) -> bool {
        self.state.alive.get()
    }

    pub fn stop(&self) {
        self.state.alive.set(false);
        if let Some(token) = self.state.pending.take() {
            self.state.scheduler.cancel(token);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(state: &Rc<LoopState>) {
    let next = Rc::clone(state);
    let token = state.scheduler.schedule_frame(Box::new(move |now| {
        if !next.alive.get() {
            return;
        }
        next.pending.set(None);
        let keep_going = match next.step.try_borrow_mut() {
            Ok(mut step) => step(now),
            Err(_) => true,
        };
        if keep_going && next.alive.get() {
            request_frame(&next);
        } else {
            next.alive.set(false);
        }
    }));
    if state.alive.get() {
        state.pending.set(Some(token));
    }
}
