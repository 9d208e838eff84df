use crate::constants::MAX_FRAME_STEP_SEC;

/// Per-instance animation clock.
///
/// `elapsed` only grows. The cyclic position is derived from it at read time,
/// so skips and long sessions never accumulate reset error.
#[derive(Clone, Debug, Default)]
pub struct RuntimeClock {
    elapsed: f64,
    last_tick_ms: Option<f64>,
    manual_paused: bool,
    hover_paused: bool,
}

impl RuntimeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.manual_paused || self.hover_paused
    }

    pub fn set_manual_paused(&mut self, paused: bool) {
        self.manual_paused = paused;
    }

    pub fn set_hover_paused(&mut self, paused: bool) {
        self.hover_paused = paused;
    }

    /// Re-anchor the frame delta, e.g. when the loop restarts.
    pub fn reset_anchor(&mut self, now_ms: f64) {
        self.last_tick_ms = Some(now_ms);
    }

    /// Forget the anchor so the next tick only re-anchors.
    pub fn clear_anchor(&mut self) {
        self.last_tick_ms = None;
    }

    /// Advance by the wall-clock delta since the previous tick and return the
    /// clamped step in seconds. The first tick only anchors.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_tick_ms {
            Some(prev) if now_ms.is_finite() => {
                ((now_ms - prev) / 1000.0).clamp(0.0, MAX_FRAME_STEP_SEC)
            }
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_tick_ms = Some(now_ms);
        }
        if !self.is_paused() {
            self.elapsed += dt;
        }
        dt
    }

    /// Jump forward without touching the frame anchor (manual phase skip).
    pub fn advance(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.elapsed += seconds;
        }
    }
}
