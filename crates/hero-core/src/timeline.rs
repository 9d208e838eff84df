//! Phase timeline: turns a cycle time into a discrete phase and progress.

use crate::config::PhaseDurations;
use crate::constants::SKIP_EPSILON_SEC;

/// Narrative stages of the hero loop, in playback order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    ToPrinter,
    Printing,
    ToScanner,
    Scanning,
    ToCube,
    LoopPause,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Idle,
        Phase::ToPrinter,
        Phase::Printing,
        Phase::ToScanner,
        Phase::Scanning,
        Phase::ToCube,
        Phase::LoopPause,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ToPrinter => "toPrinter",
            Phase::Printing => "printing",
            Phase::ToScanner => "toScanner",
            Phase::Scanning => "scanning",
            Phase::ToCube => "toCube",
            Phase::LoopPause => "loopPause",
        }
    }
}

/// A resolved position on the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSample {
    pub phase: Phase,
    /// Normalized position inside `phase`, always in \[0, 1\].
    pub progress: f32,
}

impl PhaseSample {
    pub const START: PhaseSample = PhaseSample {
        phase: Phase::Idle,
        progress: 0.0,
    };
}

#[derive(Clone, Debug)]
pub struct PhaseTimeline {
    durations: [f64; 7],
    offsets: [f64; 7],
    total: f64,
}

impl PhaseTimeline {
    pub fn new(durations: &PhaseDurations) -> Self {
        let mut d = [0.0; 7];
        let mut offsets = [0.0; 7];
        let mut accum = 0.0;
        for phase in Phase::ALL {
            let i = phase.index();
            d[i] = sanitize(durations.get(phase));
            offsets[i] = accum;
            accum += d[i];
        }
        Self {
            durations: d,
            offsets,
            total: accum,
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.total
    }

    pub fn start_of(&self, phase: Phase) -> f64 {
        self.offsets[phase.index()]
    }

    pub fn duration_of(&self, phase: Phase) -> f64 {
        self.durations[phase.index()]
    }

    /// Position of `elapsed` inside the current cycle. Zero for a degenerate
    /// timeline.
    pub fn cycle_time(&self, elapsed: f64) -> f64 {
        if self.total <= 0.0 || !elapsed.is_finite() {
            return 0.0;
        }
        elapsed.rem_euclid(self.total)
    }

    /// Resolve a cycle time into a phase. Scans from the last phase so that an
    /// exact boundary belongs to the later phase. A zero-length cycle always
    /// resolves to the start of idle.
    pub fn resolve(&self, time: f64) -> PhaseSample {
        if !time.is_finite() || self.total <= 0.0 {
            return PhaseSample::START;
        }
        for phase in Phase::ALL.iter().rev().copied() {
            let start = self.start_of(phase);
            let duration = self.duration_of(phase);
            if time >= start {
                let progress = if duration > 0.0 {
                    ((time - start) / duration).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                return PhaseSample {
                    phase,
                    progress: progress as f32,
                };
            }
        }
        PhaseSample::START
    }

    /// Phase whose half-open interval contains `time`; the first phase when
    /// none does.
    pub fn phase_containing(&self, time: f64) -> Phase {
        Phase::ALL
            .iter()
            .copied()
            .find(|p| {
                let start = self.start_of(*p);
                time >= start && time < start + self.duration_of(*p)
            })
            .unwrap_or(Phase::Idle)
    }

    /// How far `elapsed` must advance to land just inside the next phase.
    pub fn skip_delta(&self, elapsed: f64) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        let time = self.cycle_time(elapsed);
        let current = self.phase_containing(time).index();
        let next_start = if current + 1 < Phase::ALL.len() {
            self.offsets[current + 1]
        } else {
            self.total
        };
        let delta = next_start - time;
        if delta <= 0.0 {
            self.total - time + SKIP_EPSILON_SEC
        } else {
            delta + SKIP_EPSILON_SEC
        }
    }
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
