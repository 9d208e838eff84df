// Phase resolution, skipping and clock behaviour.

use hero_core::config::PhaseDurations;
use hero_core::{Phase, PhaseSample, PhaseTimeline, RuntimeClock};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn default_durations_total() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());
    assert!(approx(timeline.total_duration(), 16.2));
    assert!(approx(timeline.start_of(Phase::Printing), 4.5));
    assert!(approx(timeline.start_of(Phase::LoopPause), 15.2));
}

#[test]
fn resolves_phase_boundaries() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());

    let at_start = timeline.resolve(3.0);
    assert_eq!(at_start.phase, Phase::ToPrinter);
    assert_eq!(at_start.progress, 0.0);

    let near_end = timeline.resolve(4.49);
    assert_eq!(near_end.phase, Phase::ToPrinter);
    assert!((near_end.progress - 0.993).abs() < 1e-3);

    let next = timeline.resolve(4.5);
    assert_eq!(next.phase, Phase::Printing);
    assert_eq!(next.progress, 0.0);
}

#[test]
fn skip_lands_just_inside_next_phase() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());
    let delta = timeline.skip_delta(3.75);
    assert!(approx(delta, 0.751));
    let landed = timeline.resolve(timeline.cycle_time(3.75 + delta));
    assert_eq!(landed.phase, Phase::Printing);
    assert!(landed.progress > 0.0 && landed.progress < 0.01);
}

#[test]
fn skip_from_last_phase_wraps_to_idle() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());
    let elapsed = 15.5;
    let landed = timeline.resolve(timeline.cycle_time(elapsed + timeline.skip_delta(elapsed)));
    assert_eq!(landed.phase, Phase::Idle);
}

#[test]
fn every_time_in_cycle_resolves_to_its_containing_phase() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());
    let total = timeline.total_duration();
    let mut t = 0.0;
    while t < total {
        let sample = timeline.resolve(t);
        assert_eq!(sample.phase, timeline.phase_containing(t), "t = {t}");
        assert!((0.0..=1.0).contains(&sample.progress), "t = {t}");
        t += 0.013;
    }
}

#[test]
fn resolve_is_total() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());
    for t in [-5.0, f64::NAN, f64::INFINITY, 1e9] {
        let sample = timeline.resolve(t);
        assert!((0.0..=1.0).contains(&sample.progress));
    }
    assert_eq!(timeline.resolve(-1.0).phase, Phase::Idle);
    assert_eq!(timeline.resolve(f64::NAN).phase, Phase::Idle);
}

#[test]
fn cycle_time_wraps_elapsed() {
    let timeline = PhaseTimeline::new(&PhaseDurations::default());
    assert!(approx(timeline.cycle_time(16.2 + 3.0), 3.0));
    assert!(approx(timeline.cycle_time(16.2 * 10.0 + 0.5), 0.5));
}

#[test]
fn zero_and_invalid_durations_are_skipped() {
    let durations = PhaseDurations {
        idle: 0.0,
        to_printer: -1.0,
        printing: f64::NAN,
        ..PhaseDurations::default()
    };
    let timeline = PhaseTimeline::new(&durations);
    assert_eq!(timeline.duration_of(Phase::ToPrinter), 0.0);
    assert_eq!(timeline.duration_of(Phase::Printing), 0.0);
    assert_eq!(timeline.resolve(0.0).phase, Phase::ToScanner);
}

#[test]
fn degenerate_timeline_holds_idle() {
    let durations = PhaseDurations {
        idle: 0.0,
        to_printer: 0.0,
        printing: 0.0,
        to_scanner: 0.0,
        scanning: 0.0,
        to_cube: 0.0,
        loop_pause: 0.0,
    };
    let timeline = PhaseTimeline::new(&durations);
    assert_eq!(timeline.total_duration(), 0.0);
    assert_eq!(timeline.cycle_time(42.0), 0.0);
    assert_eq!(timeline.skip_delta(42.0), 0.0);
    assert_eq!(timeline.resolve(0.0), PhaseSample::START);
    let held = timeline.resolve(timeline.cycle_time(42.0));
    assert_eq!(held.phase, Phase::Idle);
    assert_eq!(held.progress, 0.0);
}

#[test]
fn clock_first_tick_only_anchors() {
    let mut clock = RuntimeClock::new();
    assert_eq!(clock.tick(5_000.0), 0.0);
    assert_eq!(clock.elapsed(), 0.0);
    clock.tick(5_016.0);
    assert!(approx(clock.elapsed(), 0.016));
}

#[test]
fn clock_clamps_long_frames() {
    let mut clock = RuntimeClock::new();
    clock.tick(0.0);
    let dt = clock.tick(30_000.0);
    assert!(approx(dt, 0.1));
    assert!(approx(clock.elapsed(), 0.1));
    // Time going backwards never rewinds.
    clock.tick(29_000.0);
    assert!(approx(clock.elapsed(), 0.1));
}

#[test]
fn clock_pause_stops_elapsed_until_both_flags_clear() {
    let mut clock = RuntimeClock::new();
    clock.tick(0.0);
    clock.set_manual_paused(true);
    clock.set_hover_paused(true);
    clock.tick(50.0);
    assert_eq!(clock.elapsed(), 0.0);

    clock.set_manual_paused(false);
    clock.tick(100.0);
    assert_eq!(clock.elapsed(), 0.0);

    clock.set_hover_paused(false);
    clock.tick(150.0);
    assert!(approx(clock.elapsed(), 0.05));
}

#[test]
fn clock_advance_ignores_negative_and_non_finite() {
    let mut clock = RuntimeClock::new();
    clock.advance(-3.0);
    clock.advance(f64::NAN);
    assert_eq!(clock.elapsed(), 0.0);
    clock.advance(0.751);
    assert!(approx(clock.elapsed(), 0.751));
}
