// Timing tests: beat interval math, the catch-up beat clock and the polled
// debounce/throttle pair.

use glam::Vec2;
use seq_core::constants::MAX_CATCHUP_BEATS;
use seq_core::timing::{
    approach, approach_vec2, beat_interval_ms, clamp_percent, clamp_unit, BeatClock, Debounce,
    Throttle,
};

#[test]
fn beat_interval_follows_the_bpm() {
    assert_eq!(beat_interval_ms(120.0), 500.0);
    assert_eq!(beat_interval_ms(60.0), 1000.0);
    assert_eq!(beat_interval_ms(150.0), 400.0);
}

#[test]
fn beat_interval_guards_non_positive_bpm() {
    let floor = beat_interval_ms(0.0);
    assert!(floor.is_finite(), "zero bpm must not divide to infinity");
    assert_eq!(floor, beat_interval_ms(-30.0));
    assert_eq!(floor, 60_000.0, "guard floor is one beat per minute");
}

#[test]
fn clock_hands_out_each_beat_once() {
    let mut clock = BeatClock::new(120.0, 1_000.0);
    assert_eq!(clock.interval_ms(), 500.0);
    assert_eq!(clock.due_beats(1_000.0), 0);
    assert_eq!(clock.due_beats(1_499.0), 0);
    assert_eq!(clock.due_beats(2_600.0), 3);
    assert_eq!(clock.due_beats(2_700.0), 0, "already consumed");
    assert_eq!(clock.due_beats(3_100.0), 1);
}

#[test]
fn clock_caps_catch_up_after_a_long_stall() {
    let mut clock = BeatClock::new(120.0, 0.0);
    let due = clock.due_beats(60_000.0);
    assert_eq!(due, MAX_CATCHUP_BEATS, "a long stall is capped");
    assert_eq!(
        clock.due_beats(60_100.0),
        0,
        "the skipped beats are not replayed later"
    );
}

#[test]
fn clock_restart_rebases_the_origin() {
    let mut clock = BeatClock::new(120.0, 0.0);
    let _ = clock.due_beats(1_700.0);
    clock.restart(5_000.0);
    assert_eq!(clock.due_beats(5_400.0), 0);
    assert_eq!(clock.due_beats(6_001.0), 2);
    assert!((clock.beats_elapsed(6_001.0) - 2.002).abs() < 1e-9);
}

#[test]
fn clock_bpm_change_takes_effect_immediately() {
    let mut clock = BeatClock::new(120.0, 0.0);
    clock.set_bpm(60.0, 10_000.0);
    assert_eq!(clock.interval_ms(), 1_000.0);
    assert_eq!(clock.due_beats(12_500.0), 2);
}

#[test]
fn debounce_fires_once_after_the_quiet_period() {
    let mut debounce = Debounce::new(150.0);
    assert!(!debounce.poll(100.0), "idle debounce never fires");

    debounce.trigger(0.0);
    assert!(!debounce.poll(100.0));
    assert!(debounce.poll(150.0));
    assert!(!debounce.poll(200.0), "fires only once per trigger");

    debounce.trigger(300.0);
    debounce.trigger(350.0);
    assert!(!debounce.poll(480.0), "re-triggering extends the quiet period");
    assert!(debounce.poll(500.0));
}

#[test]
fn throttle_passes_leading_edge_then_rate_limits() {
    let mut throttle = Throttle::new(50.0);
    assert!(throttle.ready(1_000.0), "first call passes immediately");
    assert!(!throttle.ready(1_010.0));
    assert!(!throttle.ready(1_049.0));
    assert!(throttle.ready(1_050.0));
    assert!(!throttle.ready(1_051.0));
}

#[test]
fn throttle_reset_rearms_the_leading_edge() {
    let mut throttle = Throttle::new(50.0);
    assert!(throttle.ready(0.0));
    assert!(!throttle.ready(10.0));
    throttle.reset();
    assert!(throttle.ready(11.0), "reset forgets the last pass");
}

#[test]
fn approach_moves_a_fixed_fraction() {
    assert_eq!(approach(0.0, 100.0, 0.1), 10.0);
    assert_eq!(approach(90.0, 100.0, 0.5), 95.0);
    let moved = approach_vec2(Vec2::ZERO, Vec2::new(40.0, -20.0), 0.25);
    assert_eq!(moved, Vec2::new(10.0, -5.0));
}

#[test]
fn clamps_pin_to_their_ranges() {
    assert_eq!(clamp_percent(-10.0), 0.0);
    assert_eq!(clamp_percent(55.5), 55.5);
    assert_eq!(clamp_percent(140.0), 100.0);
    assert_eq!(clamp_unit(-0.5), 0.0);
    assert_eq!(clamp_unit(0.25), 0.25);
    assert_eq!(clamp_unit(1.5), 1.0);
}
