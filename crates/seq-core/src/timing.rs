//! Beat timing and small interpolation helpers.
//!
//! Everything here takes explicit `now_ms` timestamps instead of reading a
//! wall clock, so the web frontend can feed `performance.now()` while tests
//! feed plain numbers.

use glam::Vec2;

use crate::constants::{MIN_BPM, MAX_CATCHUP_BEATS};

/// Milliseconds between beats at `bpm`. Non-positive inputs are treated as
/// [`MIN_BPM`] rather than producing an infinite or negative interval.
pub fn beat_interval_ms(bpm: f32) -> f64 {
    60_000.0 / f64::from(bpm.max(MIN_BPM))
}

/// Move `current` a fixed fraction of the remaining distance toward `target`.
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

pub fn approach_vec2(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

/// Clamp a divider position to the 0..=100 percent range.
pub fn clamp_percent(percent: f32) -> f32 {
    percent.clamp(0.0, 100.0)
}

/// Clamp a gain/opacity value to the 0..=1 range.
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Counts whole beats against an injected clock.
///
/// The interval timer that drives playback can fire late (background tabs are
/// throttled hard), so callers ask for `due_beats` and run one tick per beat
/// that actually elapsed. Catch-up is capped; beyond the cap the clock rebases
/// instead of replaying a long sleep.
#[derive(Clone, Debug)]
pub struct BeatClock {
    interval_ms: f64,
    origin_ms: f64,
    consumed: u64,
}

impl BeatClock {
    pub fn new(bpm: f32, now_ms: f64) -> Self {
        Self {
            interval_ms: beat_interval_ms(bpm),
            origin_ms: now_ms,
            consumed: 0,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Fractional beats since the clock (re)started.
    pub fn beats_elapsed(&self, now_ms: f64) -> f64 {
        ((now_ms - self.origin_ms) / self.interval_ms).max(0.0)
    }

    /// Whole beats that have elapsed but not yet been handed out.
    pub fn due_beats(&mut self, now_ms: f64) -> u32 {
        let elapsed = self.beats_elapsed(now_ms).floor() as u64;
        if elapsed <= self.consumed {
            return 0;
        }
        let due = elapsed - self.consumed;
        if due > u64::from(MAX_CATCHUP_BEATS) {
            // Too far behind; skip ahead instead of replaying every beat.
            self.consumed = elapsed;
            return MAX_CATCHUP_BEATS;
        }
        self.consumed = elapsed;
        due as u32
    }

    pub fn restart(&mut self, now_ms: f64) {
        self.origin_ms = now_ms;
        self.consumed = 0;
    }

    pub fn set_bpm(&mut self, bpm: f32, now_ms: f64) {
        self.interval_ms = beat_interval_ms(bpm);
        self.restart(now_ms);
    }
}

/// Trailing-edge debounce polled from the frame loop.
///
/// `trigger` marks activity; `poll` reports `true` once after `quiet_ms` of
/// silence. Used for resize handling, where re-measuring layout on every
/// event would thrash.
#[derive(Clone, Debug)]
pub struct Debounce {
    quiet_ms: f64,
    armed_at: Option<f64>,
}

impl Debounce {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms,
            armed_at: None,
        }
    }

    pub fn trigger(&mut self, now_ms: f64) {
        self.armed_at = Some(now_ms);
    }

    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.armed_at {
            Some(at) if now_ms - at >= self.quiet_ms => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Leading-edge rate limiter. `ready` passes the first call immediately and
/// then at most one call per `min_gap_ms`. Used to thin out pointermove
/// bursts while a divider drag is live.
#[derive(Clone, Debug)]
pub struct Throttle {
    min_gap_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(min_gap_ms: f64) -> Self {
        Self {
            min_gap_ms,
            last_ms: None,
        }
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.min_gap_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    /// Forget the last pass so the next `ready` fires immediately.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
