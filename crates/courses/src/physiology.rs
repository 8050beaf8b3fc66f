//! Physiological model for a simulated workout.
//!
//! Every function here is pure: the same course, distance and elapsed time always
//! produce the same numbers, which keeps tick-by-tick snapshots reproducible.

use serde::{Deserialize, Serialize};

use crate::models::CourseDefinition;

pub const DEFAULT_BODY_WEIGHT_KG: f64 = 70.0;

/// Floor applied to simulated speed, km/h.
pub const MIN_SPEED_KMH: f64 = 8.0;

const SPEED_WOBBLE_KMH: f64 = 0.3;
const SPEED_WOBBLE_FREQ: f64 = 0.1;

const HR_MIN: f64 = 60.0;
const HR_MAX: f64 = 185.0;
const HR_WOBBLE_BPM: f64 = 5.0;
const HR_WOBBLE_FREQ: f64 = 0.2;
const WARMUP_FRACTION: f64 = 0.15;
const COOLDOWN_FRACTION: f64 = 0.15;
/// Heart rate reached at the very end of the cool-down.
pub const FINISH_HEART_RATE_BPM: u32 = 130;

const STEPS_PER_METER: f64 = 1.3;

/// All per-tick metrics derived from distance and elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub speed_kmh: f64,
    pub heart_rate_bpm: u32,
    pub calories_kcal: f64,
    pub step_count: u64,
    pub pace_label: String,
}

/// Simulated speed at a point of the course, km/h.
///
/// Base speed comes from the active pace segment, plus a small sinusoidal wobble
/// so the trace does not look machine-flat.
pub fn speed_kmh(course: &CourseDefinition, distance_covered: f64, elapsed_seconds: f64) -> f64 {
    let segment = course.segment_at(distance_covered);
    let base = 60.0 / segment.pace_min_per_km;
    let wobble = SPEED_WOBBLE_KMH * (SPEED_WOBBLE_FREQ * elapsed_seconds).sin();
    (base + wobble).max(MIN_SPEED_KMH)
}

/// Three-phase heart-rate curve: warm-up ramp, speed-driven steady state,
/// cool-down ramp. Always within `[60, 185]` bpm.
pub fn heart_rate_bpm(elapsed_seconds: f64, target_duration: f64, speed_kmh: f64) -> u32 {
    let duration = target_duration.max(f64::MIN_POSITIVE);
    let t = elapsed_seconds.max(0.0);
    let warmup_end = duration * WARMUP_FRACTION;
    let cooldown_start = duration * (1.0 - COOLDOWN_FRACTION);

    let target = if t < warmup_end {
        95.0 + (135.0 - 95.0) * (t / warmup_end)
    } else if t < cooldown_start {
        135.0 + (speed_kmh / 12.0) * 30.0
    } else {
        let fraction = ((t - cooldown_start) / (duration - cooldown_start)).min(1.0);
        155.0 - (155.0 - FINISH_HEART_RATE_BPM as f64) * fraction
    };

    let bpm = target + HR_WOBBLE_BPM * (HR_WOBBLE_FREQ * t).sin();
    let bpm = if bpm.is_nan() { HR_MIN } else { bpm };
    bpm.clamp(HR_MIN, HR_MAX).round() as u32
}

/// MET value for a running speed.
pub fn met_for_speed(speed_kmh: f64) -> f64 {
    if speed_kmh < 8.0 {
        7.0
    } else if speed_kmh < 10.0 {
        9.8
    } else {
        11.5
    }
}

/// Energy spent so far, recomputed from total elapsed time at the current speed
/// tier (not integrated tick by tick).
pub fn calories_kcal(elapsed_seconds: f64, speed_kmh: f64, body_weight_kg: f64) -> f64 {
    met_for_speed(speed_kmh) * body_weight_kg / 3600.0 * elapsed_seconds.max(0.0)
}

pub fn step_count(distance_covered_meters: f64) -> u64 {
    (distance_covered_meters.max(0.0) * STEPS_PER_METER).round() as u64
}

/// Pace for a speed, formatted `mm:ss` per km.
pub fn pace_label(speed_kmh: f64) -> String {
    if !(speed_kmh.is_finite() && speed_kmh > 0.0) {
        return "--:--".to_string();
    }
    let total_seconds = (60.0 / speed_kmh * 60.0).round() as u64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Metrics at a given moment of a run.
///
/// Once `elapsed_seconds` reaches the course's target duration the result is a
/// fixed terminal tuple (average speed over the full course, finish heart rate),
/// so repeated calls after completion are stable.
pub fn metrics_at(
    course: &CourseDefinition,
    distance_covered: f64,
    elapsed_seconds: f64,
    body_weight_kg: f64,
) -> Metrics {
    let target = course.target_duration_seconds();
    if elapsed_seconds >= target {
        return terminal_metrics(course, body_weight_kg);
    }

    let speed = speed_kmh(course, distance_covered, elapsed_seconds);
    Metrics {
        speed_kmh: speed,
        heart_rate_bpm: heart_rate_bpm(elapsed_seconds, target, speed),
        calories_kcal: calories_kcal(elapsed_seconds, speed, body_weight_kg),
        step_count: step_count(distance_covered),
        pace_label: pace_label(speed),
    }
}

/// The fixed metrics reported for a completed course.
pub fn terminal_metrics(course: &CourseDefinition, body_weight_kg: f64) -> Metrics {
    let target = course.target_duration_seconds();
    let average_speed = course.total_distance_meters() / target * 3.6;
    Metrics {
        speed_kmh: average_speed,
        heart_rate_bpm: FINISH_HEART_RATE_BPM,
        calories_kcal: calories_kcal(target, average_speed, body_weight_kg),
        step_count: step_count(course.total_distance_meters()),
        pace_label: pace_label(average_speed),
    }
}
