use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{CourseDefinition, Position};

/// Lifecycle of a [`super::TickController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationPhase {
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl SimulationPhase {
    /// Phases in which a course is loaded and not yet torn down.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SimulationPhase::Running | SimulationPhase::Paused | SimulationPhase::Completed
        )
    }
}

/// Read-only snapshot of a run, published after every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    pub course: Arc<CourseDefinition>,
    pub elapsed_seconds: f64,
    pub paused: bool,
    pub position: Position,
    pub distance_covered_meters: f64,
    pub speed_kmh: f64,
    pub heart_rate_bpm: u32,
    pub calories_kcal: f64,
    pub step_count: u64,
    pub pace_label: String,
    pub progress_percent: f64,
    pub completed: bool,
}

/// Direction a coaching cue nudges the athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceAdvice {
    SpeedUp,
    EaseOff,
    HoldPace,
}

impl PaceAdvice {
    /// Compares current speed with a segment's target speed using a ±5% band.
    pub fn for_speeds(current_kmh: f64, target_kmh: f64) -> Self {
        let ratio = current_kmh / target_kmh;
        if ratio < 0.95 {
            PaceAdvice::SpeedUp
        } else if ratio > 1.05 {
            PaceAdvice::EaseOff
        } else {
            PaceAdvice::HoldPace
        }
    }
}

/// Periodic coaching feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachingCue {
    pub elapsed_seconds: f64,
    pub segment_description: String,
    pub pace_label: String,
    pub target_pace_label: String,
    pub advice: PaceAdvice,
    pub message: String,
}

/// Everything a tick can publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SimulationEvent {
    Snapshot(SimulationState),
    Coaching(CoachingCue),
    /// Final snapshot, published once when progress reaches 100%.
    Completed(SimulationState),
    /// Fired once after the completion grace window; consumers tear down here.
    AutoStop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_advice_band() {
        assert_eq!(PaceAdvice::for_speeds(9.0, 10.0), PaceAdvice::SpeedUp);
        assert_eq!(PaceAdvice::for_speeds(10.4, 10.0), PaceAdvice::HoldPace);
        assert_eq!(PaceAdvice::for_speeds(11.0, 10.0), PaceAdvice::EaseOff);
    }

    #[test]
    fn test_active_phases() {
        assert!(!SimulationPhase::Idle.is_active());
        assert!(SimulationPhase::Paused.is_active());
        assert!(SimulationPhase::Completed.is_active());
        assert!(!SimulationPhase::Stopped.is_active());
    }
}
