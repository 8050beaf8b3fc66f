//! Tick controller: a single-run state machine.
//!
//! `Idle -> Running <-> Paused -> Completed`, with `Stopped` reachable from any
//! non-terminal phase through [`TickController::stop`]. All state is mutated
//! inside the controller's own methods; consumers only ever see cloned
//! snapshots carried by [`SimulationEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;

use super::state::{CoachingCue, PaceAdvice, SimulationEvent, SimulationPhase, SimulationState};
use super::summary::SessionSummary;
use crate::config::{PositionSource, SimulationConfig};
use crate::errors::SimulationError;
use crate::geo_math::haversine_distance;
use crate::interpolation::interpolate;
use crate::models::{CourseDefinition, LatLng, Position};
use crate::physiology::{self, Metrics};

/// Courses shorter than this get denser coaching.
const SHORT_COURSE_SECONDS: f64 = 20.0 * 60.0;

/// Seconds of simulated time between coaching cues for a course.
pub fn coaching_interval_seconds(target_duration_seconds: f64) -> u64 {
    if target_duration_seconds < SHORT_COURSE_SECONDS {
        10
    } else {
        15
    }
}

/// Owns at most one active run and advances it tick by tick.
pub struct TickController {
    config: SimulationConfig,
    phase: SimulationPhase,
    run: Option<ActiveRun>,
    last_summary: Option<SessionSummary>,
}

struct ActiveRun {
    state: SimulationState,
    elapsed_ms: u64,
    started_at: OffsetDateTime,
    next_coaching_ms: u64,
    coaching_interval_ms: u64,
    grace_remaining: Option<Duration>,
    auto_stop_sent: bool,
    last_fix: Option<LatLng>,
    max_speed_kmh: f64,
    sampled_seconds: u64,
    heart_rate_samples: Vec<u32>,
    path_samples: Vec<LatLng>,
}

impl TickController {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            phase: SimulationPhase::Idle,
            run: None,
            last_summary: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Latest snapshot of the active (or just-stopped) run.
    pub fn snapshot(&self) -> Option<&SimulationState> {
        self.run.as_ref().map(|r| &r.state)
    }

    /// Summary produced by the most recent [`TickController::stop`].
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Loads `course` and starts running it from zero.
    ///
    /// Fails with [`SimulationError::AlreadyActive`] while another course is
    /// running, paused or awaiting teardown after completion, and with
    /// [`SimulationError::InvalidTickInterval`] when the configured cadence
    /// cannot advance time.
    pub fn start(
        &mut self,
        course: Arc<CourseDefinition>,
    ) -> Result<&SimulationState, SimulationError> {
        if self.phase.is_active() {
            return Err(SimulationError::AlreadyActive);
        }
        self.config.validate()?;

        let start = Position::from(&course.path()[0]);
        let metrics = physiology::metrics_at(&course, 0.0, 0.0, self.config.body_weight_kg);
        let coaching_interval_ms =
            coaching_interval_seconds(course.target_duration_seconds()) * 1000;

        tracing::info!(
            course_id = course.id(),
            target_seconds = course.target_duration_seconds(),
            source = ?self.config.position_source,
            "Simulation started"
        );

        let state = SimulationState {
            course,
            elapsed_seconds: 0.0,
            paused: false,
            position: start.clone(),
            distance_covered_meters: 0.0,
            speed_kmh: metrics.speed_kmh,
            heart_rate_bpm: metrics.heart_rate_bpm,
            calories_kcal: metrics.calories_kcal,
            step_count: metrics.step_count,
            pace_label: metrics.pace_label,
            progress_percent: 0.0,
            completed: false,
        };

        self.phase = SimulationPhase::Running;
        let run = self.run.insert(ActiveRun {
            state,
            elapsed_ms: 0,
            started_at: OffsetDateTime::now_utc(),
            next_coaching_ms: coaching_interval_ms,
            coaching_interval_ms,
            grace_remaining: None,
            auto_stop_sent: false,
            last_fix: None,
            max_speed_kmh: 0.0,
            sampled_seconds: 0,
            heart_rate_samples: vec![metrics.heart_rate_bpm],
            path_samples: vec![start.lat_lng()],
        });
        Ok(&run.state)
    }

    pub fn pause(&mut self) -> Result<(), SimulationError> {
        if self.phase == SimulationPhase::Idle {
            return Err(SimulationError::NoActiveCourse);
        }
        if self.phase != SimulationPhase::Running {
            return Err(SimulationError::NotRunning);
        }
        self.phase = SimulationPhase::Paused;
        if let Some(run) = self.run.as_mut() {
            run.state.paused = true;
            tracing::info!(elapsed = run.state.elapsed_seconds, "Simulation paused");
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SimulationError> {
        if self.phase == SimulationPhase::Idle {
            return Err(SimulationError::NoActiveCourse);
        }
        if self.phase != SimulationPhase::Paused {
            return Err(SimulationError::NotPaused);
        }
        self.phase = SimulationPhase::Running;
        if let Some(run) = self.run.as_mut() {
            run.state.paused = false;
            tracing::info!(elapsed = run.state.elapsed_seconds, "Simulation resumed");
        }
        Ok(())
    }

    /// Stops the run and returns its summary.
    ///
    /// Returns `None` when there is nothing to stop (idle, or already stopped),
    /// so calling it twice is harmless.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        if !self.phase.is_active() {
            return None;
        }
        let run = self.run.as_mut()?;
        let completed = self.phase == SimulationPhase::Completed;
        self.phase = SimulationPhase::Stopped;

        let elapsed = run.state.elapsed_seconds;
        let distance = run.state.distance_covered_meters;
        let avg_speed_kmh = if elapsed > 0.0 {
            distance / elapsed * 3.6
        } else {
            0.0
        };
        let summary = SessionSummary {
            course_id: run.state.course.id().to_string(),
            course_name: run.state.course.name().to_string(),
            distance_meters: distance,
            elapsed_seconds: elapsed,
            avg_speed_kmh,
            max_speed_kmh: run.max_speed_kmh,
            calories_kcal: run.state.calories_kcal,
            heart_rate_samples: run.heart_rate_samples.clone(),
            step_count: run.state.step_count,
            path: run.path_samples.clone(),
            started_at: run.started_at,
            finished_at: OffsetDateTime::now_utc(),
            completed,
        };

        tracing::info!(
            course_id = %summary.course_id,
            distance = summary.distance_meters,
            elapsed = summary.elapsed_seconds,
            completed,
            "Simulation stopped"
        );
        self.last_summary = Some(summary.clone());
        Some(summary)
    }

    /// Clears a stopped run so the controller is `Idle` again.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        if self.phase.is_active() {
            return Err(SimulationError::AlreadyActive);
        }
        self.run = None;
        self.phase = SimulationPhase::Idle;
        Ok(())
    }

    /// Advances the simulation by one cadence step.
    ///
    /// `fix` is the latest GPS sample from the location collaborator, if any;
    /// it is only consulted with [`PositionSource::Live`]. Paused, idle and
    /// stopped controllers ignore ticks entirely.
    pub fn tick(&mut self, fix: Option<LatLng>) -> Vec<SimulationEvent> {
        match self.phase {
            SimulationPhase::Running => self.advance(fix),
            SimulationPhase::Completed => self.count_down_grace(),
            SimulationPhase::Idle | SimulationPhase::Paused | SimulationPhase::Stopped => {
                Vec::new()
            }
        }
    }

    fn advance(&mut self, fix: Option<LatLng>) -> Vec<SimulationEvent> {
        let step_ms = self.config.tick_interval.as_millis() as u64;
        let source = self.config.position_source;
        let weight = self.config.body_weight_kg;
        let grace = self.config.completion_grace;
        let Some(run) = self.run.as_mut() else {
            return Vec::new();
        };

        run.elapsed_ms += step_ms;
        let elapsed = run.elapsed_ms as f64 / 1000.0;
        let course = Arc::clone(&run.state.course);
        let total = course.total_distance_meters();

        let (position, distance, progress) = match source {
            PositionSource::Virtual => {
                let progress = (elapsed / course.target_duration_seconds() * 100.0).min(100.0);
                let position = interpolate(course.path(), progress)
                    .unwrap_or_else(|| run.state.position.clone());
                let distance = position.cumulative_distance_meters;
                (position, distance, progress)
            }
            PositionSource::Live => {
                let mut distance = run.state.distance_covered_meters;
                let mut position = run.state.position.clone();
                match fix.filter(LatLng::is_valid) {
                    Some(sample) => {
                        if let Some(previous) = run.last_fix {
                            distance += haversine_distance(previous, sample);
                        }
                        run.last_fix = Some(sample);
                        position = Position {
                            lat: sample.lat,
                            lng: sample.lng,
                            cumulative_distance_meters: distance,
                            label: None,
                        };
                    }
                    None => tracing::debug!(elapsed, "No location sample; distance not advanced"),
                }
                let progress = if total > 0.0 {
                    (distance / total * 100.0).min(100.0)
                } else {
                    100.0
                };
                (position, distance, progress)
            }
        };

        let metrics: Metrics = if progress >= 100.0 && source == PositionSource::Virtual {
            physiology::terminal_metrics(&course, weight)
        } else {
            physiology::metrics_at(&course, distance, elapsed, weight)
        };

        let state = &mut run.state;
        state.elapsed_seconds = elapsed;
        state.position = position;
        state.distance_covered_meters = distance;
        state.speed_kmh = metrics.speed_kmh;
        state.heart_rate_bpm = metrics.heart_rate_bpm;
        state.calories_kcal = metrics.calories_kcal;
        state.step_count = metrics.step_count;
        state.pace_label = metrics.pace_label;
        state.progress_percent = progress;
        run.max_speed_kmh = run.max_speed_kmh.max(metrics.speed_kmh);

        let whole_seconds = run.elapsed_ms / 1000;
        if whole_seconds > run.sampled_seconds {
            run.sampled_seconds = whole_seconds;
            run.heart_rate_samples.push(state.heart_rate_bpm);
            run.path_samples.push(state.position.lat_lng());
        }

        let mut events = vec![SimulationEvent::Snapshot(state.clone())];

        if run.elapsed_ms >= run.next_coaching_ms {
            run.next_coaching_ms += run.coaching_interval_ms;
            events.push(SimulationEvent::Coaching(coaching_cue(state)));
        }

        if progress >= 100.0 {
            state.completed = true;
            tracing::info!(course_id = course.id(), elapsed, "Course completed");
            events.push(SimulationEvent::Completed(state.clone()));
            run.grace_remaining = Some(grace);
            self.phase = SimulationPhase::Completed;
            if grace.is_zero() {
                run.auto_stop_sent = true;
                events.push(SimulationEvent::AutoStop);
            }
        } else {
            tracing::debug!(elapsed, progress, distance, "Tick");
        }

        events
    }

    fn count_down_grace(&mut self) -> Vec<SimulationEvent> {
        let step = self.config.tick_interval;
        let Some(run) = self.run.as_mut() else {
            return Vec::new();
        };
        if run.auto_stop_sent {
            return Vec::new();
        }
        let remaining = run.grace_remaining.unwrap_or_default().saturating_sub(step);
        run.grace_remaining = Some(remaining);
        if remaining.is_zero() {
            run.auto_stop_sent = true;
            tracing::debug!("Completion grace elapsed; requesting auto-stop");
            return vec![SimulationEvent::AutoStop];
        }
        Vec::new()
    }
}

fn coaching_cue(state: &SimulationState) -> CoachingCue {
    let segment = state.course.segment_at(state.distance_covered_meters);
    let target_speed = segment.target_speed_kmh();
    let advice = PaceAdvice::for_speeds(state.speed_kmh, target_speed);
    let target_pace_label = physiology::pace_label(target_speed);
    let message = match advice {
        PaceAdvice::SpeedUp => format!(
            "{}: pick it up, you are at {} against a {} target",
            segment.description, state.pace_label, target_pace_label
        ),
        PaceAdvice::EaseOff => format!(
            "{}: ease off a little, {} is faster than the {} target",
            segment.description, state.pace_label, target_pace_label
        ),
        PaceAdvice::HoldPace => format!(
            "{}: hold this pace, {} is right on target",
            segment.description, state.pace_label
        ),
    };

    CoachingCue {
        elapsed_seconds: state.elapsed_seconds,
        segment_description: segment.description.clone(),
        pace_label: state.pace_label.clone(),
        target_pace_label,
        advice,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaceSegment, Waypoint};

    fn course(target: f64) -> Arc<CourseDefinition> {
        Arc::new(
            CourseDefinition::new(
                "test",
                "Test",
                1500.0,
                vec![
                    Waypoint::new(37.500, 127.0, 0.0),
                    Waypoint::new(37.505, 127.0, 750.0),
                    Waypoint::new(37.510, 127.0, 1500.0),
                ],
                vec![PaceSegment::new(0.0, 1500.0, 6.0, "Steady")],
                target,
            )
            .unwrap(),
        )
    }

    fn run_ticks(controller: &mut TickController, n: usize) -> Vec<SimulationEvent> {
        (0..n).flat_map(|_| controller.tick(None)).collect()
    }

    #[test]
    fn test_start_resets_state() {
        let mut controller = TickController::new(SimulationConfig::default());
        let state = controller.start(course(540.0)).unwrap();
        assert_eq!(state.elapsed_seconds, 0.0);
        assert_eq!(state.distance_covered_meters, 0.0);
        assert_eq!(controller.phase(), SimulationPhase::Running);
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(540.0)).unwrap();
        assert_eq!(
            controller.start(course(540.0)).unwrap_err(),
            SimulationError::AlreadyActive
        );
    }

    #[test]
    fn test_tick_advances_by_cadence() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(540.0)).unwrap();
        let events = run_ticks(&mut controller, 10);
        assert_eq!(events.len(), 10);
        assert_eq!(controller.snapshot().unwrap().elapsed_seconds, 1.0);
    }

    #[test]
    fn test_halfway_scenario() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(540.0)).unwrap();
        run_ticks(&mut controller, 2700);
        let state = controller.snapshot().unwrap();
        assert_eq!(state.elapsed_seconds, 270.0);
        assert_eq!(state.progress_percent, 50.0);
        assert!((state.distance_covered_meters - 750.0).abs() < 1.0);
    }

    #[test]
    fn test_paused_ticks_do_not_advance() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(540.0)).unwrap();
        run_ticks(&mut controller, 5);
        controller.pause().unwrap();
        assert!(run_ticks(&mut controller, 50).is_empty());
        assert_eq!(controller.snapshot().unwrap().elapsed_seconds, 0.5);
        assert!(controller.snapshot().unwrap().paused);
        controller.resume().unwrap();
        run_ticks(&mut controller, 5);
        assert_eq!(controller.snapshot().unwrap().elapsed_seconds, 1.0);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut controller = TickController::new(SimulationConfig::default());
        assert_eq!(controller.pause().unwrap_err(), SimulationError::NoActiveCourse);
        assert_eq!(controller.resume().unwrap_err(), SimulationError::NoActiveCourse);
        controller.start(course(540.0)).unwrap();
        assert_eq!(controller.resume().unwrap_err(), SimulationError::NotPaused);
        controller.stop();
        assert_eq!(controller.pause().unwrap_err(), SimulationError::NotRunning);
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        let mut config = SimulationConfig::default();
        config.tick_interval = Duration::ZERO;
        let mut controller = TickController::new(config);
        assert_eq!(
            controller.start(course(540.0)).unwrap_err(),
            SimulationError::InvalidTickInterval(Duration::ZERO)
        );
        assert_eq!(controller.phase(), SimulationPhase::Idle);
        assert!(controller.snapshot().is_none());
    }

    #[test]
    fn test_coaching_cadence_short_course() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(540.0)).unwrap();
        let events = run_ticks(&mut controller, 300);
        let cues: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimulationEvent::Coaching(c) => Some(c.elapsed_seconds),
                _ => None,
            })
            .collect();
        assert_eq!(cues, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_coaching_cadence_long_course() {
        assert_eq!(coaching_interval_seconds(1199.0), 10);
        assert_eq!(coaching_interval_seconds(1200.0), 15);
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(1800.0)).unwrap();
        let events = run_ticks(&mut controller, 300);
        let count = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::Coaching(_)))
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_completion_then_auto_stop_after_grace() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(10.0)).unwrap();
        let events = run_ticks(&mut controller, 100);
        assert!(matches!(events.last(), Some(SimulationEvent::Completed(_))));
        assert_eq!(controller.phase(), SimulationPhase::Completed);

        // 3 s grace at 100 ms per tick
        assert!(run_ticks(&mut controller, 29).is_empty());
        assert_eq!(run_ticks(&mut controller, 1), vec![SimulationEvent::AutoStop]);
        assert!(run_ticks(&mut controller, 10).is_empty());

        let summary = controller.stop().unwrap();
        assert!(summary.completed);
        assert_eq!(summary.distance_meters, 1500.0);
        assert_eq!(summary.elapsed_seconds, 10.0);
        assert_eq!(summary.heart_rate_samples.len(), 11);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut controller = TickController::new(SimulationConfig::default());
        assert!(controller.stop().is_none());
        controller.start(course(540.0)).unwrap();
        run_ticks(&mut controller, 20);
        let summary = controller.stop().unwrap();
        assert!(!summary.completed);
        assert!(controller.stop().is_none());
        assert!(run_ticks(&mut controller, 10).is_empty());
        assert_eq!(controller.last_summary(), Some(&summary));
    }

    #[test]
    fn test_restart_after_stop() {
        let mut controller = TickController::new(SimulationConfig::default());
        controller.start(course(540.0)).unwrap();
        run_ticks(&mut controller, 20);
        controller.stop();
        let state = controller.start(course(600.0)).unwrap();
        assert_eq!(state.elapsed_seconds, 0.0);
        assert_eq!(state.course.target_duration_seconds(), 600.0);
    }

    #[test]
    fn test_live_mode_skips_missing_samples() {
        let mut controller = TickController::new(SimulationConfig::live());
        controller.start(course(540.0)).unwrap();
        controller.tick(Some(LatLng::new(37.500, 127.0)));
        controller.tick(None);
        controller.tick(Some(LatLng::new(37.501, 127.0)));
        let after_two_fixes = controller.snapshot().unwrap().distance_covered_meters;
        assert!((after_two_fixes - 111.2).abs() < 1.0);

        controller.tick(None);
        controller.tick(Some(LatLng::new(f64::NAN, 127.0)));
        let state = controller.snapshot().unwrap();
        assert_eq!(state.distance_covered_meters, after_two_fixes);
        assert!((state.elapsed_seconds - 0.5).abs() < 1e-9);
    }
}
