//! In-memory registry of running simulations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use courses::prelude::*;
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

/// How long a finished session stays retrievable for its summary and GPX.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 60);

/// One simulation started through the API.
pub struct Session {
    pub id: Uuid,
    pub course_id: String,
    pub driver: SimulationDriver,
    latest_cue: Arc<Mutex<Option<CoachingCue>>>,
    finished_at: Arc<Mutex<Option<Instant>>>,
}

impl Session {
    pub fn latest_cue(&self) -> Option<CoachingCue> {
        self.latest_cue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// When the session's event stream closed, i.e. it was stopped or
    /// auto-stopped.
    pub fn finished_at(&self) -> Option<Instant> {
        *self.finished_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, retention: Duration, now: Instant) -> bool {
        self.finished_at()
            .is_some_and(|finished| now.saturating_duration_since(finished) >= retention)
    }
}

/// Sessions keyed by id. Cheap to clone.
///
/// Finished sessions are kept for a retention window and purged on the next
/// registry access after it lapses.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
    config: SimulationConfig,
    retention: Duration,
}

impl SessionRegistry {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_retention(config, DEFAULT_RETENTION)
    }

    pub fn with_retention(config: SimulationConfig, retention: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            retention,
        }
    }

    /// Starts `course` on a fresh driver and registers it.
    pub async fn start(
        &self,
        course: Arc<CourseDefinition>,
        body_weight_kg: Option<f64>,
    ) -> Result<Arc<Session>, SimulationError> {
        let mut config = self.config.clone();
        if let Some(kg) = body_weight_kg {
            config = config.with_body_weight(kg);
        }

        let course_id = course.id().to_string();
        let (driver, events) = SimulationDriver::start(config, course)?;
        let latest_cue = Arc::new(Mutex::new(None));
        let finished_at = Arc::new(Mutex::new(None));
        let id = Uuid::new_v4();
        tokio::spawn(forward_events(
            id,
            events,
            Arc::clone(&latest_cue),
            Arc::clone(&finished_at),
        ));

        let session = Arc::new(Session {
            id,
            course_id,
            driver,
            latest_cue,
            finished_at,
        });
        self.purge_expired().await;
        self.sessions.write().await.insert(id, Arc::clone(&session));
        tracing::info!(session_id = %id, course_id = %session.course_id, "Session started");
        Ok(session)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.purge_expired().await;
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drops finished sessions older than the retention window.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.retention, now));
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "Purged finished sessions");
        }
        removed
    }
}

/// Drains a session's event stream, keeping the latest coaching cue.
async fn forward_events(
    id: Uuid,
    mut events: mpsc::UnboundedReceiver<SimulationEvent>,
    latest_cue: Arc<Mutex<Option<CoachingCue>>>,
    finished_at: Arc<Mutex<Option<Instant>>>,
) {
    while let Some(event) = events.recv().await {
        match event {
            SimulationEvent::Coaching(cue) => {
                tracing::debug!(session_id = %id, advice = ?cue.advice, "{}", cue.message);
                *latest_cue.lock().unwrap_or_else(PoisonError::into_inner) = Some(cue);
            }
            SimulationEvent::Completed(state) => {
                tracing::info!(
                    session_id = %id,
                    elapsed = state.elapsed_seconds,
                    "Session completed"
                );
            }
            SimulationEvent::AutoStop | SimulationEvent::Snapshot(_) => {}
        }
    }
    // the driver's sender is gone: the run was stopped or auto-stopped
    *finished_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    tracing::debug!(session_id = %id, "Session finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_finished_session_is_purged_after_retention() {
        let registry =
            SessionRegistry::with_retention(SimulationConfig::default(), Duration::from_secs(60));
        let course = catalog::course("hangang-riverside").unwrap();
        let session = registry.start(course, None).await.unwrap();
        let id = session.id;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(session.finished_at().is_none());

        session.driver.stop();
        drop(session);
        tokio::time::sleep(Duration::from_secs(30)).await;
        let kept = registry.get(id).await.unwrap();
        assert!(kept.finished_at().is_some());
        assert!(kept.driver.summary().is_some());
        drop(kept);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(registry.get(id).await.is_none());
        assert_eq!(registry.purge_expired().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_sessions_are_never_purged() {
        let registry =
            SessionRegistry::with_retention(SimulationConfig::default(), Duration::from_secs(1));
        let course = catalog::course("namsan-circuit").unwrap();
        let session = registry.start(course, None).await.unwrap();
        session.driver.pause().unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(registry.purge_expired().await, 0);
        assert!(registry.get(session.id).await.is_some());
    }
}
