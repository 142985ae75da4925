use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Running,
    Stopped,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

/// Pure session counter: elapsed seconds advance one per tick while Running.
/// Stopping freezes the counter without resetting it; only the next
/// `begin_session` clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_secs: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            session_id: None,
            started_at: None,
            elapsed_secs: 0,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn begin_session(&mut self, session_id: Uuid, started_at: DateTime<Utc>) {
        *self = Self {
            status: SessionStatus::Running,
            session_id: Some(session_id),
            started_at: Some(started_at),
            elapsed_secs: 0,
        };
    }

    /// Advance the counter by one second if Running; no-op otherwise.
    /// Returns the current elapsed value either way.
    pub fn tick(&mut self) -> u64 {
        if self.status == SessionStatus::Running {
            self.elapsed_secs += 1;
        }
        self.elapsed_secs
    }

    pub fn stop(&mut self) {
        self.status = SessionStatus::Stopped;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_count_only_while_running() {
        let mut state = SessionState::new();
        assert_eq!(state.tick(), 0);

        state.begin_session(Uuid::new_v4(), Utc::now());
        assert_eq!(state.tick(), 1);
        assert_eq!(state.tick(), 2);
        assert_eq!(state.tick(), 3);

        state.stop();
        assert_eq!(state.tick(), 3);
        assert_eq!(state.elapsed_secs, 3);
    }

    #[test]
    fn begin_resets_elapsed() {
        let mut state = SessionState::new();
        state.begin_session(Uuid::new_v4(), Utc::now());
        state.tick();
        state.tick();

        state.begin_session(Uuid::new_v4(), Utc::now());
        assert_eq!(state.elapsed_secs, 0);
        assert!(state.is_active());
    }

    #[test]
    fn stop_preserves_elapsed_and_identity() {
        let mut state = SessionState::new();
        let id = Uuid::new_v4();
        state.begin_session(id, Utc::now());
        state.tick();
        state.stop();

        assert_eq!(state.status, SessionStatus::Stopped);
        assert_eq!(state.elapsed_secs, 1);
        assert_eq!(state.session_id, Some(id));

        state.reset();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.session_id, None);
    }
}
