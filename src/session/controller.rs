use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use log::info;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::{
    capture::CaptureGate,
    feedback::{FeedbackItem, FeedbackQueue},
    history::{SessionLog, SessionRecord},
    metrics::{MetricStore, RegionReading},
    sampling::{DetectionSource, SamplerContext, SamplerController},
    settings::EngineSettings,
};

use super::{SessionState, SessionStatus};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What presentation surfaces poll: the session counters plus the latest
/// reading and advisory window in one consistent shape.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub elapsed_secs: u64,
    pub score: u8,
    pub regions: Vec<RegionReading>,
    pub current_detection: Option<String>,
    pub feedback: Vec<FeedbackItem>,
}

/// Push side of the read contract. Sends are fire-and-forget; a surface
/// that lags simply misses events and re-polls a snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    StateChanged {
        status: SessionStatus,
        elapsed_secs: u64,
    },
    ScoreUpdated {
        score: u8,
    },
    FeedbackIssued {
        message: String,
    },
    Heartbeat {
        elapsed_secs: u64,
        score: u8,
    },
    SessionCompleted {
        record: SessionRecord,
    },
    CapabilityDenied {
        reason: String,
    },
}

/// Orchestrates one posture session at a time: owns the session state and
/// metric store, arms the sampler on start and guarantees it is fully
/// disarmed before any restart.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    metrics: MetricStore,
    feedback: FeedbackQueue,
    capture: CaptureGate,
    history: SessionLog,
    detector: Arc<Mutex<Box<dyn DetectionSource>>>,
    sampler: Arc<Mutex<SamplerController>>,
    events: broadcast::Sender<EngineEvent>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl SessionController {
    pub fn new(settings: &EngineSettings, detector: Box<dyn DetectionSource>) -> Self {
        let debug_mode = std::env::var("POSTURA_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            metrics: MetricStore::new(
                settings.score_bounds(),
                settings.status_policy,
                settings.sensitivity,
            ),
            feedback: FeedbackQueue::new(settings.feedback_window),
            capture: CaptureGate::new(),
            history: SessionLog::new(),
            detector: Arc::new(Mutex::new(detector)),
            sampler: Arc::new(Mutex::new(SamplerController::new())),
            events,
            tick_interval: Duration::from_millis(settings.tick_interval_ms),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub fn capture(&self) -> CaptureGate {
        self.capture.clone()
    }

    pub fn history(&self) -> SessionLog {
        self.history.clone()
    }

    pub fn feedback(&self) -> FeedbackQueue {
        self.feedback.clone()
    }

    pub fn metrics(&self) -> MetricStore {
        self.metrics.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let (status, elapsed_secs) = {
            let state = self.state.lock().await;
            (state.status, state.elapsed_secs)
        };
        let reading = self.metrics.current_reading().await;
        let current_detection = self.metrics.current_detection().await;
        let feedback = self.feedback.items().await;

        SessionSnapshot {
            status,
            elapsed_secs,
            score: reading.score,
            regions: reading.regions,
            current_detection,
            feedback,
        }
    }

    /// Refused unless the capture capability is Granted; a refusal leaves
    /// the session Idle and the sampler unarmed.
    pub async fn start_session(&self) -> Result<SessionSnapshot> {
        if let Err(err) = self.capture.ensure_granted() {
            let _ = self.events.send(EngineEvent::CapabilityDenied {
                reason: err.to_string(),
            });
            return Err(err);
        }

        {
            let state = self.state.lock().await;
            if state.status == SessionStatus::Running {
                bail!("session already active");
            }
        }

        let session_id = Uuid::new_v4();
        let started_at = Utc::now();

        {
            let mut state = self.state.lock().await;
            state.begin_session(session_id, started_at);
        }
        self.metrics.begin_session().await;
        self.feedback.clear().await;

        let ctx = SamplerContext {
            state: self.state.clone(),
            metrics: self.metrics.clone(),
            feedback: self.feedback.clone(),
            capture: self.capture.clone(),
            history: self.history.clone(),
            detector: self.detector.clone(),
            events: self.events.clone(),
            tick_interval: self.tick_interval,
            heartbeat_every_ticks: self.heartbeat_every_ticks,
        };

        if let Err(err) = self.sampler.lock().await.start_sampling(ctx) {
            // A refused arm must not leave a Running session behind.
            self.state.lock().await.reset();
            return Err(err);
        }

        info!("session {} started", session_id);
        self.emit_state_changed().await;

        Ok(self.snapshot().await)
    }

    /// Finalize the session into a record. Accepts a session the sampler
    /// already stopped on its own (capability loss); only a fully Idle
    /// controller refuses.
    pub async fn end_session(&self) -> Result<SessionRecord> {
        let stopped_at = Utc::now();

        let (session_id, started_at, duration_secs) = {
            let mut state = self.state.lock().await;
            if state.status == SessionStatus::Idle {
                bail!("no active session to end");
            }
            let session_id = state
                .session_id
                .ok_or_else(|| anyhow!("missing session id"))?;
            let started_at = state.started_at.unwrap_or(stopped_at);
            state.stop();
            (session_id, started_at, state.elapsed_secs)
        };

        self.sampler.lock().await.stop_sampling().await?;

        let stats = self.metrics.session_stats().await;
        let record = SessionRecord {
            id: session_id,
            started_at,
            stopped_at,
            duration_secs,
            avg_score: stats.avg_score,
            best_score: stats.best_score,
            samples: stats.samples,
        };
        self.history.append(record.clone()).await;

        info!(
            "session {} ended after {}s ({} samples)",
            session_id, duration_secs, stats.samples
        );
        self.emit_state_changed().await;
        let _ = self.events.send(EngineEvent::SessionCompleted {
            record: record.clone(),
        });

        Ok(record)
    }

    /// Discard the current session without recording it. Idempotent; calling
    /// with no session is a no-op.
    pub async fn cancel_session(&self) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if state.status == SessionStatus::Idle {
                return Ok(());
            }
            state.reset();
        }

        self.sampler.lock().await.stop_sampling().await?;
        self.emit_state_changed().await;
        Ok(())
    }

    async fn emit_state_changed(&self) {
        let (status, elapsed_secs) = {
            let state = self.state.lock().await;
            (state.status, state.elapsed_secs)
        };
        let _ = self.events.send(EngineEvent::StateChanged {
            status,
            elapsed_secs,
        });
    }
}
