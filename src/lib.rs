mod capture;
mod exercises;
mod feedback;
mod history;
mod metrics;
mod progress;
mod registry;
mod sampling;
mod session;
mod settings;
mod utils;

pub use capture::{CaptureCapability, CaptureGate};
pub use exercises::{CategorySummary, Difficulty, Exercise, ExerciseLibrary, Routine};
pub use feedback::{FeedbackItem, FeedbackQueue, DEFAULT_FEEDBACK_WINDOW};
pub use history::{DetectionShare, HistorySummary, SessionLog, SessionRecord};
pub use metrics::{
    Detection, MetricStore, Reading, Region, RegionReading, RegionStatus, ScoreBounds,
    SessionStats, StatusPolicy,
};
pub use progress::{Achievement, Goal, ProgressTracker, Rarity};
pub use registry::{AnalyzerModel, ModelRegistry, ModelStatus};
pub use sampling::{
    analyze_frame, DetectionSource, HeuristicDetectionSource, LandmarkFrame, MockDetectionSource,
    PostureIssue, ADVISORY_CATALOG, POSTURE_CATALOG,
};
pub use session::{
    EngineEvent, SessionController, SessionSnapshot, SessionState, SessionStatus,
};
pub use settings::{EngineSettings, SettingsStore};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

/// Hero-stat row of the dashboard in one struct.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub posture_score: u8,
    pub sessions_today: usize,
    pub active_alerts: usize,
    pub streak_days: u32,
}

/// Top-level wiring of the engine: the session controller plus the catalogs
/// the other dashboard tabs read. One instance per embedding application.
pub struct PostureApp {
    session: SessionController,
    registry: ModelRegistry,
    exercises: ExerciseLibrary,
    progress: ProgressTracker,
    settings: SettingsStore,
}

impl PostureApp {
    pub fn new(settings: SettingsStore, detector: Box<dyn DetectionSource>) -> Self {
        let engine = settings.engine();
        Self {
            session: SessionController::new(&engine, detector),
            registry: ModelRegistry::new(),
            exercises: ExerciseLibrary::new(),
            progress: ProgressTracker::new(),
            settings,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn exercises(&self) -> &ExerciseLibrary {
        &self.exercises
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub async fn start_analysis(&self) -> Result<SessionSnapshot> {
        self.session.start_session().await
    }

    /// End the session and fold the result into goals and achievements.
    pub async fn stop_analysis(&self) -> Result<SessionRecord> {
        let record = self.session.end_session().await?;
        let streak = self.session.history().summary().await.streak_days;
        self.progress.record_session(&record, streak);
        Ok(record)
    }

    /// Finish the in-progress exercise and credit the completion goal.
    pub fn complete_exercise(&self) -> Result<chrono::Duration> {
        let elapsed = self.exercises.complete_exercise()?;
        self.progress.record_exercise();
        Ok(elapsed)
    }

    pub async fn dashboard_stats(&self) -> DashboardStats {
        let snapshot = self.session.snapshot().await;
        let history = self.session.history();
        let summary = history.summary().await;
        let sessions_today = history.sessions_on(Utc::now().date_naive()).await;
        let active_alerts = if self.settings.engine().alerts_enabled {
            self.session.feedback().len().await
        } else {
            0
        };

        DashboardStats {
            posture_score: snapshot.score,
            sessions_today,
            active_alerts,
            streak_days: summary.streak_days,
        }
    }
}
