mod types;

pub use types::{
    Detection, Reading, Region, RegionReading, RegionStatus, ScoreBounds, SessionStats,
    StatusPolicy,
};

use std::sync::Arc;
use tokio::sync::Mutex;

/// Neutral sensitivity setting; the walk amplitude scales around this value.
const NEUTRAL_SENSITIVITY: f32 = 75.0;

/// Owns the current `Reading` and advances the score as a bounded random
/// walk: each sample nudges the previous score by the detector's delta and
/// the result is clamped into the configured bounds. Out-of-range scores are
/// unrepresentable after an update; there is no error path here.
#[derive(Clone)]
pub struct MetricStore {
    inner: Arc<Mutex<MetricsState>>,
}

struct MetricsState {
    reading: Reading,
    current_detection: Option<String>,
    bounds: ScoreBounds,
    policy: StatusPolicy,
    delta_scale: f32,
    samples: u64,
    score_sum: u64,
    best_score: u8,
}

impl MetricStore {
    pub fn new(bounds: ScoreBounds, policy: StatusPolicy, sensitivity: u8) -> Self {
        let reading = Reading::baseline();
        let best_score = reading.score;
        Self {
            inner: Arc::new(Mutex::new(MetricsState {
                reading,
                current_detection: None,
                bounds,
                policy,
                delta_scale: sensitivity as f32 / NEUTRAL_SENSITIVITY,
                samples: 0,
                score_sum: 0,
                best_score,
            })),
        }
    }

    /// Reset the per-session aggregates. The score itself carries over
    /// between sessions, same as the dashboard keeps showing the last value.
    pub async fn begin_session(&self) {
        let mut state = self.inner.lock().await;
        state.current_detection = None;
        state.samples = 0;
        state.score_sum = 0;
        state.best_score = state.reading.score;
    }

    /// Fold one detector sample into the reading and return the updated
    /// snapshot.
    pub async fn apply_sample(&self, detection: &Detection) -> Reading {
        let mut state = self.inner.lock().await;

        let scaled = detection.score_delta * state.delta_scale;
        let score = state.bounds.clamp(state.reading.score as f32 + scaled);
        state.reading.score = score;
        state.current_detection = Some(detection.label.clone());

        if state.policy == StatusPolicy::FromScore {
            for region in state.reading.regions.iter_mut() {
                let biased = (score as i16 + region.region.bias()).clamp(0, 100) as u8;
                region.status = RegionStatus::classify(biased);
                // Smooth the displayed confidence toward the detector's
                // confidence rather than jumping to it.
                region.confidence =
                    ((region.confidence as u16 * 3 + detection.confidence as u16) / 4) as u8;
            }
        }

        state.samples += 1;
        state.score_sum += score as u64;
        state.best_score = state.best_score.max(score);

        state.reading.clone()
    }

    pub async fn current_reading(&self) -> Reading {
        self.inner.lock().await.reading.clone()
    }

    /// Label of the most recent detection, `None` before the first tick of a
    /// session.
    pub async fn current_detection(&self) -> Option<String> {
        self.inner.lock().await.current_detection.clone()
    }

    pub async fn session_stats(&self) -> SessionStats {
        let state = self.inner.lock().await;
        let avg_score = if state.samples == 0 {
            0.0
        } else {
            state.score_sum as f32 / state.samples as f32
        };
        SessionStats {
            samples: state.samples,
            avg_score,
            best_score: state.best_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(delta: f32) -> Detection {
        Detection {
            label: "Desk Posture".to_string(),
            score_delta: delta,
            confidence: 80,
            advisory: None,
        }
    }

    fn store() -> MetricStore {
        MetricStore::new(ScoreBounds::default(), StatusPolicy::FromScore, 75)
    }

    #[tokio::test]
    async fn score_stays_within_bounds_for_any_delta() {
        let store = store();
        let reading = store.apply_sample(&sample(1000.0)).await;
        assert_eq!(reading.score, 100);
        let reading = store.apply_sample(&sample(-1000.0)).await;
        assert_eq!(reading.score, 60);
        // Clamping is idempotent: another huge push keeps it at the bound.
        let reading = store.apply_sample(&sample(-1000.0)).await;
        assert_eq!(reading.score, 60);
    }

    #[tokio::test]
    async fn walk_moves_by_delta_inside_bounds() {
        let store = store();
        let reading = store.apply_sample(&sample(-5.0)).await;
        assert_eq!(reading.score, 80);
        let reading = store.apply_sample(&sample(3.0)).await;
        assert_eq!(reading.score, 83);
    }

    #[tokio::test]
    async fn static_policy_leaves_regions_untouched() {
        let store = MetricStore::new(ScoreBounds::default(), StatusPolicy::Static, 75);
        let before = store.current_reading().await;
        let after = store.apply_sample(&sample(-1000.0)).await;
        assert_eq!(before.regions, after.regions);
    }

    #[tokio::test]
    async fn from_score_policy_reclassifies_regions() {
        let store = store();
        let reading = store.apply_sample(&sample(-1000.0)).await;
        // Score pinned at 60: even the best-biased region is below Good.
        for region in &reading.regions {
            assert_ne!(region.status, RegionStatus::Good, "{:?}", region.region);
            assert!(region.confidence <= 100);
        }
    }

    #[tokio::test]
    async fn session_stats_track_average_and_best() {
        let store = store();
        store.begin_session().await;
        store.apply_sample(&sample(5.0)).await; // 90
        store.apply_sample(&sample(-10.0)).await; // 80
        let stats = store.session_stats().await;
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.best_score, 90);
        assert!((stats.avg_score - 85.0).abs() < f32::EPSILON);
    }
}
