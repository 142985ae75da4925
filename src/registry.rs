//! Catalog of the posture analyzer models and their simulated retraining.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const DEFAULT_TRAIN_DELAY: Duration = Duration::from_secs(3);
/// Largest accuracy gain one retraining pass can produce.
const MAX_ACCURACY_BOOST: f32 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ModelStatus {
    Active,
    Inactive,
    Training,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerModel {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub accuracy: f32,
    pub status: ModelStatus,
    pub last_trained: NaiveDate,
    pub confidence: u8,
    pub usage_count: u64,
    pub description: String,
}

/// Holds the analyzer catalog and drives retraining: `train` flips a model
/// to Training, then a delayed task restores it to Active with a bounded
/// accuracy gain.
#[derive(Clone)]
pub struct ModelRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

struct RegistryState {
    models: Vec<AnalyzerModel>,
    rng: StdRng,
    train_delay: Duration,
    training: HashMap<String, JoinHandle<()>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), DEFAULT_TRAIN_DELAY)
    }

    /// Deterministic registry for tests: fixed seed and explicit delay.
    pub fn seeded(seed: u64, train_delay: Duration) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), train_delay)
    }

    fn with_rng(rng: StdRng, train_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryState {
                models: default_catalog(),
                rng,
                train_delay,
                training: HashMap::new(),
            })),
        }
    }

    pub async fn models(&self) -> Vec<AnalyzerModel> {
        self.inner.lock().await.models.clone()
    }

    pub async fn get(&self, id: &str) -> Option<AnalyzerModel> {
        self.inner
            .lock()
            .await
            .models
            .iter()
            .find(|model| model.id == id)
            .cloned()
    }

    /// Flip a model between Active and Inactive. Training and errored
    /// models are left alone.
    pub async fn toggle(&self, id: &str) -> Result<ModelStatus> {
        let mut state = self.inner.lock().await;
        let model = find_model(&mut state.models, id)?;
        model.status = match model.status {
            ModelStatus::Active => ModelStatus::Inactive,
            ModelStatus::Inactive => ModelStatus::Active,
            other => bail!("model {} cannot be toggled while {:?}", id, other),
        };
        Ok(model.status)
    }

    /// Kick off a retraining pass. The accuracy gain is drawn up front so a
    /// seeded registry stays deterministic regardless of task timing.
    pub async fn train(&self, id: &str) -> Result<()> {
        let mut state = self.inner.lock().await;

        // Drop handles of completed runs so a model can retrain.
        state.training.retain(|_, handle| !handle.is_finished());
        if state.training.contains_key(id) {
            bail!("model {} is already training", id);
        }

        let boost = state.rng.gen_range(0.0..MAX_ACCURACY_BOOST);
        let delay = state.train_delay;
        let model = find_model(&mut state.models, id)?;
        model.status = ModelStatus::Training;
        info!("model {} retraining", id);

        let inner = self.inner.clone();
        let model_id = id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = inner.lock().await;
            if let Some(model) = state.models.iter_mut().find(|model| model.id == model_id) {
                model.accuracy = (model.accuracy + boost).min(100.0);
                model.status = ModelStatus::Active;
                model.last_trained = Utc::now().date_naive();
                info!("model {} retrained to {:.1}%", model_id, model.accuracy);
            }
        });

        state.training.insert(id.to_string(), handle);
        Ok(())
    }

    /// Wait for every in-flight retraining pass to finish.
    pub async fn wait_idle(&self) -> Result<()> {
        let handles: Vec<JoinHandle<()>> = {
            let mut state = self.inner.lock().await;
            state.training.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            handle.await?;
        }
        Ok(())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn find_model<'a>(models: &'a mut [AnalyzerModel], id: &str) -> Result<&'a mut AnalyzerModel> {
    models
        .iter_mut()
        .find(|model| model.id == id)
        .ok_or_else(|| anyhow::anyhow!("unknown model {}", id))
}

fn default_catalog() -> Vec<AnalyzerModel> {
    vec![
        AnalyzerModel {
            id: "desk-posture".to_string(),
            name: "Desk Posture Analyzer".to_string(),
            kind: "Posture Detection".to_string(),
            accuracy: 94.5,
            status: ModelStatus::Active,
            last_trained: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            confidence: 92,
            usage_count: 1247,
            description: "Specialized in detecting desk posture issues and providing real-time feedback"
                .to_string(),
        },
        AnalyzerModel {
            id: "squat-form".to_string(),
            name: "Squat Form Checker".to_string(),
            kind: "Exercise Analysis".to_string(),
            accuracy: 89.2,
            status: ModelStatus::Active,
            last_trained: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            confidence: 87,
            usage_count: 856,
            description: "Analyzes squat form and provides corrective suggestions".to_string(),
        },
        AnalyzerModel {
            id: "walking-gait".to_string(),
            name: "Walking Gait Analyzer".to_string(),
            kind: "Movement Pattern".to_string(),
            accuracy: 91.8,
            status: ModelStatus::Training,
            last_trained: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            confidence: 90,
            usage_count: 432,
            description: "Evaluates walking patterns and identifies potential issues".to_string(),
        },
        AnalyzerModel {
            id: "yoga-pose".to_string(),
            name: "Yoga Pose Validator".to_string(),
            kind: "Pose Recognition".to_string(),
            accuracy: 86.7,
            status: ModelStatus::Inactive,
            last_trained: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            confidence: 85,
            usage_count: 298,
            description: "Validates yoga poses and provides alignment feedback".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggle_flips_between_active_and_inactive() {
        let registry = ModelRegistry::seeded(1, Duration::from_millis(10));
        assert_eq!(
            registry.toggle("desk-posture").await.unwrap(),
            ModelStatus::Inactive
        );
        assert_eq!(
            registry.toggle("desk-posture").await.unwrap(),
            ModelStatus::Active
        );
        assert!(registry.toggle("walking-gait").await.is_err());
        assert!(registry.toggle("nope").await.is_err());
    }

    #[tokio::test]
    async fn training_completes_with_bounded_boost() {
        let registry = ModelRegistry::seeded(7, Duration::from_millis(10));
        let before = registry.get("squat-form").await.unwrap().accuracy;

        registry.train("squat-form").await.unwrap();
        assert_eq!(
            registry.get("squat-form").await.unwrap().status,
            ModelStatus::Training
        );

        registry.wait_idle().await.unwrap();

        let model = registry.get("squat-form").await.unwrap();
        assert_eq!(model.status, ModelStatus::Active);
        assert!(model.accuracy >= before);
        assert!(model.accuracy <= (before + MAX_ACCURACY_BOOST).min(100.0));
        assert_eq!(model.last_trained, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn accuracy_never_exceeds_one_hundred() {
        let registry = ModelRegistry::seeded(3, Duration::from_millis(1));
        for _ in 0..5 {
            registry.train("desk-posture").await.unwrap();
            registry.wait_idle().await.unwrap();
        }
        assert!(registry.get("desk-posture").await.unwrap().accuracy <= 100.0);
    }

    #[tokio::test]
    async fn double_train_is_refused_while_in_flight() {
        let registry = ModelRegistry::seeded(5, Duration::from_secs(60));
        registry.train("squat-form").await.unwrap();
        assert!(registry.train("squat-form").await.is_err());
    }
}
