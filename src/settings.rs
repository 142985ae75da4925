use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::metrics::{ScoreBounds, StatusPolicy};

/// Tunables for the sampling engine. Defaults match the dashboard's observed
/// behavior: one-second ticks, a three-item advisory window, scores walking
/// inside [60, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub alerts_enabled: bool,
    pub sensitivity: u8,
    pub tick_interval_ms: u64,
    pub feedback_window: usize,
    pub score_floor: u8,
    pub score_ceiling: u8,
    pub status_policy: StatusPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            sensitivity: 75,
            tick_interval_ms: 1000,
            feedback_window: 3,
            score_floor: 60,
            score_ceiling: 100,
            status_policy: StatusPolicy::FromScore,
        }
    }
}

impl EngineSettings {
    pub fn score_bounds(&self) -> ScoreBounds {
        ScoreBounds {
            floor: self.score_floor,
            ceiling: self.score_ceiling,
        }
    }

    /// Clamp fields into their valid ranges; applied before persisting.
    fn normalized(mut self) -> Self {
        self.sensitivity = self.sensitivity.min(100);
        self.tick_interval_ms = self.tick_interval_ms.max(1);
        self.feedback_window = self.feedback_window.max(1);
        self.score_ceiling = self.score_ceiling.min(100);
        self.score_floor = self.score_floor.min(self.score_ceiling);
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn engine(&self) -> EngineSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update_engine(&self, settings: EngineSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings.normalized();
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

impl SettingsStore {
    #[allow(dead_code)]
    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: EngineSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
