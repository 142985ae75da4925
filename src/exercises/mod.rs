//! Corrective exercise catalog with completion and save tracking.

use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_mins: u16,
    pub target_areas: Vec<String>,
    pub instructions: Vec<String>,
    pub benefits: Vec<String>,
    pub equipment: Vec<String>,
    pub completed: bool,
    pub rating: f32,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub description: String,
    pub exercises: Vec<String>,
    pub total_duration_mins: u16,
    pub difficulty: Difficulty,
    pub category: String,
    pub popularity: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub count: usize,
}

/// Library plus a tiny guided-session state machine: one exercise can be in
/// progress at a time; completing it marks the catalog entry done.
#[derive(Clone)]
pub struct ExerciseLibrary {
    inner: Arc<RwLock<LibraryState>>,
}

struct LibraryState {
    exercises: Vec<Exercise>,
    routines: Vec<Routine>,
    active: Option<ActiveExercise>,
}

struct ActiveExercise {
    id: String,
    started_at: DateTime<Utc>,
}

impl ExerciseLibrary {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LibraryState {
                exercises: default_exercises(),
                routines: default_routines(),
                active: None,
            })),
        }
    }

    pub fn exercises(&self) -> Vec<Exercise> {
        self.inner.read().unwrap().exercises.clone()
    }

    pub fn routines(&self) -> Vec<Routine> {
        self.inner.read().unwrap().routines.clone()
    }

    /// Filter ids mirror the dashboard tabs: `all`, `neck` (neck and
    /// shoulders), `back` (spine), `hips`, `core`.
    pub fn by_category(&self, filter: &str) -> Vec<Exercise> {
        let state = self.inner.read().unwrap();
        state
            .exercises
            .iter()
            .filter(|exercise| category_matches(filter, &exercise.category))
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        [
            ("all", "All Exercises"),
            ("neck", "Neck & Shoulders"),
            ("back", "Back & Spine"),
            ("hips", "Hip Flexors"),
            ("core", "Core Stability"),
        ]
        .into_iter()
        .map(|(id, name)| CategorySummary {
            id: id.to_string(),
            name: name.to_string(),
            count: self.by_category(id).len(),
        })
        .collect()
    }

    pub fn start_exercise(&self, id: &str) -> Result<Exercise> {
        let mut state = self.inner.write().unwrap();
        if let Some(active) = &state.active {
            bail!("exercise {} already in progress", active.id);
        }
        let exercise = state
            .exercises
            .iter()
            .find(|exercise| exercise.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown exercise {}", id))?;
        state.active = Some(ActiveExercise {
            id: id.to_string(),
            started_at: Utc::now(),
        });
        Ok(exercise)
    }

    /// Finish the in-progress exercise, mark it completed, and return the
    /// time spent on it.
    pub fn complete_exercise(&self) -> Result<chrono::Duration> {
        let mut state = self.inner.write().unwrap();
        let active = state
            .active
            .take()
            .ok_or_else(|| anyhow::anyhow!("no exercise in progress"))?;
        let elapsed = Utc::now() - active.started_at;
        if let Some(exercise) = state
            .exercises
            .iter_mut()
            .find(|exercise| exercise.id == active.id)
        {
            exercise.completed = true;
        }
        Ok(elapsed)
    }

    pub fn toggle_saved(&self, id: &str) -> Result<bool> {
        let mut state = self.inner.write().unwrap();
        let exercise = state
            .exercises
            .iter_mut()
            .find(|exercise| exercise.id == id)
            .ok_or_else(|| anyhow::anyhow!("unknown exercise {}", id))?;
        exercise.saved = !exercise.saved;
        Ok(exercise.saved)
    }

    pub fn completed_count(&self) -> usize {
        self.inner
            .read()
            .unwrap()
            .exercises
            .iter()
            .filter(|exercise| exercise.completed)
            .count()
    }

    pub fn saved_count(&self) -> usize {
        self.inner
            .read()
            .unwrap()
            .exercises
            .iter()
            .filter(|exercise| exercise.saved)
            .count()
    }
}

impl Default for ExerciseLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn category_matches(filter: &str, category: &str) -> bool {
    match filter {
        "all" => true,
        "neck" => category == "neck" || category == "shoulders",
        "back" => category == "spine",
        other => category == other,
    }
}

fn default_exercises() -> Vec<Exercise> {
    vec![
        Exercise {
            id: "neck-stretch-relief".to_string(),
            name: "Neck Stretch Relief".to_string(),
            description: "Gentle neck stretches to relieve tension and improve posture".to_string(),
            category: "neck".to_string(),
            difficulty: Difficulty::Beginner,
            duration_mins: 5,
            target_areas: vec![
                "neck".to_string(),
                "shoulders".to_string(),
                "upper back".to_string(),
            ],
            instructions: vec![
                "Sit or stand with your spine straight".to_string(),
                "Slowly tilt your head to the right, bringing your ear toward your shoulder"
                    .to_string(),
                "Hold for 15-30 seconds".to_string(),
                "Return to center and repeat on the left side".to_string(),
                "Perform 3 sets on each side".to_string(),
            ],
            benefits: vec![
                "Reduces neck tension".to_string(),
                "Improves flexibility".to_string(),
                "Relieves headaches".to_string(),
                "Enhances posture".to_string(),
            ],
            equipment: vec!["None".to_string()],
            completed: false,
            rating: 4.5,
            saved: false,
        },
        Exercise {
            id: "shoulder-blade-squeeze".to_string(),
            name: "Shoulder Blade Squeeze".to_string(),
            description: "Strengthens upper back muscles and improves posture".to_string(),
            category: "shoulders".to_string(),
            difficulty: Difficulty::Beginner,
            duration_mins: 10,
            target_areas: vec![
                "upper back".to_string(),
                "shoulders".to_string(),
                "rhomboids".to_string(),
            ],
            instructions: vec![
                "Stand with feet hip-width apart".to_string(),
                "Raise arms to shoulder height, elbows bent at 90 degrees".to_string(),
                "Squeeze shoulder blades together".to_string(),
                "Hold for 5 seconds".to_string(),
                "Release and repeat 10-15 times".to_string(),
            ],
            benefits: vec![
                "Strengthens upper back".to_string(),
                "Improves posture".to_string(),
                "Reduces shoulder tension".to_string(),
                "Prevents rounded shoulders".to_string(),
            ],
            equipment: vec!["None".to_string()],
            completed: true,
            rating: 4.8,
            saved: true,
        },
        Exercise {
            id: "hip-flexor-stretch".to_string(),
            name: "Hip Flexor Stretch".to_string(),
            description: "Counteracts tight hips from prolonged sitting".to_string(),
            category: "hips".to_string(),
            difficulty: Difficulty::Intermediate,
            duration_mins: 8,
            target_areas: vec![
                "hip flexors".to_string(),
                "quadriceps".to_string(),
                "core".to_string(),
            ],
            instructions: vec![
                "Start in a lunge position".to_string(),
                "Lower your back knee to the ground".to_string(),
                "Push your hips forward gently".to_string(),
                "Hold for 30 seconds".to_string(),
                "Switch legs and repeat".to_string(),
            ],
            benefits: vec![
                "Improves hip flexibility".to_string(),
                "Reduces lower back pain".to_string(),
                "Enhances posture".to_string(),
                "Increases mobility".to_string(),
            ],
            equipment: vec!["Yoga mat (optional)".to_string()],
            completed: false,
            rating: 4.3,
            saved: false,
        },
        Exercise {
            id: "thoracic-spine-mobility".to_string(),
            name: "Thoracic Spine Mobility".to_string(),
            description: "Improves mid-back flexibility and posture".to_string(),
            category: "spine".to_string(),
            difficulty: Difficulty::Intermediate,
            duration_mins: 12,
            target_areas: vec![
                "thoracic spine".to_string(),
                "upper back".to_string(),
                "shoulders".to_string(),
            ],
            instructions: vec![
                "Start on hands and knees".to_string(),
                "Place one hand behind your head".to_string(),
                "Rotate your torso, bringing elbow toward the ceiling".to_string(),
                "Hold for 2 seconds".to_string(),
                "Perform 10 repetitions on each side".to_string(),
            ],
            benefits: vec![
                "Improves spinal mobility".to_string(),
                "Reduces upper back stiffness".to_string(),
                "Enhances posture".to_string(),
                "Prevents back pain".to_string(),
            ],
            equipment: vec!["Yoga mat".to_string()],
            completed: false,
            rating: 4.6,
            saved: true,
        },
    ]
}

fn default_routines() -> Vec<Routine> {
    vec![
        Routine {
            id: "desk-worker-relief".to_string(),
            name: "Desk Worker Relief".to_string(),
            description: "A comprehensive routine for office workers".to_string(),
            exercises: vec![
                "neck-stretch-relief".to_string(),
                "shoulder-blade-squeeze".to_string(),
                "hip-flexor-stretch".to_string(),
            ],
            total_duration_mins: 23,
            difficulty: Difficulty::Beginner,
            category: "desk".to_string(),
            popularity: 95,
        },
        Routine {
            id: "posture-reset".to_string(),
            name: "Posture Reset".to_string(),
            description: "Quick routine to reset your posture throughout the day".to_string(),
            exercises: vec![
                "shoulder-blade-squeeze".to_string(),
                "thoracic-spine-mobility".to_string(),
            ],
            total_duration_mins: 22,
            difficulty: Difficulty::Intermediate,
            category: "general".to_string(),
            popularity: 88,
        },
    ]
}
