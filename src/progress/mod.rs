//! Goals and achievements driven by finished sessions.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::history::SessionRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub current: f32,
    pub target: f32,
    pub unit: String,
    pub category: String,
    pub deadline: NaiveDate,
    pub completed: bool,
}

impl Goal {
    pub fn progress_pct(&self) -> u8 {
        if self.target <= 0.0 {
            return 100;
        }
        ((self.current / self.target) * 100.0).min(100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub unlocked: bool,
    pub unlocked_at: Option<NaiveDate>,
}

/// Tracks goal progress and unlocks achievements as session results come in.
/// Purely derived state; resets with the process like the rest of the
/// dashboard data.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<RwLock<ProgressState>>,
}

struct ProgressState {
    goals: Vec<Goal>,
    achievements: Vec<Achievement>,
    sessions_completed: u64,
    best_score_seen: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ProgressState {
                goals: default_goals(),
                achievements: default_achievements(),
                sessions_completed: 0,
                best_score_seen: 0,
            })),
        }
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.inner.read().unwrap().goals.clone()
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.inner.read().unwrap().achievements.clone()
    }

    pub fn unlocked_count(&self) -> usize {
        self.inner
            .read()
            .unwrap()
            .achievements
            .iter()
            .filter(|achievement| achievement.unlocked)
            .count()
    }

    /// Nudge a goal forward. Progress clamps at the target and completion
    /// latches there.
    pub fn advance_goal(&self, id: &str, amount: f32) -> Result<Goal> {
        let mut state = self.inner.write().unwrap();
        let goal = state
            .goals
            .iter_mut()
            .find(|goal| goal.id == id)
            .ok_or_else(|| anyhow::anyhow!("unknown goal {}", id))?;
        goal.current = (goal.current + amount).min(goal.target);
        goal.completed = goal.current >= goal.target;
        Ok(goal.clone())
    }

    /// Fold one finished session into goals and achievements.
    pub fn record_session(&self, record: &SessionRecord, streak_days: u32) {
        let mut state = self.inner.write().unwrap();
        state.sessions_completed += 1;
        state.best_score_seen = state.best_score_seen.max(record.best_score);

        set_goal(&mut state.goals, "daily-sessions", |goal| {
            goal.current = (goal.current + 1.0).min(goal.target);
        });
        set_goal(&mut state.goals, "weekly-score", |goal| {
            goal.current = record.avg_score.min(goal.target);
        });
        set_goal(&mut state.goals, "monthly-streak", |goal| {
            goal.current = (streak_days as f32).min(goal.target);
        });

        let today = Utc::now().date_naive();
        let sessions = state.sessions_completed;
        let best = state.best_score_seen;
        for achievement in state.achievements.iter_mut() {
            let earned = match achievement.id.as_str() {
                "first-steps" => sessions >= 1,
                "consistency-king" => streak_days >= 7,
                "perfect-form" => best >= 100,
                "posture-master" => streak_days >= 30,
                _ => false,
            };
            if earned && !achievement.unlocked {
                achievement.unlocked = true;
                achievement.unlocked_at = Some(today);
            }
        }
    }

    /// Called when a recommended exercise is completed.
    pub fn record_exercise(&self) {
        let mut state = self.inner.write().unwrap();
        set_goal(&mut state.goals, "exercise-completion", |goal| {
            goal.current = (goal.current + 1.0).min(goal.target);
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn set_goal(goals: &mut [Goal], id: &str, update: impl FnOnce(&mut Goal)) {
    if let Some(goal) = goals.iter_mut().find(|goal| goal.id == id) {
        update(goal);
        goal.completed = goal.current >= goal.target;
    }
}

fn default_goals() -> Vec<Goal> {
    vec![
        Goal {
            id: "daily-sessions".to_string(),
            title: "Daily Posture Sessions".to_string(),
            description: "Complete 5 posture analysis sessions daily".to_string(),
            current: 0.0,
            target: 5.0,
            unit: "sessions".to_string(),
            category: "daily".to_string(),
            deadline: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            completed: false,
        },
        Goal {
            id: "weekly-score".to_string(),
            title: "Weekly Posture Score".to_string(),
            description: "Maintain average posture score above 85%".to_string(),
            current: 0.0,
            target: 85.0,
            unit: "%".to_string(),
            category: "weekly".to_string(),
            deadline: NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(),
            completed: false,
        },
        Goal {
            id: "monthly-streak".to_string(),
            title: "Monthly Streak".to_string(),
            description: "Use the app for 30 consecutive days".to_string(),
            current: 0.0,
            target: 30.0,
            unit: "days".to_string(),
            category: "monthly".to_string(),
            deadline: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            completed: false,
        },
        Goal {
            id: "exercise-completion".to_string(),
            title: "Exercise Completion".to_string(),
            description: "Complete 20 recommended exercises".to_string(),
            current: 0.0,
            target: 20.0,
            unit: "exercises".to_string(),
            category: "skill".to_string(),
            deadline: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            completed: false,
        },
    ]
}

fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement {
            id: "first-steps".to_string(),
            title: "First Steps".to_string(),
            description: "Complete your first posture analysis".to_string(),
            icon: "👶".to_string(),
            rarity: Rarity::Common,
            unlocked: false,
            unlocked_at: None,
        },
        Achievement {
            id: "consistency-king".to_string(),
            title: "Consistency King".to_string(),
            description: "Use the app for 7 consecutive days".to_string(),
            icon: "👑".to_string(),
            rarity: Rarity::Rare,
            unlocked: false,
            unlocked_at: None,
        },
        Achievement {
            id: "perfect-form".to_string(),
            title: "Perfect Form".to_string(),
            description: "Achieve 100% posture score".to_string(),
            icon: "⭐".to_string(),
            rarity: Rarity::Epic,
            unlocked: false,
            unlocked_at: None,
        },
        Achievement {
            id: "posture-master".to_string(),
            title: "Posture Master".to_string(),
            description: "Maintain excellent posture for 30 days".to_string(),
            icon: "🏆".to_string(),
            rarity: Rarity::Legendary,
            unlocked: false,
            unlocked_at: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(avg_score: f32, best_score: u8) -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            id: Uuid::new_v4(),
            started_at: now,
            stopped_at: now,
            duration_secs: 60,
            avg_score,
            best_score,
            samples: 60,
        }
    }

    #[test]
    fn goal_progress_clamps_at_target() {
        let tracker = ProgressTracker::new();
        let goal = tracker.advance_goal("daily-sessions", 99.0).unwrap();
        assert_eq!(goal.current, goal.target);
        assert!(goal.completed);
        assert_eq!(goal.progress_pct(), 100);
        assert!(tracker.advance_goal("nope", 1.0).is_err());
    }

    #[test]
    fn first_session_unlocks_first_steps_once() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.unlocked_count(), 0);

        tracker.record_session(&record(82.0, 88), 1);
        let unlocked: Vec<_> = tracker
            .achievements()
            .into_iter()
            .filter(|achievement| achievement.unlocked)
            .collect();
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "first-steps");
        let first_date = unlocked[0].unlocked_at;

        tracker.record_session(&record(84.0, 90), 2);
        let again = tracker
            .achievements()
            .into_iter()
            .find(|achievement| achievement.id == "first-steps")
            .unwrap();
        assert_eq!(again.unlocked_at, first_date);
    }

    #[test]
    fn streak_and_score_thresholds_unlock() {
        let tracker = ProgressTracker::new();
        tracker.record_session(&record(95.0, 100), 30);
        assert_eq!(tracker.unlocked_count(), 4);
    }

    #[test]
    fn exercise_goal_advances() {
        let tracker = ProgressTracker::new();
        tracker.record_exercise();
        tracker.record_exercise();
        let goal = tracker
            .goals()
            .into_iter()
            .find(|goal| goal.id == "exercise-completion")
            .unwrap();
        assert_eq!(goal.current, 2.0);
        assert!(!goal.completed);
    }
}
