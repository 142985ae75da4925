use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Finished session, appended once when the session ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub duration_secs: u64,
    pub avg_score: f32,
    pub best_score: u8,
    pub samples: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub sessions: usize,
    pub avg_score: f32,
    pub total_active_secs: u64,
    pub streak_days: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionShare {
    pub label: String,
    pub samples: u64,
    pub share_pct: f32,
}

/// In-memory session history plus running detection tallies. Everything here
/// dies with the process; there is deliberately no storage behind it.
#[derive(Clone)]
pub struct SessionLog {
    inner: Arc<Mutex<LogState>>,
}

struct LogState {
    records: Vec<SessionRecord>,
    label_counts: HashMap<String, u64>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogState {
                records: Vec::new(),
                label_counts: HashMap::new(),
            })),
        }
    }

    pub async fn append(&self, record: SessionRecord) {
        self.inner.lock().await.records.push(record);
    }

    /// Tally one detection label; called once per sampler tick.
    pub async fn note_detection(&self, label: &str) {
        let mut state = self.inner.lock().await;
        *state.label_counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub async fn records(&self) -> Vec<SessionRecord> {
        self.inner.lock().await.records.clone()
    }

    /// Most recent `n` records, newest first.
    pub async fn recent(&self, n: usize) -> Vec<SessionRecord> {
        let state = self.inner.lock().await;
        state.records.iter().rev().take(n).cloned().collect()
    }

    pub async fn sessions_on(&self, date: NaiveDate) -> usize {
        let state = self.inner.lock().await;
        state
            .records
            .iter()
            .filter(|record| record.started_at.date_naive() == date)
            .count()
    }

    pub async fn summary(&self) -> HistorySummary {
        let state = self.inner.lock().await;
        let sessions = state.records.len();
        let scored: Vec<f32> = state
            .records
            .iter()
            .filter(|record| record.samples > 0)
            .map(|record| record.avg_score)
            .collect();
        let avg_score = if scored.is_empty() {
            0.0
        } else {
            scored.iter().sum::<f32>() / scored.len() as f32
        };
        let total_active_secs = state.records.iter().map(|record| record.duration_secs).sum();

        HistorySummary {
            sessions,
            avg_score,
            total_active_secs,
            streak_days: streak_days(&state.records),
        }
    }

    /// Per-label share of all samples seen, largest first.
    pub async fn detection_breakdown(&self) -> Vec<DetectionShare> {
        let state = self.inner.lock().await;
        let total: u64 = state.label_counts.values().sum();
        if total == 0 {
            return Vec::new();
        }

        let mut shares: Vec<DetectionShare> = state
            .label_counts
            .iter()
            .map(|(label, &samples)| DetectionShare {
                label: label.clone(),
                samples,
                share_pct: samples as f32 / total as f32 * 100.0,
            })
            .collect();
        shares.sort_by(|a, b| b.samples.cmp(&a.samples).then(a.label.cmp(&b.label)));
        shares
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Consecutive days with at least one session, counted back from the most
/// recent session day.
fn streak_days(records: &[SessionRecord]) -> u32 {
    let mut days: Vec<NaiveDate> = records
        .iter()
        .map(|record| record.started_at.date_naive())
        .collect();
    days.sort_unstable();
    days.dedup();

    let mut streak = 0;
    let mut expected: Option<NaiveDate> = None;
    for day in days.into_iter().rev() {
        match expected {
            Some(date) if day != date => break,
            _ => {
                streak += 1;
                expected = day.checked_sub_days(Days::new(1));
            }
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn record_on(day: u32, avg_score: f32, duration_secs: u64) -> SessionRecord {
        let started_at = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        SessionRecord {
            id: Uuid::new_v4(),
            started_at,
            stopped_at: started_at,
            duration_secs,
            avg_score,
            best_score: avg_score as u8,
            samples: duration_secs,
        }
    }

    #[tokio::test]
    async fn summary_averages_scored_sessions_only() {
        let log = SessionLog::new();
        log.append(record_on(10, 80.0, 60)).await;
        log.append(record_on(11, 90.0, 30)).await;
        // Zero-sample session contributes time but no score.
        let mut empty = record_on(11, 0.0, 5);
        empty.samples = 0;
        log.append(empty).await;

        let summary = log.summary().await;
        assert_eq!(summary.sessions, 3);
        assert!((summary.avg_score - 85.0).abs() < f32::EPSILON);
        assert_eq!(summary.total_active_secs, 95);
    }

    #[tokio::test]
    async fn streak_counts_consecutive_days() {
        let log = SessionLog::new();
        log.append(record_on(8, 80.0, 10)).await;
        // Gap on the 9th.
        log.append(record_on(10, 80.0, 10)).await;
        log.append(record_on(11, 80.0, 10)).await;
        log.append(record_on(11, 85.0, 10)).await;
        log.append(record_on(12, 80.0, 10)).await;

        assert_eq!(log.summary().await.streak_days, 3);
    }

    #[tokio::test]
    async fn breakdown_shares_sum_to_whole() {
        let log = SessionLog::new();
        for _ in 0..3 {
            log.note_detection("Desk Posture").await;
        }
        log.note_detection("Squat Form").await;

        let shares = log.detection_breakdown().await;
        assert_eq!(shares[0].label, "Desk Posture");
        assert_eq!(shares[0].samples, 3);
        let total: f32 = shares.iter().map(|share| share.share_pct).sum();
        assert!((total - 100.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let log = SessionLog::new();
        log.append(record_on(10, 80.0, 10)).await;
        log.append(record_on(11, 81.0, 10)).await;
        log.append(record_on(12, 82.0, 10)).await;

        let recent = log.recent(2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].started_at.day(), 12);
    }
}
