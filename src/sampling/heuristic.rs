//! Joint-angle posture checks over pose landmarks.
//!
//! This is the model-backed end of the `DetectionSource` seam: feed it
//! landmark frames from any pose estimator and it turns geometric issues
//! into detections the sampler can consume.

use crate::metrics::Detection;

use super::detector::DetectionSource;

/// Back angles below this are flagged as rounding.
const MIN_BACK_ANGLE_DEGREES: f32 = 150.0;
/// Score movement for a clean frame.
const CLEAN_FRAME_DELTA: f32 = 2.0;
/// Score penalty per detected issue.
const ISSUE_PENALTY: f32 = 2.5;

/// Subset of pose landmarks the checks need, in image coordinates.
/// Knee and ankle are optional; without them only the upper-body checks run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkFrame {
    pub left_shoulder: [f32; 2],
    pub left_hip: [f32; 2],
    pub left_knee: Option<[f32; 2]>,
    pub left_ankle: Option<[f32; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostureIssue {
    RoundedBack { angle: f32 },
    KneeOverToe,
}

impl PostureIssue {
    pub fn advisory(&self) -> &'static str {
        match self {
            PostureIssue::RoundedBack { .. } => "Back angle < 150°",
            PostureIssue::KneeOverToe => "Knee over toe",
        }
    }
}

/// Angle at `b` between the rays `b->a` and `b->c`, in degrees.
fn joint_angle(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    let ba = [a[0] - b[0], a[1] - b[1]];
    let bc = [c[0] - b[0], c[1] - b[1]];
    let dot = ba[0] * bc[0] + ba[1] * bc[1];
    let norm = (ba[0].powi(2) + ba[1].powi(2)).sqrt() * (bc[0].powi(2) + bc[1].powi(2)).sqrt();
    if norm == 0.0 {
        return 0.0;
    }
    (dot / norm).clamp(-1.0, 1.0).acos().to_degrees()
}

pub fn analyze_frame(frame: &LandmarkFrame) -> Vec<PostureIssue> {
    let mut issues = Vec::new();

    if let Some(knee) = frame.left_knee {
        let back_angle = joint_angle(frame.left_shoulder, frame.left_hip, knee);
        if back_angle < MIN_BACK_ANGLE_DEGREES {
            issues.push(PostureIssue::RoundedBack { angle: back_angle });
        }

        // Horizontal check only; the estimator's x axis points right.
        if let Some(ankle) = frame.left_ankle {
            if knee[0] > ankle[0] {
                issues.push(PostureIssue::KneeOverToe);
            }
        }
    }

    issues
}

/// `DetectionSource` backed by the geometric checks. Pulls one frame per
/// tick from the supplied provider; a missing frame yields a neutral
/// detection instead of an error.
pub struct HeuristicDetectionSource<F>
where
    F: FnMut() -> Option<LandmarkFrame> + Send,
{
    frames: F,
}

impl<F> HeuristicDetectionSource<F>
where
    F: FnMut() -> Option<LandmarkFrame> + Send,
{
    pub fn new(frames: F) -> Self {
        Self { frames }
    }
}

impl<F> DetectionSource for HeuristicDetectionSource<F>
where
    F: FnMut() -> Option<LandmarkFrame> + Send,
{
    fn sample(&mut self) -> Detection {
        let Some(frame) = (self.frames)() else {
            // No frame this tick; hold the score where it is.
            return Detection {
                label: "Desk Posture".to_string(),
                score_delta: 0.0,
                confidence: 0,
                advisory: None,
            };
        };

        let issues = analyze_frame(&frame);
        // Lower-body landmarks present means the subject is mid-exercise.
        let label = if frame.left_ankle.is_some() {
            "Squat Form"
        } else {
            "Desk Posture"
        };
        let score_delta = if issues.is_empty() {
            CLEAN_FRAME_DELTA
        } else {
            -ISSUE_PENALTY * issues.len() as f32
        };
        let confidence = 90u8.saturating_sub(10 * issues.len() as u8).max(60);

        Detection {
            label: label.to_string(),
            score_delta,
            confidence,
            advisory: issues.first().map(|issue| issue.advisory().to_string()),
        }
    }
}
