use serde::{Deserialize, Serialize};

/// One output of a `DetectionSource` per tick: the classified activity,
/// how the score should move, and how confident the classifier was.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub score_delta: f32,
    pub confidence: u8,
    pub advisory: Option<String>,
}

/// Inclusive range the posture score is clamped into after every update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBounds {
    pub floor: u8,
    pub ceiling: u8,
}

impl Default for ScoreBounds {
    fn default() -> Self {
        Self {
            floor: 60,
            ceiling: 100,
        }
    }
}

impl ScoreBounds {
    pub fn clamp(&self, value: f32) -> u8 {
        value
            .round()
            .clamp(self.floor as f32, self.ceiling as f32) as u8
    }
}

/// How region statuses react to new samples.
///
/// `Static` keeps the seeded statuses untouched; `FromScore` re-derives each
/// region's status from the current score plus a per-region bias.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatusPolicy {
    Static,
    FromScore,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        StatusPolicy::FromScore
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    DeskPosture,
    SpineAlignment,
    ShoulderPosition,
    NeckPosition,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::DeskPosture => "Desk Posture",
            Region::SpineAlignment => "Spine Alignment",
            Region::ShoulderPosition => "Shoulder Position",
            Region::NeckPosition => "Neck Position",
        }
    }

    /// Offset applied to the score before classifying this region, so the
    /// regions keep their observed relative ordering instead of moving in
    /// lockstep.
    pub(crate) fn bias(&self) -> i16 {
        match self {
            Region::DeskPosture => 7,
            Region::SpineAlignment => -7,
            Region::ShoulderPosition => 4,
            Region::NeckPosition => -20,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RegionStatus {
    Good,
    Warning,
    Error,
}

impl RegionStatus {
    pub fn classify(score: u8) -> Self {
        if score >= 85 {
            RegionStatus::Good
        } else if score >= 70 {
            RegionStatus::Warning
        } else {
            RegionStatus::Error
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionReading {
    pub region: Region,
    pub status: RegionStatus,
    pub confidence: u8,
}

/// Current snapshot of the score and the per-region statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub score: u8,
    pub regions: Vec<RegionReading>,
}

impl Reading {
    /// Seed reading shown before the first sample arrives.
    pub fn baseline() -> Self {
        Self {
            score: 85,
            regions: vec![
                RegionReading {
                    region: Region::DeskPosture,
                    status: RegionStatus::Good,
                    confidence: 92,
                },
                RegionReading {
                    region: Region::SpineAlignment,
                    status: RegionStatus::Warning,
                    confidence: 78,
                },
                RegionReading {
                    region: Region::ShoulderPosition,
                    status: RegionStatus::Good,
                    confidence: 89,
                },
                RegionReading {
                    region: Region::NeckPosition,
                    status: RegionStatus::Error,
                    confidence: 65,
                },
            ],
        }
    }
}

/// Aggregates accumulated over one session, flushed into the session record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub samples: u64,
    pub avg_score: f32,
    pub best_score: u8,
}
