mod controller;
pub mod detector;
pub mod heuristic;
mod loop_worker;

pub use detector::{DetectionSource, MockDetectionSource, ADVISORY_CATALOG, POSTURE_CATALOG};
pub use heuristic::{analyze_frame, HeuristicDetectionSource, LandmarkFrame, PostureIssue};

pub(crate) use controller::SamplerController;
pub(crate) use loop_worker::SamplerContext;
