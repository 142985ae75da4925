use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::metrics::Detection;

/// Activities the classifier can report.
pub const POSTURE_CATALOG: [&str; 4] =
    ["Desk Posture", "Squat Form", "Walking Gait", "Yoga Pose"];

/// Advisories the mock classifier draws from.
pub const ADVISORY_CATALOG: [&str; 4] = [
    "Keep your shoulders back",
    "Align your spine",
    "Adjust screen height",
    "Take a break soon",
];

/// Largest per-tick score movement the mock classifier produces.
const MAX_SCORE_DELTA: f32 = 5.0;

/// Produces one `Detection` per tick. The sampler loop is written against
/// this trait so a model-backed classifier can replace the simulation
/// without touching the loop.
pub trait DetectionSource: Send {
    fn sample(&mut self) -> Detection;
}

/// Random-walk stand-in for a real classifier: uniform label and advisory
/// choice, bounded score delta. Seedable so tests get a stable sequence.
pub struct MockDetectionSource {
    rng: StdRng,
}

impl MockDetectionSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DetectionSource for MockDetectionSource {
    fn sample(&mut self) -> Detection {
        let label = POSTURE_CATALOG[self.rng.gen_range(0..POSTURE_CATALOG.len())];
        let advisory = ADVISORY_CATALOG[self.rng.gen_range(0..ADVISORY_CATALOG.len())];
        Detection {
            label: label.to_string(),
            score_delta: self.rng.gen_range(-MAX_SCORE_DELTA..=MAX_SCORE_DELTA),
            confidence: self.rng.gen_range(60..=95),
            advisory: Some(advisory.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = MockDetectionSource::new(42);
        let mut b = MockDetectionSource::new(42);
        for _ in 0..20 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn samples_stay_in_catalog_and_bounds() {
        let mut source = MockDetectionSource::new(7);
        for _ in 0..50 {
            let detection = source.sample();
            assert!(POSTURE_CATALOG.contains(&detection.label.as_str()));
            assert!(detection.score_delta.abs() <= MAX_SCORE_DELTA);
            assert!((60..=95).contains(&detection.confidence));
            let advisory = detection.advisory.expect("mock always advises");
            assert!(ADVISORY_CATALOG.contains(&advisory.as_str()));
        }
    }
}
