use crate::models::analysis_types::{
    CleanupPriority, Detection, GarbageType, CLEAN_AREA_MESSAGE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DETECTION_PROBABILITY: f64 = 0.7;
const MAX_REPORTED_TYPES: usize = 3;

const DETECTED_CONFIDENCE_FLOOR: f64 = 0.7;
const DETECTED_CONFIDENCE_SPAN: f64 = 0.3;
const CLEAN_CONFIDENCE_FLOOR: f64 = 0.3;
const CLEAN_CONFIDENCE_SPAN: f64 = 0.4;

pub trait DetectionRng: Send {
    fn unit(&mut self) -> f64;
    /// Uniform index in `[0, bound)`. `bound` is never zero.
    fn below(&mut self, bound: usize) -> usize;
}

pub struct EntropyRng(StdRng);

impl EntropyRng {
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionRng for EntropyRng {
    fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn below(&mut self, bound: usize) -> usize {
        self.0.random_range(0..bound)
    }
}

pub fn simulate_detection(rng: &mut dyn DetectionRng, analysis_time: String) -> Detection {
    if rng.unit() < DETECTION_PROBABILITY {
        let confidence =
            (DETECTED_CONFIDENCE_FLOOR + rng.unit() * DETECTED_CONFIDENCE_SPAN).min(1.0);
        let count = rng.below(MAX_REPORTED_TYPES) + 1;
        let garbage_types = sample_types(rng, count);
        let priority =
            CleanupPriority::ACTIONABLE[rng.below(CleanupPriority::ACTIONABLE.len())];
        let names = garbage_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Detection {
            has_garbage: true,
            confidence,
            garbage_types,
            cleanup_priority: priority,
            analysis_time,
            message: Some(format!("AI detected {}", names)),
            request_id: None,
        }
    } else {
        let mut confidence = CLEAN_CONFIDENCE_FLOOR + rng.unit() * CLEAN_CONFIDENCE_SPAN;
        // Rounding can land exactly on the detected floor; keep the ranges disjoint.
        if confidence >= DETECTED_CONFIDENCE_FLOOR {
            confidence = f64::from_bits(DETECTED_CONFIDENCE_FLOOR.to_bits() - 1);
        }

        Detection {
            has_garbage: false,
            confidence,
            garbage_types: Vec::new(),
            cleanup_priority: CleanupPriority::None,
            analysis_time,
            message: Some(CLEAN_AREA_MESSAGE.to_string()),
            request_id: None,
        }
    }
}

// Partial Fisher-Yates over the label set, so picks never repeat.
fn sample_types(rng: &mut dyn DetectionRng, count: usize) -> Vec<GarbageType> {
    let mut pool = GarbageType::ALL.to_vec();
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count.min(pool.len()) {
        let idx = rng.below(pool.len()).min(pool.len() - 1);
        picked.push(pool.swap_remove(idx));
    }
    picked
}
