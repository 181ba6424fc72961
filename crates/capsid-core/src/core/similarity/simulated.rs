use super::StructureEntry;
use crate::core::models::annotation::ArchitectureClass;
use sha2::{Digest, Sha256};

const BASE: f64 = 0.30;
const SAME_CLASS_BONUS: f64 = 0.20;
const SAME_GENOME_BONUS: f64 = 0.10;
const SAME_FAMILY_BONUS: f64 = 0.25;
const BOTH_DJR_BONUS: f64 = 0.10;
const BOTH_SJR_BONUS: f64 = 0.05;
const NOISE_AMPLITUDE: f64 = 0.05;
const MIN_SCORE: f64 = 0.15;
const MAX_SCORE: f64 = 0.95;
const SAME_CLASS_FLOOR: f64 = 0.55;

/// Deterministic stand-in for a structural aligner, driven by shared
/// annotations plus a stable per-pair noise term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedScorer;

impl SimulatedScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, a: &StructureEntry<'_>, b: &StructureEntry<'_>) -> f64 {
        let mut score = BASE;

        let same_class = a.architecture_class == b.architecture_class;
        if same_class {
            score += SAME_CLASS_BONUS;
        }
        if a.genome_type.is_known() && a.genome_type == b.genome_type {
            score += SAME_GENOME_BONUS;
        }
        if let (Some(fa), Some(fb)) = (a.family, b.family) {
            if fa == fb {
                score += SAME_FAMILY_BONUS;
            }
        }
        match (a.architecture_class, b.architecture_class) {
            (ArchitectureClass::Djr, ArchitectureClass::Djr) => score += BOTH_DJR_BONUS,
            (ArchitectureClass::Sjr, ArchitectureClass::Sjr) => score += BOTH_SJR_BONUS,
            _ => {}
        }

        score += pair_noise(a.id, b.id);
        score = score.clamp(MIN_SCORE, MAX_SCORE);

        if same_class {
            score = score.max(SAME_CLASS_FLOOR);
        }
        score
    }
}

/// Noise in `[-NOISE_AMPLITUDE, NOISE_AMPLITUDE]` from a SHA-256 digest of the
/// sorted identifier pair, so `(a, b)` and `(b, a)` agree across runs and
/// platforms.
fn pair_noise(a: &str, b: &str) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo.as_bytes());
    hasher.update([0u8]);
    hasher.update(hi.as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let unit = u64::from_be_bytes(head) as f64 / u64::MAX as f64;
    (unit * 2.0 - 1.0) * NOISE_AMPLITUDE
}
