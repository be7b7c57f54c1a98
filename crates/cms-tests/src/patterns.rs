//! Seeded generators for calibration results and test pixels

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use camcal_core::analysis::CalibrationResult;

/// Deterministic RNG so failures reproduce
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// A plausible oracle answer: gains near unity, gamma in the usual display
/// range, and a name of random length that may contain non-ASCII text
pub fn random_result(rng: &mut impl Rng) -> CalibrationResult {
    const NAME_PARTS: [&str; 6] = ["Studio", "Büro", "Laptop", "Display", "Panel 2", "外部"];

    let words = rng.gen_range(1..=4);
    let name = (0..words)
        .map(|_| NAME_PARTS[rng.gen_range(0..NAME_PARTS.len())])
        .collect::<Vec<_>>()
        .join(" ");

    CalibrationResult {
        red_gain: rng.gen_range(0.7..1.3),
        green_gain: rng.gen_range(0.7..1.3),
        blue_gain: rng.gen_range(0.7..1.3),
        delta_e: rng.gen_range(0.0..12.0),
        ..CalibrationResult::neutral(name, rng.gen_range(1.6..2.8))
    }
}

/// Packed RGB8 gray ramp with `steps` evenly spaced levels from 0 to 255
pub fn grayscale_ramp(steps: usize) -> Vec<u8> {
    let steps = steps.max(2);
    (0..steps)
        .flat_map(|i| {
            let v = (i * 255 / (steps - 1)) as u8;
            [v, v, v]
        })
        .collect()
}
