use rayon::prelude::*;

use crate::config::NoiseParams;
use crate::grid::Grid;
use crate::noise::perlin01;
use crate::rng::{Rng, seed_u32};

const SALT_OFFSETS: u64 = 0x0FF5_E7A1_5EED_0001;
const SALT_LATTICE: u64 = 0x1A77_1CE0_BEEF_0002;

/// Octave offsets are drawn from `[-OFFSET_RANGE, OFFSET_RANGE)` on each axis.
pub const OFFSET_RANGE: i32 = 1000;

/// Below this spread the field is treated as flat and left unnormalized.
pub const FLAT_TOLERANCE: f32 = 1e-2;

/// Raw fractal field plus the range observed before normalization.
pub struct HeightField {
    pub height: Grid<f32>,
    pub min: f32,
    pub max: f32,
    /// True when values were remapped to `[0, 1]`.
    pub normalized: bool,
}

/// One sample offset per octave, derived only from `seed`.
pub fn octave_offsets(seed: u64, octaves: u32) -> Vec<[f32; 2]> {
    let mut rng = Rng::new(seed ^ SALT_OFFSETS);
    (0..octaves)
        .map(|_| {
            let ox = rng.range_i32(-OFFSET_RANGE, OFFSET_RANGE) as f32;
            let oy = rng.range_i32(-OFFSET_RANGE, OFFSET_RANGE) as f32;
            [ox, oy]
        })
        .collect()
}

/// Layered noise sum at cell `(x, y)` of a `width`-wide field.
#[inline]
pub fn fractal_sample(
    x: usize,
    y: usize,
    width: usize,
    offsets: &[[f32; 2]],
    params: &NoiseParams,
    lattice_seed: u32,
) -> f32 {
    let u = x as f32 / width as f32;
    let v = y as f32 / width as f32;
    let mut sum = 0.0;
    let mut scale = params.initial_scale;
    let mut weight = 1.0;
    for o in offsets {
        sum += perlin01(o[0] + u * scale, o[1] + v * scale, lattice_seed) * weight;
        weight *= params.persistence;
        scale *= params.lacunarity;
    }
    sum
}

/// Fill a `width x width` field with fractal noise and normalize it to `[0, 1]`.
///
/// Rows are computed in parallel; each cell only depends on its coordinates so the
/// output is identical for a given seed regardless of thread count.
pub fn generate_height_field(width: usize, params: &NoiseParams, seed: u64) -> HeightField {
    let offsets = octave_offsets(seed, params.octaves);
    let lattice_seed = seed_u32(seed, SALT_LATTICE);

    let mut height = Grid::<f32>::new(width, width);
    if width == 0 {
        return HeightField { height, min: 0.0, max: 0.0, normalized: false };
    }

    let (min, max) = height
        .data
        .par_chunks_mut(width)
        .enumerate()
        .map(|(y, row)| {
            let mut lo = f32::MAX;
            let mut hi = f32::MIN;
            for (x, cell) in row.iter_mut().enumerate() {
                let v = fractal_sample(x, y, width, &offsets, params, lattice_seed);
                *cell = v;
                lo = lo.min(v);
                hi = hi.max(v);
            }
            (lo, hi)
        })
        .reduce(|| (f32::MAX, f32::MIN), |a, b| (a.0.min(b.0), a.1.max(b.1)));

    let normalized = (max - min).abs() > FLAT_TOLERANCE;
    if normalized {
        normalize(&mut height, min, max);
    } else {
        log::warn!("noise field spread {} below tolerance, skipping normalization", max - min);
    }

    HeightField { height, min, max, normalized }
}

/// Linear remap of `[min, max]` onto `[0, 1]`.
pub fn normalize(height: &mut Grid<f32>, min: f32, max: f32) {
    let inv = 1.0 / (max - min);
    height.data.par_iter_mut().for_each(|v| *v = (*v - min) * inv);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_seed() {
        let a = octave_offsets(11, 5);
        assert_eq!(a.len(), 5);
        assert_eq!(a, octave_offsets(11, 5));
        assert_ne!(a, octave_offsets(12, 5));
        for o in &a {
            assert!(o[0] >= -1000.0 && o[0] < 1000.0);
            assert!(o[0].fract() == 0.0 && o[1].fract() == 0.0);
        }
    }

    #[test]
    fn octave_weights_decay() {
        // With zero scale every octave samples its lattice point, so the sum is 0.5 * sum(weights).
        let params = NoiseParams { octaves: 3, persistence: 0.5, initial_scale: 0.0, ..Default::default() };
        let offsets = octave_offsets(1, 3);
        let v = fractal_sample(2, 3, 8, &offsets, &params, 9);
        assert!((v - 0.5 * 1.75).abs() < 1e-6);
    }
}
