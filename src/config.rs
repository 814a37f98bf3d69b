use serde::{Deserialize, Serialize};

use crate::erosion::{ErosionStrategy, ParallelErosion, SequentialErosion};

/// Dispatch width used by the parallel erosion path.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Fractal noise controls for the initial heightmap.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: u64,
    /// Draw a fresh seed from system randomness on every run.
    pub randomize_seed: bool,
    pub octaves: u32,
    /// Amplitude decay per octave (0-1).
    pub persistence: f32,
    /// Frequency growth per octave.
    pub lacunarity: f32,
    pub initial_scale: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 42,
            randomize_seed: false,
            octaves: 7,
            persistence: 0.5,
            lacunarity: 2.0,
            initial_scale: 2.0,
        }
    }
}

/// How droplets are scheduled against the shared height buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErosionMode {
    /// One droplet completes before the next starts. Reproducible for a fixed seed.
    Sequential,
    /// Droplets run as independent work-items in batches; overlapping writes race.
    Parallel { batch_size: usize },
}

impl Default for ErosionMode {
    fn default() -> Self {
        Self::Parallel { batch_size: DEFAULT_BATCH_SIZE }
    }
}

impl ErosionMode {
    pub fn strategy(&self) -> Box<dyn ErosionStrategy> {
        match *self {
            ErosionMode::Sequential => Box::new(SequentialErosion),
            ErosionMode::Parallel { batch_size } => Box::new(ParallelErosion { batch_size }),
        }
    }
}

/// Droplet erosion controls.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Brush radius in cells; also the width of the border around the interior.
    pub brush_radius: i32,
    pub max_lifetime: u32,
    /// Directional persistence (0-1).
    pub inertia: f32,
    pub sediment_capacity_factor: f32,
    /// Floor on capacity so droplets on gentle slopes still carry something.
    pub min_sediment_capacity: f32,
    pub deposit_speed: f32,
    pub erode_speed: f32,
    /// Fraction of water lost per step (0-1).
    pub evaporate_speed: f32,
    pub gravity: f32,
    pub start_speed: f32,
    pub start_water: f32,
    /// Droplets holding less water than this terminate.
    pub min_water: f32,
    pub iterations: u32,
    /// `None` draws start positions from system randomness.
    pub seed: Option<u64>,
    pub mode: ErosionMode,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            brush_radius: 3,
            max_lifetime: 30,
            inertia: 0.05,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: 0.01,
            deposit_speed: 0.3,
            erode_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            start_speed: 1.0,
            start_water: 1.0,
            min_water: 0.01,
            iterations: 50_000,
            seed: None,
            mode: ErosionMode::default(),
        }
    }
}

/// Surface mesh controls.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Side length of the rendered (non-border) region.
    pub interior_size: usize,
    pub horizontal_scale: f32,
    pub elevation_scale: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            interior_size: 255,
            horizontal_scale: 20.0,
            elevation_scale: 10.0,
        }
    }
}

/// All tunable parameters for one pipeline run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub noise: NoiseParams,
    pub erosion: ErosionParams,
    pub mesh: MeshParams,
}

impl Params {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p = Params::from_json(r#"{"erosion": {"iterations": 10, "mode": "sequential"}}"#).unwrap();
        assert_eq!(p.erosion.iterations, 10);
        assert_eq!(p.erosion.mode, ErosionMode::Sequential);
        assert_eq!(p.erosion.brush_radius, 3);
        assert_eq!(p.noise.octaves, 7);
        assert_eq!(p.mesh.interior_size, 255);
    }

    #[test]
    fn parallel_mode_parses_batch_size() {
        let p = Params::from_json(r#"{"erosion": {"mode": {"parallel": {"batch_size": 64}}}}"#).unwrap();
        assert_eq!(p.erosion.mode, ErosionMode::Parallel { batch_size: 64 });
    }
}
