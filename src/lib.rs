pub mod config;
pub mod erosion;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod mesh;
pub mod noise;
pub mod render;
pub mod rng;

use std::time::Instant;

use config::{ErosionParams, MeshParams, Params};
use erosion::ErosionStats;
use error::{AtStage, ConfigError, PipelineError, Stage};
use grid::{Grid, MapLayout};
use mesh::Mesh;

/// Generated terrain: the bordered height field and the surface built from its interior.
pub struct Terrain {
    pub layout: MapLayout,
    /// Noise seed actually used, so randomized runs can be replayed.
    pub seed: u64,
    /// Normalized noise field before any erosion.
    pub initial_height: Grid<f32>,
    pub height: Grid<f32>,
    /// Raw fractal range observed before normalization.
    pub noise_range: (f32, f32),
    pub mesh: Mesh,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

fn ms_since(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

/// Check every stage's preconditions up front and derive the bordered layout.
pub fn validate(params: &Params) -> Result<MapLayout, PipelineError> {
    if params.erosion.brush_radius <= 0 {
        return Err(PipelineError {
            stage: Stage::Erosion,
            source: ConfigError::NonPositiveBrushRadius(params.erosion.brush_radius),
        });
    }
    let layout = match MapLayout::new(params.mesh.interior_size, params.erosion.brush_radius) {
        Err(source @ ConfigError::IndexOverflow(_)) => {
            return Err(PipelineError { stage: Stage::Heightmap, source });
        }
        other => other.at(Stage::Mesh)?,
    };
    params.erosion.mode.strategy().validate(params.erosion.iterations).at(Stage::Erosion)?;
    Ok(layout)
}

impl Terrain {
    /// Heightmap stage only: a normalized noise field, no erosion, empty mesh.
    pub fn from_noise(params: &Params) -> Result<Self, PipelineError> {
        let layout = validate(params)?;
        let seed = if params.noise.randomize_seed {
            rng::system_seed()
        } else {
            params.noise.seed
        };
        let field = heightmap::generate_height_field(layout.width(), &params.noise, seed);
        log::debug!(
            "heightmap {}x{} seed={} raw range [{}, {}]",
            layout.width(),
            layout.width(),
            seed,
            field.min,
            field.max
        );
        Ok(Self {
            layout,
            seed,
            initial_height: field.height.clone(),
            height: field.height,
            noise_range: (field.min, field.max),
            mesh: Mesh::default(),
        })
    }

    /// Run droplet erosion over the current height field.
    pub fn erode(&mut self, params: &ErosionParams) -> Result<ErosionStats, PipelineError> {
        let stats = erosion::erode(&mut self.height, params).at(Stage::Erosion)?;
        log::info!(
            "{} droplets, {} steps: eroded {:.3}, deposited {:.3}",
            stats.droplets,
            stats.steps,
            stats.eroded,
            stats.deposited
        );
        Ok(stats)
    }

    /// Rebuild the surface mesh in place from the current height field.
    pub fn rebuild_mesh(&mut self, params: &MeshParams) -> Result<(), PipelineError> {
        self.mesh.rebuild(&self.height, &self.layout, params).at(Stage::Mesh)
    }
}

/// Run the full pipeline: heightmap, erosion, mesh.
pub fn generate(params: &Params) -> Result<(Terrain, ErosionStats, Vec<Timing>), PipelineError> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    let t = Instant::now();
    let mut terrain = Terrain::from_noise(params)?;
    timings.push(Timing { name: "heightmap", ms: ms_since(t) });

    let t = Instant::now();
    let stats = terrain.erode(&params.erosion)?;
    timings.push(Timing { name: "erosion", ms: ms_since(t) });

    let t = Instant::now();
    terrain.rebuild_mesh(&params.mesh)?;
    timings.push(Timing { name: "mesh", ms: ms_since(t) });

    timings.push(Timing { name: "TOTAL", ms: ms_since(total_start) });
    for t in &timings {
        log::info!("{:12} {:8.1} ms", t.name, t.ms);
    }

    Ok((terrain, stats, timings))
}
