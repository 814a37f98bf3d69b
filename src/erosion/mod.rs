//! Droplet-based hydraulic erosion over a bordered height field.

pub mod brush;
pub mod buffer;
pub mod droplet;

use rayon::prelude::*;

use crate::config::ErosionParams;
use crate::error::ConfigError;
use crate::grid::{Grid, MapLayout};
use crate::rng::{Rng, system_seed};

use brush::Brush;
use buffer::SharedHeights;
use droplet::{DropletStats, run_droplet};

const SALT_STARTS: u64 = 0x57A2_7CE1_1000_0001;
const SALT_DROPLET: u64 = 0xD209_1E70_0000_0002;

/// Most batches one parallel dispatch may issue.
pub const MAX_BATCHES: usize = 65_535;

/// Totals over every droplet of one erosion run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErosionStats {
    pub seed: u64,
    pub droplets: u32,
    pub steps: u64,
    pub deposited: f64,
    pub eroded: f64,
}

impl ErosionStats {
    fn absorb(mut self, d: DropletStats) -> Self {
        self.droplets += 1;
        self.steps += d.steps as u64;
        self.deposited += d.deposited as f64;
        self.eroded += d.eroded as f64;
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.droplets += other.droplets;
        self.steps += other.steps;
        self.deposited += other.deposited;
        self.eroded += other.eroded;
        self
    }
}

/// Read-only inputs shared by every droplet of a run.
pub struct ErosionJob<'a> {
    pub width: usize,
    pub border: usize,
    /// Flat start cell per droplet.
    pub starts: &'a [u32],
    pub brush: &'a Brush,
    pub params: &'a ErosionParams,
    pub seed: u64,
}

impl ErosionJob<'_> {
    /// Droplet `i` always gets the same start and the same fallback-direction stream.
    fn droplet<B: buffer::HeightBuffer + ?Sized>(&self, heights: &mut B, i: usize) -> DropletStats {
        let start = self.starts[i] as usize;
        let pos = ((start % self.width) as f32, (start / self.width) as f32);
        let mut rng = Rng::stream(self.seed, SALT_DROPLET, i as u64);
        run_droplet(heights, self.width, self.border, pos, self.params, self.brush, &mut rng)
    }
}

/// Scheduling policy for running a job's droplets against one height buffer.
pub trait ErosionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reject configurations this strategy cannot dispatch.
    fn validate(&self, _iterations: u32) -> Result<(), ConfigError> {
        Ok(())
    }

    fn run(&self, heights: &mut [f32], job: &ErosionJob) -> ErosionStats;
}

/// Droplets run one after another; the result is reproducible for a fixed seed.
pub struct SequentialErosion;

impl ErosionStrategy for SequentialErosion {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn run(&self, heights: &mut [f32], job: &ErosionJob) -> ErosionStats {
        let mut stats = ErosionStats { seed: job.seed, ..Default::default() };
        for i in 0..job.starts.len() {
            stats = stats.absorb(job.droplet(heights, i));
        }
        stats
    }
}

/// Droplets run as independent work-items in groups of `batch_size`.
///
/// All work-items share one unsynchronized height buffer; concurrent droplets
/// crossing the same cells may lose each other's updates.
pub struct ParallelErosion {
    pub batch_size: usize,
}

impl ErosionStrategy for ParallelErosion {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn validate(&self, iterations: u32) -> Result<(), ConfigError> {
        if iterations == 0 {
            return Ok(());
        }
        if self.batch_size == 0 {
            return Err(ConfigError::NoParallelBatches(iterations));
        }
        let max = MAX_BATCHES.saturating_mul(self.batch_size).min(u32::MAX as usize) as u32;
        if iterations > max {
            return Err(ConfigError::TooManyDroplets { iterations, max });
        }
        Ok(())
    }

    fn run(&self, heights: &mut [f32], job: &ErosionJob) -> ErosionStats {
        let shared = SharedHeights::from_slice(heights);
        let bs = self.batch_size;

        let stats = job
            .starts
            .par_chunks(bs)
            .enumerate()
            .map(|(b, batch)| {
                (0..batch.len())
                    .into_par_iter()
                    .map(|k| {
                        let mut view = shared.view();
                        job.droplet(&mut view, b * bs + k)
                    })
                    .fold(ErosionStats::default, ErosionStats::absorb)
                    .reduce(ErosionStats::default, ErosionStats::merge)
            })
            .reduce(ErosionStats::default, ErosionStats::merge);

        shared.copy_to(heights);
        ErosionStats { seed: job.seed, ..stats }
    }
}

/// Uniform random start cells over the interior, as flat bordered indices.
pub fn random_start_indices(layout: &MapLayout, count: u32, seed: u64) -> Vec<u32> {
    let mut rng = Rng::new(seed ^ SALT_STARTS);
    let w = layout.width();
    (0..count)
        .map(|_| {
            let x = layout.border + rng.range_usize(layout.interior_size);
            let y = layout.border + rng.range_usize(layout.interior_size);
            (y * w + x) as u32
        })
        .collect()
}

/// Erode a square bordered field in place. The border width is the brush radius.
///
/// Every precondition is checked before the first droplet runs.
pub fn erode(field: &mut Grid<f32>, params: &ErosionParams) -> Result<ErosionStats, ConfigError> {
    if params.brush_radius <= 0 {
        return Err(ConfigError::NonPositiveBrushRadius(params.brush_radius));
    }
    let border = params.brush_radius as usize;
    let interior = field.w.saturating_sub(2 * border);
    let layout = MapLayout::new(interior, params.brush_radius)?;
    layout.check_field(field)?;

    let strategy = params.mode.strategy();
    strategy.validate(params.iterations)?;

    let brush = Brush::build(params.brush_radius, layout.width())?;
    let seed = params.seed.unwrap_or_else(system_seed);
    let starts = random_start_indices(&layout, params.iterations, seed);

    log::debug!(
        "eroding {}x{} field: {} droplets, brush of {} cells, {} strategy",
        layout.width(),
        layout.width(),
        params.iterations,
        brush.len(),
        strategy.name()
    );

    let job = ErosionJob {
        width: layout.width(),
        border: layout.border,
        starts: &starts,
        brush: &brush,
        params,
        seed,
    };
    Ok(strategy.run(&mut field.data, &job))
}
