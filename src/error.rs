use thiserror::Error;

/// Pipeline stage that rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Heightmap,
    Erosion,
    Mesh,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Heightmap => "heightmap",
            Stage::Erosion => "erosion",
            Stage::Mesh => "mesh",
        }
    }
}

/// Precondition violations. Always raised before any simulation work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("brush radius must be positive, got {0}")]
    NonPositiveBrushRadius(i32),
    #[error("interior size must be at least 2, got {0}")]
    InteriorTooSmall(usize),
    #[error("parallel erosion of {0} droplets with batch size 0 dispatches no batches")]
    NoParallelBatches(u32),
    #[error("{iterations} droplets exceed the work-item ceiling of {max}")]
    TooManyDroplets { iterations: u32, max: u32 },
    #[error("mesh requested for interior {requested}, field interior is {layout}")]
    InteriorMismatch { layout: usize, requested: usize },
    #[error("height buffer holds {got} cells, expected {expected}")]
    FieldSize { expected: usize, got: usize },
    #[error("bordered width {0} overflows 32-bit cell indexing")]
    IndexOverflow(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("stage '{}' failed: {source}", stage.name())]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: ConfigError,
}

pub trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T> AtStage<T> for Result<T, ConfigError> {
    fn at(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}
