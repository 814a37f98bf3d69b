use crate::error::ConfigError;

/// Row-major flat grid. No per-cell objects, f32 friendly.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }
}

impl Grid<f32> {
    /// Smallest and largest value in the grid.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// Square height field geometry: an interior region padded by `border` cells per side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapLayout {
    pub interior_size: usize,
    pub border: usize,
}

impl MapLayout {
    /// Border comes from the erosion brush radius so brush and gradient reads stay in bounds.
    pub fn new(interior_size: usize, brush_radius: i32) -> Result<Self, ConfigError> {
        if brush_radius <= 0 {
            return Err(ConfigError::NonPositiveBrushRadius(brush_radius));
        }
        if interior_size < 2 {
            return Err(ConfigError::InteriorTooSmall(interior_size));
        }
        let layout = Self {
            interior_size,
            border: brush_radius as usize,
        };
        let w = layout.width();
        if w.checked_mul(w).is_none_or(|n| n > u32::MAX as usize) {
            return Err(ConfigError::IndexOverflow(w));
        }
        Ok(layout)
    }

    /// Bordered side length.
    #[inline]
    pub fn width(&self) -> usize {
        self.interior_size + 2 * self.border
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.width() * self.width()
    }

    pub fn check_field(&self, field: &Grid<f32>) -> Result<(), ConfigError> {
        if field.w != self.width() || field.h != self.width() || field.data.len() != self.cells() {
            return Err(ConfigError::FieldSize {
                expected: self.cells(),
                got: field.data.len(),
            });
        }
        Ok(())
    }
}
