use crate::error::ConfigError;

/// One kernel cell: its lattice offset from the centre, the same offset flattened
/// for the field width, and its normalized weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushCell {
    pub dx: i32,
    pub dy: i32,
    pub offset: isize,
    pub weight: f32,
}

/// Circular erosion kernel. Weights fall off linearly from the centre and sum to 1.
#[derive(Clone, Debug)]
pub struct Brush {
    pub radius: i32,
    pub cells: Vec<BrushCell>,
}

impl Brush {
    /// Every lattice point strictly inside the disk of `radius`, for a field `width` cells wide.
    pub fn build(radius: i32, width: usize) -> Result<Self, ConfigError> {
        if radius <= 0 {
            return Err(ConfigError::NonPositiveBrushRadius(radius));
        }
        let r2 = radius * radius;
        let mut cells = Vec::new();
        let mut weight_sum = 0.0f32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy;
                if d2 >= r2 {
                    continue;
                }
                let weight = 1.0 - (d2 as f32).sqrt() / radius as f32;
                weight_sum += weight;
                cells.push(BrushCell {
                    dx,
                    dy,
                    offset: dy as isize * width as isize + dx as isize,
                    weight,
                });
            }
        }

        // The centre cell always has weight 1, so the sum is never zero.
        debug_assert!(!cells.is_empty());
        for c in &mut cells {
            c.weight /= weight_sum;
        }

        Ok(Self { radius, cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}
