use glam::Vec3;

use crate::config::MeshParams;
use crate::error::ConfigError;
use crate::grid::{Grid, MapLayout};

/// Indexed triangle surface over the interior of a height field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Clear and refill from `field`, keeping the existing allocations.
    pub fn rebuild(
        &mut self,
        field: &Grid<f32>,
        layout: &MapLayout,
        params: &MeshParams,
    ) -> Result<(), ConfigError> {
        let n = params.interior_size;
        if n < 2 {
            return Err(ConfigError::InteriorTooSmall(n));
        }
        if n != layout.interior_size {
            return Err(ConfigError::InteriorMismatch { layout: layout.interior_size, requested: n });
        }
        layout.check_field(field)?;

        self.positions.clear();
        self.indices.clear();
        self.positions.reserve(n * n);
        self.indices.reserve((n - 1) * (n - 1) * 6);

        let step = 1.0 / (n - 1) as f32;
        for y in 0..n {
            for x in 0..n {
                let h = field.get(x + layout.border, y + layout.border);
                let px = (x as f32 * step * 2.0 - 1.0) * params.horizontal_scale;
                let pz = (y as f32 * step * 2.0 - 1.0) * params.horizontal_scale;
                self.positions.push(Vec3::new(px, h * params.elevation_scale, pz));

                if x + 1 < n && y + 1 < n {
                    let i = (y * n + x) as u32;
                    let n = n as u32;
                    self.indices.extend_from_slice(&[i + n, i + n + 1, i, i + n + 1, i + 1, i]);
                }
            }
        }

        self.recalculate_normals();
        Ok(())
    }

    /// Area-weighted vertex normals: each face adds its unnormalized cross product.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vec3::ZERO);
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p = self.positions[a];
            let face = (self.positions[b] - p).cross(self.positions[c] - p);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }
        for n in &mut self.normals {
            *n = n.normalize_or(Vec3::Y);
        }
    }
}

/// Build a fresh mesh from the interior of `field`.
pub fn build_mesh(field: &Grid<f32>, layout: &MapLayout, params: &MeshParams) -> Result<Mesh, ConfigError> {
    let mut mesh = Mesh::default();
    mesh.rebuild(field, layout, params)?;
    Ok(mesh)
}
