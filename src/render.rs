use glam::Vec3;
use rayon::prelude::*;

use crate::grid::{Grid, MapLayout};
use crate::mesh::Mesh;

const LOWLAND: [u8; 4] = [70, 110, 60, 255];
const UPLAND: [u8; 4] = [150, 140, 110, 255];
const PEAK: [u8; 4] = [235, 235, 230, 255];
const ERODED: [u8; 4] = [200, 60, 40, 255];
const DEPOSITED: [u8; 4] = [40, 90, 210, 255];
const UNCHANGED: [u8; 4] = [245, 245, 245, 255];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Diagnostic: grayscale heightmap of the whole bordered field.
pub fn render_heightmap(height: &Grid<f32>) -> Vec<u8> {
    let (min_h, max_h) = height.min_max();
    let range = (max_h - min_h).max(1e-6);
    let w = height.w;
    let h = height.h;
    let mut rgba = vec![0u8; w * h * 4];
    for i in 0..w * h {
        let t = (height.data[i] - min_h) / range;
        let v = (t * 255.0).clamp(0.0, 255.0) as u8;
        rgba[i * 4..i * 4 + 4].copy_from_slice(&[v, v, v, 255]);
    }
    rgba
}

/// Elevation-tinted Lambert shading of the interior, lit from the north-west.
/// Output is `interior_size x interior_size`, one pixel per mesh vertex.
pub fn render_shaded(height: &Grid<f32>, layout: &MapLayout, mesh: &Mesh) -> Vec<u8> {
    let n = layout.interior_size;
    let light = Vec3::new(-1.0, 1.5, -1.0).normalize();
    let mut rgba = vec![0u8; n * n * 4];

    rgba.par_chunks_mut(n * 4).enumerate().for_each(|(y, row)| {
        for x in 0..n {
            let e = height.get(x + layout.border, y + layout.border).clamp(0.0, 1.0);
            let base = if e < 0.5 {
                lerp_color(LOWLAND, UPLAND, e / 0.5)
            } else {
                lerp_color(UPLAND, PEAK, (e - 0.5) / 0.5)
            };
            let normal = mesh.normals.get(y * n + x).copied().unwrap_or(Vec3::Y);
            let shade = 0.25 + 0.75 * normal.dot(light).max(0.0);
            let out = &mut row[x * 4..x * 4 + 4];
            out.copy_from_slice(&[
                (base[0] as f32 * shade) as u8,
                (base[1] as f32 * shade) as u8,
                (base[2] as f32 * shade) as u8,
                255,
            ]);
        }
    });

    rgba
}

/// Diagnostic: where erosion removed (red) or added (blue) material.
pub fn render_erosion_delta(before: &Grid<f32>, after: &Grid<f32>) -> Vec<u8> {
    let max_d = before
        .data
        .iter()
        .zip(&after.data)
        .map(|(a, b)| (b - a).abs())
        .fold(0.0f32, f32::max)
        .max(1e-6);
    let mut rgba = vec![0u8; after.w * after.h * 4];
    rgba.par_chunks_mut(4).enumerate().for_each(|(i, px)| {
        let d = (after.data[i] - before.data[i]) / max_d;
        let color = if d < 0.0 {
            lerp_color(UNCHANGED, ERODED, d.abs().sqrt())
        } else {
            lerp_color(UNCHANGED, DEPOSITED, d.sqrt())
        };
        px.copy_from_slice(&color);
    });
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_of_identical_fields_is_blank() {
        let g = Grid::<f32>::new(3, 3);
        let rgba = render_erosion_delta(&g, &g);
        assert!(rgba.chunks(4).all(|px| px == UNCHANGED));
    }
}
