use std::sync::atomic::{AtomicU32, Ordering};

/// Height storage a droplet reads and writes through.
pub trait HeightBuffer {
    fn get(&self, i: usize) -> f32;
    fn add(&mut self, i: usize, delta: f32);
}

impl HeightBuffer for [f32] {
    #[inline]
    fn get(&self, i: usize) -> f32 {
        self[i]
    }

    #[inline]
    fn add(&mut self, i: usize, delta: f32) {
        self[i] += delta;
    }
}

/// Height buffer shared by concurrently running droplets.
///
/// Cells hold f32 bit patterns. Updates are a relaxed load followed by a relaxed
/// store, not a read-modify-write, so two droplets touching the same cell at once
/// can lose one of the updates. Erosion quality is statistical and tolerates that.
pub struct SharedHeights {
    cells: Vec<AtomicU32>,
}

impl SharedHeights {
    pub fn from_slice(heights: &[f32]) -> Self {
        Self {
            cells: heights.iter().map(|h| AtomicU32::new(h.to_bits())).collect(),
        }
    }

    pub fn view(&self) -> SharedView<'_> {
        SharedView { cells: &self.cells }
    }

    /// Read back into host memory once all work-items have finished.
    pub fn copy_to(&self, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.cells.len());
        for (o, c) in out.iter_mut().zip(&self.cells) {
            *o = f32::from_bits(c.load(Ordering::Relaxed));
        }
    }
}

#[derive(Clone, Copy)]
pub struct SharedView<'a> {
    cells: &'a [AtomicU32],
}

impl HeightBuffer for SharedView<'_> {
    #[inline]
    fn get(&self, i: usize) -> f32 {
        f32::from_bits(self.cells[i].load(Ordering::Relaxed))
    }

    #[inline]
    fn add(&mut self, i: usize, delta: f32) {
        let v = self.get(i) + delta;
        self.cells[i].store(v.to_bits(), Ordering::Relaxed);
    }
}
