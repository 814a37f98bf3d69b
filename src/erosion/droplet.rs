use crate::config::ErosionParams;
use crate::erosion::brush::Brush;
use crate::erosion::buffer::HeightBuffer;
use crate::rng::Rng;

/// Direction vectors shorter than this are replaced by a random heading.
const MIN_DIRECTION: f32 = 1e-6;

/// Bilinear height and gradient at a continuous position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightAndGradient {
    pub height: f32,
    pub gx: f32,
    pub gy: f32,
}

/// Sample the four grid corners around `(x, y)`. Caller guarantees `x < width - 1` and `y < width - 1`.
#[inline]
pub fn sample_height_and_gradient<B: HeightBuffer + ?Sized>(
    heights: &B,
    width: usize,
    x: f32,
    y: f32,
) -> HeightAndGradient {
    let cx = x.floor();
    let cy = y.floor();
    let u = x - cx;
    let v = y - cy;
    let i = cy as usize * width + cx as usize;

    let nw = heights.get(i);
    let ne = heights.get(i + 1);
    let sw = heights.get(i + width);
    let se = heights.get(i + width + 1);

    HeightAndGradient {
        height: nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v,
        gx: (ne - nw) * (1.0 - v) + (se - sw) * v,
        gy: (sw - nw) * (1.0 - u) + (se - ne) * u,
    }
}

/// What a single droplet step did to the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Sediment dropped onto the four corners of the old cell.
    Deposited(f32),
    /// Material removed under the brush around the old cell.
    Eroded(f32),
    /// Moved outside the bordered interior; nothing was changed.
    OutOfBounds,
}

/// Per-droplet totals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DropletStats {
    pub steps: u32,
    pub deposited: f32,
    pub eroded: f32,
}

#[derive(Clone, Debug)]
pub struct Droplet {
    pub x: f32,
    pub y: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub speed: f32,
    pub water: f32,
    pub sediment: f32,
}

impl Droplet {
    pub fn new(x: f32, y: f32, params: &ErosionParams) -> Self {
        Self {
            x,
            y,
            dir_x: 0.0,
            dir_y: 0.0,
            speed: params.start_speed,
            water: params.start_water,
            sediment: 0.0,
        }
    }

    /// Advance one cell-length along the flow direction and deposit or erode at the old cell.
    pub fn step<B: HeightBuffer + ?Sized>(
        &mut self,
        heights: &mut B,
        width: usize,
        border: usize,
        params: &ErosionParams,
        brush: &Brush,
        rng: &mut Rng,
    ) -> StepOutcome {
        let cell_x = self.x.floor() as usize;
        let cell_y = self.y.floor() as usize;
        let u = self.x - cell_x as f32;
        let v = self.y - cell_y as f32;
        let cell = cell_y * width + cell_x;

        let here = sample_height_and_gradient(heights, width, self.x, self.y);

        self.dir_x = self.dir_x * params.inertia - here.gx * (1.0 - params.inertia);
        self.dir_y = self.dir_y * params.inertia - here.gy * (1.0 - params.inertia);
        let len = (self.dir_x * self.dir_x + self.dir_y * self.dir_y).sqrt();
        if len < MIN_DIRECTION {
            (self.dir_x, self.dir_y) = rng.unit_vec2();
        } else {
            self.dir_x /= len;
            self.dir_y /= len;
        }

        self.x += self.dir_x;
        self.y += self.dir_y;

        let lo = border as f32;
        let hi = (width - 1 - border) as f32;
        if self.x < lo || self.x > hi || self.y < lo || self.y > hi {
            return StepOutcome::OutOfBounds;
        }

        let new_height = sample_height_and_gradient(heights, width, self.x, self.y).height;
        let delta_height = new_height - here.height;

        let capacity = (-delta_height * self.speed * self.water * params.sediment_capacity_factor)
            .max(params.min_sediment_capacity);

        let outcome = if delta_height > 0.0 || self.sediment > capacity {
            // Uphill: fill the pit behind us, at most up to the new position's height.
            let amount = if delta_height > 0.0 {
                delta_height.min(self.sediment)
            } else {
                ((self.sediment - capacity) * params.deposit_speed).min(self.sediment)
            };
            self.sediment -= amount;

            heights.add(cell, amount * (1.0 - u) * (1.0 - v));
            heights.add(cell + 1, amount * u * (1.0 - v));
            heights.add(cell + width, amount * (1.0 - u) * v);
            heights.add(cell + width + 1, amount * u * v);
            StepOutcome::Deposited(amount)
        } else {
            let amount = ((capacity - self.sediment) * params.erode_speed).min(-delta_height);
            let removed = erode_with_brush(heights, width, cell_x, cell_y, amount, brush);
            self.sediment += removed;
            StepOutcome::Eroded(removed)
        };

        self.speed = (self.speed * self.speed + delta_height * params.gravity).max(0.0).sqrt();
        self.water *= 1.0 - params.evaporate_speed;

        outcome
    }
}

/// Remove `amount` spread by brush weight around `(cx, cy)`, never digging a cell below zero.
/// Returns the total actually removed.
fn erode_with_brush<B: HeightBuffer + ?Sized>(
    heights: &mut B,
    width: usize,
    cx: usize,
    cy: usize,
    amount: f32,
    brush: &Brush,
) -> f32 {
    let center = (cy * width + cx) as isize;
    let mut removed = 0.0;
    for c in &brush.cells {
        let nx = cx as i32 + c.dx;
        let ny = cy as i32 + c.dy;
        if nx < 0 || ny < 0 || nx >= width as i32 || ny >= width as i32 {
            continue;
        }
        let i = (center + c.offset) as usize;
        let weighted = amount * c.weight;
        let delta = weighted.min(heights.get(i).max(0.0));
        heights.add(i, -delta);
        removed += delta;
    }
    removed
}

/// Simulate one droplet from `start` until it leaves the interior, dries up or ages out.
pub fn run_droplet<B: HeightBuffer + ?Sized>(
    heights: &mut B,
    width: usize,
    border: usize,
    start: (f32, f32),
    params: &ErosionParams,
    brush: &Brush,
    rng: &mut Rng,
) -> DropletStats {
    let mut droplet = Droplet::new(start.0, start.1, params);
    let mut stats = DropletStats::default();

    for _ in 0..params.max_lifetime {
        let outcome = droplet.step(heights, width, border, params, brush, rng);
        stats.steps += 1;
        match outcome {
            StepOutcome::Deposited(a) => stats.deposited += a,
            StepOutcome::Eroded(a) => stats.eroded += a,
            StepOutcome::OutOfBounds => break,
        }
        if droplet.water < params.min_water {
            break;
        }
    }

    stats
}
