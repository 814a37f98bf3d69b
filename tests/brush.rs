//! Erosion brush kernel construction.

use erosion_terrain::erosion::brush::Brush;
use erosion_terrain::error::ConfigError;

#[test]
fn weights_sum_to_one() {
    for r in 1..=8 {
        let brush = Brush::build(r, 64).unwrap();
        let sum: f32 = brush.cells.iter().map(|c| c.weight).sum();
        assert!((sum - 1.0).abs() < 1e-5, "radius {r}: sum {sum}");
    }
}

#[test]
fn offsets_lie_in_open_disk() {
    let r = 5;
    let brush = Brush::build(r, 40).unwrap();
    for c in &brush.cells {
        assert!(c.dx * c.dx + c.dy * c.dy < r * r);
        assert_eq!(c.offset, (c.dy * 40 + c.dx) as isize);
        assert!(c.weight > 0.0);
    }
}

#[test]
fn cell_count_matches_lattice_points_in_disk() {
    // Lattice points with x^2 + y^2 < r^2.
    let expected = [(1, 1), (2, 9), (3, 25), (4, 45), (5, 69)];
    for (r, n) in expected {
        assert_eq!(Brush::build(r, 32).unwrap().len(), n, "radius {r}");
    }
}

#[test]
fn centre_carries_the_largest_weight() {
    let brush = Brush::build(4, 32).unwrap();
    let centre = brush.cells.iter().find(|c| c.dx == 0 && c.dy == 0).unwrap();
    assert!(brush.cells.iter().all(|c| c.weight <= centre.weight));
}

#[test]
fn rejects_non_positive_radius() {
    assert_eq!(Brush::build(0, 32).unwrap_err(), ConfigError::NonPositiveBrushRadius(0));
    assert_eq!(Brush::build(-2, 32).unwrap_err(), ConfigError::NonPositiveBrushRadius(-2));
}
