//! End-to-end generate -> erode -> mesh runs.

use erosion_terrain::config::{ErosionMode, ErosionParams, MeshParams, NoiseParams, Params};
use erosion_terrain::error::{ConfigError, Stage};
use erosion_terrain::grid::{Grid, MapLayout};
use erosion_terrain::mesh::build_mesh;
use erosion_terrain::{Terrain, erosion, generate};

fn small_params() -> Params {
    Params {
        noise: NoiseParams { seed: 10, ..Default::default() },
        erosion: ErosionParams {
            iterations: 2000,
            seed: Some(10),
            mode: ErosionMode::Sequential,
            ..Default::default()
        },
        mesh: MeshParams { interior_size: 48, ..Default::default() },
    }
}

#[test]
fn flat_field_without_droplets_gives_flat_grid() {
    let layout = MapLayout::new(4, 1).unwrap();
    let mut field = Grid::<f32>::new(layout.width(), layout.width());
    let params = ErosionParams { brush_radius: 1, iterations: 0, ..Default::default() };
    erosion::erode(&mut field, &params).unwrap();

    let mesh = build_mesh(&field, &layout, &MeshParams { interior_size: 4, ..Default::default() }).unwrap();
    assert_eq!(mesh.positions.len(), 16);
    assert_eq!(mesh.indices.len(), 54);
    assert_eq!(mesh.triangle_count(), 18);
    assert!(mesh.positions.iter().all(|p| p.y == 0.0));
}

#[test]
fn full_pipeline_produces_mesh_of_interior() {
    let params = small_params();
    let (terrain, stats, timings) = generate(&params).unwrap();
    assert_eq!(terrain.layout.width(), 54);
    assert_eq!(terrain.height.data.len(), 54 * 54);
    assert_eq!(terrain.mesh.positions.len(), 48 * 48);
    assert_eq!(terrain.mesh.indices.len(), 47 * 47 * 6);
    assert_eq!(stats.droplets, 2000);
    assert_ne!(terrain.initial_height, terrain.height);
    let names: Vec<_> = timings.iter().map(|t| t.name).collect();
    assert_eq!(names, ["heightmap", "erosion", "mesh", "TOTAL"]);
}

#[test]
fn sequential_pipeline_is_reproducible() {
    let params = small_params();
    let (a, _, _) = generate(&params).unwrap();
    let (b, _, _) = generate(&params).unwrap();
    assert_eq!(a.height, b.height);
    assert_eq!(a.mesh, b.mesh);
}

#[test]
fn randomized_seed_is_reported() {
    let mut params = small_params();
    params.noise.randomize_seed = true;
    params.erosion.iterations = 0;
    let terrain = Terrain::from_noise(&params).unwrap();
    let mut replay = small_params();
    replay.noise.seed = terrain.seed;
    let again = Terrain::from_noise(&replay).unwrap();
    assert_eq!(terrain.height, again.height);
}

#[test]
fn drawn_erosion_seed_replays_the_run() {
    let mut params = small_params();
    params.erosion.seed = None;
    let (terrain, stats, _) = generate(&params).unwrap();

    let mut replay = terrain.initial_height.clone();
    let fixed = ErosionParams { seed: Some(stats.seed), ..params.erosion.clone() };
    let again = erosion::erode(&mut replay, &fixed).unwrap();
    assert_eq!(again.seed, stats.seed);
    assert_eq!(replay, terrain.height);
}

#[test]
fn errors_name_the_failing_stage() {
    let mut params = small_params();
    params.mesh.interior_size = 1;
    let err = generate(&params).err().unwrap();
    assert_eq!(err.stage, Stage::Mesh);
    assert_eq!(err.source, ConfigError::InteriorTooSmall(1));

    let mut params = small_params();
    params.erosion.brush_radius = 0;
    let err = generate(&params).err().unwrap();
    assert_eq!(err.stage, Stage::Erosion);
    assert!(err.to_string().starts_with("stage 'erosion' failed"));

    let mut params = small_params();
    params.erosion.mode = ErosionMode::Parallel { batch_size: 0 };
    assert_eq!(generate(&params).err().unwrap().stage, Stage::Erosion);
}

#[test]
fn remeshing_with_another_interior_is_rejected() {
    let mut params = small_params();
    params.erosion.iterations = 0;
    let (mut terrain, _, _) = generate(&params).unwrap();
    let err = terrain
        .rebuild_mesh(&MeshParams { interior_size: 100, ..Default::default() })
        .unwrap_err();
    assert_eq!(err.stage, Stage::Mesh);
    assert_eq!(err.source, ConfigError::InteriorMismatch { layout: 48, requested: 100 });
    assert_eq!(terrain.mesh.positions.len(), 48 * 48);
}

#[test]
fn terrain_can_be_eroded_and_remeshed_again() {
    let params = small_params();
    let (mut terrain, _, _) = generate(&params).unwrap();
    let once = terrain.height.clone();
    terrain.erode(&params.erosion).unwrap();
    assert_ne!(once, terrain.height);
    terrain.rebuild_mesh(&params.mesh).unwrap();
    assert_eq!(terrain.mesh.positions.len(), 48 * 48);
}
