use std::path::PathBuf;

use erosion_terrain::config::Params;
use erosion_terrain::render;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut params = match args.get(5) {
        Some(path) => {
            let text = std::fs::read_to_string(path).expect("failed to read params file");
            Params::from_json(&text).expect("invalid params file")
        }
        None => Params::default(),
    };
    if let Some(seed) = args.get(1).and_then(|s| s.parse().ok()) {
        params.noise.seed = seed;
        params.erosion.seed = Some(seed);
    }
    if let Some(size) = args.get(2).and_then(|s| s.parse().ok()) {
        params.mesh.interior_size = size;
    }
    if let Some(iterations) = args.get(3).and_then(|s| s.parse().ok()) {
        params.erosion.iterations = iterations;
    }
    let out_dir: PathBuf = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    std::fs::create_dir_all(&out_dir).expect("failed to create output directory");

    eprintln!(
        "Generating {0}x{0} terrain with seed={1}, droplets={2}, mode={3:?}",
        params.mesh.interior_size, params.noise.seed, params.erosion.iterations, params.erosion.mode
    );

    let (terrain, stats, timings) = match erosion_terrain::generate(&params) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }
    eprintln!(
        "\nErosion: {} droplets, {} steps, eroded {:.3}, deposited {:.3}",
        stats.droplets, stats.steps, stats.eroded, stats.deposited
    );
    eprintln!("Seeds: noise={}, erosion={}", terrain.seed, stats.seed);
    eprintln!(
        "Mesh: {} vertices, {} triangles",
        terrain.mesh.positions.len(),
        terrain.mesh.triangle_count()
    );

    let save = |name: &str, rgba: &[u8], w: usize, h: usize| {
        let path = out_dir.join(name);
        image::save_buffer(&path, rgba, w as u32, h as u32, image::ColorType::Rgba8)
            .expect("failed to save image");
        eprintln!("Saved {}", path.display());
    };

    let w = terrain.layout.width();
    let n = terrain.layout.interior_size;

    save("heightmap.png", &render::render_heightmap(&terrain.initial_height), w, w);
    save("eroded.png", &render::render_heightmap(&terrain.height), w, w);
    save(
        "erosion_delta.png",
        &render::render_erosion_delta(&terrain.initial_height, &terrain.height),
        w,
        w,
    );
    save(
        "shaded.png",
        &render::render_shaded(&terrain.height, &terrain.layout, &terrain.mesh),
        n,
        n,
    );

    eprintln!("\nDone.");
}
