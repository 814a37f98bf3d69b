use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use erosion_terrain::config::{ErosionMode, Params};
use erosion_terrain::render;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    randomize_seed: Option<bool>,
    interior_size: Option<usize>,
    // Noise
    octaves: Option<u32>,
    persistence: Option<f32>,
    lacunarity: Option<f32>,
    initial_scale: Option<f32>,
    // Erosion
    iterations: Option<u32>,
    brush_radius: Option<i32>,
    max_lifetime: Option<u32>,
    inertia: Option<f32>,
    sediment_capacity_factor: Option<f32>,
    deposit_speed: Option<f32>,
    erode_speed: Option<f32>,
    evaporate_speed: Option<f32>,
    gravity: Option<f32>,
    sequential: Option<bool>,
    // Mesh
    horizontal_scale: Option<f32>,
    elevation_scale: Option<f32>,
}

impl GenerateRequest {
    fn into_params(self) -> Params {
        let mut p = Params::default();
        let n = &mut p.noise;
        n.seed = self.seed.unwrap_or(n.seed);
        n.randomize_seed = self.randomize_seed.unwrap_or(n.randomize_seed);
        n.octaves = self.octaves.unwrap_or(n.octaves);
        n.persistence = self.persistence.unwrap_or(n.persistence);
        n.lacunarity = self.lacunarity.unwrap_or(n.lacunarity);
        n.initial_scale = self.initial_scale.unwrap_or(n.initial_scale);

        let e = &mut p.erosion;
        e.seed = self.seed;
        e.iterations = self.iterations.unwrap_or(e.iterations);
        e.brush_radius = self.brush_radius.unwrap_or(e.brush_radius);
        e.max_lifetime = self.max_lifetime.unwrap_or(e.max_lifetime);
        e.inertia = self.inertia.unwrap_or(e.inertia);
        e.sediment_capacity_factor = self.sediment_capacity_factor.unwrap_or(e.sediment_capacity_factor);
        e.deposit_speed = self.deposit_speed.unwrap_or(e.deposit_speed);
        e.erode_speed = self.erode_speed.unwrap_or(e.erode_speed);
        e.evaporate_speed = self.evaporate_speed.unwrap_or(e.evaporate_speed);
        e.gravity = self.gravity.unwrap_or(e.gravity);
        if self.sequential.unwrap_or(false) {
            e.mode = ErosionMode::Sequential;
        }

        let m = &mut p.mesh;
        m.interior_size = self.interior_size.unwrap_or(m.interior_size);
        m.horizontal_scale = self.horizontal_scale.unwrap_or(m.horizontal_scale);
        m.elevation_scale = self.elevation_scale.unwrap_or(m.elevation_scale);
        p
    }
}

#[derive(Serialize)]
struct GenerateResponse {
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    seed: u64,
    erosion_seed: u64,
    width: usize,
    interior_size: usize,
    vertices: usize,
    triangles: usize,
    eroded: f64,
    deposited: f64,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn run(params: Params) -> Result<GenerateResponse, String> {
    let (terrain, stats, timings) = erosion_terrain::generate(&params).map_err(|e| e.to_string())?;
    let w = terrain.layout.width();
    let n = terrain.layout.interior_size;

    let layer = |name: &str, rgba: Vec<u8>, side: usize| -> Result<Layer, String> {
        Ok(Layer {
            name: name.into(),
            data_url: encode_png(&rgba, side, side).map_err(|e| e.to_string())?,
        })
    };

    let layers = vec![
        layer("heightmap", render::render_heightmap(&terrain.initial_height), w)?,
        layer("eroded", render::render_heightmap(&terrain.height), w)?,
        layer(
            "erosion_delta",
            render::render_erosion_delta(&terrain.initial_height, &terrain.height),
            w,
        )?,
        layer(
            "shaded",
            render::render_shaded(&terrain.height, &terrain.layout, &terrain.mesh),
            n,
        )?,
    ];

    Ok(GenerateResponse {
        layers,
        timings: timings
            .iter()
            .map(|t| TimingEntry { name: t.name.to_string(), ms: t.ms })
            .collect(),
        seed: terrain.seed,
        erosion_seed: stats.seed,
        width: w,
        interior_size: n,
        vertices: terrain.mesh.positions.len(),
        triangles: terrain.mesh.triangle_count(),
        eroded: stats.eroded,
        deposited: stats.deposited,
    })
}

async fn generate_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let params = req.into_params();
    let result = tokio::task::spawn_blocking(move || run(params))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r);

    match result {
        Ok(response) => Ok(Json(response)),
        Err(error) => {
            log::warn!("generate request rejected: {}", error);
            Err((StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse { error })))
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .layer(CorsLayer::permissive())
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("erosion_terrain server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
