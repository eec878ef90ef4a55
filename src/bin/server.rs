use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use terraform::config::{Displacement, GenerationParameters};
use terraform::render;
use terraform::terrain::BandTable;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    iterations: Option<u32>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    smoothness: Option<f64>,
    peak_scale: Option<f64>,
    displacement: Option<Displacement>,
    bands: Option<BandTable>,
}

#[derive(Serialize)]
struct GenerateResponse {
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    size: usize,
    min: f64,
    max: f64,
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
struct ErrorBody {
    error: String,
}

/// Interactive requests are capped well below the library limit.
const MAX_SERVER_ITERATIONS: u32 = 11;

enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

fn encode_png(rgba: &[u8], size: usize) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, size as u32, size as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn build_response(seed: u64, params: GenerationParameters, bands: BandTable) -> Result<GenerateResponse, ApiError> {
    let (map, timings) =
        terraform::generate(seed, &params, &bands).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let size = map.size;

    let layer = |name: &str, rgba: &[u8]| -> Result<Layer, ApiError> {
        Ok(Layer {
            name: name.into(),
            data_url: encode_png(rgba, size).map_err(|e| ApiError::Internal(e.to_string()))?,
        })
    };

    let layers = vec![
        layer("heightmap", &render::render_heightmap(&map.height))?,
        layer("terrain", &render::render_terrain(&map.terrain, &bands))?,
        layer("map", &map.rgba)?,
    ];

    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(GenerateResponse {
        layers,
        timings: timing_entries,
        size,
        min: map.min,
        max: map.max,
    })
}

async fn generate_handler(Json(req): Json<GenerateRequest>) -> Result<Json<GenerateResponse>, ApiError> {
    let defaults = GenerationParameters::default();
    let seed = req.seed.unwrap_or(42);
    let params = GenerationParameters {
        iterations: req.iterations.unwrap_or(defaults.iterations),
        min_value: req.min_value.unwrap_or(defaults.min_value),
        max_value: req.max_value.unwrap_or(defaults.max_value),
        smoothness: req.smoothness.unwrap_or(defaults.smoothness),
        peak_scale: req.peak_scale.unwrap_or(defaults.peak_scale),
        displacement: req.displacement.unwrap_or(defaults.displacement),
    };
    if params.iterations > MAX_SERVER_ITERATIONS {
        return Err(ApiError::BadRequest(format!(
            "iterations must be at most {MAX_SERVER_ITERATIONS} here, got {}",
            params.iterations
        )));
    }
    let bands = req.bands.unwrap_or_default();

    log::info!("generate: seed={seed} params={params:?}");

    let response = tokio::task::spawn_blocking(move || build_response(seed, params, bands))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(response))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("terraform server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
