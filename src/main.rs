use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use boxseg_rs::{maskops, trace_boundary, Config, Segmenter, TraceOptions};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();

    let source = image::open(&config.input)
        .with_context(|| format!("Failed to open image: {}", config.input.display()))?
        .into_rgba8();

    let segmenter = match &config.model_path {
        Some(path) => Segmenter::with_onnx_model(path, config.device_id),
        None => Segmenter::fallback_only(),
    };

    let segmentation = segmenter.segment(&source, config.bbox);
    info!(
        width = segmentation.width(),
        height = segmentation.height(),
        model = segmenter.session_ready(),
        "segmentation complete"
    );

    maskops::save_png(&segmentation.mask, config.overlay_style(), &config.output)
        .with_context(|| format!("Failed to save mask: {}", config.output.display()))?;
    info!(path = %config.output.display(), "mask written");

    if let Some(path) = &config.geojson {
        let options = TraceOptions {
            offset: (
                i64::from(segmentation.bbox.x),
                i64::from(segmentation.bbox.y),
            ),
            min_ring_len: config.min_ring_len,
        };
        let collection = trace_boundary(&segmentation.mask, options);
        let body = serde_json::to_string_pretty(&collection)
            .context("Failed to serialize polygon outline")?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write GeoJSON: {}", path.display()))?;
        info!(path = %path.display(), features = collection.features.len(), "outline written");
    }

    Ok(())
}
