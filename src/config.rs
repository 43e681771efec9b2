use std::path::PathBuf;

use clap::Parser;

use crate::maskops::{BoundingBox, OverlayStyle, DEFAULT_MASK_FILENAME};
use crate::trace::DEFAULT_MIN_RING_LEN;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Source raster image
    pub input: PathBuf,

    /// Bounding box as `x,y,w,h` in source pixel coordinates
    #[arg(short, long, value_parser = parse_bbox)]
    pub bbox: BoundingBox,

    /// ONNX segmentation model; omit to use the threshold fallback only
    #[arg(short, long)]
    pub model_path: Option<PathBuf>,

    /// Output path for the tinted mask PNG
    #[arg(short, long, default_value = DEFAULT_MASK_FILENAME)]
    pub output: PathBuf,

    /// Optional output path for the polygon outline as GeoJSON
    #[arg(short, long)]
    pub geojson: Option<PathBuf>,

    /// Overlay color as RRGGBB hex
    #[arg(long, default_value = "ff0000", value_parser = parse_color)]
    pub overlay_color: [u8; 3],

    #[arg(long, default_value_t = 128)]
    pub overlay_alpha: u8,

    /// Minimum ring length before a return to the start pixel closes the loop
    #[arg(long, default_value_t = DEFAULT_MIN_RING_LEN)]
    pub min_ring_len: usize,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,
}

impl Config {
    pub const fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            color: self.overlay_color,
            alpha: self.overlay_alpha,
        }
    }
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    let parts = s
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bounding box components must be integers: {e}"))?;
    match parts[..] {
        [x, y, w, h] => Ok(BoundingBox::new(x, y, w, h)),
        _ => Err(format!(
            "expected 4 comma-separated values `x,y,w,h`, got {}",
            parts.len()
        )),
    }
}

fn parse_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 {
        return Err("expected a 6-digit RRGGBB hex color".to_string());
    }
    let component = |range| {
        u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid hex color: {e}"))
    };
    Ok([component(0..2)?, component(2..4)?, component(4..6)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_parsing_accepts_negative_origin() {
        let bbox = parse_bbox("-3, 4, 10, 20").unwrap();
        assert_eq!(bbox, BoundingBox { x: 0, y: 4, w: 10, h: 20 });
    }

    #[test]
    fn bbox_parsing_rejects_wrong_arity() {
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,3,4,5").is_err());
        assert!(parse_bbox("a,b,c,d").is_err());
    }

    #[test]
    fn color_parsing_handles_hash_prefix() {
        assert_eq!(parse_color("#00ff80").unwrap(), [0, 255, 128]);
        assert!(parse_color("12345").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }
}
