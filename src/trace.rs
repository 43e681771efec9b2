use geojson::{Feature, FeatureCollection, Geometry, Value};
use image::GrayImage;

/// Minimum number of points collected before a return to the start pixel is
/// treated as a closed loop. Guards against premature closure on tiny noisy
/// masks; configurable through [`TraceOptions`].
pub const DEFAULT_MIN_RING_LEN: usize = 20;

/// Clockwise 8-connected neighbor ordering used by the boundary walk.
const NEIGHBORS: [(i64, i64); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

#[derive(Debug, Clone, Copy)]
pub struct TraceOptions {
    /// Translation applied to every emitted coordinate, e.g. the crop origin
    /// when re-embedding a crop-local ring into full-image coordinates.
    pub offset: (i64, i64),
    pub min_ring_len: usize,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            offset: (0, 0),
            min_ring_len: DEFAULT_MIN_RING_LEN,
        }
    }
}

/// Trace the outer boundary of the first foreground region in `mask` and
/// package it as a GeoJSON FeatureCollection with zero or one Polygon
/// feature.
///
/// Moore-neighbor following: starting from the first row-major foreground
/// pixel, each step appends the current pixel and searches the 8-neighborhood
/// clockwise, beginning one position counter-clockwise of the direction that
/// led here, for the next in-bounds foreground pixel. The walk terminates
/// when no foreground neighbor exists (isolated pixel), when it returns to
/// the start after collecting more than `min_ring_len` points, or after a
/// `width * height` iteration ceiling, so it always terminates.
///
/// Known scope limits: only the first-encountered region is traced, and the
/// emitted ring may be degenerate (fewer than 3 points) for very small
/// regions — callers must tolerate both.
pub fn trace_boundary(mask: &GrayImage, options: TraceOptions) -> FeatureCollection {
    let features = trace_ring(mask, options)
        .map(|ring| {
            vec![Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                id: None,
                properties: None,
                foreign_members: None,
            }]
        })
        .unwrap_or_default();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// The raw walk. Returns `None` for an all-background mask, otherwise a
/// closed ring (first position repeated, unless the ring is a single point).
fn trace_ring(mask: &GrayImage, options: TraceOptions) -> Option<Vec<Vec<f64>>> {
    let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
    let foreground =
        |x: i64, y: i64| x >= 0 && y >= 0 && x < w && y < h && mask.get_pixel(x as u32, y as u32)[0] != 0;

    // enumerate_pixels scans row-major
    let start = mask
        .enumerate_pixels()
        .find(|(_, _, px)| px[0] != 0)
        .map(|(x, y, _)| (i64::from(x), i64::from(y)))?;

    let ceiling = (w * h) as usize;
    let (ox, oy) = options.offset;
    let mut points: Vec<Vec<f64>> = Vec::new();
    let (mut cx, mut cy) = start;
    let mut dir = 0;

    loop {
        points.push(vec![(cx + ox) as f64, (cy + oy) as f64]);

        // search clockwise from one position counter-clockwise of the
        // previous direction
        let mut next = None;
        for step in 0..NEIGHBORS.len() {
            let d = (dir + 7 + step) % 8;
            let (dx, dy) = NEIGHBORS[d];
            if foreground(cx + dx, cy + dy) {
                next = Some((d, cx + dx, cy + dy));
                break;
            }
        }
        let Some((d, nx, ny)) = next else {
            break; // isolated pixel
        };
        (cx, cy, dir) = (nx, ny, d);

        if (cx, cy) == start && points.len() > options.min_ring_len {
            break;
        }
        if points.len() >= ceiling {
            break;
        }
    }

    if points.len() > 1 {
        points.push(points[0].clone());
    }
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maskops::FOREGROUND;
    use image::Luma;

    fn mask_with(w: u32, h: u32, fg: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(w, h);
        for &(x, y) in fg {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
        mask
    }

    fn ring_of(collection: &FeatureCollection) -> Vec<(i64, i64)> {
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        let Value::Polygon(rings) = &geometry.value else {
            panic!("expected polygon geometry");
        };
        rings[0]
            .iter()
            .map(|p| (p[0] as i64, p[1] as i64))
            .collect()
    }

    #[test]
    fn all_background_yields_empty_collection() {
        let collection = trace_boundary(&GrayImage::new(10, 10), TraceOptions::default());
        assert!(collection.features.is_empty());
    }

    #[test]
    fn single_pixel_yields_degenerate_ring() {
        let mask = mask_with(10, 10, &[(5, 5)]);
        let collection = trace_boundary(&mask, TraceOptions::default());
        assert_eq!(ring_of(&collection), vec![(5, 5)]);
    }

    #[test]
    fn single_pixel_respects_offset() {
        let mask = mask_with(10, 10, &[(5, 5)]);
        let options = TraceOptions {
            offset: (100, 40),
            ..TraceOptions::default()
        };
        assert_eq!(ring_of(&trace_boundary(&mask, options)), vec![(105, 45)]);
    }

    #[test]
    fn square_boundary_is_clockwise_and_closed() {
        // 2x2 foreground square at rows/cols 1..=2 of a 4x4 mask
        let mask = mask_with(4, 4, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        let options = TraceOptions {
            min_ring_len: 3,
            ..TraceOptions::default()
        };
        assert_eq!(
            ring_of(&trace_boundary(&mask, options)),
            vec![(1, 1), (2, 1), (2, 2), (1, 2), (1, 1)]
        );
    }

    #[test]
    fn small_ring_terminates_under_default_min_len() {
        // with the default minimum the walk keeps lapping the square until
        // the iteration ceiling; it must still terminate and stay on the
        // square's boundary pixels
        let mask = mask_with(4, 4, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        let ring = ring_of(&trace_boundary(&mask, TraceOptions::default()));
        assert!(!ring.is_empty());
        assert!(ring
            .iter()
            .all(|p| [(1, 1), (2, 1), (2, 2), (1, 2)].contains(p)));
    }

    #[test]
    fn filled_rectangle_bounds_match() {
        let mut fg = Vec::new();
        for y in 2..=7 {
            for x in 3..=9 {
                fg.push((x, y));
            }
        }
        let mask = mask_with(12, 12, &fg);
        let ring = ring_of(&trace_boundary(&mask, TraceOptions::default()));

        let min_x = ring.iter().map(|p| p.0).min().unwrap();
        let max_x = ring.iter().map(|p| p.0).max().unwrap();
        let min_y = ring.iter().map(|p| p.1).min().unwrap();
        let max_y = ring.iter().map(|p| p.1).max().unwrap();
        assert_eq!((min_x, min_y, max_x, max_y), (3, 2, 9, 7));
    }
}
