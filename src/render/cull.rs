use crate::command::TileRegion;
use crate::geom::Point;
use crate::projection::Projection;
use macroquad::prelude::*;

/// Extra tiles kept around the view so sprites taller than a cell are not cut early.
const CULL_MARGIN_TILES: i32 = 1;

/// Tiles overlapping the screen rectangle `view_min..view_max`, padded and clamped to the map.
///
/// Maps without a fixed grid (infinite ones) are not clamped.
pub fn visible_tile_range(projection: &Projection, view_min: Vec2, view_max: Vec2) -> TileRegion {
    let corners = [
        projection.screen_to_tile(view_min.x, view_min.y),
        projection.screen_to_tile(view_max.x, view_min.y),
        projection.screen_to_tile(view_min.x, view_max.y),
        projection.screen_to_tile(view_max.x, view_max.y),
    ];

    let min = |f: fn(&Point) -> i32| corners.iter().map(f).min().unwrap_or(0);
    let max = |f: fn(&Point) -> i32| corners.iter().map(f).max().unwrap_or(0);
    let mut x_min = min(|p| p.x).saturating_sub(CULL_MARGIN_TILES);
    let mut y_min = min(|p| p.y).saturating_sub(CULL_MARGIN_TILES);
    let mut x_max = max(|p| p.x).saturating_add(CULL_MARGIN_TILES);
    let mut y_max = max(|p| p.y).saturating_add(CULL_MARGIN_TILES);

    let (w, h) = projection.grid_size();
    if w > 0 && h > 0 {
        x_min = x_min.max(0);
        y_min = y_min.max(0);
        x_max = x_max.min(w - 1);
        y_max = y_max.min(h - 1);
    }
    if x_min > x_max || y_min > y_max {
        return TileRegion {
            start_x: x_min,
            start_y: y_min,
            width: 0,
            height: 0,
        };
    }

    TileRegion {
        start_x: x_min,
        start_y: y_min,
        width: span(x_min, x_max),
        height: span(y_min, y_max),
    }
}

// cells in `lo..=hi`, capped at u32::MAX
fn span(lo: i32, hi: i32) -> u32 {
    (hi as i64 - lo as i64 + 1).min(u32::MAX as i64) as u32
}

/// World-space rectangle a camera shows.
pub fn camera_view(cam: &Camera2D) -> (Vec2, Vec2) {
    let (viewport_width, viewport_height) = match cam.viewport {
        Some((_, _, w, h)) => (w as f32, h as f32),
        None => (screen_width(), screen_height()), // Fall back to screen dimensions
    };

    // zoom maps world units to clip space, which spans 2 units
    let half_w = (1.0 / cam.zoom.x).abs();
    let half_h = (1.0 / cam.zoom.y).abs();
    let half = if half_w.is_finite() && half_h.is_finite() {
        vec2(half_w, half_h)
    } else {
        vec2(viewport_width, viewport_height) * 0.5
    };
    (cam.target - half, cam.target + half)
}
