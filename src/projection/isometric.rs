use crate::geom::Point;
use macroquad::math::{vec2, Vec2};

/// Diamond grid. Tile coordinates map to the top vertex of each diamond;
/// "pixel" space is the unprojected square grid scaled by the tile height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Isometric {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) tile_width: f32,
    pub(crate) tile_height: f32,
}

impl Isometric {
    /// Diamond grid of `width` × `height` cells.
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            tile_width: tile_width.max(1) as f32,
            tile_height: tile_height.max(1) as f32,
        }
    }

    // x shift that puts the left-most vertex of the map at 0
    fn origin_x(&self) -> f32 {
        self.height as f32 * self.tile_width * 0.5
    }

    pub(crate) fn tile_to_screen(&self, x: f32, y: f32) -> Vec2 {
        vec2(
            (self.height as f32 + x - y) * self.tile_width * 0.5,
            (x + y) * self.tile_height * 0.5,
        )
    }

    pub(crate) fn screen_to_tile(&self, x: f32, y: f32) -> Point {
        let x = x - self.origin_x();
        let tile_y = y / self.tile_height;
        let tile_x = x / self.tile_width;
        Point::from_floor(tile_y + tile_x, tile_y - tile_x)
    }

    pub(crate) fn screen_to_pixel(&self, x: f32, y: f32) -> Vec2 {
        let x = x - self.origin_x();
        let tile_y = y / self.tile_height;
        let tile_x = x / self.tile_width;
        vec2(
            (tile_y + tile_x) * self.tile_height,
            (tile_y - tile_x) * self.tile_height,
        )
    }

    pub(crate) fn pixel_to_screen(&self, x: f32, y: f32) -> Vec2 {
        let tile_y = y / self.tile_height;
        let tile_x = x / self.tile_height;
        self.tile_to_screen(tile_x, tile_y)
    }

    pub(crate) fn tile_to_pixel(&self, x: f32, y: f32) -> Vec2 {
        vec2(x * self.tile_height, y * self.tile_height)
    }

    pub(crate) fn pixel_to_tile(&self, x: f32, y: f32) -> Point {
        Point::from_floor(x / self.tile_height, y / self.tile_height)
    }

    pub(crate) fn map_size(&self) -> Vec2 {
        let side = (self.width + self.height) as f32;
        vec2(side * self.tile_width * 0.5, side * self.tile_height * 0.5)
    }

    pub(crate) fn tile_size(&self) -> Vec2 {
        vec2(self.tile_width, self.tile_height)
    }

    /// Anti-diagonals back to front: `x + y = p` for `p` in `0..w+h-1`.
    pub(crate) fn visit(&self, f: &mut dyn FnMut(i32, i32)) {
        for p in 0..(self.width + self.height - 1).max(0) {
            for y in 0..=p {
                let x = p - y;
                if y < self.height && x < self.width {
                    f(x, y);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_vertex_and_map_size() {
        let iso = Isometric::new(4, 3, 64, 32);
        assert_eq!(iso.tile_to_screen(0.0, 0.0), vec2(96.0, 0.0));
        assert_eq!(iso.tile_to_screen(0.0, 2.0), vec2(32.0, 32.0));
        assert_eq!(iso.map_size(), vec2(224.0, 112.0));
        assert_eq!(iso.screen_to_tile(96.0, 1.0), Point::new(0, 0));
    }

    #[test]
    fn pixel_space_is_square() {
        let iso = Isometric::new(4, 3, 64, 32);
        assert_eq!(iso.tile_to_pixel(2.0, 1.0), vec2(64.0, 32.0));
        assert_eq!(iso.pixel_to_tile(63.0, 32.0), Point::new(1, 1));
        // pixel (0, 0) is the top vertex of tile (0, 0)
        assert_eq!(iso.pixel_to_screen(0.0, 0.0), vec2(96.0, 0.0));
        assert_eq!(iso.screen_to_pixel(96.0, 16.0), vec2(16.0, 16.0));
    }

    #[test]
    fn diagonals_are_visited_back_to_front() {
        let iso = Isometric::new(2, 2, 64, 32);
        let mut seen = Vec::new();
        iso.visit(&mut |x, y| seen.push((x, y)));
        assert_eq!(seen, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }
}
