use crate::geom::Point;
use crate::map::RenderOrder;
use macroquad::math::{vec2, Vec2};

/// Plain rectangular grid; pixel and screen space coincide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthogonal {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) tile_width: i32,
    pub(crate) tile_height: i32,
    pub(crate) render_order: RenderOrder,
}

impl Orthogonal {
    /// Grid of `width` × `height` cells of `tile_width` × `tile_height` pixels.
    pub fn new(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        render_order: RenderOrder,
    ) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            tile_width: tile_width.max(1) as i32,
            tile_height: tile_height.max(1) as i32,
            render_order,
        }
    }

    pub(crate) fn tile_to_screen(&self, x: f32, y: f32) -> Vec2 {
        vec2(x * self.tile_width as f32, y * self.tile_height as f32)
    }

    pub(crate) fn screen_to_tile(&self, x: f32, y: f32) -> Point {
        Point::from_floor(x / self.tile_width as f32, y / self.tile_height as f32)
    }

    pub(crate) fn map_size(&self) -> Vec2 {
        vec2(
            self.width as f32 * self.tile_width as f32,
            self.height as f32 * self.tile_height as f32,
        )
    }

    pub(crate) fn tile_size(&self) -> Vec2 {
        vec2(self.tile_width as f32, self.tile_height as f32)
    }

    /// Rows outer, columns inner; the render order picks each direction.
    pub(crate) fn visit(&self, f: &mut dyn FnMut(i32, i32)) {
        let (rev_x, rev_y) = match self.render_order {
            RenderOrder::RightDown => (false, false),
            RenderOrder::RightUp => (false, true),
            RenderOrder::LeftDown => (true, false),
            RenderOrder::LeftUp => (true, true),
        };
        for j in 0..self.height {
            let y = if rev_y { self.height - 1 - j } else { j };
            for i in 0..self.width {
                let x = if rev_x { self.width - 1 - i } else { i };
                f(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_handles_negative_screen_positions() {
        let o = Orthogonal::new(4, 4, 32, 16, RenderOrder::RightDown);
        assert_eq!(o.screen_to_tile(-1.0, -1.0), Point::new(-1, -1));
        assert_eq!(o.screen_to_tile(31.9, 16.0), Point::new(0, 1));
        assert_eq!(o.tile_to_screen(3.0, 2.0), vec2(96.0, 32.0));
        assert_eq!(o.map_size(), vec2(128.0, 64.0));
    }

    #[test]
    fn left_up_reverses_both_axes() {
        let o = Orthogonal::new(2, 2, 8, 8, RenderOrder::LeftUp);
        let mut seen = Vec::new();
        o.visit(&mut |x, y| seen.push((x, y)));
        assert_eq!(seen, vec![(1, 1), (0, 1), (1, 0), (0, 0)]);
    }
}
