//! Coordinate conversion between tile, pixel and screen space.
//!
//! * tile space: integer grid coordinates of a cell
//! * pixel space: the unprojected map plane (identical to screen space for
//!   every orientation but isometric)
//! * screen space: where sprites are drawn, origin at the top-left of the map's
//!   bounding box

mod hexagonal;
mod isometric;
mod orthogonal;

pub use hexagonal::Hexagonal;
pub use isometric::Isometric;
pub use orthogonal::Orthogonal;

use crate::geom::Point;
use crate::map::{Orientation, TiledMap};
use macroquad::math::{vec2, Vec2};

/// Projection for one map, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    #[allow(missing_docs)]
    Orthogonal(Orthogonal),
    #[allow(missing_docs)]
    Isometric(Isometric),
    /// Staggered isometric; shares the hexagonal layout with a zero side length.
    Staggered(Hexagonal),
    #[allow(missing_docs)]
    Hexagonal(Hexagonal),
}

impl Projection {
    /// Picks the projection matching the map orientation.
    pub fn for_map(map: &TiledMap) -> Self {
        let (w, h, tw, th) = (map.width, map.height, map.tile_width, map.tile_height);
        match map.orientation {
            Orientation::Orthogonal => {
                Self::Orthogonal(Orthogonal::new(w, h, tw, th, map.render_order))
            }
            Orientation::Isometric => Self::Isometric(Isometric::new(w, h, tw, th)),
            Orientation::Staggered => Self::Staggered(Hexagonal::staggered(
                w,
                h,
                tw,
                th,
                map.stagger_axis,
                map.stagger_index,
            )),
            Orientation::Hexagonal => Self::Hexagonal(Hexagonal::new(
                w,
                h,
                tw,
                th,
                map.stagger_axis,
                map.stagger_index,
                map.hex_side_length,
            )),
        }
    }

    /// Map width and height in cells.
    pub fn grid_size(&self) -> (i32, i32) {
        match self {
            Self::Orthogonal(o) => (o.width, o.height),
            Self::Isometric(i) => (i.width, i.height),
            Self::Staggered(h) | Self::Hexagonal(h) => (h.width, h.height),
        }
    }

    /// Pixel position of a tile corner.
    pub fn tile_to_pixel(&self, x: f32, y: f32) -> Vec2 {
        match self {
            Self::Isometric(i) => i.tile_to_pixel(x, y),
            _ => self.tile_to_screen(x, y),
        }
    }

    #[allow(missing_docs)]
    pub fn pixel_to_tile(&self, x: f32, y: f32) -> Point {
        match self {
            Self::Isometric(i) => i.pixel_to_tile(x, y),
            _ => self.screen_to_tile(x, y),
        }
    }

    /// Screen position a tile is anchored at.
    ///
    /// This is the top-left corner of the cell, except on isometric maps where
    /// it is the top vertex of the diamond.
    pub fn tile_to_screen(&self, x: f32, y: f32) -> Vec2 {
        match self {
            Self::Orthogonal(o) => o.tile_to_screen(x, y),
            Self::Isometric(i) => i.tile_to_screen(x, y),
            Self::Staggered(h) | Self::Hexagonal(h) => h.tile_to_screen(x, y),
        }
    }

    /// Tile under a screen position.
    pub fn screen_to_tile(&self, x: f32, y: f32) -> Point {
        match self {
            Self::Orthogonal(o) => o.screen_to_tile(x, y),
            Self::Isometric(i) => i.screen_to_tile(x, y),
            Self::Staggered(h) | Self::Hexagonal(h) => h.screen_to_tile(x, y),
        }
    }

    #[allow(missing_docs)]
    pub fn screen_to_pixel(&self, x: f32, y: f32) -> Vec2 {
        match self {
            Self::Isometric(i) => i.screen_to_pixel(x, y),
            _ => vec2(x, y),
        }
    }

    #[allow(missing_docs)]
    pub fn pixel_to_screen(&self, x: f32, y: f32) -> Vec2 {
        match self {
            Self::Isometric(i) => i.pixel_to_screen(x, y),
            _ => vec2(x, y),
        }
    }

    /// Size of the whole map in screen pixels.
    pub fn map_size(&self) -> Vec2 {
        match self {
            Self::Orthogonal(o) => o.map_size(),
            Self::Isometric(i) => i.map_size(),
            Self::Staggered(h) | Self::Hexagonal(h) => h.map_size(),
        }
    }

    /// Drawn size of one cell. Hexagonal sizes are rounded down to even.
    pub fn tile_size(&self) -> Vec2 {
        match self {
            Self::Orthogonal(o) => o.tile_size(),
            Self::Isometric(i) => i.tile_size(),
            Self::Staggered(h) | Self::Hexagonal(h) => h.tile_size(),
        }
    }

    /// Screen position of the visual centre of a tile.
    pub fn tile_center(&self, x: i32, y: i32) -> Vec2 {
        let anchor = self.tile_to_screen(x as f32, y as f32);
        let size = self.tile_size();
        match self {
            Self::Isometric(_) => anchor + vec2(0.0, size.y * 0.5),
            _ => anchor + size * 0.5,
        }
    }

    /// Calls `f(x, y, z)` for every cell of the map, back to front.
    pub fn visit_tiles<F: FnMut(i32, i32, u32)>(&self, mut f: F) {
        let mut z = 0u32;
        let mut step = |x: i32, y: i32| {
            f(x, y, z);
            z += 1;
        };
        match self {
            Self::Orthogonal(o) => o.visit(&mut step),
            Self::Isometric(i) => i.visit(&mut step),
            Self::Staggered(h) | Self::Hexagonal(h) => h.visit(&mut step),
        }
    }

    /// Draw rank of every cell.
    pub fn z_order(&self) -> ZOrder {
        let (w, h) = self.grid_size();
        let (w, h) = (w.max(0) as u32, h.max(0) as u32);
        let mut order = vec![0u32; w as usize * h as usize];
        self.visit_tiles(|x, y, z| {
            order[x as usize + y as usize * w as usize] = z;
        });
        ZOrder {
            width: w,
            height: h,
            order,
        }
    }
}

/// Draw rank per cell, indexed by `x + y * width`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZOrder {
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
    order: Vec<u32>,
}

impl ZOrder {
    /// Rank of the cell, `None` outside the map.
    pub fn at(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.order
            .get(x as usize + y as usize * self.width as usize)
            .copied()
    }

    #[allow(missing_docs)]
    pub fn as_slice(&self) -> &[u32] {
        &self.order
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{RenderOrder, StaggerAxis, StaggerIndex};

    fn map(orientation: Orientation, w: u32, h: u32, tw: u32, th: u32) -> TiledMap {
        let mut m = TiledMap::new(w, h, tw, th);
        m.orientation = orientation;
        m
    }

    fn all_maps() -> Vec<TiledMap> {
        let mut maps = vec![
            map(Orientation::Orthogonal, 5, 4, 16, 16),
            map(Orientation::Isometric, 5, 4, 64, 32),
        ];
        for axis in [StaggerAxis::X, StaggerAxis::Y] {
            for index in [StaggerIndex::Odd, StaggerIndex::Even] {
                let mut s = map(Orientation::Staggered, 5, 4, 64, 32);
                s.stagger_axis = axis;
                s.stagger_index = index;
                maps.push(s);

                let mut h = map(Orientation::Hexagonal, 5, 4, 32, 32);
                h.stagger_axis = axis;
                h.stagger_index = index;
                h.hex_side_length = 16;
                maps.push(h);
            }
        }
        maps
    }

    #[test]
    fn tile_centre_round_trips_for_every_orientation() {
        for m in all_maps() {
            let p = m.projection();
            for y in 0..m.height as i32 {
                for x in 0..m.width as i32 {
                    let c = p.tile_center(x, y);
                    assert_eq!(
                        p.screen_to_tile(c.x, c.y),
                        Point::new(x, y),
                        "{:?} {:?}/{:?} at ({x},{y})",
                        m.orientation,
                        m.stagger_axis,
                        m.stagger_index
                    );
                }
            }
        }
    }

    #[test]
    fn z_order_is_a_permutation() {
        let mut orders = all_maps();
        for ro in [RenderOrder::RightUp, RenderOrder::LeftDown, RenderOrder::LeftUp] {
            let mut m = map(Orientation::Orthogonal, 3, 7, 8, 8);
            m.render_order = ro;
            orders.push(m);
        }
        for m in orders {
            let z = m.projection().z_order();
            let mut ranks = z.as_slice().to_vec();
            ranks.sort_unstable();
            let expected: Vec<u32> = (0..(m.width * m.height)).collect();
            assert_eq!(ranks, expected, "{:?}", m.orientation);
        }
    }

    #[test]
    fn right_up_draws_bottom_row_first() {
        let mut m = map(Orientation::Orthogonal, 2, 2, 8, 8);
        m.render_order = RenderOrder::RightUp;
        let z = m.projection().z_order();
        assert_eq!(z.at(0, 1), Some(0));
        assert_eq!(z.at(1, 1), Some(1));
        assert_eq!(z.at(0, 0), Some(2));
        assert_eq!(z.at(2, 0), None);
    }

    #[test]
    fn pixel_and_screen_coincide_off_isometric() {
        let p = map(Orientation::Hexagonal, 3, 3, 32, 32).projection();
        assert_eq!(p.screen_to_pixel(12.5, 3.0), vec2(12.5, 3.0));
        assert_eq!(p.tile_to_pixel(1.0, 1.0), p.tile_to_screen(1.0, 1.0));
    }

    #[test]
    fn isometric_pixel_screen_round_trip() {
        let p = map(Orientation::Isometric, 4, 4, 64, 32).projection();
        let s = p.pixel_to_screen(40.0, 8.0);
        assert_eq!(p.screen_to_pixel(s.x, s.y), vec2(40.0, 8.0));
    }
}
