use crate::geom::Point;
use crate::map::{StaggerAxis, StaggerIndex};
use macroquad::math::{vec2, Vec2};

const OFFSETS_STAGGER_X: [Point; 4] = [
    Point::new(0, 0),
    Point::new(1, -1),
    Point::new(1, 0),
    Point::new(2, 0),
];

const OFFSETS_STAGGER_Y: [Point; 4] = [
    Point::new(0, 0),
    Point::new(-1, 1),
    Point::new(0, 1),
    Point::new(0, 2),
];

/// Staggered and hexagonal grids.
///
/// Both shift every other row (axis `Y`) or column (axis `X`) by half a cell.
/// A staggered map is a hexagonal one with a side length of zero; the two only
/// differ in how a screen position is resolved back to a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hexagonal {
    pub(crate) width: i32,
    pub(crate) height: i32,
    diamond: bool,
    stagger_x: bool,
    stagger_even: bool,
    side_length_x: i32,
    side_length_y: i32,
    side_offset_x: i32,
    side_offset_y: i32,
    column_width: i32,
    row_height: i32,
    tile_width: i32,
    tile_height: i32,
}

impl Hexagonal {
    /// Hexagonal grid with the given side length on the stagger axis.
    pub fn new(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        axis: StaggerAxis,
        index: StaggerIndex,
        side_length: u32,
    ) -> Self {
        Self::build(width, height, tile_width, tile_height, axis, index, side_length as i32, false)
    }

    /// Staggered isometric grid.
    pub fn staggered(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        axis: StaggerAxis,
        index: StaggerIndex,
    ) -> Self {
        Self::build(width, height, tile_width, tile_height, axis, index, 0, true)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        axis: StaggerAxis,
        index: StaggerIndex,
        side_length: i32,
        diamond: bool,
    ) -> Self {
        let stagger_x = axis == StaggerAxis::X;
        let (side_length_x, side_length_y) = if stagger_x {
            (side_length, 0)
        } else {
            (0, side_length)
        };
        // odd sizes would leave a one pixel seam between rows
        let tw = (tile_width.max(2) & !1) as i32;
        let th = (tile_height.max(2) & !1) as i32;

        let side_offset_x = (tw - side_length_x) / 2;
        let side_offset_y = (th - side_length_y) / 2;
        let column_width = side_offset_x + side_length_x;
        let row_height = side_offset_y + side_length_y;

        Self {
            width: width as i32,
            height: height as i32,
            diamond,
            stagger_x,
            stagger_even: index == StaggerIndex::Even,
            side_length_x,
            side_length_y,
            side_offset_x,
            side_offset_y,
            column_width,
            row_height,
            tile_width: column_width + side_offset_x,
            tile_height: row_height + side_offset_y,
        }
    }

    fn stagger_index(&self) -> i32 {
        if self.stagger_even {
            0
        } else {
            1
        }
    }

    /// Whether row or column `v` on the stagger axis is shifted.
    pub fn do_stagger(&self, v: i32) -> bool {
        ((v & 1) ^ self.stagger_index()) == 0
    }

    pub(crate) fn tile_to_screen(&self, x: f32, y: f32) -> Vec2 {
        let tx = x.floor();
        let ty = y.floor();
        if self.stagger_x {
            let mut py = ty * (self.tile_height + self.side_length_y) as f32;
            if self.do_stagger(tx as i32) {
                py += self.row_height as f32;
            }
            vec2(tx * self.column_width as f32, py)
        } else {
            let mut px = tx * (self.tile_width + self.side_length_x) as f32;
            if self.do_stagger(ty as i32) {
                px += self.column_width as f32;
            }
            vec2(px, ty * self.row_height as f32)
        }
    }

    pub(crate) fn screen_to_tile(&self, x: f32, y: f32) -> Point {
        if self.diamond {
            self.staggered_screen_to_tile(x, y)
        } else {
            self.hex_screen_to_tile(x, y)
        }
    }

    // cell reference to tile coordinates; saturates for far-off screen positions
    fn double_on_axis(&self, reference: &mut Point) {
        let v = if self.stagger_x {
            &mut reference.x
        } else {
            &mut reference.y
        };
        *v = v.saturating_mul(2);
        if self.stagger_even {
            *v = v.saturating_add(1);
        }
    }

    fn hex_screen_to_tile(&self, mut x: f32, mut y: f32) -> Point {
        if self.stagger_x {
            x -= if self.stagger_even { self.tile_width } else { self.side_offset_x } as f32;
        } else {
            y -= if self.stagger_even { self.tile_height } else { self.side_offset_y } as f32;
        }

        let cell_w = (self.column_width * 2) as f32;
        let cell_h = (self.row_height * 2) as f32;
        let mut reference = Point::from_floor(x / cell_w, y / cell_h);
        let rel = Point::from_floor(
            x - reference.x as f32 * cell_w,
            y - reference.y as f32 * cell_h,
        );

        self.double_on_axis(&mut reference);

        let centers = if self.stagger_x {
            let left = self.side_length_x / 2;
            let cx = left + self.column_width;
            let cy = self.tile_height / 2;
            [
                Point::new(left, cy),
                Point::new(cx, cy - self.row_height),
                Point::new(cx, cy + self.row_height),
                Point::new(cx + self.column_width, cy),
            ]
        } else {
            let top = self.side_length_y / 2;
            let cx = self.tile_width / 2;
            let cy = top + self.row_height;
            [
                Point::new(cx, top),
                Point::new(cx - self.column_width, cy),
                Point::new(cx + self.column_width, cy),
                Point::new(cx, cy + self.row_height),
            ]
        };

        // strict comparison: on a tie the earlier candidate wins
        let mut nearest = 0;
        let mut min_dist = i64::MAX;
        for (i, c) in centers.iter().enumerate() {
            let d = c.distance_squared(rel);
            if d < min_dist {
                min_dist = d;
                nearest = i;
            }
        }

        let offsets = if self.stagger_x {
            &OFFSETS_STAGGER_X
        } else {
            &OFFSETS_STAGGER_Y
        };
        reference + offsets[nearest]
    }

    fn staggered_screen_to_tile(&self, mut x: f32, mut y: f32) -> Point {
        if self.stagger_even {
            if self.stagger_x {
                x -= self.side_offset_x as f32;
            } else {
                y -= self.side_offset_y as f32;
            }
        }

        let tw = self.tile_width as f32;
        let th = self.tile_height as f32;
        let mut reference = Point::from_floor(x / tw, y / th);
        let rel = Point::from_floor(x - reference.x as f32 * tw, y - reference.y as f32 * th);

        self.double_on_axis(&mut reference);

        let y_pos = rel.x as f32 * (th / tw);
        let off_y = self.side_offset_y as f32;
        let rel_y = rel.y as f32;

        if off_y - y_pos > rel_y {
            return self.top_left(reference.x, reference.y);
        }
        if -off_y + y_pos > rel_y {
            return self.top_right(reference.x, reference.y);
        }
        if off_y + y_pos < rel_y {
            return self.bottom_left(reference.x, reference.y);
        }
        if off_y * 3.0 - y_pos < rel_y {
            return self.bottom_right(reference.x, reference.y);
        }
        reference
    }

    /// Neighbour up and to the left.
    pub fn top_left(&self, x: i32, y: i32) -> Point {
        if !self.stagger_x {
            if self.do_stagger(y) {
                Point::new(x, y.saturating_sub(1))
            } else {
                Point::new(x.saturating_sub(1), y.saturating_sub(1))
            }
        } else if self.do_stagger(x) {
            Point::new(x.saturating_sub(1), y)
        } else {
            Point::new(x.saturating_sub(1), y.saturating_sub(1))
        }
    }

    /// Neighbour up and to the right.
    pub fn top_right(&self, x: i32, y: i32) -> Point {
        if !self.stagger_x {
            if self.do_stagger(y) {
                Point::new(x.saturating_add(1), y.saturating_sub(1))
            } else {
                Point::new(x, y.saturating_sub(1))
            }
        } else if self.do_stagger(x) {
            Point::new(x.saturating_add(1), y)
        } else {
            Point::new(x.saturating_add(1), y.saturating_sub(1))
        }
    }

    /// Neighbour down and to the left.
    pub fn bottom_left(&self, x: i32, y: i32) -> Point {
        if !self.stagger_x {
            if self.do_stagger(y) {
                Point::new(x, y.saturating_add(1))
            } else {
                Point::new(x.saturating_sub(1), y.saturating_add(1))
            }
        } else if self.do_stagger(x) {
            Point::new(x.saturating_sub(1), y.saturating_add(1))
        } else {
            Point::new(x.saturating_sub(1), y)
        }
    }

    /// Neighbour down and to the right.
    pub fn bottom_right(&self, x: i32, y: i32) -> Point {
        if !self.stagger_x {
            if self.do_stagger(y) {
                Point::new(x.saturating_add(1), y.saturating_add(1))
            } else {
                Point::new(x, y.saturating_add(1))
            }
        } else if self.do_stagger(x) {
            Point::new(x.saturating_add(1), y.saturating_add(1))
        } else {
            Point::new(x.saturating_add(1), y)
        }
    }

    pub(crate) fn map_size(&self) -> Vec2 {
        let (width, height) = (self.width as f32, self.height as f32);
        let (mut w, mut h) = if self.stagger_x {
            (
                width * self.column_width as f32 + self.side_offset_x as f32,
                height * (self.tile_height + self.side_length_y) as f32,
            )
        } else {
            (
                width * (self.tile_width + self.side_length_x) as f32,
                height * self.row_height as f32 + self.side_offset_y as f32,
            )
        };
        if self.stagger_x && self.width > 1 {
            h += self.row_height as f32;
        }
        if !self.stagger_x && self.height > 1 {
            w += self.column_width as f32;
        }
        vec2(w, h)
    }

    pub(crate) fn tile_size(&self) -> Vec2 {
        vec2(self.tile_width as f32, self.tile_height as f32)
    }

    /// Axis `Y`: row-major. Axis `X`: per row, unshifted columns then shifted ones.
    pub(crate) fn visit(&self, f: &mut dyn FnMut(i32, i32)) {
        if !self.stagger_x {
            for y in 0..self.height {
                for x in 0..self.width {
                    f(x, y);
                }
            }
            return;
        }
        let first = if self.do_stagger(0) { 1 } else { 0 };
        for y in 0..self.height {
            for start in [first, 1 - first] {
                let mut x = start;
                while x < self.width {
                    f(x, y);
                    x += 2;
                }
            }
        }
    }
}
