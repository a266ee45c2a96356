use macroquad::prelude::{Rect, Vec2};
use std::ops::{Add, Sub};

/// Integer 2D point; doubles as a tile coordinate key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
}

impl Point {
    /// Builds a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Floors both components.
    #[inline]
    pub fn from_floor(x: f32, y: f32) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
        }
    }

    /// Overwrites both components.
    pub fn set(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Squared euclidean distance to `other`.
    #[inline]
    pub fn distance_squared(self, other: Point) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Converts to a float vector.
    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Saturates at the `i32` range.
impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

/// Saturates at the `i32` range.
impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// Axis aligned rectangle stored as its two corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bound2D {
    /// Left edge.
    pub x0: f32,
    /// Top edge.
    pub y0: f32,
    /// Right edge (exclusive).
    pub x1: f32,
    /// Bottom edge (exclusive).
    pub y1: f32,
}

impl Bound2D {
    /// Builds a bound from origin and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
        }
    }

    /// Half-open containment test.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && y >= self.y0 && x < self.x1 && y < self.y1
    }

    /// Horizontal extent.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Vertical extent.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Same area as a macroquad rect.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x0, self.y0, self.width(), self.height())
    }
}
