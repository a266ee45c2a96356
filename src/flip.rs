use crate::gid::TileId;
use macroquad::math::{vec2, Vec2};
use std::f32::consts::FRAC_PI_2;

/// Mirror flags of a placed tile, as a transform of its local pixel space.
///
/// The anti-diagonal flip is a transpose (x and y swapped) and is applied
/// before the horizontal and vertical mirrors. The hexagonal 120° bit is not
/// part of this transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlipTransform {
    #[allow(missing_docs)]
    pub horizontal: bool,
    #[allow(missing_docs)]
    pub vertical: bool,
    #[allow(missing_docs)]
    pub anti_diagonal: bool,
}

impl From<TileId> for FlipTransform {
    fn from(gid: TileId) -> Self {
        Self {
            horizontal: gid.is_flipped_horizontally(),
            vertical: gid.is_flipped_vertically(),
            anti_diagonal: gid.is_flipped_anti_diagonally(),
        }
    }
}

impl FlipTransform {
    #[allow(missing_docs)]
    pub fn is_identity(&self) -> bool {
        !(self.horizontal || self.vertical || self.anti_diagonal)
    }

    /// Size of the drawn tile; a transposed tile swaps width and height.
    pub fn footprint(&self, size: Vec2) -> Vec2 {
        if self.anti_diagonal {
            vec2(size.y, size.x)
        } else {
            size
        }
    }

    /// Maps a point of an unflipped `size` tile into the flipped footprint.
    pub fn apply(&self, p: Vec2, size: Vec2) -> Vec2 {
        let mut p = if self.anti_diagonal { vec2(p.y, p.x) } else { p };
        let extent = self.footprint(size);
        if self.horizontal {
            p.x = extent.x - p.x;
        }
        if self.vertical {
            p.y = extent.y - p.y;
        }
        p
    }

    /// `(rotation, flip_x, flip_y)` for `draw_texture_ex`, which mirrors first
    /// and then rotates clockwise about the sprite centre.
    pub fn draw_params(&self) -> (f32, bool, bool) {
        match (self.anti_diagonal, self.horizontal, self.vertical) {
            (false, h, v) => (0.0, h, v),
            (true, false, false) => (FRAC_PI_2, false, true),
            (true, true, false) => (FRAC_PI_2, false, false),
            (true, false, true) => (FRAC_PI_2, true, true),
            (true, true, true) => (FRAC_PI_2, true, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::{FLIPPED_DIAGONALLY, FLIPPED_HORIZONTALLY, FLIPPED_VERTICALLY};

    // centre-relative image of `v` under a mirror-then-rotate draw
    fn draw_image(params: (f32, bool, bool), v: Vec2) -> Vec2 {
        let (rot, fx, fy) = params;
        let m = vec2(if fx { -v.x } else { v.x }, if fy { -v.y } else { v.y });
        let (s, c) = rot.sin_cos();
        vec2(m.x * c - m.y * s, m.x * s + m.y * c)
    }

    fn all() -> Vec<FlipTransform> {
        let mut out = Vec::new();
        for bits in 0..8u32 {
            out.push(FlipTransform {
                horizontal: bits & 1 != 0,
                vertical: bits & 2 != 0,
                anti_diagonal: bits & 4 != 0,
            });
        }
        out
    }

    #[test]
    fn flags_come_from_gid() {
        let f = FlipTransform::from(TileId(FLIPPED_HORIZONTALLY | FLIPPED_DIAGONALLY | 3));
        assert!(f.horizontal && f.anti_diagonal && !f.vertical);
        assert!(FlipTransform::from(TileId(3)).is_identity());
        assert!(FlipTransform::from(TileId(FLIPPED_VERTICALLY | 3)).vertical);
    }

    #[test]
    fn transpose_happens_before_mirrors() {
        let size = vec2(32.0, 16.0);
        let f = FlipTransform {
            horizontal: true,
            vertical: false,
            anti_diagonal: true,
        };
        assert_eq!(f.footprint(size), vec2(16.0, 32.0));
        // (0,0) -> transpose (0,0) -> mirror x inside 16 wide footprint
        assert_eq!(f.apply(vec2(0.0, 0.0), size), vec2(16.0, 0.0));
        assert_eq!(f.apply(vec2(32.0, 0.0), size), vec2(16.0, 32.0));
    }

    #[test]
    fn draw_params_agree_with_apply() {
        let size = vec2(32.0, 16.0);
        let samples = [vec2(0.0, 0.0), vec2(32.0, 0.0), vec2(5.0, 11.0)];
        for f in all() {
            let from_centre = size * 0.5;
            let to_centre = f.footprint(size) * 0.5;
            for p in samples {
                let expected = f.apply(p, size) - to_centre;
                let got = draw_image(f.draw_params(), p - from_centre);
                assert!((expected - got).length() < 1e-3, "{f:?} {p:?}: {expected:?} vs {got:?}");
            }
        }
    }
}
