//! Global tile id flag bits.

/// Horizontal flip flag.
pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000; // bit 31
/// Vertical flip flag.
pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000; // bit 30
/// Anti-diagonal flip flag.
pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000; // bit 29
/// 120° rotation flag.
pub const ROTATED_HEXAGONAL_120: u32 = 0x1000_0000; // bit 28, hex maps only
/// Every flag bit.
pub const FLIPPED_MASK: u32 =
    FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY | ROTATED_HEXAGONAL_120;

/// Raw global tile id as stored in layer data, flag bits included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

#[allow(missing_docs)]
impl TileId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn gid_no_mask(self) -> u32 {
        gid_no_mask(self.0)
    }

    #[inline]
    pub fn is_flipped_horizontally(self) -> bool {
        (self.0 & FLIPPED_HORIZONTALLY) != 0
    }

    #[inline]
    pub fn is_flipped_vertically(self) -> bool {
        (self.0 & FLIPPED_VERTICALLY) != 0
    }

    #[inline]
    pub fn is_flipped_anti_diagonally(self) -> bool {
        (self.0 & FLIPPED_DIAGONALLY) != 0
    }

    #[inline]
    pub fn is_rotated_hexagonal_120(self) -> bool {
        (self.0 & ROTATED_HEXAGONAL_120) != 0
    }

    #[inline]
    pub fn has_flags(self) -> bool {
        (self.0 & FLIPPED_MASK) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.gid_no_mask() == 0
    }
}

impl From<u32> for TileId {
    fn from(raw: u32) -> Self {
        TileId(raw)
    }
}

/// Strips the four flag bits.
#[inline]
pub fn gid_no_mask(gid: u32) -> u32 {
    gid & !FLIPPED_MASK
}

/// Whether bit 31 is set.
#[inline]
pub fn is_flipped_horizontally(gid: u32) -> bool {
    TileId(gid).is_flipped_horizontally()
}

/// Whether bit 30 is set.
#[inline]
pub fn is_flipped_vertically(gid: u32) -> bool {
    TileId(gid).is_flipped_vertically()
}

/// Whether bit 29 is set.
#[inline]
pub fn is_flipped_anti_diagonally(gid: u32) -> bool {
    TileId(gid).is_flipped_anti_diagonally()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_flags_and_reports_horizontal_flip() {
        assert_eq!(gid_no_mask(0x8000_0005), 5);
        assert!(is_flipped_horizontally(0x8000_0005));
        assert!(!is_flipped_vertically(0x8000_0005));
        assert!(!is_flipped_anti_diagonally(0x8000_0005));
    }

    #[test]
    fn hex_rotation_bit_is_part_of_the_mask() {
        let id = TileId(ROTATED_HEXAGONAL_120 | 7);
        assert_eq!(id.gid_no_mask(), 7);
        assert!(id.is_rotated_hexagonal_120());
        assert!(id.has_flags());
        assert!(!TileId(7).has_flags());
        assert!(TileId(FLIPPED_VERTICALLY).is_empty());
    }
}
