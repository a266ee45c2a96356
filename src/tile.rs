use crate::gid::TileId;
use crate::image::TiledImage;
use crate::object::ObjectGroup;
use crate::properties::Properties;
use crate::tileset::TilesetId;

/// One step of a tile animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Local id of the tile shown during this frame.
    pub tile_id: u32,
    /// How long the frame lasts.
    pub duration_ms: u32,
}

/// An ordered frame list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    /// Index within the owning tile.
    pub id: usize,
    /// Optional name; TMX animations are unnamed.
    pub name: Option<String>,
    /// Frames in playback order.
    pub frames: Vec<Frame>,
}

impl Animation {
    /// Unnamed animation.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            id: 0,
            name: None,
            frames,
        }
    }

    /// Sum of all frame durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms as u64).sum()
    }
}

/// A catalog entry of a [`crate::Tileset`].
///
/// Cells and objects never hold a `Tile`; they hold a [`PlacedTile`] pointing back here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tile {
    /// Local id within the tileset.
    pub id: u32,
    /// `first_gid + id`, restamped when the tileset moves.
    pub gid: u32,
    /// Source rect within the tileset image (or the tile's own image).
    pub x: u32,
    #[allow(missing_docs)]
    pub y: u32,
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
    /// Per-tile image for image collection tilesets.
    pub image: Option<TiledImage>,
    /// `class` (or legacy `type`) attribute.
    pub class: String,
    /// Animations; TMX defines at most one.
    pub animations: Vec<Animation>,
    /// Four terrain corners packed as `corner << 8 * (3 - i)`.
    pub terrain: Option<u32>,
    /// Weight used by the terrain and wang tools.
    pub probability: Option<f32>,
    /// Custom properties from `<tile><properties>`.
    pub properties: Properties,
    /// Collision shapes.
    pub collision: Option<ObjectGroup>,
}

impl Tile {
    /// A tile with a known id and cut rect.
    pub fn new(id: u32, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Appends an animation, numbering it by position.
    pub fn add_animation(&mut self, mut animation: Animation) {
        animation.id = self.animations.len();
        self.animations.push(animation);
    }

    /// Case-insensitive name lookup.
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| {
            a.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    #[allow(missing_docs)]
    pub fn is_animated(&self) -> bool {
        self.animations.iter().any(|a| !a.frames.is_empty())
    }

    /// Terrain index for corner `i` (top-left, top-right, bottom-left, bottom-right).
    pub fn terrain_corner(&self, i: usize) -> Option<u8> {
        if i > 3 {
            return None;
        }
        let packed = self.terrain?;
        let v = (packed >> (8 * (3 - i))) as u8;
        (v != u8::MAX).then_some(v)
    }
}

/// A tile as placed into a layer cell or tile object.
///
/// Shares the catalog tile by `(tileset, id)` and carries its own flag-bearing gid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacedTile {
    /// Tileset of the owning map.
    pub tileset: TilesetId,
    /// Local id within `tileset`.
    pub id: u32,
    /// Raw value from the layer data, flags included.
    pub gid: TileId,
}

impl PlacedTile {
    /// Whether this placement differs from the unflipped catalog entry.
    pub fn is_flipped(&self) -> bool {
        self.gid.has_flags()
    }
}
