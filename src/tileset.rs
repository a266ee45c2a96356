use crate::geom::Point;
use crate::image::TiledImage;
use crate::map::Orientation;
use crate::properties::Properties;
use crate::tile::Tile;
use macroquad::color::Color;
use std::collections::BTreeMap;

/// Index of a tileset inside its map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TilesetId(pub usize);

/// Anchor used when placing tile objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ObjectAlignment {
    #[default]
    Unspecified,
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ObjectAlignment {
    /// Parses the `objectalignment` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        Some(match value {
            "unspecified" => Self::Unspecified,
            "topleft" => Self::TopLeft,
            "top" => Self::Top,
            "topright" => Self::TopRight,
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "bottomleft" => Self::BottomLeft,
            "bottom" => Self::Bottom,
            "bottomright" => Self::BottomRight,
            _ => return None,
        })
    }
}

/// Size tiles are drawn at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TileRenderSize {
    /// Native tile size.
    #[default]
    Tile,
    /// The map grid size.
    Grid,
}

impl TileRenderSize {
    /// Parses the `tilerendersize` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "tile" => Some(Self::Tile),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }
}

/// How a tile is scaled when drawn at grid size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FillMode {
    #[default]
    Stretch,
    PreserveAspectFit,
}

impl FillMode {
    /// Parses the `fillmode` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "stretch" => Some(Self::Stretch),
            "preserve-aspect-fit" => Some(Self::PreserveAspectFit),
            _ => None,
        }
    }
}

/// Which parts of a tile a wang set's colours describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum WangSetType {
    Corner,
    Edge,
    #[default]
    Mixed,
}

impl WangSetType {
    /// Parses the wang set `type` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "corner" => Some(Self::Corner),
            "edge" => Some(Self::Edge),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

/// `<grid>` override used by isometric tilesets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct TilesetGrid {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}

/// `<transformations>`: which transforms the wang tools may apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Transformations {
    pub hflip: bool,
    pub vflip: bool,
    pub rotate: bool,
    pub prefer_untransformed: bool,
}

/// Legacy `<terrain>` entry.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Terrain {
    pub name: String,
    /// Representative tile, if any.
    pub tile: Option<u32>,
    pub properties: Properties,
}

/// A `<wangcolor>`.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct WangColor {
    pub name: String,
    pub class: String,
    pub color: Color,
    pub tile: Option<u32>,
    pub probability: f32,
    pub properties: Properties,
}

/// A `<wangtile>`: eight colour indices clockwise from the top edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct WangTile {
    pub tile_id: u32,
    pub wang_id: [u8; 8],
}

impl WangTile {
    /// Parses the comma separated `wangid` attribute; missing entries are 0.
    pub fn parse_wang_id(text: &str) -> Option<[u8; 8]> {
        let mut out = [0u8; 8];
        for (i, part) in text.split(',').enumerate() {
            if i >= 8 {
                return None;
            }
            out[i] = part.trim().parse().ok()?;
        }
        Some(out)
    }
}

/// A `<wangset>`.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct WangSet {
    pub name: String,
    pub class: String,
    pub kind: WangSetType,
    pub tile: Option<u32>,
    pub colors: Vec<WangColor>,
    pub tiles: Vec<WangTile>,
    pub properties: Properties,
}

/// A catalog of tiles sharing one image grid or one image per tile.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Tileset {
    /// Gid of local tile 0 inside the owning map.
    pub first_gid: u32,
    /// External `.tsx` path, `None` for embedded tilesets.
    pub source: Option<String>,
    pub name: String,
    pub class: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    /// Drawing offset applied to every tile.
    pub tile_offset: Point,
    pub grid: Option<TilesetGrid>,
    /// Shared atlas image; `None` for image collections.
    pub image: Option<TiledImage>,
    pub transformations: Transformations,
    pub terrains: Vec<Terrain>,
    pub wang_sets: Vec<WangSet>,
    pub properties: Properties,
    tiles: BTreeMap<u32, Tile>,
}

impl Default for Tileset {
    fn default() -> Self {
        Self::new(32, 32, 0, 0)
    }
}

#[allow(missing_docs)]
impl Tileset {
    pub fn new(tile_width: u32, tile_height: u32, spacing: u32, margin: u32) -> Self {
        Self {
            first_gid: 1,
            source: None,
            name: String::new(),
            class: String::new(),
            tile_width,
            tile_height,
            spacing,
            margin,
            tile_count: 0,
            columns: 0,
            object_alignment: ObjectAlignment::default(),
            tile_render_size: TileRenderSize::default(),
            fill_mode: FillMode::default(),
            tile_offset: Point::default(),
            grid: None,
            image: None,
            transformations: Transformations::default(),
            terrains: Vec::new(),
            wang_sets: Vec::new(),
            properties: Properties::new(),
            tiles: BTreeMap::new(),
        }
    }

    /// Next id handed out by [`Tileset::push_tile`].
    pub fn next_tile_id(&self) -> u32 {
        self.tiles.keys().next_back().map_or(0, |id| id + 1)
    }

    /// Adds a tile under its own id, replacing any previous entry.
    ///
    /// Stamps the gid and grows the tileset tile size to fit.
    pub fn add_tile(&mut self, mut tile: Tile) -> u32 {
        tile.gid = self.first_gid + tile.id;
        self.tile_width = self.tile_width.max(tile.width);
        self.tile_height = self.tile_height.max(tile.height);
        let id = tile.id;
        self.tiles.insert(id, tile);
        id
    }

    /// Adds a tile under the next free id.
    pub fn push_tile(&mut self, mut tile: Tile) -> u32 {
        tile.id = self.next_tile_id();
        self.add_tile(tile)
    }

    pub fn remove_tile(&mut self, id: u32) -> Option<Tile> {
        self.tiles.remove(&id)
    }

    #[inline]
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn tile_mut(&mut self, id: u32) -> Option<&mut Tile> {
        self.tiles.get_mut(&id)
    }

    /// Tiles in id order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn first_tile(&self) -> Option<&Tile> {
        self.tiles.values().next()
    }

    /// Highest local id; ids may have gaps in image collections.
    pub fn max_tile_id(&self) -> Option<u32> {
        self.tiles.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_image_based(&self) -> bool {
        self.image.is_some()
    }

    /// Moves the tileset to a new first gid and restamps every tile.
    pub fn update_first_gid(&mut self, first_gid: u32) {
        self.first_gid = first_gid;
        for (id, tile) in self.tiles.iter_mut() {
            tile.gid = first_gid + id;
        }
    }

    /// Whether `gid` (without flags) belongs to this tileset.
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && self.tile(gid - self.first_gid).is_some()
    }

    /// Replaces the atlas image and cuts it into tiles.
    pub fn cut_image(&mut self, image: TiledImage) {
        let cutter = TileCutter::new(
            image.width,
            image.height,
            self.tile_width,
            self.tile_height,
            self.margin,
            self.spacing,
        );
        self.columns = cutter.columns();
        self.tile_count = cutter.tile_count();
        for tile in cutter {
            self.push_tile(tile);
        }
        self.image = Some(image);
    }
}

/// Cuts a regular grid of tiles out of an atlas image.
#[derive(Debug, Clone)]
pub struct TileCutter {
    image_width: u32,
    image_height: u32,
    tile_width: u32,
    tile_height: u32,
    margin: u32,
    spacing: u32,
    next_x: u32,
    next_y: u32,
}

impl TileCutter {
    #[allow(missing_docs)]
    pub fn new(
        image_width: u32,
        image_height: u32,
        tile_width: u32,
        tile_height: u32,
        margin: u32,
        spacing: u32,
    ) -> Self {
        Self {
            image_width,
            image_height,
            tile_width,
            tile_height,
            margin,
            spacing,
            next_x: margin,
            next_y: margin,
        }
    }

    fn fit(extent: u32, tile: u32, margin: u32, spacing: u32) -> u32 {
        let step = tile + spacing;
        if step == 0 {
            return 0;
        }
        (extent + spacing).saturating_sub(2 * margin) / step
    }

    /// Whole tiles per row.
    pub fn columns(&self) -> u32 {
        Self::fit(self.image_width, self.tile_width, self.margin, self.spacing)
    }

    /// Whole tiles per column.
    pub fn rows(&self) -> u32 {
        Self::fit(self.image_height, self.tile_height, self.margin, self.spacing)
    }

    #[allow(missing_docs)]
    pub fn tile_count(&self) -> u32 {
        self.columns() * self.rows()
    }
}

impl Iterator for TileCutter {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return None;
        }
        if self.next_x + self.tile_width + self.margin > self.image_width {
            return None;
        }
        if self.next_y + self.tile_height + self.margin > self.image_height {
            return None;
        }

        let tile = Tile::new(0, self.next_x, self.next_y, self.tile_width, self.tile_height);

        self.next_x += self.tile_width + self.spacing;
        if self.next_x + self.tile_width + self.margin > self.image_width {
            self.next_x = self.margin;
            self.next_y += self.tile_height + self.spacing;
        }
        Some(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutter_respects_margin_and_spacing() {
        // 2 columns: 1 + 16 + 2 + 16 + 1 = 36
        let cutter = TileCutter::new(36, 19, 16, 16, 1, 2);
        assert_eq!(cutter.columns(), 2);
        assert_eq!(cutter.rows(), 1);
        let tiles: Vec<Tile> = cutter.collect();
        assert_eq!(tiles.len(), 2);
        assert_eq!((tiles[0].x, tiles[0].y), (1, 1));
        assert_eq!((tiles[1].x, tiles[1].y), (19, 1));
    }

    #[test]
    fn cutter_wraps_rows() {
        let tiles: Vec<Tile> = TileCutter::new(64, 64, 32, 32, 0, 0).collect();
        let origins: Vec<(u32, u32)> = tiles.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(origins, vec![(0, 0), (32, 0), (0, 32), (32, 32)]);
    }

    #[test]
    fn cut_image_numbers_tiles_and_stamps_gids() {
        let mut ts = Tileset::new(32, 32, 0, 0);
        ts.first_gid = 5;
        ts.cut_image(TiledImage::new("tiles.png", 64, 64));
        assert_eq!(ts.len(), 4);
        assert_eq!(ts.columns, 2);
        assert_eq!(ts.tile_count, 4);
        assert_eq!(ts.max_tile_id(), Some(3));
        assert_eq!(ts.tile(3).map(|t| t.gid), Some(8));
        assert!(ts.is_image_based());
    }

    #[test]
    fn update_first_gid_restamps_tiles() {
        let mut ts = Tileset::new(16, 16, 0, 0);
        ts.push_tile(Tile::new(0, 0, 0, 16, 16));
        ts.push_tile(Tile::new(0, 16, 0, 16, 16));
        ts.update_first_gid(100);
        assert_eq!(ts.tile(1).map(|t| t.gid), Some(101));
        assert!(ts.contains_gid(100));
        assert!(!ts.contains_gid(102));
    }

    #[test]
    fn add_tile_grows_tile_size() {
        let mut ts = Tileset::new(16, 16, 0, 0);
        ts.add_tile(Tile::new(7, 0, 0, 48, 20));
        assert_eq!((ts.tile_width, ts.tile_height), (48, 20));
        assert_eq!(ts.next_tile_id(), 8);
        assert!(ts.remove_tile(7).is_some());
        assert!(ts.is_empty());
    }

    #[test]
    fn parses_wang_ids() {
        assert_eq!(
            WangTile::parse_wang_id("0,1,0,2,0,1,0,2"),
            Some([0, 1, 0, 2, 0, 1, 0, 2])
        );
        assert_eq!(WangTile::parse_wang_id("0,1,x"), None);
    }
}
