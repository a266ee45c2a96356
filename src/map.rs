use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::gid::{gid_no_mask, TileId};
use crate::layer::{Layer, LayerId, LayerTree};
use crate::object::ObjectTemplate;
use crate::projection::Projection;
use crate::properties::Properties;
use crate::tile::{PlacedTile, Tile};
use crate::tileset::{Tileset, TilesetId};
use macroquad::color::Color;
use macroquad::math::Vec2;
use std::collections::{BTreeMap, HashMap};

/// Grid topology of a map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl Orientation {
    /// Parses the `orientation` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "orthogonal" => Some(Self::Orthogonal),
            "isometric" => Some(Self::Isometric),
            "staggered" => Some(Self::Staggered),
            "hexagonal" => Some(Self::Hexagonal),
            _ => None,
        }
    }
}

/// Order tiles of an orthogonal map are painted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RenderOrder {
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

impl RenderOrder {
    /// Parses the `renderorder` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "right-down" => Some(Self::RightDown),
            "right-up" => Some(Self::RightUp),
            "left-down" => Some(Self::LeftDown),
            "left-up" => Some(Self::LeftUp),
            _ => None,
        }
    }
}

/// Axis along which staggered and hexagonal maps shift every other line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StaggerAxis {
    X,
    #[default]
    Y,
}

impl StaggerAxis {
    /// Parses the `staggeraxis` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            _ => None,
        }
    }
}

/// Whether even or odd lines are shifted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StaggerIndex {
    Even,
    #[default]
    Odd,
}

impl StaggerIndex {
    /// Parses the `staggerindex` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "even" => Some(Self::Even),
            "odd" => Some(Self::Odd),
            _ => None,
        }
    }
}

/// A loaded map: tilesets, layers and the geometry needed to project them.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct TiledMap {
    pub version: String,
    pub tiled_version: String,
    pub class: String,
    pub orientation: Orientation,
    pub render_order: RenderOrder,
    pub stagger_axis: StaggerAxis,
    pub stagger_index: StaggerIndex,
    /// Length of the straight hex edge, in pixels.
    pub hex_side_length: u32,
    /// Size in tiles.
    pub width: u32,
    pub height: u32,
    /// Grid cell size in pixels.
    pub tile_width: u32,
    pub tile_height: u32,
    pub parallax_origin: Vec2,
    pub background_color: Color,
    pub infinite: bool,
    /// -1 means the codec default.
    pub compression_level: i32,
    pub next_layer_id: u32,
    pub next_object_id: u32,
    pub properties: Properties,
    pub layers: LayerTree,
    /// Object templates by the source path objects reference.
    pub templates: HashMap<String, ObjectTemplate>,
    tilesets: Vec<Tileset>,
    tilesets_by_name: HashMap<String, TilesetId>,
    tileset_per_first_gid: BTreeMap<u32, TilesetId>,
}

impl TiledMap {
    /// Empty orthogonal map.
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            version: String::new(),
            tiled_version: String::new(),
            class: String::new(),
            orientation: Orientation::default(),
            render_order: RenderOrder::default(),
            stagger_axis: StaggerAxis::default(),
            stagger_index: StaggerIndex::default(),
            hex_side_length: 0,
            width,
            height,
            tile_width,
            tile_height,
            parallax_origin: Vec2::ZERO,
            background_color: Color::new(0.0, 0.0, 0.0, 0.0),
            infinite: false,
            compression_level: -1,
            next_layer_id: 1,
            next_object_id: 1,
            properties: Properties::new(),
            layers: LayerTree::new(),
            templates: HashMap::new(),
            tilesets: Vec::new(),
            tilesets_by_name: HashMap::new(),
            tileset_per_first_gid: BTreeMap::new(),
        }
    }

    /// Adds a tileset and indexes it by first gid.
    ///
    /// A tileset with the same name and first gid as an existing one is ignored and the
    /// existing id is returned. The map adopts the tile size when its own is still zero.
    pub fn add_tileset(&mut self, tileset: Tileset) -> TilesetId {
        if let Some(existing) = self.tilesets_by_name.get(&tileset.name) {
            if self.tilesets[existing.0].first_gid == tileset.first_gid {
                return *existing;
            }
        }

        let id = TilesetId(self.tilesets.len());
        if let Some(first) = tileset.first_tile() {
            if self.tile_width == 0 || self.tile_height == 0 {
                self.tile_width = first.width;
                self.tile_height = first.height;
            }
        }
        self.tileset_per_first_gid.insert(tileset.first_gid, id);
        self.tilesets_by_name.entry(tileset.name.clone()).or_insert(id);
        self.tilesets.push(tileset);
        id
    }

    /// Removes a tileset from every index.
    ///
    /// Ids of later tilesets shift down; placements into them must be rebuilt.
    pub fn remove_tileset(&mut self, id: TilesetId) -> Option<Tileset> {
        if id.0 >= self.tilesets.len() {
            return None;
        }
        let removed = self.tilesets.remove(id.0);
        self.reindex_tilesets();
        Some(removed)
    }

    fn reindex_tilesets(&mut self) {
        self.tilesets_by_name.clear();
        self.tileset_per_first_gid.clear();
        for (i, ts) in self.tilesets.iter().enumerate() {
            self.tileset_per_first_gid.insert(ts.first_gid, TilesetId(i));
            self.tilesets_by_name
                .entry(ts.name.clone())
                .or_insert(TilesetId(i));
        }
    }

    #[allow(missing_docs)]
    pub fn tileset(&self, id: TilesetId) -> Option<&Tileset> {
        self.tilesets.get(id.0)
    }

    #[allow(missing_docs)]
    pub fn tileset_mut(&mut self, id: TilesetId) -> Option<&mut Tileset> {
        self.tilesets.get_mut(id.0)
    }

    #[allow(missing_docs)]
    pub fn tileset_by_name(&self, name: &str) -> Option<TilesetId> {
        self.tilesets_by_name.get(name).copied()
    }

    /// Tileset loaded from the given external source.
    pub fn tileset_by_source(&self, source: &str) -> Option<TilesetId> {
        self.tilesets
            .iter()
            .position(|t| t.source.as_deref() == Some(source))
            .map(TilesetId)
    }

    /// Tilesets in insertion order.
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Moves a tileset to a new first gid, keeping the gid index consistent.
    pub fn update_first_gid(&mut self, id: TilesetId, first_gid: u32) {
        if let Some(ts) = self.tilesets.get_mut(id.0) {
            ts.update_first_gid(first_gid);
            self.reindex_tilesets();
        }
    }

    /// Tileset owning `gid`: the largest first gid not above it.
    pub fn tileset_for_gid(&self, gid: u32) -> Option<TilesetId> {
        let gid = gid_no_mask(gid);
        self.tileset_per_first_gid
            .range(..=gid)
            .next_back()
            .map(|(_, id)| *id)
    }

    /// Catalog tile for a gid; flag bits are ignored.
    pub fn tile_for_gid(&self, gid: u32) -> Option<(TilesetId, &Tile)> {
        let gid = gid_no_mask(gid);
        if gid == 0 {
            return None;
        }
        let id = self.tileset_for_gid(gid)?;
        let ts = &self.tilesets[id.0];
        ts.tile(gid - ts.first_gid).map(|t| (id, t))
    }

    /// Resolves a raw layer value into a placement.
    ///
    /// `0` is an empty cell. A non-zero gid that matches no tile is reported and also
    /// yields `None`. The returned placement keeps the raw value with its flags.
    pub fn resolve_gid(&self, raw: u32, diagnostics: &mut dyn Diagnostics) -> Option<PlacedTile> {
        let gid = gid_no_mask(raw);
        if gid == 0 {
            return None;
        }
        match self.tile_for_gid(gid) {
            Some((tileset, tile)) => Some(PlacedTile {
                tileset,
                id: tile.id,
                gid: TileId(raw),
            }),
            None => {
                diagnostics.report(Diagnostic::new(
                    DiagnosticKind::UnresolvedGid,
                    format!("no tile for gid {gid} (raw {raw:#010x})"),
                ));
                None
            }
        }
    }

    /// Catalog entry behind a placement.
    pub fn placed_tile(&self, placed: &PlacedTile) -> Option<&Tile> {
        self.tileset(placed.tileset)?.tile(placed.id)
    }

    /// Appends a layer at the top level or under a group.
    pub fn add_layer(&mut self, parent: Option<LayerId>, layer: Layer) -> LayerId {
        self.layers.push(parent, layer)
    }

    #[allow(missing_docs)]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    #[allow(missing_docs)]
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    #[allow(missing_docs)]
    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.by_name(name).and_then(|id| self.layers.get(id))
    }

    /// Layers at every nesting level.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Whether a tile coordinate is inside the map.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Projection for this map's orientation.
    pub fn projection(&self) -> Projection {
        Projection::for_map(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gid::FLIPPED_HORIZONTALLY;
    use crate::image::TiledImage;

    fn tileset(name: &str, first_gid: u32, tiles: u32) -> Tileset {
        let mut ts = Tileset::new(32, 32, 0, 0);
        ts.name = name.into();
        ts.first_gid = first_gid;
        ts.cut_image(TiledImage::new("t.png", 32 * tiles, 32));
        ts
    }

    #[test]
    fn gid_lookup_uses_floor_entry() {
        let mut map = TiledMap::new(2, 2, 32, 32);
        let a = map.add_tileset(tileset("a", 1, 4));
        let b = map.add_tileset(tileset("b", 5, 2));

        assert_eq!(map.tile_for_gid(3).map(|(ts, t)| (ts, t.id)), Some((a, 2)));
        assert_eq!(map.tile_for_gid(6).map(|(ts, t)| (ts, t.id)), Some((b, 1)));
        assert!(map.tile_for_gid(7).is_none());
        assert!(map.tile_for_gid(0).is_none());
    }

    #[test]
    fn resolving_same_gid_twice_is_stable() {
        let mut map = TiledMap::new(2, 2, 32, 32);
        map.add_tileset(tileset("a", 1, 4));
        let mut diags: Vec<Diagnostic> = Vec::new();

        let first = map.resolve_gid(2, &mut diags).expect("tile");
        let second = map.resolve_gid(2, &mut diags).expect("tile");
        assert_eq!((first.tileset, first.id), (second.tileset, second.id));
        assert!(!first.is_flipped());
        assert!(diags.is_empty());
    }

    #[test]
    fn flagged_gid_gets_its_own_placement_and_leaves_catalog_alone() {
        let mut map = TiledMap::new(2, 2, 32, 32);
        map.add_tileset(tileset("a", 1, 4));
        let mut diags: Vec<Diagnostic> = Vec::new();

        let plain = map.resolve_gid(2, &mut diags).expect("tile");
        let flipped = map
            .resolve_gid(FLIPPED_HORIZONTALLY | 2, &mut diags)
            .expect("tile");

        assert_ne!(plain, flipped);
        assert_eq!((plain.tileset, plain.id), (flipped.tileset, flipped.id));
        assert!(flipped.gid.is_flipped_horizontally());
        let catalog = map.placed_tile(&flipped).expect("catalog tile");
        assert_eq!(catalog.gid, 2);
        assert!(std::ptr::eq(catalog, map.placed_tile(&plain).expect("catalog")));
    }

    #[test]
    fn unresolved_gid_is_reported_not_fatal() {
        let mut map = TiledMap::new(2, 2, 32, 32);
        map.add_tileset(tileset("a", 1, 4));
        let mut diags: Vec<Diagnostic> = Vec::new();

        assert!(map.resolve_gid(99, &mut diags).is_none());
        assert!(map.resolve_gid(0, &mut diags).is_none());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnresolvedGid);
    }

    #[test]
    fn duplicate_tileset_is_ignored_and_removal_reindexes() {
        let mut map = TiledMap::new(2, 2, 0, 0);
        let a = map.add_tileset(tileset("a", 1, 4));
        assert_eq!(map.add_tileset(tileset("a", 1, 4)), a);
        assert_eq!(map.tilesets().len(), 1);
        assert_eq!((map.tile_width, map.tile_height), (32, 32));

        map.add_tileset(tileset("b", 5, 2));
        map.remove_tileset(a).expect("removed");
        assert_eq!(map.tileset_by_name("b"), Some(TilesetId(0)));
        assert!(map.tile_for_gid(2).is_none());
        assert_eq!(map.tile_for_gid(5).map(|(_, t)| t.id), Some(0));
    }

    #[test]
    fn moving_first_gid_keeps_lookup_consistent() {
        let mut map = TiledMap::new(2, 2, 32, 32);
        let a = map.add_tileset(tileset("a", 1, 4));
        map.update_first_gid(a, 10);
        assert!(map.tile_for_gid(1).is_none());
        assert_eq!(map.tile_for_gid(12).map(|(_, t)| (t.id, t.gid)), Some((2, 12)));
    }

    #[test]
    fn loaded_map_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<TiledMap>();
    }
}
