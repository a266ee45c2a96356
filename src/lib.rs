#![warn(missing_docs)]

//! Tiled TMX/TSX loader and grid projections for Macroquad.
//!
//! Maps are loaded into an in-memory model ([`TiledMap`]) and projected through
//! one of four orientations ([`Projection`]). The [`render`] module turns the
//! result into textured sprites.

mod color;
mod command;
mod decode;
mod diagnostics;
mod error;
mod flip;
mod geom;
mod gid;
mod image;
mod layer;
mod loader;
mod map;
mod object;
mod projection;
mod properties;
pub mod render;
mod tile;
mod tile_layer;
mod tileset;

pub use color::{format_color, parse_color, to_rgba8};
pub use command::{build_tile_commands, build_visible_tile_commands, DrawCommand, TileRegion};
pub use decode::{
    cell_count, decode_base64, decode_csv, decode_xml_tiles, read_layer_data, Compression,
    Encoding, LayerData, RawChunk, MAX_CELLS,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, LogDiagnostics};
pub use error::MapError;
pub use flip::FlipTransform;
pub use geom::{Bound2D, Point};
pub use gid::{
    gid_no_mask, is_flipped_anti_diagonally, is_flipped_horizontally, is_flipped_vertically,
    TileId, FLIPPED_DIAGONALLY, FLIPPED_HORIZONTALLY, FLIPPED_MASK, FLIPPED_VERTICALLY,
    ROTATED_HEXAGONAL_120,
};
pub use image::{ImageLayer, TiledImage};
pub use layer::{GroupLayer, Layer, LayerId, LayerKind, LayerTree};
pub use loader::{load_map, load_map_str, Assets, FsAssets, LoadOptions, MemoryAssets, TmxLoader};
pub use map::{Orientation, RenderOrder, StaggerAxis, StaggerIndex, TiledMap};
pub use object::{
    DrawOrder, HorizontalAlignment, MapObject, ObjectGroup, ObjectShape, ObjectTemplate,
    ObjectText, VerticalAlignment,
};
pub use projection::{Hexagonal, Isometric, Orthogonal, Projection, ZOrder};
pub use properties::{Properties, PropertyValue};
pub use tile::{Animation, Frame, PlacedTile, Tile};
pub use tile_layer::{Chunk, TileLayer};
pub use tileset::{
    FillMode, ObjectAlignment, Terrain, TileCutter, TileRenderSize, Tileset, TilesetGrid,
    TilesetId, Transformations, WangColor, WangSet, WangSetType, WangTile,
};
