use crate::geom::Point;
use crate::gid::TileId;
use crate::properties::Properties;
use crate::tile::PlacedTile;
use std::collections::HashMap;

/// A dense block of cells with per-cell dirty flags.
///
/// Shared by [`TileLayer`] and [`Chunk`]; coordinates here are local to the block.
#[derive(Debug, Clone, Default, PartialEq)]
struct Cells {
    width: u32,
    height: u32,
    tiles: Vec<Option<PlacedTile>>,
    need_update: Vec<bool>,
}

impl Cells {
    fn new(width: u32, height: u32) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            tiles: vec![None; n],
            need_update: vec![false; n],
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn get(&self, x: i32, y: i32) -> Option<&PlacedTile> {
        self.index(x, y).and_then(|i| self.tiles[i].as_ref())
    }

    fn set(&mut self, x: i32, y: i32, tile: Option<PlacedTile>) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.tiles[i] = tile;
                self.need_update[i] = true;
                true
            }
            None => false,
        }
    }

    fn need_update(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.need_update[i])
    }

    fn set_need_update(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.index(x, y) {
            self.need_update[i] = value;
        }
    }

    fn position_of(&self, gid: TileId) -> Option<Point> {
        let i = self
            .tiles
            .iter()
            .position(|t| t.is_some_and(|t| t.gid == gid))?;
        let w = self.width as usize;
        Some(Point::new((i % w) as i32, (i / w) as i32))
    }
}

/// A rectangular tile block of an infinite map, positioned in layer tile space.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Tile x of the top-left cell.
    pub x: i32,
    /// Tile y of the top-left cell.
    pub y: i32,
    cells: Cells,
}

impl Chunk {
    /// Empty chunk.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            cells: Cells::new(width, height),
        }
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> u32 {
        self.cells.width
    }

    #[allow(missing_docs)]
    pub fn height(&self) -> u32 {
        self.cells.height
    }

    /// Whether the layer coordinate falls inside this chunk.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && ((x - self.x) as u32) < self.cells.width
            && ((y - self.y) as u32) < self.cells.height
    }

    /// Tile at a layer coordinate.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&PlacedTile> {
        self.cells.get(x - self.x, y - self.y)
    }

    /// Places a tile at a layer coordinate and marks the cell dirty.
    pub fn set_tile_at(&mut self, x: i32, y: i32, tile: Option<PlacedTile>) -> bool {
        self.cells.set(x - self.x, y - self.y, tile)
    }

    #[allow(missing_docs)]
    pub fn is_need_update_at(&self, x: i32, y: i32) -> bool {
        self.cells.need_update(x - self.x, y - self.y)
    }

    #[allow(missing_docs)]
    pub fn set_need_update_at(&mut self, x: i32, y: i32, value: bool) {
        self.cells.set_need_update(x - self.x, y - self.y, value);
    }

    /// Non-empty cells as `(layer x, layer y, tile)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &PlacedTile)> + '_ {
        let w = self.cells.width.max(1) as usize;
        self.cells.tiles.iter().enumerate().filter_map(move |(i, t)| {
            t.as_ref()
                .map(|t| (self.x + (i % w) as i32, self.y + (i / w) as i32, t))
        })
    }
}

/// Payload of a `<layer>`: a width×height grid plus optional chunks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileLayer {
    /// Tile-space origin of the grid.
    pub x: i32,
    #[allow(missing_docs)]
    pub y: i32,
    cells: Cells,
    /// Blocks of an infinite map; kept apart from the dense grid.
    pub chunks: Vec<Chunk>,
    /// Per-cell properties from `<tileproperties>`.
    pub tile_instance_properties: HashMap<Point, Properties>,
}

impl TileLayer {
    /// Empty grid of the given size.
    ///
    /// Allocates `width * height` cells; sizes read from a document go through
    /// [`cell_count`](crate::cell_count) first.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: Cells::new(width, height),
            ..Default::default()
        }
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> u32 {
        self.cells.width
    }

    #[allow(missing_docs)]
    pub fn height(&self) -> u32 {
        self.cells.height
    }

    /// Whether the coordinate is inside the dense grid; chunks are not consulted.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.cells.width && (y as u32) < self.cells.height
    }

    /// Tile at a layer coordinate (offset by the layer origin).
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&PlacedTile> {
        self.cells.get(x - self.x, y - self.y)
    }

    /// Places a tile and marks the cell dirty. Returns `false` when out of bounds.
    pub fn set_tile_at(&mut self, x: i32, y: i32, tile: Option<PlacedTile>) -> bool {
        self.cells.set(x - self.x, y - self.y, tile)
    }

    /// Clears a cell, returning what was there.
    pub fn remove_tile_at(&mut self, x: i32, y: i32) -> Option<PlacedTile> {
        let old = self.tile_at(x, y).copied();
        self.set_tile_at(x, y, None);
        old
    }

    #[allow(missing_docs)]
    pub fn is_need_update_at(&self, x: i32, y: i32) -> bool {
        self.cells.need_update(x - self.x, y - self.y)
    }

    #[allow(missing_docs)]
    pub fn set_need_update_at(&mut self, x: i32, y: i32, value: bool) {
        self.cells.set_need_update(x - self.x, y - self.y, value);
    }

    /// Clears every dirty flag, dense grid and chunks alike.
    pub fn clear_need_update(&mut self) {
        self.cells.need_update.fill(false);
        for chunk in &mut self.chunks {
            chunk.cells.need_update.fill(false);
        }
    }

    /// First cell holding exactly this raw gid, row-major.
    pub fn location_of(&self, gid: TileId) -> Option<Point> {
        self.cells
            .position_of(gid)
            .map(|p| Point::new(p.x + self.x, p.y + self.y))
    }

    /// Swaps every placement with gid `old` for `new`.
    pub fn replace_tile(&mut self, old: TileId, new: Option<PlacedTile>) -> usize {
        let mut count = 0;
        for i in 0..self.cells.tiles.len() {
            if self.cells.tiles[i].is_some_and(|t| t.gid == old) {
                self.cells.tiles[i] = new;
                self.cells.need_update[i] = true;
                count += 1;
            }
        }
        count
    }

    /// Appends a chunk; chunks are never merged into the grid.
    pub fn add_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Tile at a layer coordinate, searching chunks only.
    pub fn chunk_tile_at(&self, x: i32, y: i32) -> Option<&PlacedTile> {
        self.chunks
            .iter()
            .find(|c| c.contains(x, y))
            .and_then(|c| c.tile_at(x, y))
    }

    /// Non-empty dense cells as `(grid x, grid y, tile)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &PlacedTile)> + '_ {
        let w = self.cells.width.max(1) as usize;
        self.cells
            .tiles
            .iter()
            .enumerate()
            .filter_map(move |(i, t)| t.as_ref().map(|t| ((i % w) as i32, (i / w) as i32, t)))
    }

    /// Properties attached to one cell instance.
    pub fn tile_instance_properties_at(&self, x: i32, y: i32) -> Option<&Properties> {
        self.tile_instance_properties.get(&Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::TilesetId;

    fn placed(id: u32, raw: u32) -> PlacedTile {
        PlacedTile {
            tileset: TilesetId(0),
            id,
            gid: TileId(raw),
        }
    }

    #[test]
    fn set_tile_marks_cell_dirty() {
        let mut layer = TileLayer::new(3, 2);
        assert!(!layer.is_need_update_at(2, 1));
        assert!(layer.set_tile_at(2, 1, Some(placed(0, 1))));
        assert!(layer.is_need_update_at(2, 1));
        assert_eq!(layer.tile_at(2, 1).map(|t| t.id), Some(0));

        layer.clear_need_update();
        assert!(!layer.is_need_update_at(2, 1));
        assert!(!layer.set_tile_at(3, 0, Some(placed(0, 1))));
    }

    #[test]
    fn contains_is_bounded_by_grid_only() {
        let mut layer = TileLayer::new(2, 2);
        let mut chunk = Chunk::new(16, 16, 16, 16);
        chunk.set_tile_at(20, 17, Some(placed(3, 4)));
        layer.add_chunk(chunk);

        assert!(layer.contains(1, 1));
        assert!(!layer.contains(20, 17));
        assert!(layer.chunks[0].contains(20, 17));
        assert!(!layer.chunks[0].contains(15, 17));
        assert_eq!(layer.chunk_tile_at(20, 17).map(|t| t.id), Some(3));
        assert!(layer.tile_at(20, 17).is_none());
        assert!(layer.chunks[0].is_need_update_at(20, 17));
    }

    #[test]
    fn location_and_replace() {
        let mut layer = TileLayer::new(2, 2);
        layer.set_tile_at(1, 0, Some(placed(1, 2)));
        layer.set_tile_at(0, 1, Some(placed(1, 2)));
        assert_eq!(layer.location_of(TileId(2)), Some(Point::new(1, 0)));
        assert_eq!(layer.replace_tile(TileId(2), Some(placed(0, 1))), 2);
        assert_eq!(layer.location_of(TileId(2)), None);
        assert_eq!(layer.remove_tile_at(0, 1).map(|t| t.id), Some(0));
        assert_eq!(layer.iter().count(), 1);
    }

    #[test]
    fn chunk_iter_reports_layer_coordinates() {
        let mut chunk = Chunk::new(-16, 0, 16, 16);
        chunk.set_tile_at(-15, 2, Some(placed(5, 6)));
        let cells: Vec<(i32, i32)> = chunk.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(cells, vec![(-15, 2)]);
    }
}
