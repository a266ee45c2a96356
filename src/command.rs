use crate::flip::FlipTransform;
use crate::layer::LayerId;
use crate::map::TiledMap;
use crate::projection::Projection;
use crate::tile::PlacedTile;
use crate::tileset::TilesetId;
use macroquad::color::Color;
use macroquad::math::{vec2, Rect, Vec2};

/// One tile sprite, fully positioned in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct DrawCommand {
    pub layer: LayerId,
    pub tileset: TilesetId,
    /// Local tile id inside `tileset`.
    pub tile_id: u32,
    /// Source rectangle in the tileset atlas or the tile's own image.
    pub src: Rect,
    /// Top-left corner of the drawn footprint.
    pub dest: Vec2,
    /// Drawn footprint; width and height are swapped for anti-diagonal flips.
    pub size: Vec2,
    /// Draw rank inside the layer.
    pub z: u32,
    pub flip: FlipTransform,
    /// Layer tint with the layer opacity folded into alpha.
    pub tint: Color,
}

/// Rectangle of tile coordinates, `width` by `height` cells from the start corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TileRegion {
    pub start_x: i32,
    pub start_y: i32,
    pub width: u32,
    pub height: u32,
}

impl TileRegion {
    #[allow(missing_docs)]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let dx = x as i64 - self.start_x as i64;
        let dy = y as i64 - self.start_y as i64;
        dx >= 0 && dy >= 0 && dx < self.width as i64 && dy < self.height as i64
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Draw commands for every visible tile layer, depth first, each layer back to front.
///
/// Chunks of infinite maps follow the dense grid of their layer.
pub fn build_tile_commands(map: &TiledMap, projection: &Projection) -> Vec<DrawCommand> {
    build(map, projection, None)
}

/// Like [`build_tile_commands`], keeping only cells inside `region`.
pub fn build_visible_tile_commands(
    map: &TiledMap,
    projection: &Projection,
    region: TileRegion,
) -> Vec<DrawCommand> {
    build(map, projection, Some(region))
}

fn build(map: &TiledMap, projection: &Projection, region: Option<TileRegion>) -> Vec<DrawCommand> {
    let cell = projection.tile_size();
    let (grid_w, grid_h) = projection.grid_size();
    let iso_shift = match projection {
        Projection::Isometric(_) => vec2(-cell.x * 0.5, 0.0),
        _ => Vec2::ZERO,
    };
    let wanted = |x: i32, y: i32| region.map_or(true, |r| r.contains(x, y));

    let mut commands = Vec::new();
    for (id, layer) in map.layers.iter_depth_first() {
        let Some(tiles) = layer.as_tiles() else {
            continue;
        };
        if !map.layers.is_visible(id) {
            continue;
        }
        let offset = map.layers.render_offset(id) + iso_shift;
        let mut tint = map.layers.tint_color(id);
        tint.a *= map.layers.render_opacity(id);

        let mut push = |x: i32, y: i32, z: u32, placed: &PlacedTile| {
            let Some(ts) = map.tileset(placed.tileset) else {
                return;
            };
            let Some(tile) = ts.tile(placed.id) else {
                return;
            };
            let flip = FlipTransform::from(placed.gid);
            let size = flip.footprint(vec2(tile.width as f32, tile.height as f32));
            let anchor = projection.tile_to_screen(x as f32, y as f32);
            // sprites sit on the bottom edge of their cell
            let dest = anchor + offset + ts.tile_offset.as_vec2() + vec2(0.0, cell.y - size.y);
            commands.push(DrawCommand {
                layer: id,
                tileset: placed.tileset,
                tile_id: placed.id,
                src: Rect::new(
                    tile.x as f32,
                    tile.y as f32,
                    tile.width as f32,
                    tile.height as f32,
                ),
                dest,
                size,
                z,
                flip,
                tint,
            });
        };

        projection.visit_tiles(|x, y, z| {
            if !wanted(x, y) {
                return;
            }
            if let Some(placed) = tiles.tile_at(x, y) {
                push(x, y, z, placed);
            }
        });

        let mut z = (grid_w.max(0) as u32).saturating_mul(grid_h.max(0) as u32);
        for chunk in &tiles.chunks {
            for (x, y, placed) in chunk.iter() {
                if wanted(x, y) {
                    push(x, y, z, placed);
                }
                z += 1;
            }
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::gid::{FLIPPED_DIAGONALLY, FLIPPED_HORIZONTALLY};
    use crate::image::TiledImage;
    use crate::layer::{GroupLayer, Layer, LayerKind};
    use crate::map::Orientation;
    use crate::tile_layer::{Chunk, TileLayer};
    use crate::tileset::Tileset;
    use macroquad::color::WHITE;

    fn map_2x2(orientation: Orientation) -> TiledMap {
        let mut map = TiledMap::new(2, 2, 32, 32);
        map.orientation = orientation;
        let mut ts = Tileset::new(32, 32, 0, 0);
        ts.name = "t".into();
        ts.cut_image(TiledImage::new("t.png", 64, 64));
        map.add_tileset(ts);
        map
    }

    fn tile_layer(map: &TiledMap, gids: &[u32]) -> TileLayer {
        let mut layer = TileLayer::new(map.width, map.height);
        let mut sink: Vec<Diagnostic> = Vec::new();
        for (i, gid) in gids.iter().enumerate() {
            let placed = map.resolve_gid(*gid, &mut sink);
            layer.set_tile_at(i as i32 % map.width as i32, i as i32 / map.width as i32, placed);
        }
        layer
    }

    #[test]
    fn orthogonal_layer_emits_cells_in_z_order() {
        let mut map = map_2x2(Orientation::Orthogonal);
        let tiles = tile_layer(&map, &[1, 2, 0, 4]);
        let ground = Layer::new("ground", LayerKind::Tiles(tiles)).with_offset(vec2(3.0, 4.0));
        map.add_layer(None, ground);

        let projection = map.projection();
        let cmds = build_tile_commands(&map, &projection);
        assert_eq!(cmds.len(), 3);
        assert!(cmds.windows(2).all(|w| w[0].z < w[1].z));
        assert_eq!(cmds[1].tile_id, 1);
        assert_eq!(cmds[1].src, Rect::new(32.0, 0.0, 32.0, 32.0));
        assert_eq!(cmds[2].dest, vec2(35.0, 36.0));
        assert_eq!(cmds[0].tint, WHITE);
    }

    #[test]
    fn hidden_groups_hide_children_and_opacity_folds_into_tint() {
        let mut map = map_2x2(Orientation::Orthogonal);
        let mut group = Layer::new("g", LayerKind::Group(GroupLayer::default()));
        group.opacity = 0.5;
        let g = map.add_layer(None, group);
        let tiles = tile_layer(&map, &[1, 0, 0, 0]);
        map.add_layer(Some(g), Layer::new("a", LayerKind::Tiles(tiles)));

        let projection = map.projection();
        let cmds = build_tile_commands(&map, &projection);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].tint.a, 0.5);

        map.layer_mut(g).expect("group").visible = false;
        assert!(build_tile_commands(&map, &projection).is_empty());
    }

    #[test]
    fn isometric_sprites_are_centred_on_the_diamond() {
        let mut map = map_2x2(Orientation::Isometric);
        map.tile_height = 16;
        let mut ts = Tileset::new(32, 32, 0, 0);
        ts.name = "tall".into();
        ts.first_gid = 10;
        ts.cut_image(TiledImage::new("tall.png", 32, 32));
        map.add_tileset(ts);
        let tiles = tile_layer(&map, &[10, 0, 0, 0]);
        map.add_layer(None, Layer::new("l", LayerKind::Tiles(tiles)));

        let projection = map.projection();
        let cmds = build_tile_commands(&map, &projection);
        let anchor = projection.tile_to_screen(0.0, 0.0);
        // 32x32 sprite on a 32x16 cell: shifted left by half a cell and up by 16
        assert_eq!(cmds[0].dest, anchor + vec2(-16.0, -16.0));
    }

    #[test]
    fn flips_swap_footprint_and_chunks_follow_grid() {
        let mut map = map_2x2(Orientation::Orthogonal);
        let mut tiles = tile_layer(&map, &[FLIPPED_DIAGONALLY | FLIPPED_HORIZONTALLY | 1, 0, 0, 0]);
        let mut chunk = Chunk::new(4, 0, 2, 1);
        let mut sink: Vec<Diagnostic> = Vec::new();
        chunk.set_tile_at(5, 0, map.resolve_gid(3, &mut sink));
        tiles.add_chunk(chunk);
        let id = map.add_layer(None, Layer::new("l", LayerKind::Tiles(tiles)));

        let projection = map.projection();
        let cmds = build_tile_commands(&map, &projection);
        assert_eq!(cmds.len(), 2);
        assert!(cmds[0].flip.anti_diagonal && cmds[0].flip.horizontal);
        assert_eq!(cmds[0].layer, id);
        assert_eq!(cmds[1].z, 4);
        assert_eq!(cmds[1].dest, vec2(160.0, 0.0));

        let region = TileRegion { start_x: 0, start_y: 0, width: 2, height: 2 };
        assert_eq!(build_visible_tile_commands(&map, &projection, region).len(), 1);
    }

    #[test]
    fn region_bounds() {
        let r = TileRegion { start_x: -1, start_y: 2, width: 3, height: 1 };
        assert!(r.contains(-1, 2) && r.contains(1, 2));
        assert!(!r.contains(2, 2) && !r.contains(0, 3));
        assert!(TileRegion::default().is_empty());
    }

    #[test]
    fn region_contains_handles_far_coordinates() {
        let r = TileRegion { start_x: i32::MIN, start_y: i32::MIN, width: 10, height: 10 };
        assert!(r.contains(i32::MIN + 9, i32::MIN));
        assert!(!r.contains(i32::MAX, i32::MAX));
        let r = TileRegion { start_x: -5, start_y: 0, width: u32::MAX, height: 1 };
        assert!(r.contains(i32::MAX, 0));
    }
}
