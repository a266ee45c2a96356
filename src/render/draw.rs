use crate::command::DrawCommand;
use crate::map::TiledMap;
use crate::tileset::TilesetId;
use anyhow::Context;
use macroquad::prelude::*;
use std::collections::HashMap;

/// Textures for every tileset atlas and per-tile image of one map.
#[derive(Default)]
pub struct TextureCache {
    by_path: HashMap<String, Texture2D>,
    atlases: HashMap<TilesetId, Texture2D>,
    tile_images: HashMap<(TilesetId, u32), Texture2D>,
}

impl TextureCache {
    /// Loads every image the map's tilesets reference, each file once.
    pub async fn load(map: &TiledMap) -> anyhow::Result<Self> {
        let mut cache = Self::default();
        for (i, ts) in map.tilesets().iter().enumerate() {
            let id = TilesetId(i);
            if let Some(image) = &ts.image {
                let tex = cache.texture(&image.source).await?;
                cache.atlases.insert(id, tex);
            }
            for tile in ts.tiles() {
                if let Some(image) = &tile.image {
                    let tex = cache.texture(&image.source).await?;
                    cache.tile_images.insert((id, tile.id), tex);
                }
            }
        }
        log::debug!(target: "macroquad_tmx", "loaded {} textures", cache.by_path.len());
        Ok(cache)
    }

    async fn texture(&mut self, path: &str) -> anyhow::Result<Texture2D> {
        if let Some(tex) = self.by_path.get(path) {
            return Ok(tex.clone());
        }
        let tex: Texture2D = load_texture(path)
            .await
            .with_context(|| format!("Loading texture {}", path))?;
        tex.set_filter(FilterMode::Nearest);
        self.by_path.insert(path.to_owned(), tex.clone());
        Ok(tex)
    }

    /// Texture a command samples from: the tile's own image, else the tileset atlas.
    pub fn get(&self, tileset: TilesetId, tile_id: u32) -> Option<&Texture2D> {
        self.tile_images
            .get(&(tileset, tile_id))
            .or_else(|| self.atlases.get(&tileset))
    }

    /// Draws the commands in order with the current camera.
    pub fn draw(&self, commands: &[DrawCommand]) {
        for cmd in commands {
            let Some(tex) = self.get(cmd.tileset, cmd.tile_id) else {
                continue;
            };
            let (rotation, flip_x, flip_y) = cmd.flip.draw_params();
            // rotation pivots on the sprite centre, so centre the unrotated rect on the footprint
            let size = cmd.src.size();
            let centre = cmd.dest + cmd.size * 0.5;
            let top_left = centre - size * 0.5;

            draw_texture_ex(
                tex,
                top_left.x,
                top_left.y,
                cmd.tint,
                DrawTextureParams {
                    dest_size: Some(size),
                    source: Some(cmd.src),
                    rotation,
                    flip_x,
                    flip_y,
                    ..Default::default()
                },
            );
        }
    }
}
