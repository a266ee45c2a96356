use super::properties::read_properties;
use super::xml::{
    attribute, attribute_opt, attribute_or, child, children_named, flag_or, text_attribute,
};
use super::{parent_dir, parse_document, Reader};
use crate::color::parse_color;
use crate::diagnostics::DiagnosticKind;
use crate::error::MapError;
use crate::geom::Point;
use crate::image::TiledImage;
use crate::map::Orientation;
use crate::tile::{Animation, Frame, Tile};
use crate::tileset::{
    FillMode, ObjectAlignment, Terrain, TileRenderSize, Tileset, TilesetGrid, Transformations,
    WangColor, WangSet, WangSetType, WangTile,
};
use macroquad::color::BLANK;
use std::path::Path;

const NO_TERRAIN: u32 = 0xFF;

impl Reader<'_> {
    /// A `<tileset>` inside a map: either embedded or a reference to a `.tsx` file.
    pub(crate) fn map_tileset(
        &mut self,
        node: &roxmltree::Node,
        map_tile_width: u32,
        map_tile_height: u32,
    ) -> Result<Tileset, MapError> {
        let first_gid: u32 = attribute_or(node, "firstgid", 1)?;
        let mut tileset = match node.attribute("source") {
            Some(source) if self.options.load_external_tilesets => {
                let path = self.resolve(source);
                let mut ts = self.tileset_file(&path)?;
                ts.source = Some(source.to_owned());
                ts
            }
            Some(source) => {
                let mut ts = Tileset::new(map_tile_width, map_tile_height, 0, 0);
                ts.source = Some(source.to_owned());
                ts
            }
            None => self.read_tileset(node, map_tile_width, map_tile_height)?,
        };
        if tileset.tile_width == 0 || tileset.tile_height == 0 {
            tileset.tile_width = map_tile_width;
            tileset.tile_height = map_tile_height;
        }
        tileset.update_first_gid(first_gid);
        Ok(tileset)
    }

    /// A standalone `.tsx` document.
    pub(crate) fn tileset_file(&mut self, path: &Path) -> Result<Tileset, MapError> {
        let text = self.read_text(path)?;
        let doc = parse_document(&text, path)?;
        let root = doc.root_element();
        if !root.has_tag_name("tileset") {
            return Err(MapError::structure(
                root.tag_name().name(),
                "Root element must be 'tileset'",
            ));
        }
        let tileset = self.in_dir(parent_dir(path), |r| r.read_tileset(&root, 0, 0))?;
        log::debug!(
            target: "macroquad_tmx",
            "loaded tileset '{}' from {} ({} tiles)",
            tileset.name,
            path.display(),
            tileset.len()
        );
        Ok(tileset)
    }

    fn read_tileset(
        &mut self,
        node: &roxmltree::Node,
        fallback_width: u32,
        fallback_height: u32,
    ) -> Result<Tileset, MapError> {
        let tile_width: i64 = attribute_or(node, "tilewidth", 0)?;
        let tile_height: i64 = attribute_or(node, "tileheight", 0)?;
        let (tile_width, tile_height) = if tile_width <= 0 || tile_height <= 0 {
            (fallback_width, fallback_height)
        } else {
            (tile_width as u32, tile_height as u32)
        };

        let mut ts = Tileset::new(
            tile_width,
            tile_height,
            attribute_or(node, "spacing", 0)?,
            attribute_or(node, "margin", 0)?,
        );
        ts.name = text_attribute(node, "name");
        ts.class = text_attribute(node, "class");
        ts.tile_count = attribute_or(node, "tilecount", 0)?;
        ts.columns = attribute_or(node, "columns", 0)?;
        if let Some(v) = self.enum_attribute(node, "objectalignment", ObjectAlignment::from_value) {
            ts.object_alignment = v;
        }
        if let Some(v) = self.enum_attribute(node, "tilerendersize", TileRenderSize::from_value) {
            ts.tile_render_size = v;
        }
        if let Some(v) = self.enum_attribute(node, "fillmode", FillMode::from_value) {
            ts.fill_mode = v;
        }
        let declared_count = ts.tile_count;
        let declared_columns = ts.columns;

        for el in node.children().filter(|c| c.is_element()) {
            match el.tag_name().name() {
                "image" => {
                    if ts.image.is_some() {
                        self.report(
                            DiagnosticKind::DuplicateImage,
                            format!("tileset '{}' has more than one image", ts.name),
                        );
                        continue;
                    }
                    let image = self.read_image(&el)?;
                    ts.cut_image(image);
                }
                "grid" => {
                    let orientation = self
                        .enum_attribute(&el, "orientation", Orientation::from_value)
                        .unwrap_or_default();
                    ts.grid = Some(TilesetGrid {
                        orientation,
                        width: attribute_or(&el, "width", 0)?,
                        height: attribute_or(&el, "height", 0)?,
                    });
                }
                "tileoffset" => {
                    ts.tile_offset =
                        Point::new(attribute_or(&el, "x", 0)?, attribute_or(&el, "y", 0)?);
                }
                "transformations" => {
                    ts.transformations = Transformations {
                        hflip: flag_or(&el, "hflip", false)?,
                        vflip: flag_or(&el, "vflip", false)?,
                        rotate: flag_or(&el, "rotate", false)?,
                        prefer_untransformed: flag_or(&el, "preferuntransformed", false)?,
                    };
                }
                "terraintypes" => {
                    for t in children_named(&el, "terrain") {
                        let terrain = self.read_terrain(&t)?;
                        ts.terrains.push(terrain);
                    }
                }
                "wangsets" => {
                    for w in children_named(&el, "wangset") {
                        let set = self.read_wang_set(&w)?;
                        ts.wang_sets.push(set);
                    }
                }
                "tile" => self.read_tile(&mut ts, &el)?,
                "properties" => {}
                _ => self.unknown_element("tileset", &el),
            }
        }
        ts.properties = read_properties(node, self.diagnostics)?;

        // image collections keep their declared layout
        if ts.image.is_none() {
            ts.tile_count = declared_count.max(ts.len() as u32);
            ts.columns = declared_columns;
        }
        Ok(ts)
    }

    /// An `<image>`; the source is resolved against the declaring document.
    pub(crate) fn read_image(&mut self, node: &roxmltree::Node) -> Result<TiledImage, MapError> {
        let source = node.attribute("source").ok_or_else(|| {
            MapError::structure("image", "Required attribute 'source' missing")
        })?;
        let path = self.resolve(source);
        let mut image = TiledImage::new(
            path.to_string_lossy(),
            attribute_or(node, "width", 0)?,
            attribute_or(node, "height", 0)?,
        );
        image.trans = node.attribute("trans").and_then(parse_color);
        image.format = node.attribute("format").map(str::to_owned);

        if !image.has_size() && self.options.read_image_sizes {
            if let Some((w, h)) = self.assets.image_size(&path) {
                image.width = w;
                image.height = h;
            }
        }
        Ok(image)
    }

    fn read_tile(&mut self, ts: &mut Tileset, node: &roxmltree::Node) -> Result<(), MapError> {
        let id: u32 = attribute(node, "id")?;
        let (tw, th) = (ts.tile_width, ts.tile_height);
        let mut tile = match ts.remove_tile(id) {
            Some(existing) => existing,
            None => Tile::new(id, 0, 0, tw, th),
        };

        tile.x = attribute_or(node, "x", tile.x)?;
        tile.y = attribute_or(node, "y", tile.y)?;
        tile.width = attribute_or(node, "width", tile.width)?;
        tile.height = attribute_or(node, "height", tile.height)?;
        if let Some(class) = node.attribute("class").or_else(|| node.attribute("type")) {
            tile.class = class.to_owned();
        }
        if let Some(text) = node.attribute("terrain") {
            tile.terrain = Some(parse_terrain(text));
        }
        tile.probability = attribute_opt(node, "probability")?;
        tile.properties = read_properties(node, self.diagnostics)?;

        if let Some(image_node) = child(node, "image") {
            let image = self.read_image(&image_node)?;
            // collection tiles default to the full image
            if node.attribute("width").is_none() && image.width > 0 {
                tile.width = image.width;
            }
            if node.attribute("height").is_none() && image.height > 0 {
                tile.height = image.height;
            }
            tile.image = Some(image);
        }
        if let Some(anim) = child(node, "animation") {
            let mut frames = Vec::new();
            for f in children_named(&anim, "frame") {
                frames.push(Frame {
                    tile_id: attribute(&f, "tileid")?,
                    duration_ms: attribute(&f, "duration")?,
                });
            }
            tile.add_animation(Animation::new(frames));
        }
        if let Some(group) = child(node, "objectgroup") {
            tile.collision = Some(self.read_object_group(&group, None)?);
        }

        ts.add_tile(tile);
        Ok(())
    }

    fn read_terrain(&mut self, node: &roxmltree::Node) -> Result<Terrain, MapError> {
        let tile: i64 = attribute_or(node, "tile", -1)?;
        Ok(Terrain {
            name: text_attribute(node, "name"),
            tile: u32::try_from(tile).ok(),
            properties: read_properties(node, self.diagnostics)?,
        })
    }

    fn read_wang_set(&mut self, node: &roxmltree::Node) -> Result<WangSet, MapError> {
        let tile: i64 = attribute_or(node, "tile", -1)?;
        let mut set = WangSet {
            name: text_attribute(node, "name"),
            class: text_attribute(node, "class"),
            kind: self
                .enum_attribute(node, "type", WangSetType::from_value)
                .unwrap_or_default(),
            tile: u32::try_from(tile).ok(),
            properties: read_properties(node, self.diagnostics)?,
            ..Default::default()
        };
        for el in node.children().filter(|c| c.is_element()) {
            match el.tag_name().name() {
                // corner and edge colours are the pre-1.5 spelling
                "wangcolor" | "wangcornercolor" | "wangedgecolor" => {
                    let tile: i64 = attribute_or(&el, "tile", -1)?;
                    set.colors.push(WangColor {
                        name: text_attribute(&el, "name"),
                        class: text_attribute(&el, "class"),
                        color: el.attribute("color").and_then(parse_color).unwrap_or(BLANK),
                        tile: u32::try_from(tile).ok(),
                        probability: attribute_or(&el, "probability", 0.0)?,
                        properties: read_properties(&el, self.diagnostics)?,
                    });
                }
                "wangtile" => {
                    let text = el.attribute("wangid").unwrap_or_default();
                    let wang_id = WangTile::parse_wang_id(text).ok_or_else(|| {
                        MapError::InvalidAttribute {
                            tag: "wangtile".into(),
                            name: "wangid".into(),
                            value: text.to_owned(),
                        }
                    })?;
                    set.tiles.push(WangTile {
                        tile_id: attribute(&el, "tileid")?,
                        wang_id,
                    });
                }
                "properties" => {}
                _ => self.unknown_element("wangset", &el),
            }
        }
        Ok(set)
    }
}

/// Packs "tl,tr,bl,br" into one word; empty entries mean no terrain.
fn parse_terrain(text: &str) -> u32 {
    let mut packed = 0u32;
    let mut parts = text.split(',');
    for i in 0..4 {
        let corner = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .map_or(NO_TERRAIN, |v| v.min(NO_TERRAIN));
        packed |= corner << (8 * (3 - i));
    }
    packed
}
