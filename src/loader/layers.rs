use super::properties::read_properties;
use super::xml::{attribute, attribute_or, child, children_named, flag_or, text_attribute};
use super::Reader;
use crate::color::parse_color;
use crate::decode::{cell_count, read_layer_data};
use crate::error::MapError;
use crate::geom::Point;
use crate::image::ImageLayer;
use crate::layer::{GroupLayer, Layer, LayerId, LayerKind};
use crate::map::TiledMap;
use crate::tile_layer::{Chunk, TileLayer};
use macroquad::math::vec2;

impl Reader<'_> {
    /// Reads one layer element and appends it to `map` under `parent`.
    pub(crate) fn read_layer(
        &mut self,
        map: &mut TiledMap,
        node: &roxmltree::Node,
        parent: Option<LayerId>,
    ) -> Result<LayerId, MapError> {
        match node.tag_name().name() {
            "layer" => {
                let layer = self.read_tile_layer(map, node)?;
                Ok(map.add_layer(parent, layer))
            }
            "objectgroup" => {
                let group = self.read_object_group(node, Some(&*map))?;
                self.record_templates(map, &group);
                let layer = self.layer_base(node, LayerKind::Objects(group))?;
                Ok(map.add_layer(parent, layer))
            }
            "imagelayer" => {
                let image = match child(node, "image") {
                    Some(img) => Some(self.read_image(&img)?),
                    None => None,
                };
                let kind = LayerKind::Image(ImageLayer {
                    image,
                    repeat_x: flag_or(node, "repeatx", false)?,
                    repeat_y: flag_or(node, "repeaty", false)?,
                });
                let layer = self.layer_base(node, kind)?;
                Ok(map.add_layer(parent, layer))
            }
            "group" => {
                let layer = self.layer_base(node, LayerKind::Group(GroupLayer::default()))?;
                let id = map.add_layer(parent, layer);
                for c in node.children().filter(|c| c.is_element()) {
                    match c.tag_name().name() {
                        "layer" | "objectgroup" | "imagelayer" | "group" => {
                            self.read_layer(map, &c, Some(id))?;
                        }
                        "properties" => {}
                        _ => self.unknown_element("group", &c),
                    }
                }
                Ok(id)
            }
            other => Err(MapError::structure(other, "Not a layer element")),
        }
    }

    /// Attributes shared by every layer kind.
    fn layer_base(&mut self, node: &roxmltree::Node, kind: LayerKind) -> Result<Layer, MapError> {
        let mut layer = Layer::new(text_attribute(node, "name"), kind)
            .with_offset(vec2(
                attribute_or(node, "offsetx", 0.0)?,
                attribute_or(node, "offsety", 0.0)?,
            ))
            .with_parallax(vec2(
                attribute_or(node, "parallaxx", 1.0)?,
                attribute_or(node, "parallaxy", 1.0)?,
            ));
        layer.id = attribute_or(node, "id", 0)?;
        layer.class = text_attribute(node, "class");
        layer.x = attribute_or(node, "x", 0)?;
        layer.y = attribute_or(node, "y", 0)?;
        layer.width = attribute_or(node, "width", 0)?;
        layer.height = attribute_or(node, "height", 0)?;
        layer.opacity = attribute_or(node, "opacity", 1.0)?;
        layer.visible = flag_or(node, "visible", true)?;
        layer.locked = flag_or(node, "locked", false)?;
        layer.tint_color = node.attribute("tintcolor").and_then(parse_color);
        layer.properties = read_properties(node, self.diagnostics)?;
        Ok(layer)
    }

    fn read_tile_layer(
        &mut self,
        map: &TiledMap,
        node: &roxmltree::Node,
    ) -> Result<Layer, MapError> {
        let mut width: u32 = attribute_or(node, "width", 0)?;
        let mut height: u32 = attribute_or(node, "height", 0)?;
        if width == 0 && height == 0 {
            width = map.width;
            height = map.height;
        }

        cell_count(width, height)?;
        let mut tiles = TileLayer::new(width, height);
        if let Some(data) = child(node, "data") {
            let decoded = read_layer_data(&data, width, height)?;
            for (i, raw) in decoded.cells.into_iter().enumerate() {
                let x = (i % width as usize) as i32;
                let y = (i / width as usize) as i32;
                let placed = map.resolve_gid(raw, self.diagnostics);
                if placed.is_some() {
                    tiles.set_tile_at(x, y, placed);
                }
            }
            for raw_chunk in decoded.chunks {
                let mut chunk =
                    Chunk::new(raw_chunk.x, raw_chunk.y, raw_chunk.width, raw_chunk.height);
                let w = raw_chunk.width.max(1) as usize;
                for (i, raw) in raw_chunk.cells.into_iter().enumerate() {
                    let placed = map.resolve_gid(raw, self.diagnostics);
                    if placed.is_some() {
                        chunk.set_tile_at(
                            raw_chunk.x + (i % w) as i32,
                            raw_chunk.y + (i / w) as i32,
                            placed,
                        );
                    }
                }
                tiles.add_chunk(chunk);
            }
        }
        if let Some(list) = child(node, "tileproperties") {
            for tile in children_named(&list, "tile") {
                let at = Point::new(attribute(&tile, "x")?, attribute(&tile, "y")?);
                let props = read_properties(&tile, self.diagnostics)?;
                tiles.tile_instance_properties.insert(at, props);
            }
        }
        let mut layer = self.layer_base(node, LayerKind::Tiles(tiles))?;
        layer.width = width;
        layer.height = height;
        Ok(layer)
    }
}
