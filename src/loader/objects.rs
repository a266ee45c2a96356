use super::properties::read_properties;
use super::xml::{attribute, attribute_or, child, flag_or};
use super::{parent_dir, parse_document, Reader};
use crate::color::parse_color;
use crate::diagnostics::DiagnosticKind;
use crate::error::MapError;
use crate::gid::{gid_no_mask, TileId, FLIPPED_MASK};
use crate::map::TiledMap;
use crate::object::{
    DrawOrder, HorizontalAlignment, MapObject, ObjectGroup, ObjectShape, ObjectTemplate,
    ObjectText, VerticalAlignment,
};
use crate::tile::PlacedTile;
use macroquad::math::{vec2, Vec2};

impl Reader<'_> {
    /// Reads an `<objectgroup>` payload. Tile objects resolve through `map` when given.
    pub(crate) fn read_object_group(
        &mut self,
        node: &roxmltree::Node,
        map: Option<&TiledMap>,
    ) -> Result<ObjectGroup, MapError> {
        let mut group = ObjectGroup::new();
        if let Some(color) = node.attribute("color").and_then(parse_color) {
            group.color = color;
        }
        if let Some(order) = self.enum_attribute(node, "draworder", DrawOrder::from_value) {
            group.draw_order = order;
        }
        for el in node.children().filter(|c| c.is_element()) {
            match el.tag_name().name() {
                "object" => {
                    let object = self.read_object(&el, map)?;
                    group.add(object);
                }
                "properties" => {}
                _ => self.unknown_element("objectgroup", &el),
            }
        }
        Ok(group)
    }

    /// Copies the templates used by `group` into the map.
    pub(crate) fn record_templates(&mut self, map: &mut TiledMap, group: &ObjectGroup) {
        for source in group.objects.iter().filter_map(|o| o.template.as_ref()) {
            if map.templates.contains_key(source) {
                continue;
            }
            let key = self.resolve(source);
            if let Some(template) = self.templates.get(&key) {
                map.templates.insert(source.clone(), template.clone());
            }
        }
    }

    /// Loads a `.tx` file referenced by the current document, caching by resolved path.
    pub(crate) fn template(&mut self, source: &str) -> Result<ObjectTemplate, MapError> {
        let path = self.resolve(source);
        if let Some(cached) = self.templates.get(&path) {
            return Ok(cached.clone());
        }

        let text = self.read_text(&path)?;
        let doc = parse_document(&text, &path)?;
        let root = doc.root_element();
        if !root.has_tag_name("template") {
            return Err(MapError::structure(
                root.tag_name().name(),
                "Root element must be 'template'",
            ));
        }
        let template = self.in_dir(parent_dir(&path), |r| -> Result<ObjectTemplate, MapError> {
            let tileset = match child(&root, "tileset") {
                Some(ts) => {
                    let first_gid: u32 = attribute_or(&ts, "firstgid", 1)?;
                    let ts_source: String = attribute(&ts, "source")?;
                    Some((r.resolve(&ts_source).to_string_lossy().into_owned(), first_gid))
                }
                None => None,
            };
            let object_node = child(&root, "object").ok_or_else(|| MapError::Template {
                source: source.to_owned(),
                msg: "no <object> element".into(),
            })?;
            Ok(ObjectTemplate {
                source: source.to_owned(),
                tileset,
                object: r.read_object(&object_node, None)?,
            })
        })?;

        log::debug!(target: "macroquad_tmx", "loaded template {}", path.display());
        self.templates.insert(path, template.clone());
        Ok(template)
    }

    /// Reads an `<object>`; attributes present on the element win over its template.
    pub(crate) fn read_object(
        &mut self,
        node: &roxmltree::Node,
        map: Option<&TiledMap>,
    ) -> Result<MapObject, MapError> {
        let template = match node.attribute("template") {
            Some(source) if self.options.load_templates => Some(self.template(source)?),
            _ => None,
        };
        let mut obj = template
            .as_ref()
            .map_or_else(MapObject::default, ObjectTemplate::instantiate);
        if let Some(source) = node.attribute("template") {
            obj.template = Some(source.to_owned());
        }

        obj.id = attribute_or(node, "id", obj.id)?;
        if let Some(name) = node.attribute("name") {
            obj.name = name.to_owned();
        }
        if let Some(class) = node.attribute("class").or_else(|| node.attribute("type")) {
            obj.class = class.to_owned();
        }
        obj.x = attribute_or(node, "x", obj.x)?;
        obj.y = attribute_or(node, "y", obj.y)?;
        obj.width = attribute_or(node, "width", obj.width)?;
        obj.height = attribute_or(node, "height", obj.height)?;
        obj.rotation = attribute_or(node, "rotation", obj.rotation)?;
        obj.visible = flag_or(node, "visible", obj.visible)?;

        let own = read_properties(node, self.diagnostics)?;
        obj.properties.extend(&own);

        for el in node.children().filter(|c| c.is_element()) {
            match el.tag_name().name() {
                "ellipse" => obj.shape = ObjectShape::Ellipse,
                "point" => obj.shape = ObjectShape::Point,
                "polygon" => obj.shape = ObjectShape::Polygon(read_points(&el)?),
                "polyline" => obj.shape = ObjectShape::Polyline(read_points(&el)?),
                "text" => obj.shape = ObjectShape::Text(self.read_text_shape(&el)?),
                "image" => obj.shape = ObjectShape::Image(self.read_image(&el)?),
                "properties" => {}
                _ => self.unknown_element("object", &el),
            }
        }

        if let Some(raw) = attribute_opt_gid(node)? {
            obj.gid = Some(TileId(raw));
            obj.shape = ObjectShape::Tile(map.and_then(|m| m.resolve_gid(raw, self.diagnostics)));
        } else if let (Some(TileId(raw)), Some(map)) = (obj.gid, map) {
            // the template's gid is local to the template's own tileset
            let placed = match template.as_ref().and_then(|t| t.tileset.as_ref()) {
                Some((source, first_gid)) => {
                    self.rebase_template_tile(&mut obj, raw, source, *first_gid, map)
                }
                None => map.resolve_gid(raw, self.diagnostics),
            };
            obj.shape = ObjectShape::Tile(placed);
        }
        Ok(obj)
    }

    fn rebase_template_tile(
        &mut self,
        obj: &mut MapObject,
        raw: u32,
        template_tileset: &str,
        template_first_gid: u32,
        map: &TiledMap,
    ) -> Option<PlacedTile> {
        let target = map.tilesets().iter().find(|ts| {
            ts.source
                .as_deref()
                .is_some_and(|s| self.resolve(s).to_string_lossy() == template_tileset)
        });
        let local = gid_no_mask(raw).checked_sub(template_first_gid);
        match (target, local) {
            (Some(ts), Some(local)) => {
                let rebased = (raw & FLIPPED_MASK) | (ts.first_gid + local);
                obj.gid = Some(TileId(rebased));
                map.resolve_gid(rebased, self.diagnostics)
            }
            _ => {
                self.report(
                    DiagnosticKind::MissingTemplateTile,
                    format!(
                        "object {} uses tileset {} which the map does not load",
                        obj.id, template_tileset
                    ),
                );
                None
            }
        }
    }

    fn read_text_shape(&mut self, node: &roxmltree::Node) -> Result<ObjectText, MapError> {
        let mut text = ObjectText {
            text: node.text().unwrap_or_default().to_owned(),
            ..Default::default()
        };
        if let Some(family) = node.attribute("fontfamily") {
            text.font_family = family.to_owned();
        }
        text.pixel_size = attribute_or(node, "pixelsize", text.pixel_size)?;
        text.wrap = flag_or(node, "wrap", text.wrap)?;
        text.bold = flag_or(node, "bold", text.bold)?;
        text.italic = flag_or(node, "italic", text.italic)?;
        text.underline = flag_or(node, "underline", text.underline)?;
        text.strikeout = flag_or(node, "strikeout", text.strikeout)?;
        text.kerning = flag_or(node, "kerning", text.kerning)?;
        if let Some(color) = node.attribute("color").and_then(parse_color) {
            text.color = color;
        }
        if let Some(h) = self.enum_attribute(node, "halign", HorizontalAlignment::from_value) {
            text.halign = h;
        }
        if let Some(v) = self.enum_attribute(node, "valign", VerticalAlignment::from_value) {
            text.valign = v;
        }
        Ok(text)
    }
}

// gids above i32::MAX carry flag bits, so the value is parsed wide.
fn attribute_opt_gid(node: &roxmltree::Node) -> Result<Option<u32>, MapError> {
    match node.attribute("gid") {
        None => Ok(None),
        Some(text) => text
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| MapError::InvalidAttribute {
                tag: "object".into(),
                name: "gid".into(),
                value: text.to_owned(),
            }),
    }
}

/// `points="x,y x,y ..."`.
fn read_points(node: &roxmltree::Node) -> Result<Vec<Vec2>, MapError> {
    let text = node.attribute("points").unwrap_or_default();
    let invalid = || MapError::InvalidAttribute {
        tag: node.tag_name().name().to_owned(),
        name: "points".into(),
        value: text.to_owned(),
    };
    let numbers: Vec<f32> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    if numbers.len() % 2 != 0 {
        return Err(invalid());
    }
    Ok(numbers.chunks_exact(2).map(|p| vec2(p[0], p[1])).collect())
}
