use super::properties::read_properties;
use super::xml::{attribute_or, flag_or, text_attribute};
use super::{parse_document, Reader};
use crate::color::parse_color;
use crate::decode::cell_count;
use crate::error::MapError;
use crate::map::{Orientation, RenderOrder, StaggerAxis, StaggerIndex, TiledMap};
use macroquad::math::vec2;
use std::path::Path;

impl Reader<'_> {
    pub(crate) fn map_document(&mut self, text: &str, path: &Path) -> Result<TiledMap, MapError> {
        let doc = parse_document(text, path)?;
        let root = doc.root_element();
        if !root.has_tag_name("map") {
            return Err(MapError::structure(
                root.tag_name().name(),
                "Root element must be 'map'",
            ));
        }
        self.read_map(&root)
    }

    fn read_map(&mut self, node: &roxmltree::Node) -> Result<TiledMap, MapError> {
        let infinite = flag_or(node, "infinite", false)?;
        let width: i64 = attribute_or(node, "width", 0)?;
        let height: i64 = attribute_or(node, "height", 0)?;
        // infinite maps take their extent from the chunks
        if !infinite && (width <= 0 || height <= 0) {
            return Err(MapError::InvalidDimensions { width, height });
        }
        let invalid = |_| MapError::InvalidDimensions { width, height };
        let grid_w = u32::try_from(width.max(0)).map_err(invalid)?;
        let grid_h = u32::try_from(height.max(0)).map_err(invalid)?;
        cell_count(grid_w, grid_h)?;

        let mut map = TiledMap::new(
            grid_w,
            grid_h,
            attribute_or(node, "tilewidth", 0)?,
            attribute_or(node, "tileheight", 0)?,
        );
        map.infinite = infinite;
        map.version = text_attribute(node, "version");
        map.tiled_version = text_attribute(node, "tiledversion");
        map.class = text_attribute(node, "class");
        map.compression_level = attribute_or(node, "compressionlevel", -1)?;
        map.hex_side_length = attribute_or(node, "hexsidelength", 0)?;
        map.next_layer_id = attribute_or(node, "nextlayerid", map.next_layer_id)?;
        map.next_object_id = attribute_or(node, "nextobjectid", map.next_object_id)?;
        map.parallax_origin = vec2(
            attribute_or(node, "parallaxoriginx", 0.0)?,
            attribute_or(node, "parallaxoriginy", 0.0)?,
        );

        if let Some(v) = self.enum_attribute(node, "orientation", Orientation::from_value) {
            map.orientation = v;
        }
        if let Some(v) = self.enum_attribute(node, "renderorder", RenderOrder::from_value) {
            map.render_order = v;
        }
        if let Some(v) = self.enum_attribute(node, "staggeraxis", StaggerAxis::from_value) {
            map.stagger_axis = v;
        }
        if let Some(v) = self.enum_attribute(node, "staggerindex", StaggerIndex::from_value) {
            map.stagger_index = v;
        }
        if let Some(color) = node.attribute("backgroundcolor").and_then(parse_color) {
            map.background_color = color;
        }
        map.properties = read_properties(node, self.diagnostics)?;

        // layers may reference any tileset, so all of them go first
        for ts_node in node.children().filter(|c| c.has_tag_name("tileset")) {
            let tileset = self.map_tileset(&ts_node, map.tile_width, map.tile_height)?;
            map.add_tileset(tileset);
        }
        log::debug!(target: "macroquad_tmx", "map uses {} tilesets", map.tilesets().len());

        for child in node.children().filter(|c| c.is_element()) {
            match child.tag_name().name() {
                "tileset" | "properties" => {}
                "layer" | "objectgroup" | "imagelayer" | "group" => {
                    self.read_layer(&mut map, &child, None)?;
                }
                _ => self.unknown_element("map", &child),
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::{Diagnostic, DiagnosticKind};
    use crate::error::MapError;
    use crate::loader::TmxLoader;
    use crate::map::{Orientation, RenderOrder, StaggerAxis};

    fn load(xml: &str) -> (Result<crate::TiledMap, MapError>, Vec<Diagnostic>) {
        let mut loader = TmxLoader::new().with_diagnostics(Vec::<Diagnostic>::new());
        let map = loader.load_map_str(xml, "");
        (map, loader.into_diagnostics())
    }

    #[test]
    fn root_must_be_map() {
        let (map, _) = load(r#"<tileset name="x"/>"#);
        assert!(matches!(map, Err(MapError::Structure { ref tag, .. }) if tag == "tileset"));
    }

    #[test]
    fn non_positive_size_is_rejected_unless_infinite() {
        let (map, _) = load(r#"<map width="0" height="4" tilewidth="8" tileheight="8"/>"#);
        assert!(matches!(
            map,
            Err(MapError::InvalidDimensions { width: 0, height: 4 })
        ));

        let (map, _) =
            load(r#"<map width="0" height="0" infinite="1" tilewidth="8" tileheight="8"/>"#);
        assert!(map.expect("infinite map").infinite);
    }

    #[test]
    fn unknown_enums_keep_defaults() {
        let (map, diags) = load(
            r#"<map orientation="spherical" renderorder="left-up" staggeraxis="z"
                   width="2" height="2" tilewidth="8" tileheight="8"/>"#,
        );
        let map = map.expect("map");
        assert_eq!(map.orientation, Orientation::Orthogonal);
        assert_eq!(map.render_order, RenderOrder::LeftUp);
        assert_eq!(map.stagger_axis, StaggerAxis::Y);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.kind == DiagnosticKind::UnknownEnum));
    }

    #[test]
    fn header_attributes() {
        let (map, diags) = load(
            r##"<map version="1.10" tiledversion="1.10.2" orientation="hexagonal"
                   staggeraxis="x" staggerindex="even" hexsidelength="6"
                   width="3" height="2" tilewidth="16" tileheight="14"
                   backgroundcolor="#80112233" nextlayerid="5" nextobjectid="9">
                <properties><property name="title" value="Level 1"/></properties>
                <editorsettings/>
            </map>"##,
        );
        let map = map.expect("map");
        assert_eq!(map.version, "1.10");
        assert_eq!(map.orientation, Orientation::Hexagonal);
        assert_eq!(map.hex_side_length, 6);
        assert_eq!((map.next_layer_id, map.next_object_id), (5, 9));
        assert_eq!(crate::color::to_rgba8(map.background_color), [0x11, 0x22, 0x33, 0x80]);
        assert_eq!(map.properties.get_string("title"), Some("Level 1"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnknownElement);
    }

    #[test]
    fn oversized_maps_and_layers_are_rejected() {
        let (map, _) =
            load(r#"<map width="100000" height="100000" tilewidth="8" tileheight="8"/>"#);
        assert!(matches!(map, Err(MapError::InvalidDimensions { .. })));

        let (map, _) =
            load(r#"<map width="8589934592" height="1" tilewidth="8" tileheight="8"/>"#);
        assert!(matches!(map, Err(MapError::InvalidDimensions { .. })));

        let (map, _) = load(
            r#"<map width="2" height="2" tilewidth="8" tileheight="8">
                <layer name="huge" width="100000" height="100000">
                    <data encoding="csv">1</data>
                </layer>
            </map>"#,
        );
        assert!(matches!(
            map,
            Err(MapError::InvalidDimensions { width: 100_000, height: 100_000 })
        ));
    }
}
