use crate::geom::Bound2D;
use crate::gid::TileId;
use crate::image::TiledImage;
use crate::properties::Properties;
use crate::tile::PlacedTile;
use macroquad::color::{Color, BLACK, LIGHTGRAY};
use macroquad::math::Vec2;

/// Order objects of a group are drawn in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawOrder {
    /// Sorted by y ascending.
    #[default]
    TopDown,
    /// Document order.
    Index,
}

impl DrawOrder {
    /// Parses the `draworder` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "topdown" => Some(Self::TopDown),
            "index" => Some(Self::Index),
            _ => None,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

impl HorizontalAlignment {
    /// Parses the `halign` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

impl VerticalAlignment {
    /// Parses the `valign` attribute.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Payload of a text object.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct ObjectText {
    pub text: String,
    pub font_family: String,
    pub pixel_size: u32,
    pub wrap: bool,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub kerning: bool,
    pub halign: HorizontalAlignment,
    pub valign: VerticalAlignment,
}

impl Default for ObjectText {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".to_owned(),
            pixel_size: 16,
            wrap: false,
            color: BLACK,
            bold: false,
            italic: false,
            underline: false,
            strikeout: false,
            kerning: true,
            halign: HorizontalAlignment::Left,
            valign: VerticalAlignment::Top,
        }
    }
}

/// Shape of a [`MapObject`] with its shape-specific payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ObjectShape {
    /// Box spanning `width` by `height` from the object origin.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the object's box.
    Ellipse,
    /// Closed outline, points relative to the object origin.
    Polygon(Vec<Vec2>),
    /// Open outline, points relative to the object origin.
    Polyline(Vec<Vec2>),
    /// Single position, no extent.
    Point,
    /// Tile object; `None` when the gid did not resolve.
    Tile(Option<PlacedTile>),
    /// Free-standing image.
    Image(TiledImage),
    /// Text box.
    Text(ObjectText),
}

/// A free-form object of an object group.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct MapObject {
    pub id: u32,
    pub name: String,
    pub class: String,
    /// Position in pixels.
    pub x: f32,
    pub y: f32,
    /// 0 means no extent.
    pub width: f32,
    pub height: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub visible: bool,
    /// Template file this object was instantiated from.
    pub template: Option<String>,
    /// Raw gid for tile objects, flags included.
    pub gid: Option<TileId>,
    pub shape: ObjectShape,
    pub properties: Properties,
}

impl Default for MapObject {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            class: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            visible: true,
            template: None,
            gid: None,
            shape: ObjectShape::Rectangle,
            properties: Properties::new(),
        }
    }
}

impl MapObject {
    /// Rectangle object at the given bounds.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Axis aligned bounds, rotation ignored.
    pub fn bounds(&self) -> Bound2D {
        Bound2D::new(self.x, self.y, self.width, self.height)
    }

    /// Resolved tile for tile objects.
    pub fn tile(&self) -> Option<&PlacedTile> {
        match &self.shape {
            ObjectShape::Tile(tile) => tile.as_ref(),
            _ => None,
        }
    }

    /// Outline points for polygons and polylines.
    pub fn points(&self) -> Option<&[Vec2]> {
        match &self.shape {
            ObjectShape::Polygon(p) | ObjectShape::Polyline(p) => Some(p),
            _ => None,
        }
    }

    fn covers(&self, x: f32, y: f32) -> bool {
        match (self.width == 0.0, self.height == 0.0) {
            (true, true) => x == self.x && y == self.y,
            (true, false) => x == self.x && y >= self.y && y < self.y + self.height,
            (false, true) => y == self.y && x >= self.x && x < self.x + self.width,
            (false, false) => self.bounds().contains(x, y),
        }
    }
}

/// The object payload of an `<objectgroup>`; also used for tile collision shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroup {
    /// Objects in document order.
    pub objects: Vec<MapObject>,
    /// Whether [`ObjectGroup::sorted_for_draw`] sorts by y.
    pub draw_order: DrawOrder,
    /// Display colour used by editors and debug drawing.
    pub color: Color,
}

impl Default for ObjectGroup {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            draw_order: DrawOrder::TopDown,
            color: LIGHTGRAY,
        }
    }
}

#[allow(missing_docs)]
impl ObjectGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: MapObject) {
        self.objects.push(object);
    }

    pub fn get(&self, id: u32) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut MapObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn remove(&mut self, id: u32) -> Option<MapObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First object covering the pixel position.
    ///
    /// Objects without width or height match only their exact edge.
    pub fn object_at(&self, x: f32, y: f32) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.covers(x, y))
    }

    /// Objects in drawing order.
    pub fn sorted_for_draw(&self) -> Vec<&MapObject> {
        let mut out: Vec<&MapObject> = self.objects.iter().collect();
        if self.draw_order == DrawOrder::TopDown {
            // stable: equal y keeps document order
            out.sort_by(|a, b| a.y.total_cmp(&b.y));
        }
        out
    }
}

/// A reusable object loaded from a `.tx` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTemplate {
    /// Path the template was loaded from, as referenced by objects.
    pub source: String,
    /// External tileset referenced by a tile template, with its local first gid.
    pub tileset: Option<(String, u32)>,
    /// The template object; tile shapes are still unresolved here.
    pub object: MapObject,
}

impl ObjectTemplate {
    /// Copies the template fields into a fresh object.
    ///
    /// Callers then apply the instance's own attributes on top.
    pub fn instantiate(&self) -> MapObject {
        let mut obj = self.object.clone();
        obj.template = Some(self.source.clone());
        obj
    }
}
