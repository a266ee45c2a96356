use crate::color::format_color;
use macroquad::color::Color;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;

/// A typed custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `type="bool"`.
    Bool(bool),
    /// `type="int"`.
    Int(i64),
    /// `type="float"`.
    Float(f32),
    /// `type="string"` or untyped.
    String(String),
    /// `type="color"`.
    Color(Color),
    /// `type="file"`, path as written in the document.
    File(String),
    /// `type="object"`, an object id (0 means none).
    Object(i64),
    /// `type="class"` with nested members.
    Class {
        /// The `propertytype` attribute.
        property_type: String,
        /// Member values.
        properties: Properties,
    },
}

/// Custom properties attached to maps, layers, tilesets, tiles and objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: BTreeMap<String, PropertyValue>,
}

impl Properties {
    /// Empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.values.insert(name.into(), value);
    }

    /// Copies every entry of `other` over this set.
    pub fn extend(&mut self, other: &Properties) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[allow(missing_docs)]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::Int(v) | PropertyValue::Object(v) => Some(*v),
            _ => None,
        }
    }

    /// `None` when the value does not fit an `i32`.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    #[allow(missing_docs)]
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// String and file values.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(s) | PropertyValue::File(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Exports the set as a JSON object, colours as `#AARRGGBB`.
    pub fn to_json(&self) -> JsonValue {
        let mut out = JsonMap::new();
        for (k, v) in &self.values {
            out.insert(k.clone(), value_to_json(v));
        }
        JsonValue::Object(out)
    }
}

fn value_to_json(value: &PropertyValue) -> JsonValue {
    match value {
        PropertyValue::Bool(v) => json!(v),
        PropertyValue::Int(v) | PropertyValue::Object(v) => json!(v),
        PropertyValue::Float(v) => json!(v),
        PropertyValue::String(v) | PropertyValue::File(v) => json!(v),
        PropertyValue::Color(c) => json!(format_color(*c)),
        PropertyValue::Class { properties, .. } => properties.to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_only_match_their_type() {
        let mut props = Properties::new();
        props.insert("solid", PropertyValue::Bool(true));
        props.insert("big", PropertyValue::Int(5_000_000_000));
        props.insert("speed", PropertyValue::Float(1.5));
        props.insert("path", PropertyValue::File("a.png".into()));

        assert_eq!(props.get_bool("solid"), Some(true));
        assert_eq!(props.get_i64("big"), Some(5_000_000_000));
        assert_eq!(props.get_i32("big"), None);
        assert_eq!(props.get_f32("speed"), Some(1.5));
        assert_eq!(props.get_string("path"), Some("a.png"));
        assert_eq!(props.get_bool("speed"), None);
    }

    #[test]
    fn exports_nested_classes_to_json() {
        let mut inner = Properties::new();
        inner.insert("hp", PropertyValue::Int(3));
        let mut props = Properties::new();
        props.insert(
            "stats",
            PropertyValue::Class {
                property_type: "Stats".into(),
                properties: inner,
            },
        );
        props.insert("tint", PropertyValue::Color(Color::from_rgba(255, 0, 0, 255)));

        let v = props.to_json();
        assert_eq!(v["stats"]["hp"], json!(3));
        assert_eq!(v["tint"], json!("#ffff0000"));
    }
}
