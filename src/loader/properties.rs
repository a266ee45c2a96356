use super::xml::{child, children_named, text_attribute};
use crate::color::parse_color;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::MapError;
use crate::properties::{Properties, PropertyValue};
use macroquad::color::BLANK;

fn invalid(name: &str, value: &str) -> MapError {
    MapError::InvalidAttribute {
        tag: "property".into(),
        name: name.to_owned(),
        value: value.to_owned(),
    }
}

/// Reads the `<properties>` child of `node`, empty when there is none.
pub(crate) fn read_properties(
    node: &roxmltree::Node,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Properties, MapError> {
    match child(node, "properties") {
        Some(props) => read_property_list(&props, diagnostics),
        None => Ok(Properties::new()),
    }
}

fn read_property_list(
    node: &roxmltree::Node,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for prop in children_named(node, "property") {
        let name = text_attribute(&prop, "name");
        let kind = prop.attribute("type").unwrap_or("string");

        if kind == "class" {
            let properties = read_properties(&prop, diagnostics)?;
            out.insert(
                name,
                PropertyValue::Class {
                    property_type: text_attribute(&prop, "propertytype"),
                    properties,
                },
            );
            continue;
        }

        // multi-line strings are stored as element text
        let raw = match prop.attribute("value") {
            Some(v) => v.to_owned(),
            None => prop.text().map(str::trim).unwrap_or_default().to_owned(),
        };

        let value = match kind {
            "string" => PropertyValue::String(raw),
            "int" => PropertyValue::Int(raw.trim().parse().map_err(|_| invalid(&name, &raw))?),
            "float" => PropertyValue::Float(raw.trim().parse().map_err(|_| invalid(&name, &raw))?),
            "bool" => PropertyValue::Bool(raw.trim() == "true"),
            "color" => PropertyValue::Color(parse_color(&raw).unwrap_or(BLANK)),
            "file" => PropertyValue::File(raw),
            "object" => {
                PropertyValue::Object(raw.trim().parse().map_err(|_| invalid(&name, &raw))?)
            }
            other => {
                diagnostics.report(Diagnostic::new(
                    DiagnosticKind::UnknownPropertyType,
                    format!("property '{name}' has unknown type '{other}'"),
                ));
                PropertyValue::String(raw)
            }
        };
        out.insert(name, value);
    }
    Ok(out)
}
