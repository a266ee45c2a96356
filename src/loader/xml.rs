use crate::error::MapError;
use std::str::FromStr;

fn tag(node: &roxmltree::Node) -> String {
    node.tag_name().name().to_string()
}

fn parse<T: FromStr>(node: &roxmltree::Node, name: &str, text: &str) -> Result<T, MapError> {
    text.trim().parse().map_err(|_| MapError::InvalidAttribute {
        tag: tag(node),
        name: name.to_owned(),
        value: text.to_owned(),
    })
}

/// Required attribute.
pub(crate) fn attribute<T: FromStr>(node: &roxmltree::Node, name: &str) -> Result<T, MapError> {
    let text = node.attribute(name).ok_or_else(|| MapError::Structure {
        tag: tag(node),
        msg: format!("Required attribute '{}' missing", name),
    })?;
    parse(node, name, text)
}

/// Optional attribute with a fallback.
pub(crate) fn attribute_or<T: FromStr>(
    node: &roxmltree::Node,
    name: &str,
    alternative: T,
) -> Result<T, MapError> {
    match node.attribute(name) {
        None => Ok(alternative),
        Some(text) => parse(node, name, text),
    }
}

/// Optional attribute, `None` when absent.
pub(crate) fn attribute_opt<T: FromStr>(
    node: &roxmltree::Node,
    name: &str,
) -> Result<Option<T>, MapError> {
    node.attribute(name).map(|text| parse(node, name, text)).transpose()
}

/// `0`/`1` flags; `true`/`false` is accepted too.
pub(crate) fn flag_or(
    node: &roxmltree::Node,
    name: &str,
    alternative: bool,
) -> Result<bool, MapError> {
    match node.attribute(name).map(str::trim) {
        None => Ok(alternative),
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(other) => Err(MapError::InvalidAttribute {
            tag: tag(node),
            name: name.to_owned(),
            value: other.to_owned(),
        }),
    }
}

/// String attribute, empty when absent.
pub(crate) fn text_attribute(node: &roxmltree::Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_owned()
}

/// First child element with the given tag.
pub(crate) fn child<'a, 'input>(
    node: &roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(name))
}

/// Child elements with the given tag, in document order.
pub(crate) fn children_named<'a, 'input: 'a>(
    node: &roxmltree::Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.has_tag_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_helpers() {
        let doc = roxmltree::Document::parse(r#"<map width="10" visible="0" bad="x"/>"#)
            .expect("xml");
        let node = doc.root_element();
        assert_eq!(attribute::<u32>(&node, "width").expect("width"), 10);
        assert_eq!(attribute_or::<u32>(&node, "height", 7).expect("height"), 7);
        assert_eq!(attribute_opt::<i32>(&node, "nope").expect("opt"), None);
        assert!(!flag_or(&node, "visible", true).expect("flag"));

        let missing = attribute::<u32>(&node, "height").err().expect("missing");
        assert!(matches!(missing, MapError::Structure { ref tag, .. } if tag == "map"));
        let bad = attribute_or::<u32>(&node, "bad", 0).err().expect("bad");
        assert!(matches!(bad, MapError::InvalidAttribute { ref value, .. } if value == "x"));
    }
}
