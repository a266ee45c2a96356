//! Layer payload decoding: `<data>` and `<chunk>` elements to raw gids.

use crate::error::MapError;
use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use std::io::Read;

/// Largest grid, in cells, a map, layer or chunk may declare.
pub const MAX_CELLS: usize = 1 << 26;

/// `width * height`, or [`MapError::InvalidDimensions`] above [`MAX_CELLS`].
pub fn cell_count(width: u32, height: u32) -> Result<usize, MapError> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&n| n <= MAX_CELLS)
        .ok_or(MapError::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        })
}

/// `<data encoding>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// One `<tile gid>` element per cell.
    Xml,
    #[allow(missing_docs)]
    Base64,
    #[allow(missing_docs)]
    Csv,
}

impl Encoding {
    /// A missing attribute means XML; anything unknown is fatal.
    pub fn from_attribute(value: Option<&str>) -> Result<Self, MapError> {
        match value {
            None => Ok(Self::Xml),
            Some("base64") => Ok(Self::Base64),
            Some("csv") => Ok(Self::Csv),
            Some(other) => Err(MapError::UnsupportedEncoding(other.to_owned())),
        }
    }
}

/// `<data compression>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Compression {
    None,
    Zlib,
    Gzip,
}

impl Compression {
    /// `zstd` and unknown codecs are fatal.
    pub fn from_attribute(value: Option<&str>) -> Result<Self, MapError> {
        match value {
            None | Some("") => Ok(Self::None),
            Some("zlib") => Ok(Self::Zlib),
            Some("gzip") => Ok(Self::Gzip),
            Some(other) => Err(MapError::UnsupportedCompression(other.to_owned())),
        }
    }
}

/// A `<chunk>` decoded to raw gids, before tile resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    #[allow(missing_docs)]
    pub x: i32,
    #[allow(missing_docs)]
    pub y: i32,
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
    /// Row-major raw values, `width * height` long.
    pub cells: Vec<u32>,
}

/// Everything a `<data>` element carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerData {
    /// Row-major raw gids of the dense grid; empty for chunked data.
    pub cells: Vec<u32>,
    /// Chunks in document order.
    pub chunks: Vec<RawChunk>,
}

fn inflate(bytes: &[u8], compression: Compression) -> Result<Vec<u8>, MapError> {
    let mut out = Vec::new();
    let res = match compression {
        Compression::None => return Ok(bytes.to_vec()),
        Compression::Zlib => ZlibDecoder::new(bytes).read_to_end(&mut out),
        Compression::Gzip => GzDecoder::new(bytes).read_to_end(&mut out),
    };
    res.map_err(|source| MapError::Io {
        path: "<tile data>".into(),
        source,
    })?;
    Ok(out)
}

/// Decodes base64 (optionally compressed) data: 4 little-endian bytes per cell.
pub fn decode_base64(
    text: &str,
    compression: Compression,
    count: usize,
) -> Result<Vec<u32>, MapError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = base64::engine::general_purpose::STANDARD.decode(compact.as_bytes())?;
    let bytes = inflate(&raw, compression)?;

    let expected = count * 4;
    if bytes.len() < expected {
        return Err(MapError::TruncatedData {
            expected,
            found: bytes.len(),
        });
    }
    Ok(bytes[..expected]
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Decodes CSV data; exactly `count` comma separated values are required.
pub fn decode_csv(text: &str, count: usize) -> Result<Vec<u32>, MapError> {
    let trimmed = text.trim();
    let tokens: Vec<&str> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split(',').map(str::trim).collect()
    };
    if tokens.len() != count {
        return Err(MapError::TileCountMismatch {
            expected: count,
            found: tokens.len(),
        });
    }
    tokens
        .into_iter()
        .map(|tok| {
            // values above i32::MAX carry flag bits; keep the low 32 bits
            tok.parse::<i64>()
                .map(|v| v as u32)
                .map_err(|_| MapError::InvalidAttribute {
                    tag: "data".into(),
                    name: "csv".into(),
                    value: tok.to_owned(),
                })
        })
        .collect()
}

/// Walks `<tile gid>` children with a cursor that wraps at `width` and stops at `height`.
pub fn decode_xml_tiles(
    node: &roxmltree::Node,
    width: u32,
    height: u32,
) -> Result<Vec<u32>, MapError> {
    let mut cells = vec![0u32; cell_count(width, height)?];
    let (mut x, mut y) = (0u32, 0u32);
    for tile in node.children().filter(|c| c.has_tag_name("tile")) {
        if y >= height || width == 0 {
            break;
        }
        let gid = match tile.attribute("gid") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .map(|v| v.max(0) as u32)
                .map_err(|_| MapError::InvalidAttribute {
                    tag: "tile".into(),
                    name: "gid".into(),
                    value: v.to_owned(),
                })?,
            None => 0,
        };
        cells[(y * width + x) as usize] = gid;
        x += 1;
        if x == width {
            x = 0;
            y += 1;
        }
    }
    Ok(cells)
}

fn decode_payload(
    node: &roxmltree::Node,
    encoding: Encoding,
    compression: Compression,
    width: u32,
    height: u32,
) -> Result<Vec<u32>, MapError> {
    let count = cell_count(width, height)?;
    match encoding {
        Encoding::Xml => decode_xml_tiles(node, width, height),
        Encoding::Base64 => decode_base64(node.text().unwrap_or_default(), compression, count),
        Encoding::Csv => decode_csv(&element_text(node), count),
    }
}

// CSV text may be split across several text nodes around `<chunk>` siblings.
fn element_text(node: &roxmltree::Node) -> String {
    node.children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect()
}

fn chunk_attr(node: &roxmltree::Node, name: &str) -> Result<i64, MapError> {
    let v = node.attribute(name).ok_or_else(|| {
        MapError::structure("chunk", format!("Required attribute '{name}' missing"))
    })?;
    v.trim().parse().map_err(|_| MapError::InvalidAttribute {
        tag: "chunk".into(),
        name: name.into(),
        value: v.to_owned(),
    })
}

/// Reads a `<data>` element for a layer of the given size.
pub fn read_layer_data(
    node: &roxmltree::Node,
    width: u32,
    height: u32,
) -> Result<LayerData, MapError> {
    let encoding = Encoding::from_attribute(node.attribute("encoding"))?;
    let compression = Compression::from_attribute(node.attribute("compression"))?;

    let chunk_nodes: Vec<roxmltree::Node> =
        node.children().filter(|c| c.has_tag_name("chunk")).collect();
    if chunk_nodes.is_empty() {
        return Ok(LayerData {
            cells: decode_payload(node, encoding, compression, width, height)?,
            chunks: Vec::new(),
        });
    }

    let mut chunks = Vec::with_capacity(chunk_nodes.len());
    for chunk in chunk_nodes {
        let has_payload = chunk.children().any(|c| {
            c.is_element() || c.text().is_some_and(|t| !t.trim().is_empty())
        });
        if !has_payload {
            return Err(MapError::EmptyChunk);
        }
        let w = chunk_attr(&chunk, "width")?.max(0) as u32;
        let h = chunk_attr(&chunk, "height")?.max(0) as u32;
        chunks.push(RawChunk {
            x: chunk_attr(&chunk, "x")? as i32,
            y: chunk_attr(&chunk, "y")? as i32,
            width: w,
            height: h,
            cells: decode_payload(&chunk, encoding, compression, w, h)?,
        });
    }
    Ok(LayerData {
        cells: Vec::new(),
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use std::io::Write;

    fn le_bytes(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn csv_maps_row_major() {
        assert_eq!(decode_csv("1,2,3,4", 4).expect("csv"), vec![1, 2, 3, 4]);
        assert_eq!(
            decode_csv("\n 1 , 2,\n3 ,4\n", 4).expect("csv"),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn csv_with_wrong_count_is_an_error() {
        let err = decode_csv("1,2,3", 4).err().expect("expected mismatch");
        assert!(matches!(
            err,
            MapError::TileCountMismatch { expected: 4, found: 3 }
        ));
    }

    #[test]
    fn csv_keeps_flag_bits() {
        assert_eq!(decode_csv("2147483653", 1).expect("csv"), vec![0x8000_0005]);
        assert!(decode_csv("x", 1).is_err());
    }

    #[test]
    fn base64_plain_zlib_and_gzip() {
        let values = [1u32, 0x8000_0002, 3, 0];
        let raw = le_bytes(&values);
        assert_eq!(decode_base64(&b64(&raw), Compression::None, 4).expect("plain"), values);

        let mut z = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        z.write_all(&raw).expect("zlib write");
        let zipped = z.finish().expect("zlib finish");
        assert_eq!(decode_base64(&b64(&zipped), Compression::Zlib, 4).expect("zlib"), values);

        let mut g = GzEncoder::new(Vec::new(), flate2::Compression::default());
        g.write_all(&raw).expect("gzip write");
        let gzipped = g.finish().expect("gzip finish");
        let text = format!("\n   {}\n  ", b64(&gzipped));
        assert_eq!(decode_base64(&text, Compression::Gzip, 4).expect("gzip"), values);
    }

    #[test]
    fn short_base64_payload_is_truncated() {
        let raw = le_bytes(&[1, 2]);
        let err = decode_base64(&b64(&raw), Compression::None, 4).err().expect("error");
        assert!(matches!(err, MapError::TruncatedData { expected: 16, found: 8 }));
    }

    #[test]
    fn unknown_codecs_are_fatal() {
        assert!(matches!(
            Compression::from_attribute(Some("zstd")),
            Err(MapError::UnsupportedCompression(c)) if c == "zstd"
        ));
        assert!(matches!(
            Encoding::from_attribute(Some("hex")),
            Err(MapError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn xml_tiles_wrap_and_stop() {
        let xml = r#"<data>
            <tile gid="1"/><tile/><tile gid="3"/><tile gid="4"/><tile gid="9"/>
        </data>"#;
        let doc = roxmltree::Document::parse(xml).expect("xml");
        let cells = decode_xml_tiles(&doc.root_element(), 2, 2).expect("tiles");
        assert_eq!(cells, vec![1, 0, 3, 4]);
    }

    #[test]
    fn chunks_are_decoded_separately() {
        let xml = r#"<data encoding="csv">
            <chunk x="-16" y="0" width="2" height="1">5,6</chunk>
            <chunk x="0" y="0" width="1" height="2">7,
            8</chunk>
        </data>"#;
        let doc = roxmltree::Document::parse(xml).expect("xml");
        let data = read_layer_data(&doc.root_element(), 10, 10).expect("data");
        assert!(data.cells.is_empty());
        assert_eq!(data.chunks.len(), 2);
        assert_eq!((data.chunks[0].x, data.chunks[0].cells.clone()), (-16, vec![5, 6]));
        assert_eq!(data.chunks[1].cells, vec![7, 8]);
    }

    #[test]
    fn empty_chunk_is_an_error() {
        let xml = r#"<data encoding="csv">
            <chunk x="0" y="0" width="1" height="1"> </chunk>
        </data>"#;
        let doc = roxmltree::Document::parse(xml).expect("xml");
        let err = read_layer_data(&doc.root_element(), 1, 1).err().expect("error");
        assert!(matches!(err, MapError::EmptyChunk));
    }

    #[test]
    fn oversized_grids_are_rejected_before_allocating() {
        assert_eq!(cell_count(8192, 8192).expect("cap"), MAX_CELLS);
        assert!(matches!(
            cell_count(100_000, 100_000),
            Err(MapError::InvalidDimensions { width: 100_000, height: 100_000 })
        ));
        assert!(cell_count(u32::MAX, u32::MAX).is_err());

        for xml in [
            r#"<data encoding="csv">1,2</data>"#,
            r#"<data><tile gid="1"/></data>"#,
            r#"<data encoding="csv">
                <chunk x="0" y="0" width="100000" height="100000">1</chunk>
            </data>"#,
        ] {
            let doc = roxmltree::Document::parse(xml).expect("xml");
            let err = read_layer_data(&doc.root_element(), 100_000, 100_000).err();
            assert!(matches!(err, Some(MapError::InvalidDimensions { .. })), "{xml}");
        }
    }
}
