use std::path::PathBuf;
use std::{error, fmt, io};

/// Fatal failures while loading a map, tileset or template.
///
/// Recoverable problems (an unresolved gid, an unknown enum string) never end up here,
/// they are reported through [`crate::Diagnostics`] instead.
#[derive(Debug)]
pub enum MapError {
    /// Reading a file failed.
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The document is not well-formed XML.
    Xml {
        /// Document that failed to parse.
        path: PathBuf,
        /// Parser error.
        source: roxmltree::Error,
    },
    /// Loader options could not be parsed.
    Json(serde_json::Error),
    /// A required element or attribute is missing or misplaced.
    Structure {
        /// Tag the problem was found on.
        tag: String,
        /// What went wrong.
        msg: String,
    },
    /// An attribute value could not be parsed.
    InvalidAttribute {
        /// Tag owning the attribute.
        tag: String,
        /// Attribute name.
        name: String,
        /// Offending value.
        value: String,
    },
    /// A grid size is not positive or holds too many cells.
    InvalidDimensions {
        /// Declared width in tiles.
        width: i64,
        /// Declared height in tiles.
        height: i64,
    },
    /// `<data encoding>` is not `base64` or `csv`.
    UnsupportedEncoding(String),
    /// `<data compression>` is not `zlib` or `gzip`.
    UnsupportedCompression(String),
    /// The base64 payload is malformed.
    Base64(base64::DecodeError),
    /// CSV data holds the wrong number of cells.
    TileCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Tokens actually found.
        found: usize,
    },
    /// Decoded binary data is shorter than `width * height * 4` bytes.
    TruncatedData {
        /// Bytes needed.
        expected: usize,
        /// Bytes available.
        found: usize,
    },
    /// A `<chunk>` carries no tile data.
    EmptyChunk,
    /// An object template could not be used.
    Template {
        /// Template file as referenced by the object.
        source: String,
        /// What went wrong.
        msg: String,
    },
}

impl MapError {
    pub(crate) fn structure(tag: &str, msg: impl Into<String>) -> Self {
        MapError::Structure {
            tag: tag.to_owned(),
            msg: msg.into(),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            MapError::Xml { path, source } => {
                write!(f, "Failed to parse XML {}: {}", path.display(), source)
            }
            MapError::Json(err) => write!(f, "Failed to parse options: {}", err),
            MapError::Structure { tag, msg } => write!(f, "<{}>: {}", tag, msg),
            MapError::InvalidAttribute { tag, name, value } => {
                write!(f, "<{}>: invalid value '{}' for attribute '{}'", tag, value, name)
            }
            MapError::InvalidDimensions { width, height } => {
                write!(f, "Invalid grid dimensions ({}x{})", width, height)
            }
            MapError::UnsupportedEncoding(enc) => write!(f, "Unsupported data encoding: {}", enc),
            MapError::UnsupportedCompression(comp) => {
                write!(f, "Unsupported data compression: {}", comp)
            }
            MapError::Base64(err) => write!(f, "Invalid base64 tile data: {}", err),
            MapError::TileCountMismatch { expected, found } => write!(
                f,
                "CSV tile data holds {} cells, expected {}",
                found, expected
            ),
            MapError::TruncatedData { expected, found } => write!(
                f,
                "Tile data holds {} bytes, expected {}",
                found, expected
            ),
            MapError::EmptyChunk => write!(f, "Chunk without tile data"),
            MapError::Template { source, msg } => write!(f, "Template {}: {}", source, msg),
        }
    }
}

impl error::Error for MapError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapError::Io { source, .. } => Some(source),
            MapError::Xml { source, .. } => Some(source),
            MapError::Json(err) => Some(err),
            MapError::Base64(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Json(err)
    }
}

impl From<base64::DecodeError> for MapError {
    fn from(err: base64::DecodeError) -> Self {
        MapError::Base64(err)
    }
}
