//! TMX, TSX and TX loading on top of `roxmltree`.

mod assets;
mod config;
mod layers;
mod map;
mod objects;
mod properties;
mod tileset;
mod xml;

pub use assets::{Assets, FsAssets, MemoryAssets};
pub use config::LoadOptions;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, LogDiagnostics};
use crate::error::MapError;
use crate::map::TiledMap;
use crate::object::ObjectTemplate;
use crate::tileset::Tileset;
use assets::normalize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loads maps and the tilesets and templates they reference.
///
/// Templates are cached by resolved path for the lifetime of the loader, so
/// loading several maps that share templates parses each `.tx` file once.
pub struct TmxLoader<D: Diagnostics = LogDiagnostics> {
    options: LoadOptions,
    assets: Box<dyn Assets>,
    diagnostics: D,
    templates: HashMap<PathBuf, ObjectTemplate>,
}

impl Default for TmxLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TmxLoader {
    /// File system loader reporting through `log`.
    pub fn new() -> Self {
        Self {
            options: LoadOptions::default(),
            assets: Box::new(FsAssets),
            diagnostics: LogDiagnostics,
            templates: HashMap::new(),
        }
    }
}

impl<D: Diagnostics> TmxLoader<D> {
    #[allow(missing_docs)]
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces where documents and images are read from.
    pub fn with_assets(mut self, assets: impl Assets + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    /// Replaces the diagnostics sink.
    pub fn with_diagnostics<E: Diagnostics>(self, diagnostics: E) -> TmxLoader<E> {
        TmxLoader {
            options: self.options,
            assets: self.assets,
            diagnostics,
            templates: self.templates,
        }
    }

    #[allow(missing_docs)]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    #[allow(missing_docs)]
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Gives the sink back, e.g. to inspect collected diagnostics.
    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }

    fn reader(&mut self, base_dir: &Path) -> Reader<'_> {
        Reader {
            options: self.options,
            assets: self.assets.as_ref(),
            diagnostics: &mut self.diagnostics,
            templates: &mut self.templates,
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Loads a `.tmx` file; relative references resolve against its directory.
    pub fn load_map(&mut self, path: impl AsRef<Path>) -> Result<TiledMap, MapError> {
        let path = path.as_ref();
        let text = self.read(path)?;
        let map = self.reader(parent_dir(path)).map_document(&text, path)?;
        log::info!(
            target: "macroquad_tmx",
            "loaded map {} ({}x{}, {} tilesets, {} layers)",
            path.display(),
            map.width,
            map.height,
            map.tilesets().len(),
            map.layer_count()
        );
        Ok(map)
    }

    /// Loads a map from TMX text; relative references resolve against `base_dir`.
    pub fn load_map_str(
        &mut self,
        text: &str,
        base_dir: impl AsRef<Path>,
    ) -> Result<TiledMap, MapError> {
        let base_dir = base_dir.as_ref();
        let map = self
            .reader(base_dir)
            .map_document(text, &base_dir.join("<inline>"))?;
        log::debug!(target: "macroquad_tmx", "loaded inline map with {} layers", map.layer_count());
        Ok(map)
    }

    /// Loads a standalone `.tsx` tileset; its first gid is left at 1.
    pub fn load_tileset(&mut self, path: impl AsRef<Path>) -> Result<Tileset, MapError> {
        let path = path.as_ref();
        let mut reader = self.reader(parent_dir(path));
        reader.tileset_file(path)
    }

    /// Loads a `.tx` template, or returns the cached copy.
    pub fn load_template(&mut self, path: impl AsRef<Path>) -> Result<ObjectTemplate, MapError> {
        let path = path.as_ref();
        let source = path.to_string_lossy().into_owned();
        let mut reader = self.reader(Path::new(""));
        reader.template(&source)
    }

    fn read(&self, path: &Path) -> Result<String, MapError> {
        self.assets.read_text(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads a map from disk with default options, logging diagnostics.
pub fn load_map(path: impl AsRef<Path>) -> Result<TiledMap, MapError> {
    TmxLoader::new().load_map(path)
}

/// Loads a map from TMX text; relative references resolve against the working directory.
pub fn load_map_str(text: &str) -> Result<TiledMap, MapError> {
    TmxLoader::new().load_map_str(text, "")
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// Per-document loading state shared by the element readers.
pub(crate) struct Reader<'l> {
    pub(crate) options: LoadOptions,
    pub(crate) assets: &'l dyn Assets,
    pub(crate) diagnostics: &'l mut dyn Diagnostics,
    pub(crate) templates: &'l mut HashMap<PathBuf, ObjectTemplate>,
    /// Directory relative references in the current document resolve against.
    pub(crate) base_dir: PathBuf,
}

impl Reader<'_> {
    pub(crate) fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.report(Diagnostic::new(kind, message));
    }

    pub(crate) fn unknown_element(&mut self, parent: &str, node: &roxmltree::Node) {
        if self.options.report_unknown_elements {
            self.report(
                DiagnosticKind::UnknownElement,
                format!("unsupported <{}> inside <{}>", node.tag_name().name(), parent),
            );
        }
    }

    /// Parses an enum attribute, reporting unknown values and returning `None` for them.
    pub(crate) fn enum_attribute<T>(
        &mut self,
        node: &roxmltree::Node,
        name: &str,
        parse: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let value = node.attribute(name)?;
        let parsed = parse(value);
        if parsed.is_none() {
            self.report(
                DiagnosticKind::UnknownEnum,
                format!(
                    "<{}> has unknown {}=\"{}\"",
                    node.tag_name().name(),
                    name,
                    value
                ),
            );
        }
        parsed
    }

    /// Path of a reference made by the current document.
    pub(crate) fn resolve(&self, source: &str) -> PathBuf {
        normalize(&self.base_dir.join(source))
    }

    pub(crate) fn read_text(&self, path: &Path) -> Result<String, MapError> {
        self.assets.read_text(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Runs `f` with relative references resolving against `dir`.
    pub(crate) fn in_dir<R>(&mut self, dir: &Path, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.base_dir, dir.to_path_buf());
        let out = f(self);
        self.base_dir = saved;
        out
    }
}

pub(crate) fn parse_document<'input>(
    text: &'input str,
    path: &Path,
) -> Result<roxmltree::Document<'input>, MapError> {
    roxmltree::Document::parse(text).map_err(|source| MapError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;

    #[test]
    fn missing_file_is_an_io_error() {
        let mut loader = TmxLoader::new().with_assets(MemoryAssets::new());
        let err = loader.load_map("missing.tmx").err().expect("error");
        assert!(matches!(err, MapError::Io { ref path, .. } if path == Path::new("missing.tmx")));
    }

    #[test]
    fn malformed_xml_is_an_xml_error() {
        let mut loader = TmxLoader::new().with_diagnostics(Vec::<Diagnostic>::new());
        let err = loader.load_map_str("<map", "").err().expect("error");
        assert!(matches!(err, MapError::Xml { .. }));
    }
}
