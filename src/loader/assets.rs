use macroquad::texture::Image;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::{fs, io};

/// Where the loader reads documents from and how it measures images.
pub trait Assets {
    /// Whole text of a TMX, TSX or TX document.
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Pixel size of an image file, `None` when it cannot be decoded.
    fn image_size(&self, path: &Path) -> Option<(u32, u32)>;
}

/// Reads from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAssets;

impl Assets for FsAssets {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn image_size(&self, path: &Path) -> Option<(u32, u32)> {
        let bytes = fs::read(path).ok()?;
        let image = Image::from_file_with_format(&bytes, None).ok()?;
        Some((image.width() as u32, image.height() as u32))
    }
}

/// Documents and image sizes held in memory, keyed by normalized path.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    texts: HashMap<PathBuf, String>,
    sizes: HashMap<PathBuf, (u32, u32)>,
}

impl MemoryAssets {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document.
    pub fn with_text(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.texts.insert(normalize(path.as_ref()), text.into());
        self
    }

    /// Registers the size an image would decode to.
    pub fn with_image_size(mut self, path: impl AsRef<Path>, width: u32, height: u32) -> Self {
        self.sizes.insert(normalize(path.as_ref()), (width, height));
        self
    }
}

impl Assets for MemoryAssets {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        self.texts
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn image_size(&self, path: &Path) -> Option<(u32, u32)> {
        self.sizes.get(&normalize(path)).copied()
    }
}

/// Lexically drops `.` and folds `..` so that two spellings of one file compare equal.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_relative_segments() {
        assert_eq!(
            normalize(Path::new("maps/./level/../tiles.tsx")),
            PathBuf::from("maps/tiles.tsx")
        );
        assert_eq!(normalize(Path::new("../a.png")), PathBuf::from("../a.png"));
    }

    #[test]
    fn memory_assets_match_equivalent_paths() {
        let assets = MemoryAssets::new()
            .with_text("maps/a.tsx", "<tileset/>")
            .with_image_size("maps/a.png", 64, 32);
        assert!(assets.read_text(Path::new("maps/sub/../a.tsx")).is_ok());
        assert_eq!(assets.image_size(Path::new("./maps/a.png")), Some((64, 32)));
        assert!(assets.read_text(Path::new("nope")).is_err());
    }
}
