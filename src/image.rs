use macroquad::color::Color;

/// An `<image>` reference; pixels are never decoded by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TiledImage {
    /// Path resolved against the document that declared it.
    pub source: String,
    /// Colour treated as transparent.
    pub trans: Option<Color>,
    /// Format hint for embedded images.
    pub format: Option<String>,
    /// Width in pixels, 0 when unknown.
    pub width: u32,
    /// Height in pixels, 0 when unknown.
    pub height: u32,
}

impl TiledImage {
    /// Image with a known source and size.
    pub fn new(source: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            width,
            height,
            ..Default::default()
        }
    }

    /// Whether both dimensions are known.
    pub fn has_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Payload of an `<imagelayer>`.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct ImageLayer {
    pub image: Option<TiledImage>,
    pub repeat_x: bool,
    pub repeat_y: bool,
}
