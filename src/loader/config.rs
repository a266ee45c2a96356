use crate::error::MapError;
use serde::{Deserialize, Serialize};

/// Switches for optional loader work.
///
/// Every field defaults to `true`, so a partial JSON document only needs to
/// name what it turns off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Decode image files whose `<image>` element omits width or height.
    pub read_image_sizes: bool,
    /// Resolve `template` attributes on objects.
    pub load_templates: bool,
    /// Follow `source` attributes on map tilesets.
    pub load_external_tilesets: bool,
    /// Report unknown child elements as diagnostics.
    pub report_unknown_elements: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            read_image_sizes: true,
            load_templates: true,
            load_external_tilesets: true,
            report_unknown_elements: true,
        }
    }
}

impl LoadOptions {
    /// Parses options from JSON, e.g. `{"load_templates": false}`.
    pub fn from_json_str(text: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(text)?)
    }
}
