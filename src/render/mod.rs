//! Turning a loaded map into textured sprites.

mod cull;
mod draw;

pub use cull::{camera_view, visible_tile_range};
pub use draw::TextureCache;
