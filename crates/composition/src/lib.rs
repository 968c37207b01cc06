//! Composition model for Shaderforge.
//!
//! A composition is the single source of truth for everything the preview
//! window renders and the exporter serializes: the [`ShaderParameters`] that
//! drive the animated background, the overlay [`Layer`] stack, and a couple
//! of editor-only [`GlobalSettings`]. Documents round-trip through TOML; the
//! parameter snapshot additionally serializes as camelCase JSON so exported
//! pages embed the exact literal the runtime script expects.

mod document;
mod layer;
mod palette;
mod params;

pub use document::{Composition, DocumentError, GlobalSettings};
pub use layer::{
    BlendMode, ButtonStyle, Layer, LayerError, LayerStack, SYSTEM_FONTS,
};
pub use palette::hex_to_rgb;
pub use params::{ShaderParameters, PALETTE_SIZE};
