use composition::ShaderParameters;

use crate::runtime::RenderPolicy;

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Auto
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// Mirrors CLI flags: initial window size, the parameter snapshot to render
/// until the first live update arrives, and the frame policy.
#[derive(Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Parameters rendered until an update command replaces them.
    pub parameters: ShaderParameters,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
}

impl Default for RendererConfig {
    /// Provides a 720p animated preview of the default parameters.
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            parameters: ShaderParameters::default(),
            antialiasing: Antialiasing::default(),
            policy: RenderPolicy::default(),
        }
    }
}
