//! Render surface manager for Shaderforge.
//!
//! The crate glues the preview window, the `wgpu` full-screen-quad pipeline,
//! and the built-in background kernel together. The overall flow is:
//!
//! ```text
//!   CLI / shaderforge
//!          │ RendererConfig
//!          ▼
//!   WindowRuntime::spawn ──▶ winit event loop ──▶ render_frame()
//!          ▲ UpdateParams                │
//!          │ (live document edits)       └─▶ EffectUniforms ─▶ GPU UBO
//! ```
//!
//! `GpuState` owns the GPU resources (surface, device, compiled program,
//! quad vertex buffer, uniform buffer); `WindowRuntime` owns the event-loop
//! thread and is the only cancellation point — shutting it down stops the
//! frame chain. Parameter snapshots enter through the runtime's command
//! queue, so the per-frame read never observes a torn value.

mod gpu;
mod runtime;
mod shaders;
mod types;
mod window;

use anyhow::Result;

pub use runtime::{
    time_source_for_policy, BoxedTimeSource, FixedTimeSource, RenderPolicy,
    SystemTimeSource, TimeSample, TimeSource,
};
pub use types::{Antialiasing, RendererConfig};
pub use window::WindowRuntime;

/// Thin blocking entry point over [`WindowRuntime`].
///
/// Spawns the preview window and parks the calling thread until the user
/// closes it. Callers that want to push live parameter updates keep the
/// runtime themselves instead.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn run(self) -> Result<()> {
        let runtime = WindowRuntime::spawn(self.config)?;
        runtime.wait_until_closed();
        runtime.shutdown()
    }
}
