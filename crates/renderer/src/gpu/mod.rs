//! GPU orchestration for the background effect.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds
//!   swapchain state when the window resizes.
//! - `pipeline` compiles the built-in GLSL stages into the single
//!   full-screen-quad render pipeline and owns its buffers.
//! - `uniforms` mirrors the `EffectParams` uniform block and converts the
//!   parameter snapshot into std140 bytes each frame.
//! - `state` glues everything together and exposes the `GpuState` API used
//!   by `window`.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
