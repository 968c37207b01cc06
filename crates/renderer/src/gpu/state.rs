use anyhow::Result;
use composition::ShaderParameters;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::runtime::TimeSample;
use crate::types::Antialiasing;

use super::context::GpuContext;
use super::pipeline::EffectPipeline;
use super::uniforms::EffectUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// The live rendering session: surface, device, compiled program, quad
/// buffer, and the uniform block written every frame. Created once when the
/// window mounts and torn down with it.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: EffectPipeline,
    uniforms: EffectUniforms,
    multisample_target: Option<MultisampleTarget>,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing)?;
        let pipeline =
            EffectPipeline::new(&context.device, context.surface_format, context.sample_count)?;
        let uniforms = EffectUniforms::new(context.size.width, context.size.height);

        let multisample_target = if context.sample_count > 1 {
            Some(MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            ))
        } else {
            None
        };

        tracing::debug!(
            format = ?context.surface_format,
            samples = context.sample_count,
            width = context.size.width,
            height = context.size.height,
            "rendering session initialised"
        );

        Ok(Self {
            context,
            pipeline,
            uniforms,
            multisample_target,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        if self.context.sample_count > 1 {
            self.multisample_target = Some(MultisampleTarget::new(
                &self.context.device,
                self.context.surface_format,
                self.context.size,
                self.context.sample_count,
            ));
        }
    }

    /// Renders one frame: rebind resolution, time, palette, and knobs, then
    /// issue the six-vertex quad draw and present.
    pub(crate) fn render(
        &mut self,
        params: &ShaderParameters,
        time_sample: TimeSample,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        let size = self.context.size;
        self.uniforms
            .set_resolution(size.width as f32, size.height as f32);
        self.uniforms.set_time(time_sample.seconds);
        self.uniforms.set_parameters(params);
        self.context.queue.write_buffer(
            &self.pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        let (attachment_view, resolve_target) =
            if let Some(msaa) = self.multisample_target.as_ref() {
                (&msaa.view, Some(&view))
            } else {
                (&view, None)
            };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.pipeline.vertex_buffer.slice(..));
            render_pass.set_viewport(
                0.0,
                0.0,
                size.width as f32,
                size.height as f32,
                0.0,
                1.0,
            );
            render_pass.draw(0..6, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
