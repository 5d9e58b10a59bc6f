//! WebGPU render pipeline setup
//!
//! The level is drawn letterboxed: world units are scaled uniformly so the
//! level's base size fits the canvas, centered, then offset by the camera.

use glam::Vec2;
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::sim::{Camera, GameState};

/// Errors raised while setting up the GPU
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Maps world coordinates to the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas size in pixels
    pub width: f32,
    pub height: f32,
    /// Level's logical size
    pub base_width: f32,
    pub base_height: f32,
}

impl Viewport {
    /// Uniform scale that fits the whole base size on the canvas
    pub fn scale(&self) -> f32 {
        (self.width / self.base_width).min(self.height / self.base_height)
    }

    /// Letterbox margins in pixels
    pub fn offset(&self) -> Vec2 {
        let scale = self.scale();
        Vec2::new(
            (self.width - self.base_width * scale) / 2.0,
            (self.height - self.base_height * scale) / 2.0,
        )
    }

    /// World point to canvas pixels (origin top-left)
    pub fn world_to_screen(&self, point: Vec2, camera: &Camera) -> Vec2 {
        self.offset() + (point - Vec2::new(camera.x, camera.y)) * self.scale()
    }

    /// World point to normalized device coordinates (y up)
    pub fn world_to_ndc(&self, point: Vec2, camera: &Camera) -> Vec2 {
        let screen = self.world_to_screen(point, camera);
        Vec2::new(
            screen.x / self.width * 2.0 - 1.0,
            1.0 - screen.y / self.height * 2.0,
        )
    }
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("side-scroller-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Create shader module
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Create pipeline
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Create initial vertex buffer (will be updated each frame)
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: bytemuck::cast_slice(&[Vertex::new(0.0, 0.0, [1.0; 4])]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_count: 0,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn viewport(&self, base_width: f32, base_height: f32) -> Viewport {
        Viewport {
            width: self.size.0 as f32,
            height: self.size.1 as f32,
            base_width,
            base_height,
        }
    }

    /// Draw one frame of `state`
    pub fn render(
        &mut self,
        state: &GameState,
        now_ms: f64,
        hit_flash: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        let viewport = self.viewport(state.base_width, state.base_height);
        let ndc_vertices: Vec<Vertex> = shapes::world_vertices(state, now_ms, hit_flash)
            .into_iter()
            .map(|v| {
                let p = viewport.world_to_ndc(Vec2::from(v.position), &state.camera);
                Vertex::new(p.x, p.y, v.color)
            })
            .collect();

        // Scene size changes as enemies are removed; recreate each frame
        self.vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("vertex_buffer"),
                contents: bytemuck::cast_slice(&ndc_vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.vertex_count = ndc_vertices.len() as u32;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: colors::BACKGROUND[0] as f64,
                            g: colors::BACKGROUND[1] as f64,
                            b: colors::BACKGROUND[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..self.vertex_count, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(x: f32, y: f32) -> Camera {
        Camera {
            x,
            y,
            width: 800.0,
            height: 500.0,
        }
    }

    #[test]
    fn test_letterbox_wide_canvas() {
        let viewport = Viewport {
            width: 1600.0,
            height: 500.0,
            base_width: 800.0,
            base_height: 500.0,
        };
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.offset(), Vec2::new(400.0, 0.0));
    }

    #[test]
    fn test_camera_corner_maps_to_view_corner() {
        let viewport = Viewport {
            width: 1600.0,
            height: 1000.0,
            base_width: 800.0,
            base_height: 500.0,
        };
        let camera = camera_at(-280.0, 120.0);
        assert_eq!(
            viewport.world_to_ndc(Vec2::new(-280.0, 120.0), &camera),
            Vec2::new(-1.0, 1.0)
        );
        assert_eq!(
            viewport.world_to_ndc(Vec2::new(520.0, 620.0), &camera),
            Vec2::new(1.0, -1.0)
        );
    }
}
