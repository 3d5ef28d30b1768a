//! Per-frame render composition.
//!
//! [`RenderComposer`] owns every GPU resource the scene needs: the two
//! pipelines (filled faces and edge lines), the frame uniform buffer, the
//! depth buffer, the uploaded mesh and the texture. The texture and mesh
//! are created once and only bound per frame.
//!
//! # Architecture
//!
//! The pipelines share one layout with two bind groups:
//! - **Group 0**: frame uniforms (view-projection, model matrix, render mode)
//! - **Group 1**: the surface texture and its sampler
//!
//! # Frame steps
//!
//! 1. Resize the depth buffer if the surface changed size
//! 2. Advance the model spin when rotation is enabled
//! 3. Upload the camera and model matrices
//! 4. Clear color and depth, bind, draw faces (or edges) in declaration order
//! 5. Submit and present

use glam::{Mat4, Quat, Vec3};

use crate::camera::Camera;
use crate::geometry::Polyhedron;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use crate::state::{RenderMode, RotationToggle};
use crate::texture::Texture;

/// Skew axis the object spins around.
pub const SPIN_AXIS: Vec3 = Vec3::new(3.0, 1.0, 1.0);

/// Rotation applied per rendered frame while spinning.
pub const SPIN_STEP_DEGREES: f32 = 1.0;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniforms uploaded once per frame.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Combined projection * view matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Accumulated model rotation.
    pub model: [[f32; 4]; 4],
    /// See [`RenderMode`].
    pub mode: u32,
    pub _padding: [u32; 3],
}

/// Accumulated model rotation, advanced a fixed step per frame.
///
/// The spin is frame-coupled: at 60 fps the object turns 60° per second, at
/// 30 fps half as fast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelSpin {
    rotation: Quat,
}

impl Default for ModelSpin {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
        }
    }
}

impl ModelSpin {
    /// Post-multiply one step about [`SPIN_AXIS`].
    pub fn advance(&mut self) {
        let step = Quat::from_axis_angle(SPIN_AXIS.normalize(), SPIN_STEP_DEGREES.to_radians());
        self.rotation = (self.rotation * step).normalize();
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }
}

/// Draws the single textured object.
pub struct RenderComposer {
    face_pipeline: wgpu::RenderPipeline,
    edge_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    mesh: Mesh,
    spin: ModelSpin,
    // Bound through `texture_bind_group`; kept alive for the composer's lifetime.
    _texture: Texture,
}

impl RenderComposer {
    /// Upload `polyhedron` and build the pipelines around `texture`.
    pub fn new(gpu: &GpuContext, polyhedron: &Polyhedron, texture: Texture) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
        });

        // Frame uniform buffer (group 0)
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Texture bind group (group 1)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let face_pipeline = Self::create_pipeline(
            gpu,
            &pipeline_layout,
            &shader,
            "Face Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            wgpu::CompareFunction::Less,
        );

        let edge_pipeline = Self::create_pipeline(
            gpu,
            &pipeline_layout,
            &shader,
            "Edge Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            wgpu::CompareFunction::LessEqual,
        );

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);
        let mesh = Mesh::from_polyhedron(gpu, polyhedron);

        Self {
            face_pipeline,
            edge_pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            mesh,
            spin: ModelSpin::default(),
            _texture: texture,
        }
    }

    fn create_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        label: &str,
        primitive: wgpu::PrimitiveState,
        depth_compare: wgpu::CompareFunction,
    ) -> wgpu::RenderPipeline {
        gpu.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the depth buffer if the surface size changed.
    fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    pub fn spin(&self) -> &ModelSpin {
        &self.spin
    }

    /// Render one frame and present it.
    ///
    /// Surface errors are returned untouched so the caller can decide
    /// whether to reconfigure; no state advances when the frame is skipped.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        camera: &dyn Camera,
        rotation: RotationToggle,
        mode: RenderMode,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_depth_size(gpu);

        if rotation.is_enabled() {
            self.spin.advance();
        }

        let (proj, cam_view) = camera.projection_and_view();
        let uniforms = FrameUniforms {
            view_proj: (proj * cam_view).to_cols_array_2d(),
            model: self.spin.matrix().to_cols_array_2d(),
            mode: mode.shader_index(),
            _padding: [0; 3],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));

            match mode {
                RenderMode::Textured | RenderMode::Colored => {
                    render_pass.set_pipeline(&self.face_pipeline);
                    render_pass.set_index_buffer(
                        self.mesh.triangle_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    render_pass.draw_indexed(0..self.mesh.triangle_count, 0, 0..1);
                }
                RenderMode::Wireframe => {
                    render_pass.set_pipeline(&self.edge_pipeline);
                    render_pass
                        .set_index_buffer(self.mesh.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..self.mesh.edge_count, 0, 0..1);
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 144);
    }

    #[test]
    fn spin_turns_one_degree_per_step() {
        let mut spin = ModelSpin::default();
        spin.advance();
        let (axis, angle) = spin.rotation().to_axis_angle();
        assert!((angle - 1.0_f32.to_radians()).abs() < 1e-5);
        assert!((axis - SPIN_AXIS.normalize()).length() < 1e-4);
    }

    #[test]
    fn spin_accumulates_across_frames() {
        let mut spin = ModelSpin::default();
        for _ in 0..90 {
            spin.advance();
        }
        let (_, angle) = spin.rotation().to_axis_angle();
        assert!((angle - 90.0_f32.to_radians()).abs() < 1e-3);
    }

    #[test]
    fn spin_keeps_axis_fixed() {
        let mut spin = ModelSpin::default();
        for _ in 0..10 {
            spin.advance();
        }
        let axis = SPIN_AXIS.normalize();
        let rotated = spin.matrix().transform_vector3(axis);
        assert!((rotated - axis).length() < 1e-5);
    }

    #[test]
    fn mode_indices_are_distinct() {
        let modes = [RenderMode::Textured, RenderMode::Colored, RenderMode::Wireframe];
        let indices: Vec<u32> = modes.iter().map(|m| m.shader_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
