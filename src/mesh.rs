//! GPU vertex layout and mesh buffers built from a [`Polyhedron`].
//!
//! - [`Vertex3d`]: position, texture coordinate and face color
//! - [`MeshData`]: the CPU-side vertex stream and index lists
//! - [`Mesh`]: the same data uploaded into wgpu buffers
//!
//! # Vertex stream
//!
//! The stream holds one vertex per face corner, faces in declaration order
//! and corners in declaration order inside each face. Each face is fanned
//! into triangles `(0, i, i + 1)`, which keeps the declared winding. A
//! second index list draws every polyhedron edge once as a line.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | uv        | Float32x2 | 12     | 1               |
//! | color     | Float32x3 | 20     | 2               |

use std::collections::HashMap;

use crate::geometry::Polyhedron;
use crate::gpu::GpuContext;

/// A vertex with position, texture coordinates and the color of its face.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for this vertex type (32 bytes stride).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 20,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub fn new(position: [f32; 3], uv: [f32; 2], color: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }
}

/// Vertex stream plus triangle and line index lists, ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex3d>,
    /// Triangle list, three indices per triangle.
    pub triangles: Vec<u32>,
    /// Line list, two indices per edge.
    pub edges: Vec<u32>,
}

impl MeshData {
    /// Flatten a polyhedron into a face-ordered vertex stream.
    pub fn from_polyhedron(polyhedron: &Polyhedron) -> Self {
        let mut data = Self::default();
        // First stream slot that carries each polyhedron vertex; edges reuse it.
        let mut first_slot: HashMap<u32, u32> = HashMap::new();

        for (face, (color, corners)) in polyhedron.faces().iter().zip(polyhedron.iter_faces()) {
            let base = data.vertices.len() as u32;

            for (&index, (position, uv)) in face.iter().zip(corners) {
                first_slot
                    .entry(index)
                    .or_insert(data.vertices.len() as u32);
                data.vertices
                    .push(Vertex3d::new(position.to_array(), uv.to_array(), color));
            }

            for i in 1..face.len() as u32 - 1 {
                data.triangles.extend_from_slice(&[base, base + i, base + i + 1]);
            }
        }

        for [a, b] in polyhedron.edges() {
            data.edges.push(first_slot[&a]);
            data.edges.push(first_slot[&b]);
        }

        data
    }
}

/// GPU-resident geometry: one vertex buffer and two index buffers.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) triangle_buffer: wgpu::Buffer,
    pub(crate) triangle_count: u32,
    pub(crate) edge_buffer: wgpu::Buffer,
    pub(crate) edge_count: u32,
}

impl Mesh {
    pub fn new(gpu: &GpuContext, data: &MeshData) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let triangle_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Triangle Index Buffer"),
                contents: bytemuck::cast_slice(&data.triangles),
                usage: wgpu::BufferUsages::INDEX,
            });

        let edge_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Edge Index Buffer"),
                contents: bytemuck::cast_slice(&data.edges),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            triangle_buffer,
            triangle_count: data.triangles.len() as u32,
            edge_buffer,
            edge_count: data.edges.len() as u32,
        }
    }

    /// Upload a polyhedron directly.
    pub fn from_polyhedron(gpu: &GpuContext, polyhedron: &Polyhedron) -> Self {
        Self::new(gpu, &MeshData::from_polyhedron(polyhedron))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 32);
    }

    #[test]
    fn cube_stream_follows_declaration_order() {
        let cube = Polyhedron::cube();
        let data = MeshData::from_polyhedron(&cube);
        assert_eq!(data.vertices.len(), 24);

        let mut slot = 0;
        for (face, uvs) in cube.faces().iter().zip(cube.face_uvs()) {
            for (&index, uv) in face.iter().zip(uvs) {
                let vertex = data.vertices[slot];
                assert_eq!(vertex.position, cube.vertices()[index as usize].to_array());
                assert_eq!(vertex.uv, uv.to_array());
                slot += 1;
            }
        }
    }

    #[test]
    fn quads_fan_into_two_triangles() {
        let data = MeshData::from_polyhedron(&Polyhedron::cube());
        assert_eq!(data.triangles.len(), 36);
        assert_eq!(&data.triangles[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&data.triangles[6..12], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn triangles_keep_outward_winding() {
        let data = MeshData::from_polyhedron(&Polyhedron::cube());
        for tri in data.triangles.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from_array(data.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn faces_carry_their_color() {
        let cube = Polyhedron::cube();
        let data = MeshData::from_polyhedron(&cube);
        for (face, color) in cube.face_colors().iter().enumerate() {
            for corner in 0..4 {
                assert_eq!(data.vertices[face * 4 + corner].color, *color);
            }
        }
    }

    #[test]
    fn edges_connect_matching_positions() {
        let cube = Polyhedron::cube();
        let data = MeshData::from_polyhedron(&cube);
        assert_eq!(data.edges.len(), 24);
        for (pair, [a, b]) in data.edges.chunks(2).zip(cube.edges()) {
            assert_eq!(
                data.vertices[pair[0] as usize].position,
                cube.vertices()[a as usize].to_array()
            );
            assert_eq!(
                data.vertices[pair[1] as usize].position,
                cube.vertices()[b as usize].to_array()
            );
        }
    }
}
