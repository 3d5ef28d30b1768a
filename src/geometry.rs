//! Immutable polyhedron data: vertices, faces, per-face colors and UVs.
//!
//! A [`Polyhedron`] is the CPU-side description of the single object in the
//! scene. It is validated once on construction and never mutated afterwards;
//! [`crate::mesh`] turns it into GPU buffers.
//!
//! # Face order
//!
//! Faces and the vertex indices inside each face are kept exactly in the
//! order they were declared. That order is the winding order: a face whose
//! vertices run counter-clockwise when seen from outside is a front face.
//!
//! ```
//! use orbitlab::Polyhedron;
//!
//! let cube = Polyhedron::cube();
//! assert_eq!(cube.face_count(), 6);
//! assert_eq!(cube.edges().len(), 12);
//! ```

use glam::{Vec2, Vec3};

/// Errors raised when polyhedron data breaks its structural invariants.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    /// `faces`, `face_colors` and `face_uvs` must be parallel sequences.
    #[error("face tables disagree: {faces} faces, {colors} colors, {uvs} uv lists")]
    FaceCountMismatch {
        faces: usize,
        colors: usize,
        uvs: usize,
    },
    /// A face's index list and UV list have different lengths.
    #[error("face {face} has {indices} indices but {uvs} uvs")]
    UvCountMismatch {
        face: usize,
        indices: usize,
        uvs: usize,
    },
    /// A face with fewer than three vertices cannot be drawn.
    #[error("face {face} has only {len} vertices")]
    DegenerateFace { face: usize, len: usize },
    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but only {vertex_count} exist")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// A convex polyhedron with one color and one UV set per face.
#[derive(Clone, Debug)]
pub struct Polyhedron {
    vertices: Vec<Vec3>,
    faces: Vec<Vec<u32>>,
    face_colors: Vec<[f32; 3]>,
    face_uvs: Vec<Vec<Vec2>>,
}

impl Polyhedron {
    /// Build a polyhedron, checking that the face tables line up.
    pub fn new(
        vertices: Vec<Vec3>,
        faces: Vec<Vec<u32>>,
        face_colors: Vec<[f32; 3]>,
        face_uvs: Vec<Vec<Vec2>>,
    ) -> Result<Self, GeometryError> {
        if faces.len() != face_colors.len() || faces.len() != face_uvs.len() {
            return Err(GeometryError::FaceCountMismatch {
                faces: faces.len(),
                colors: face_colors.len(),
                uvs: face_uvs.len(),
            });
        }

        for (face, (indices, uvs)) in faces.iter().zip(&face_uvs).enumerate() {
            if indices.len() < 3 {
                return Err(GeometryError::DegenerateFace {
                    face,
                    len: indices.len(),
                });
            }
            if indices.len() != uvs.len() {
                return Err(GeometryError::UvCountMismatch {
                    face,
                    indices: indices.len(),
                    uvs: uvs.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(GeometryError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        Ok(Self {
            vertices,
            faces,
            face_colors,
            face_uvs,
        })
    }

    /// The 2×2×2 cube centered at the origin.
    ///
    /// Every face is declared counter-clockwise as seen from outside and maps
    /// the full texture onto itself.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            Vec3::new( 1.0, -1.0, -1.0), // 0
            Vec3::new( 1.0,  1.0, -1.0), // 1
            Vec3::new(-1.0,  1.0, -1.0), // 2
            Vec3::new(-1.0, -1.0, -1.0), // 3
            Vec3::new( 1.0, -1.0,  1.0), // 4
            Vec3::new( 1.0,  1.0,  1.0), // 5
            Vec3::new(-1.0, -1.0,  1.0), // 6
            Vec3::new(-1.0,  1.0,  1.0), // 7
        ];

        let faces = vec![
            vec![1, 2, 7, 5], // +Y
            vec![4, 6, 3, 0], // -Y
            vec![5, 7, 6, 4], // +Z
            vec![0, 3, 2, 1], // -Z
            vec![7, 2, 3, 6], // -X
            vec![1, 5, 4, 0], // +X
        ];

        let face_colors = vec![
            [0.0, 1.0, 0.0],
            [1.0, 0.5, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
        ];

        let quad_uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let face_uvs = vec![quad_uvs; 6];

        Self {
            vertices,
            faces,
            face_colors,
            face_uvs,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    pub fn face_colors(&self) -> &[[f32; 3]] {
        &self.face_colors
    }

    pub fn face_uvs(&self) -> &[Vec<Vec2>] {
        &self.face_uvs
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterate faces in declaration order as `(color, [(position, uv)])`.
    pub fn iter_faces(&self) -> impl Iterator<Item = ([f32; 3], Vec<(Vec3, Vec2)>)> + '_ {
        self.faces
            .iter()
            .zip(&self.face_colors)
            .zip(&self.face_uvs)
            .map(|((indices, color), uvs)| {
                let corners = indices
                    .iter()
                    .zip(uvs)
                    .map(|(&i, &uv)| (self.vertices[i as usize], uv))
                    .collect();
                (*color, corners)
            })
    }

    /// Unique undirected edges along face boundaries, in first-seen order.
    ///
    /// Each edge is stored with the smaller vertex index first.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = Vec::new();
        for face in &self.faces {
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                let edge = [a.min(b), a.max(b)];
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Outward normal of a face, from its first three corners. `None` when
    /// `face` is out of range.
    pub fn face_normal(&self, face: usize) -> Option<Vec3> {
        let indices = self.faces.get(face)?;
        let [a, b, c] = [indices[0], indices[1], indices[2]].map(|i| self.vertices[i as usize]);
        Some((b - a).cross(c - b).normalize_or_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_uvs() -> Vec<Vec2> {
        vec![Vec2::ZERO, Vec2::X, Vec2::Y]
    }

    #[test]
    fn cube_tables_are_parallel() {
        let cube = Polyhedron::cube();
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.faces().len(), cube.face_colors().len());
        assert_eq!(cube.faces().len(), cube.face_uvs().len());
        for (indices, uvs) in cube.faces().iter().zip(cube.face_uvs()) {
            assert_eq!(indices.len(), uvs.len());
        }
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_from_outside() {
        let cube = Polyhedron::cube();
        for face in 0..cube.face_count() {
            let centroid = cube.faces()[face]
                .iter()
                .map(|&i| cube.vertices()[i as usize])
                .sum::<Vec3>()
                / cube.faces()[face].len() as f32;
            let normal = cube.face_normal(face).unwrap();
            assert!(
                normal.dot(centroid) > 0.0,
                "face {face} points inward: normal {normal}, centroid {centroid}"
            );
        }
    }

    #[test]
    fn face_normal_out_of_range_is_none() {
        let cube = Polyhedron::cube();
        assert_eq!(cube.face_normal(0), Some(Vec3::Y));
        assert_eq!(cube.face_normal(cube.face_count()), None);
    }

    #[test]
    fn cube_has_twelve_unique_edges() {
        let edges = Polyhedron::cube().edges();
        assert_eq!(edges.len(), 12);
        assert!(edges.iter().all(|[a, b]| a < b));
        assert_eq!(edges[0], [1, 2]);
    }

    #[test]
    fn iter_faces_keeps_declaration_order() {
        let cube = Polyhedron::cube();
        let (color, corners) = cube.iter_faces().next().unwrap();
        assert_eq!(color, [0.0, 1.0, 0.0]);
        assert_eq!(corners[0].0, Vec3::new(1.0, 1.0, -1.0));
        assert_eq!(corners[1].0, Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(corners[2].1, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn rejects_mismatched_face_tables() {
        let err = Polyhedron::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![vec![0, 1, 2]],
            vec![],
            vec![triangle_uvs()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GeometryError::FaceCountMismatch {
                faces: 1,
                colors: 0,
                uvs: 1
            }
        );
    }

    #[test]
    fn rejects_uv_count_mismatch() {
        let err = Polyhedron::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            vec![vec![0, 1, 2, 3]],
            vec![[1.0; 3]],
            vec![triangle_uvs()],
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::UvCountMismatch { face: 0, .. }));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = Polyhedron::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![vec![0, 1, 7]],
            vec![[1.0; 3]],
            vec![triangle_uvs()],
        )
        .unwrap_err();
        assert!(matches!(err, GeometryError::IndexOutOfRange { index: 7, .. }));
    }

    #[test]
    fn rejects_two_vertex_face() {
        let err = Polyhedron::new(
            vec![Vec3::ZERO, Vec3::X],
            vec![vec![0, 1]],
            vec![[1.0; 3]],
            vec![vec![Vec2::ZERO, Vec2::X]],
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::DegenerateFace { face: 0, len: 2 });
    }

    #[test]
    fn accepts_tetrahedron() {
        let tetra = Polyhedron::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z],
            vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 3, 2], vec![1, 2, 3]],
            vec![[1.0; 3]; 4],
            vec![triangle_uvs(); 4],
        )
        .unwrap();
        assert_eq!(tetra.edges().len(), 6);
    }
}
