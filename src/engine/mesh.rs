use nalgebra::Vector3;

use crate::scene::park::sun_shade;

/// Floats per vertex: position then colour.
pub const VERTEX_STRIDE: usize = 6;

/// Outward normals in the order `add_box` emits faces.
const FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
];

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cube(size: f32, r: f32, g: f32, b: f32) -> Self {
        let mut mesh = Mesh::new();
        mesh.add_box([0.0; 3], [size; 3], (r, g, b));
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    /// Appends an axis-aligned box centred at `offset` with sunlight baked
    /// into each face's colour.
    pub fn add_box(&mut self, offset: [f32; 3], size: [f32; 3], color: (f32, f32, f32)) {
        let [ox, oy, oz] = offset;
        let hx = size[0] / 2.0;
        let hy = size[1] / 2.0;
        let hz = size[2] / 2.0;
        let (r, g, b) = color;

        let faces: [[[f32; 3]; 4]; 6] = [
            [[-hx, -hy, hz], [hx, -hy, hz], [hx, hy, hz], [-hx, hy, hz]],
            [[hx, -hy, -hz], [-hx, -hy, -hz], [-hx, hy, -hz], [hx, hy, -hz]],
            [[-hx, hy, hz], [hx, hy, hz], [hx, hy, -hz], [-hx, hy, -hz]],
            [[-hx, -hy, -hz], [hx, -hy, -hz], [hx, -hy, hz], [-hx, -hy, hz]],
            [[hx, -hy, hz], [hx, -hy, -hz], [hx, hy, -hz], [hx, hy, hz]],
            [[-hx, -hy, -hz], [-hx, -hy, hz], [-hx, hy, hz], [-hx, hy, -hz]],
        ];

        for (corners, normal) in faces.iter().zip(FACE_NORMALS) {
            let shade = sun_shade(&Vector3::from(normal));
            let base = self.vertex_count() as u16;
            for [x, y, z] in corners {
                self.vertices.extend_from_slice(&[
                    ox + x, oy + y, oz + z,
                    r * shade, g * shade, b * shade,
                ]);
            }
            self.indices.extend_from_slice(&[
                base, base + 1, base + 2,
                base, base + 2, base + 3,
            ]);
        }
    }

    pub fn push_vertex(&mut self, position: [f32; 3], color: (f32, f32, f32)) -> u16 {
        let index = self.vertex_count() as u16;
        self.vertices.extend_from_slice(&[
            position[0], position[1], position[2],
            color.0, color.1, color.2,
        ]);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quads() {
        let cube = Mesh::cube(1.0, 1.0, 1.0, 1.0);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertex_count()));
    }

    #[test]
    fn boxes_index_from_their_own_base() {
        let mut mesh = Mesh::new();
        mesh.add_box([0.0; 3], [1.0; 3], (1.0, 0.0, 0.0));
        mesh.add_box([2.0, 0.0, 0.0], [1.0; 3], (0.0, 1.0, 0.0));
        assert_eq!(mesh.vertex_count(), 48);
        assert_eq!(mesh.indices[36], 24);
        // Second box's first vertex sits at offset - half extent.
        assert_eq!(mesh.vertices[24 * VERTEX_STRIDE], 1.5);
    }

    #[test]
    fn faces_are_lit_from_the_sun() {
        let cube = Mesh::cube(1.0, 1.0, 1.0, 1.0);
        let red_of_face = |face: usize| cube.vertices[face * 4 * VERTEX_STRIDE + 3];
        // Top faces the sun, bottom only gets ambient.
        assert!(red_of_face(2) > red_of_face(0));
        assert!(red_of_face(0) > red_of_face(3));
        assert_eq!(red_of_face(3), crate::scene::park::AMBIENT_LIGHT);
    }
}
