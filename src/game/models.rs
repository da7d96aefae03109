//! Procedural meshes for everything in the park.

use crate::engine::mesh::Mesh;
use crate::scene::park::sun_shade;
use crate::scene::Terrain;

const HULL_COLOR: (f32, f32, f32) = (0.365, 0.498, 0.6);
const TURRET_COLOR: (f32, f32, f32) = (0.263, 0.42, 0.549);
const CANNON_COLOR: (f32, f32, f32) = (0.176, 0.298, 0.4);
const TRACK_COLOR: (f32, f32, f32) = (0.133, 0.133, 0.133);
const TRUNK_COLOR: (f32, f32, f32) = (0.545, 0.271, 0.075);
const FOLIAGE_COLOR: (f32, f32, f32) = (0.18, 0.545, 0.341);
const SEAT_COLOR: (f32, f32, f32) = (0.545, 0.271, 0.075);
const LEG_COLOR: (f32, f32, f32) = (0.412, 0.412, 0.412);
const GRASS_COLOR: (f32, f32, f32) = (0.298, 0.686, 0.314);

pub const DUST_COLOR: (f32, f32, f32) = (1.0, 0.94, 0.82);

/// Tank parts in their own pivot space, matching the hull, turret and
/// cannon transforms of `VehicleState`.
pub struct TankMeshes {
    pub hull: Mesh,
    pub turret: Mesh,
    pub cannon: Mesh,
}

pub fn tank_meshes() -> TankMeshes {
    let mut hull = Mesh::new();
    hull.add_box([0.0, 0.0, 0.0], [1.5, 0.5, 2.0], HULL_COLOR);
    for x in [0.7, -0.7] {
        hull.add_box([x, -0.4, 0.0], [0.2, 0.3, 2.0], TRACK_COLOR);
    }
    // Ears
    for x in [0.4, -0.4] {
        hull.add_box([x, 0.8, -0.4], [0.2, 0.5, 0.2], HULL_COLOR);
    }

    let mut turret = Mesh::new();
    turret.add_box([0.0, 0.0, 0.0], [1.0, 0.5, 1.0], TURRET_COLOR);

    let mut cannon = Mesh::new();
    cannon.add_box([0.0, 0.0, -0.7], [0.2, 0.2, 1.2], CANNON_COLOR);

    TankMeshes { hull, turret, cannon }
}

pub fn tree_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    mesh.add_box([0.0, 1.0, 0.0], [0.4, 2.0, 0.4], TRUNK_COLOR);
    // Stepped cone
    for (y, width) in [(2.5, 2.4), (3.5, 1.6), (4.5, 0.8)] {
        mesh.add_box([0.0, y, 0.0], [width, 1.0, width], FOLIAGE_COLOR);
    }
    mesh
}

pub fn bench_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    mesh.add_box([0.0, 0.5, 0.0], [2.0, 0.1, 0.8], SEAT_COLOR);
    for (x, z) in [(0.8, 0.3), (-0.8, 0.3), (0.8, -0.3), (-0.8, -0.3)] {
        mesh.add_box([x, 0.25, z], [0.1, 0.5, 0.1], LEG_COLOR);
    }
    mesh
}

pub fn terrain_mesh(terrain: &Terrain) -> Mesh {
    let mut mesh = Mesh::new();
    let (r, g, b) = GRASS_COLOR;

    for [x, y, z] in terrain.grid() {
        let shade = sun_shade(&terrain.normal_at(x, z));
        mesh.push_vertex([x, y, z], (r * shade, g * shade, b * shade));
    }

    let row = terrain.segments + 1;
    for i in 0..terrain.segments {
        for j in 0..terrain.segments {
            let a = i * row + j;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &Mesh) -> bool {
        mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count())
    }

    #[test]
    fn tank_parts_are_built() {
        let tank = tank_meshes();
        assert_eq!(tank.hull.vertex_count(), 24 * 5);
        assert_eq!(tank.turret.vertex_count(), 24);
        assert_eq!(tank.cannon.vertex_count(), 24);
        assert!(indices_in_range(&tank.hull));
    }

    #[test]
    fn cannon_points_toward_the_nose() {
        let cannon = tank_meshes().cannon;
        let max_z = cannon
            .vertices
            .chunks(6)
            .map(|v| v[2])
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(max_z <= -0.1 + 1e-6);
    }

    #[test]
    fn props_have_geometry() {
        assert_eq!(tree_mesh().vertex_count(), 24 * 4);
        assert_eq!(bench_mesh().vertex_count(), 24 * 5);
        assert!(indices_in_range(&bench_mesh()));
    }

    #[test]
    fn terrain_mesh_is_a_full_grid() {
        let terrain = Terrain::default();
        let mesh = terrain_mesh(&terrain);
        assert_eq!(mesh.vertex_count(), 51 * 51);
        assert_eq!(mesh.indices.len(), 50 * 50 * 6);
        assert!(indices_in_range(&mesh));
    }
}
