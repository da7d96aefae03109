use std::f32::consts::TAU;

use log::debug;
use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::terrain::Terrain;

/// Half-width of the clearing kept free of trees around the spawn point.
const CLEARING: f32 = 5.0;
const TREE_SPREAD: f32 = 40.0;
const BENCH_SPREAD: f32 = 30.0;

pub const SKY_COLOR: (f32, f32, f32) = (0.529, 0.808, 0.922);
pub const AMBIENT_LIGHT: f32 = 0.6;
pub const SUN_LIGHT: f32 = 0.8;
pub const SUN_POSITION: [f32; 3] = [10.0, 20.0, 10.0];

/// Ambient plus the Lambert sun term for a surface facing `normal`.
pub fn sun_shade(normal: &Vector3<f32>) -> f32 {
    let sun = Vector3::from(SUN_POSITION).normalize();
    AMBIENT_LIGHT + SUN_LIGHT * normal.dot(&sun).max(0.0)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ParkConfig {
    pub tree_count: usize,
    pub bench_count: usize,
    /// Fixed layout seed; a fresh park every load when absent.
    pub seed: Option<u64>,
}

impl Default for ParkConfig {
    fn default() -> Self {
        ParkConfig { tree_count: 15, bench_count: 5, seed: None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropKind {
    Tree,
    Bench,
}

#[derive(Clone, Debug)]
pub struct Prop {
    pub kind: PropKind,
    pub position: Vector3<f32>,
    pub yaw: f32,
}

pub struct Park {
    pub terrain: Terrain,
    pub props: Vec<Prop>,
}

impl Park {
    pub fn generate<R: Rng>(config: &ParkConfig, rng: &mut R) -> Self {
        let terrain = Terrain::default();
        let mut props = Vec::with_capacity(config.tree_count + config.bench_count);

        for _ in 0..config.tree_count {
            let mut x = (rng.gen::<f32>() - 0.5) * TREE_SPREAD;
            let mut z = (rng.gen::<f32>() - 0.5) * TREE_SPREAD;

            if x.abs() < CLEARING && z.abs() < CLEARING {
                x += if x > 0.0 { CLEARING } else { -CLEARING };
                z += if z > 0.0 { CLEARING } else { -CLEARING };
            }

            props.push(Prop {
                kind: PropKind::Tree,
                position: Vector3::new(x, terrain.height_at(x, z), z),
                yaw: 0.0,
            });
        }

        for _ in 0..config.bench_count {
            let x = (rng.gen::<f32>() - 0.5) * BENCH_SPREAD;
            let z = (rng.gen::<f32>() - 0.5) * BENCH_SPREAD;
            props.push(Prop {
                kind: PropKind::Bench,
                position: Vector3::new(x, terrain.height_at(x, z), z),
                yaw: rng.gen::<f32>() * TAU,
            });
        }

        debug!(
            "generated park with {} trees and {} benches",
            config.tree_count, config.bench_count
        );

        Park { terrain, props }
    }

    pub fn props_of(&self, kind: PropKind) -> impl Iterator<Item = &Prop> {
        self.props.iter().filter(move |prop| prop.kind == kind)
    }
}
