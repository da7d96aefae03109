//! Fixed-capacity pool of dust particles.
//!
//! Storage is columnar so the render layer can read each attribute as a flat
//! `f32` slice. A slot whose lifespan is `<= 0` is free and contributes
//! nothing visually, whatever its opacity currently holds.

use log::{debug, trace};
use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_CAPACITY: usize = 500;

const SPAWN_SPREAD: f32 = 0.1;
const SPAWN_LIFT: f32 = 0.05;
const MIN_SIZE: f32 = 0.2;
const SIZE_RANGE: f32 = 0.3;
const MIN_OPACITY: f32 = 0.7;
const OPACITY_RANGE: f32 = 0.3;
const MIN_LIFESPAN: f32 = 30.0;
const LIFESPAN_RANGE: f32 = 30.0;
/// Lifespan that maps to full opacity while fading.
const FADE_TICKS: f32 = 60.0;
const DRIFT_SPREAD: f32 = 0.01;
const RISE_PER_TICK: f32 = 0.01;

pub struct ParticleEmitterPool<R: Rng = SmallRng> {
    positions: Vec<f32>,
    sizes: Vec<f32>,
    opacities: Vec<f32>,
    lifespans: Vec<f32>,
    rng: R,
}

impl ParticleEmitterPool<SmallRng> {
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, SmallRng::from_entropy())
    }
}

impl<R: Rng> ParticleEmitterPool<R> {
    pub fn with_rng(capacity: usize, rng: R) -> Self {
        debug!("allocating dust pool with {} slots", capacity);
        ParticleEmitterPool {
            positions: vec![0.0; capacity * 3],
            sizes: vec![0.1; capacity],
            opacities: vec![0.0; capacity],
            lifespans: vec![0.0; capacity],
            rng,
        }
    }

    pub fn capacity(&self) -> usize {
        self.lifespans.len()
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.lifespans.get(slot).is_some_and(|&life| life > 0.0)
    }

    pub fn active_count(&self) -> usize {
        self.lifespans.iter().filter(|&&life| life > 0.0).count()
    }

    /// Claims up to `count` free slots, lowest index first, and returns how
    /// many were claimed. A full pool silently emits fewer.
    ///
    /// `_bias` is the dust direction hint from the caller; it does not
    /// influence spawn position or drift.
    pub fn emit(&mut self, origin: &Vector3<f32>, _bias: &Vector3<f32>, count: usize) -> usize {
        let mut emitted = 0;

        for slot in 0..self.capacity() {
            if emitted >= count {
                break;
            }
            if self.lifespans[slot] > 0.0 {
                continue;
            }

            let jitter_x = (self.rng.gen::<f32>() - 0.5) * SPAWN_SPREAD;
            let jitter_y = (self.rng.gen::<f32>() - 0.5) * SPAWN_SPREAD;
            let jitter_z = (self.rng.gen::<f32>() - 0.5) * SPAWN_SPREAD;
            let lift = self.rng.gen::<f32>() * SPAWN_LIFT;

            let base = slot * 3;
            self.positions[base] = origin.x + jitter_x;
            self.positions[base + 1] = origin.y + jitter_y + lift;
            self.positions[base + 2] = origin.z + jitter_z;

            self.sizes[slot] = self.rng.gen::<f32>() * SIZE_RANGE + MIN_SIZE;
            self.opacities[slot] = MIN_OPACITY + self.rng.gen::<f32>() * OPACITY_RANGE;
            self.lifespans[slot] = MIN_LIFESPAN + self.rng.gen::<f32>() * LIFESPAN_RANGE;

            emitted += 1;
        }

        if emitted < count {
            trace!("dust pool saturated: emitted {} of {}", emitted, count);
        }

        emitted
    }

    /// Ages every live particle by one frame: fade, sideways drift, rise.
    pub fn advance(&mut self) {
        for slot in 0..self.capacity() {
            if self.lifespans[slot] <= 0.0 {
                continue;
            }

            self.lifespans[slot] -= 1.0;
            // Not clamped: a lifespan above FADE_TICKS yields opacity > 1.
            self.opacities[slot] = self.lifespans[slot] / FADE_TICKS;

            let base = slot * 3;
            self.positions[base] += (self.rng.gen::<f32>() - 0.5) * DRIFT_SPREAD;
            self.positions[base + 1] += RISE_PER_TICK;
            self.positions[base + 2] += (self.rng.gen::<f32>() - 0.5) * DRIFT_SPREAD;
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn lifespans(&self) -> &[f32] {
        &self.lifespans
    }

    pub fn position(&self, slot: usize) -> Vector3<f32> {
        let base = slot * 3;
        Vector3::new(self.positions[base], self.positions[base + 1], self.positions[base + 2])
    }

    /// Live particles as `(slot, position, size, opacity)`.
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, Vector3<f32>, f32, f32)> + '_ {
        (0..self.capacity())
            .filter(move |&slot| self.lifespans[slot] > 0.0)
            .map(move |slot| (slot, self.position(slot), self.sizes[slot], self.opacities[slot]))
    }
}
