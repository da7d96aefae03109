//! Per-frame tank motion: velocity, heading, turret aim and track dust.
//!
//! Constants are applied per frame, not per second. `step` receives the
//! frame delta but the integration assumes a fixed display rate.

use std::f32::consts::FRAC_PI_2;

use nalgebra::{Matrix4, Rotation3, Vector3};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::effects::ParticleEmitterPool;

use super::input::ControlInput;

/// Track dust spawn points in hull space, at the rear end of each track.
const TRACK_EMITTERS: [[f32; 3]; 2] = [[0.7, -0.4, 1.0], [-0.7, -0.4, 1.0]];
const DUST_PER_TRACK: usize = 1;
const DUST_LIFT: f32 = 0.2;
const TURRET_HEIGHT: f32 = 0.5;
/// Coasting decays geometrically and stalls at subnormal values, so speeds
/// at or below this count as parked for dust.
const PARKED_SPEED: f32 = f32::EPSILON;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TankTuning {
    pub max_speed: f32,
    pub reverse_factor: f32,
    pub coast_factor: f32,
    pub turn_rate: f32,
    pub turret_yaw_scale: f32,
    pub cannon_pitch_scale: f32,
    pub cannon_min_offset: f32,
    pub cannon_max_offset: f32,
    pub ground_height: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        TankTuning {
            max_speed: 0.1,
            reverse_factor: 0.7,
            coast_factor: 0.9,
            turn_rate: 0.03,
            turret_yaw_scale: 0.5,
            cannon_pitch_scale: 0.3,
            cannon_min_offset: -0.2,
            cannon_max_offset: 0.5,
            ground_height: 0.5,
        }
    }
}

impl TankTuning {
    pub fn cannon_range(&self) -> (f32, f32) {
        (FRAC_PI_2 + self.cannon_min_offset, FRAC_PI_2 + self.cannon_max_offset)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub position: Vector3<f32>,
    pub heading: f32,
    /// Yaw relative to the hull.
    pub turret_angle: f32,
    /// Pitch measured from a horizontal reference of pi/2.
    pub cannon_elevation: f32,
    pub velocity_forward: f32,
}

impl VehicleState {
    pub fn new(position: Vector3<f32>) -> Self {
        VehicleState {
            position,
            heading: 0.0,
            turret_angle: 0.0,
            cannon_elevation: FRAC_PI_2,
            velocity_forward: 0.0,
        }
    }

    fn yaw(&self) -> Rotation3<f32> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.heading)
    }

    /// Hull-space `+z` in world space. The nose points the other way.
    pub fn forward_unit(&self) -> Vector3<f32> {
        Vector3::new(self.heading.sin(), 0.0, self.heading.cos())
    }

    pub fn track_emitters(&self) -> [Vector3<f32>; 2] {
        let yaw = self.yaw();
        TRACK_EMITTERS.map(|[x, y, z]| self.position + yaw * Vector3::new(x, y, z))
    }

    pub fn body_transform(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position) * self.yaw().to_homogeneous()
    }

    pub fn turret_transform(&self) -> Matrix4<f32> {
        self.body_transform()
            * Matrix4::new_translation(&Vector3::new(0.0, TURRET_HEIGHT, 0.0))
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.turret_angle).to_homogeneous()
    }

    pub fn cannon_transform(&self) -> Matrix4<f32> {
        let pitch = self.cannon_elevation - FRAC_PI_2;
        self.turret_transform()
            * Rotation3::from_axis_angle(&Vector3::x_axis(), pitch).to_homogeneous()
    }
}

/// Owns the tank state and its dust pool.
pub struct VehicleStepper<R: Rng = SmallRng> {
    state: VehicleState,
    tuning: TankTuning,
    dust: ParticleEmitterPool<R>,
    moving: bool,
}

impl<R: Rng> VehicleStepper<R> {
    pub fn new(tuning: TankTuning, dust: ParticleEmitterPool<R>) -> Self {
        let spawn = Vector3::new(0.0, tuning.ground_height, 0.0);
        VehicleStepper {
            state: VehicleState::new(spawn),
            tuning,
            dust,
            moving: false,
        }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut VehicleState {
        &mut self.state
    }

    pub fn tuning(&self) -> &TankTuning {
        &self.tuning
    }

    pub fn dust(&self) -> &ParticleEmitterPool<R> {
        &self.dust
    }

    /// Whether the last step counted as motion (and so kicked up dust).
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Advances one frame. `controls` must hold finite values.
    pub fn step(&mut self, controls: &ControlInput, _dt: f32) {
        let tuning = &self.tuning;
        let state = &mut self.state;
        let throttle = controls.move_vector.z;
        let turn = controls.move_vector.x;

        if throttle < 0.0 {
            state.velocity_forward = -tuning.max_speed * throttle.abs();
        } else if throttle > 0.0 {
            state.velocity_forward = tuning.max_speed * throttle.abs() * tuning.reverse_factor;
        } else {
            state.velocity_forward *= tuning.coast_factor;
        }

        if turn != 0.0 {
            state.heading -= turn * tuning.turn_rate;
        }

        let forward = state.forward_unit();
        state.position += forward * state.velocity_forward;

        if controls.mouse_drag_on {
            state.turret_angle = controls.rotation_vector.y * tuning.turret_yaw_scale;
            let (min, max) = tuning.cannon_range();
            let elevation = FRAC_PI_2 + controls.rotation_vector.x * tuning.cannon_pitch_scale;
            state.cannon_elevation = elevation.clamp(min, max);
        }

        state.position.y = tuning.ground_height;

        self.moving = state.velocity_forward.abs() > PARKED_SPEED || turn != 0.0;
        if self.moving {
            let travel = forward * state.velocity_forward;
            let dust_direction = (Vector3::y() * DUST_LIFT - travel)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::y);
            for emitter in state.track_emitters() {
                self.dust.emit(&emitter, &dust_direction, DUST_PER_TRACK);
            }
        }

        self.dust.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector2};
    use rand::rngs::mock::StepRng;

    fn stepper() -> VehicleStepper<StepRng> {
        VehicleStepper::new(
            TankTuning::default(),
            ParticleEmitterPool::with_rng(64, StepRng::new(0, 0)),
        )
    }

    fn drive(x: f32, z: f32) -> ControlInput {
        ControlInput {
            move_vector: Vector3::new(x, 0.0, z),
            ..ControlInput::default()
        }
    }

    #[test]
    fn full_forward_sets_negative_max_speed() {
        let mut tank = stepper();
        tank.step(&drive(0.0, -1.0), 1.0 / 60.0);
        assert_relative_eq!(tank.state().velocity_forward, -0.1);
        // Nose-first along -z at heading 0.
        assert_relative_eq!(tank.state().position.z, -0.1);
    }

    #[test]
    fn reverse_is_capped_at_seventy_percent() {
        let mut tank = stepper();
        tank.step(&drive(0.0, 1.0), 1.0 / 60.0);
        assert_relative_eq!(tank.state().velocity_forward, 0.07, epsilon = 1e-6);
    }

    #[test]
    fn released_throttle_coasts_geometrically() {
        let mut tank = stepper();
        tank.step(&drive(0.0, -1.0), 1.0 / 60.0);
        let mut expected = tank.state().velocity_forward;

        for _ in 0..10 {
            tank.step(&ControlInput::default(), 1.0 / 60.0);
            expected *= 0.9;
            assert_relative_eq!(tank.state().velocity_forward, expected);
            assert!(tank.state().velocity_forward != 0.0);
        }
    }

    #[test]
    fn turn_intent_changes_heading_by_fixed_rate() {
        let mut tank = stepper();
        tank.step(&drive(0.5, 0.0), 1.0 / 60.0);
        assert_relative_eq!(tank.state().heading, -0.015);
        tank.step(&drive(-0.5, 0.0), 1.0 / 60.0);
        assert_relative_eq!(tank.state().heading, 0.0);
    }

    #[test]
    fn height_is_pinned_to_ground() {
        let mut tank = stepper();
        tank.state_mut().position.y = 4.0;
        tank.step(&ControlInput::default(), 1.0 / 60.0);
        assert_relative_eq!(tank.state().position.y, 0.5);
    }

    #[test]
    fn turret_holds_without_drag() {
        let mut tank = stepper();
        let aim = ControlInput {
            rotation_vector: Vector2::new(0.5, 0.5),
            mouse_drag_on: true,
            ..ControlInput::default()
        };
        tank.step(&aim, 1.0 / 60.0);
        assert_relative_eq!(tank.state().turret_angle, 0.25);

        let idle = ControlInput {
            rotation_vector: Vector2::new(-0.5, -0.5),
            mouse_drag_on: false,
            ..ControlInput::default()
        };
        tank.step(&idle, 1.0 / 60.0);
        assert_relative_eq!(tank.state().turret_angle, 0.25);
        assert_relative_eq!(tank.state().cannon_elevation, FRAC_PI_2 + 0.15);
    }

    #[test]
    fn cannon_elevation_is_clamped() {
        let mut tank = stepper();
        let (min, max) = tank.tuning().cannon_range();
        for pitch in [-1e6, -3.0, -0.5, 0.0, 0.5, 1.2, 3.0, 1e6] {
            let aim = ControlInput {
                rotation_vector: Vector2::new(pitch, 0.0),
                mouse_drag_on: true,
                ..ControlInput::default()
            };
            tank.step(&aim, 1.0 / 60.0);
            let elevation = tank.state().cannon_elevation;
            assert!(elevation >= min && elevation <= max, "pitch {pitch} -> {elevation}");
        }
        assert_relative_eq!(tank.state().cannon_elevation, FRAC_PI_2 + 0.5);
    }

    #[test]
    fn moving_emits_one_particle_per_track() {
        let mut tank = stepper();
        tank.step(&drive(0.0, -1.0), 1.0 / 60.0);
        assert!(tank.is_moving());
        assert_eq!(tank.dust().active_count(), 2);
        tank.step(&drive(0.0, -1.0), 1.0 / 60.0);
        assert_eq!(tank.dust().active_count(), 4);
    }

    #[test]
    fn turning_in_place_still_raises_dust() {
        let mut tank = stepper();
        tank.step(&drive(0.5, 0.0), 1.0 / 60.0);
        assert!(tank.is_moving());
        assert_eq!(tank.dust().active_count(), 2);
    }

    #[test]
    fn idle_tank_only_ages_dust() {
        let mut tank = stepper();
        tank.step(&ControlInput::default(), 1.0 / 60.0);
        assert!(!tank.is_moving());
        assert_eq!(tank.dust().active_count(), 0);
    }

    #[test]
    fn coasting_tank_eventually_parks() {
        let mut tank = stepper();
        tank.step(&drive(0.0, -1.0), 1.0 / 60.0);
        for _ in 0..10_000 {
            tank.step(&ControlInput::default(), 1.0 / 60.0);
        }
        assert!(!tank.is_moving());
        assert_eq!(tank.dust().active_count(), 0);
        // Decay itself is never cut short.
        assert!(tank.state().velocity_forward <= 0.0);
    }

    #[test]
    fn emitted_dust_is_aged_in_the_same_frame() {
        let mut tank = stepper();
        tank.step(&drive(0.0, -1.0), 1.0 / 60.0);
        // Zero draws spawn with lifespan 30, then one advance.
        assert_relative_eq!(tank.dust().lifespans()[0], 29.0);
    }

    #[test]
    fn track_emitters_follow_heading() {
        let mut state = VehicleState::new(Vector3::new(2.0, 0.5, 3.0));
        let [left, right] = state.track_emitters();
        assert_relative_eq!(left, Vector3::new(2.7, 0.1, 4.0), epsilon = 1e-6);
        assert_relative_eq!(right, Vector3::new(1.3, 0.1, 4.0), epsilon = 1e-6);

        state.heading = FRAC_PI_2;
        let [left, _] = state.track_emitters();
        assert_relative_eq!(left, Vector3::new(3.0, 0.1, 2.3), epsilon = 1e-5);
    }

    #[test]
    fn cannon_transform_raises_muzzle() {
        let mut state = VehicleState::new(Vector3::zeros());
        state.cannon_elevation = FRAC_PI_2 + 0.5;
        let muzzle = state.cannon_transform().transform_point(&Point3::new(0.0, 0.0, -1.0));
        assert!(muzzle.y > TURRET_HEIGHT);
        assert!(muzzle.z < 0.0);
    }

    #[test]
    fn turret_transform_stacks_on_hull() {
        let mut state = VehicleState::new(Vector3::new(1.0, 0.5, 1.0));
        state.heading = 0.3;
        state.turret_angle = -0.3;
        let pivot = state.turret_transform().transform_point(&Point3::origin());
        assert_relative_eq!(pivot, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-6);
        let aim = state.turret_transform().transform_vector(&Vector3::z());
        assert_relative_eq!(aim, Vector3::z(), epsilon = 1e-6);
    }
}
