pub mod models;

use log::{info, warn};
use nalgebra::{Matrix4, Perspective3, Rotation3, Vector3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::AppConfig;
use crate::effects::ParticleEmitterPool;
use crate::engine::audio::{engine_volume, AudioManager};
use crate::engine::renderer::{GpuMesh, Renderer};
use crate::scene::{park, Park, PropKind};
use crate::vehicle::{ChaseCamera, InputState, VehicleStepper};

use self::models::DUST_COLOR;

const AMBIENT_SOUND: &str = "ambient";
const ENGINE_SOUND: &str = "engine";
/// Frame delta handed to the stepper; the render loop targets 60 Hz.
const FRAME_DT: f32 = 1.0 / 60.0;

/// Per-frame snapshot handed to the page for the HUD.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub position: [f32; 3],
    pub heading: f32,
    pub speed: f32,
    pub turret_angle: f32,
    pub cannon_elevation: f32,
    pub active_dust: usize,
}

impl Telemetry {
    pub fn capture<R: Rng>(tank: &VehicleStepper<R>) -> Self {
        let state = tank.state();
        Telemetry {
            position: state.position.into(),
            heading: state.heading,
            speed: state.velocity_forward.abs(),
            turret_angle: state.turret_angle,
            cannon_elevation: state.cannon_elevation,
            active_dust: tank.dust().active_count(),
        }
    }
}

struct SceneMeshes {
    terrain: GpuMesh,
    tree: GpuMesh,
    bench: GpuMesh,
    hull: GpuMesh,
    turret: GpuMesh,
    cannon: GpuMesh,
}

pub struct Demo {
    renderer: Renderer,
    meshes: SceneMeshes,
    park: Park,
    tank: VehicleStepper,
    camera: ChaseCamera,
    audio: AudioManager,
    pub input: InputState,
    audio_started: bool,
    engine_idle_volume: f64,
}

impl Demo {
    pub fn new(renderer: Renderer, config: AppConfig) -> Result<Self, wasm_bindgen::JsValue> {
        let mut rng = match config.park.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let park = Park::generate(&config.park, &mut rng);

        let tank_meshes = models::tank_meshes();
        let meshes = SceneMeshes {
            terrain: renderer.upload_mesh(&models::terrain_mesh(&park.terrain))?,
            tree: renderer.upload_mesh(&models::tree_mesh())?,
            bench: renderer.upload_mesh(&models::bench_mesh())?,
            hull: renderer.upload_mesh(&tank_meshes.hull)?,
            turret: renderer.upload_mesh(&tank_meshes.turret)?,
            cannon: renderer.upload_mesh(&tank_meshes.cannon)?,
        };

        let dust = ParticleEmitterPool::new(config.particles.capacity);
        let tank = VehicleStepper::new(config.tank.clone(), dust);

        let mut camera = ChaseCamera::new(config.camera.clone());
        camera.snap(&tank.state().position, tank.state().heading);

        let mut audio = AudioManager::new();
        for (name, sound) in [
            (AMBIENT_SOUND, &config.audio.ambient),
            (ENGINE_SOUND, &config.audio.engine),
        ] {
            if let Some(sound) = sound {
                if let Err(e) = audio.load(name, &sound.path, true, sound.volume) {
                    warn!("sound {} unavailable: {}", name, e);
                }
            }
        }

        let engine_idle_volume = config.audio.engine.as_ref().map_or(0.0, |sound| sound.volume);

        info!("park ready with {} props", park.props.len());

        Ok(Demo {
            renderer,
            meshes,
            park,
            tank,
            camera,
            audio,
            input: InputState::new(),
            audio_started: false,
            engine_idle_volume,
        })
    }

    /// Browsers only allow playback after a user gesture.
    pub fn start_audio(&mut self) {
        if self.audio_started {
            return;
        }
        self.audio_started = true;
        self.audio.play(AMBIENT_SOUND);
        self.audio.play(ENGINE_SOUND);
    }

    /// Window lost focus: drop held input and silence the park until the
    /// next gesture.
    pub fn suspend(&mut self) {
        self.input.clear();
        if self.audio_started {
            self.audio_started = false;
            self.audio.stop(AMBIENT_SOUND);
            self.audio.stop(ENGINE_SOUND);
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry::capture(&self.tank)
    }

    pub fn update(&mut self) {
        let controls = self.input.controls();
        self.tank.step(&controls, FRAME_DT);

        let state = self.tank.state();
        self.camera.follow(&state.position, state.heading);

        if self.audio_started {
            let volume = engine_volume(
                state.velocity_forward,
                self.tank.tuning().max_speed,
                self.engine_idle_volume,
            );
            self.audio.set_volume(ENGINE_SOUND, volume);
        }
    }

    pub fn render(&self) {
        let (sky_r, sky_g, sky_b) = park::SKY_COLOR;
        self.renderer.clear(sky_r, sky_g, sky_b);
        self.renderer.enable_depth_test();

        let Some(canvas) = self.renderer.canvas() else {
            return;
        };
        let width = canvas.width();
        let height = canvas.height();
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width as i32, height as i32);

        let aspect = width as f32 / height as f32;
        let projection = Perspective3::new(aspect, self.camera.fov(), 0.1, 1000.0).to_homogeneous();
        let view = self.camera.view_matrix();

        self.renderer.draw_mesh(&self.meshes.terrain, &Matrix4::identity(), &projection, &view);

        for prop in &self.park.props {
            let model = Matrix4::new_translation(&prop.position)
                * Rotation3::from_axis_angle(&Vector3::y_axis(), prop.yaw).to_homogeneous();
            let mesh = match prop.kind {
                PropKind::Tree => &self.meshes.tree,
                PropKind::Bench => &self.meshes.bench,
            };
            self.renderer.draw_mesh(mesh, &model, &projection, &view);
        }

        let state = self.tank.state();
        self.renderer.draw_mesh(&self.meshes.hull, &state.body_transform(), &projection, &view);
        self.renderer.draw_mesh(&self.meshes.turret, &state.turret_transform(), &projection, &view);
        self.renderer.draw_mesh(&self.meshes.cannon, &state.cannon_transform(), &projection, &view);

        self.renderer.begin_particles();
        for (_, position, size, opacity) in self.tank.dust().iter_active() {
            self.renderer.draw_cube(&position, size * 0.25, DUST_COLOR, opacity.min(1.0), &projection, &view);
        }
        self.renderer.end_particles();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{ControlInput, TankTuning};
    use rand::rngs::mock::StepRng;

    #[test]
    fn telemetry_reports_speed_and_dust() {
        let mut tank = VehicleStepper::new(
            TankTuning::default(),
            ParticleEmitterPool::with_rng(16, StepRng::new(0, 0)),
        );
        let reverse = ControlInput {
            move_vector: Vector3::new(0.0, 0.0, 1.0),
            ..ControlInput::default()
        };
        tank.step(&reverse, FRAME_DT);

        let telemetry = Telemetry::capture(&tank);
        assert!((telemetry.speed - 0.07).abs() < 1e-6);
        assert_eq!(telemetry.active_dust, 2);
        assert_eq!(telemetry.position[1], 0.5);

        let json = serde_json::to_value(&telemetry).unwrap();
        assert_eq!(json["active_dust"], 2);
    }
}
