//! Tunables loaded from `/assets/config.json`. Every field has a default,
//! so a partial or missing file still yields a playable demo.

use serde::{Deserialize, Serialize};

use crate::effects::particles::DEFAULT_CAPACITY;
use crate::error::Result;
use crate::scene::ParkConfig;
use crate::vehicle::{CameraConfig, TankTuning};

pub const CONFIG_PATH: &str = "/assets/config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub capacity: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig { capacity: DEFAULT_CAPACITY }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SoundConfig {
    pub path: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    0.5
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub ambient: Option<SoundConfig>,
    pub engine: Option<SoundConfig>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            ambient: Some(SoundConfig {
                path: "audio/park-ambience.mp3".to_string(),
                volume: 0.3,
            }),
            engine: Some(SoundConfig {
                path: "audio/tank-engine.mp3".to_string(),
                volume: 0.15,
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub tank: TankTuning,
    pub particles: ParticleConfig,
    pub camera: CameraConfig,
    pub park: ParkConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
