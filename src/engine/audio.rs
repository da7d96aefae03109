//! Named looping sounds backed by `<audio>` elements.

use std::collections::HashMap;

use log::{debug, warn};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

use crate::error::Result;

const ENGINE_VOLUME_RANGE: f64 = 0.5;

#[derive(Default)]
pub struct AudioManager {
    sounds: HashMap<String, HtmlAudioElement>,
}

impl AudioManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, name: &str, url: &str, looping: bool, volume: f64) -> Result<()> {
        let sound = HtmlAudioElement::new_with_src(url)?;
        sound.set_loop(looping);
        sound.set_volume(volume.clamp(0.0, 1.0));
        debug!("loaded sound {} from {}", name, url);
        self.sounds.insert(name.to_string(), sound);
        Ok(())
    }

    /// Starts `name` unless it is already playing. Rejections (autoplay
    /// policy, missing file) arrive asynchronously and are logged.
    pub fn play(&self, name: &str) {
        let Some(sound) = self.sounds.get(name) else {
            return;
        };
        if !sound.paused() {
            return;
        }
        match sound.play() {
            Ok(promise) => {
                let name = name.to_string();
                spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        warn!("could not play {}: {:?}", name, e);
                    }
                });
            }
            Err(e) => warn!("could not play {}: {:?}", name, e),
        }
    }

    pub fn stop(&self, name: &str) {
        if let Some(sound) = self.sounds.get(name) {
            if !sound.paused() {
                sound.pause().ok();
                sound.set_current_time(0.0);
            }
        }
    }

    pub fn set_volume(&self, name: &str, volume: f64) {
        if let Some(sound) = self.sounds.get(name) {
            sound.set_volume(volume.clamp(0.0, 1.0));
        }
    }
}

/// Engine loop volume for the current hull speed, rising from the
/// configured `idle` volume when parked.
pub fn engine_volume(speed: f32, max_speed: f32, idle: f64) -> f64 {
    if max_speed <= 0.0 {
        return idle.clamp(0.0, 1.0);
    }
    let load = (speed.abs() / max_speed) as f64;
    (idle + ENGINE_VOLUME_RANGE * load).clamp(0.0, 1.0)
}
