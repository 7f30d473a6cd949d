//! Game configuration file. Every section is optional and falls back to the
//! stock tuning values.
//!
//! Missing map prefabs are deliberately not a load error: the map manager
//! reports them itself at initialization and the run continues without a map.

use std::fs;
use std::path::Path;

use deer_core::antidote::{AntidoteConfig, SpawnerConfig};
use deer_core::camera::CameraConfig;
use deer_core::health::HealthConfig;
use deer_core::map::MapConfig;
use deer_core::movement::MovementConfig;
use serde::Deserialize;

use crate::audio::AudioConfig;
use crate::physics::PhysicsConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub version: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: f32,
    /// Enables the debug health key.
    #[serde(default)]
    pub debug_keys: bool,
    #[serde(default)]
    pub clip_set: Option<String>,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub antidote: AntidoteConfig,
    #[serde(default)]
    pub spawner: SpawnerConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            seed: 0,
            fixed_dt: default_fixed_dt(),
            debug_keys: false,
            clip_set: None,
            map: MapConfig::default(),
            health: HealthConfig::default(),
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
            antidote: AntidoteConfig::default(),
            spawner: SpawnerConfig::default(),
            physics: PhysicsConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.version != "0.1" {
        return Err(format!(
            "Config validation failed: unsupported version '{}'",
            config.version
        ));
    }
    if !(config.fixed_dt > 0.0) {
        return Err("Config validation failed: fixed_dt must be > 0".to_string());
    }
    if config.health.max_health <= 0.0 {
        return Err("Config validation failed: health.max_health must be > 0".to_string());
    }
    if config.movement.move_speed < 0.0 || config.movement.jump_force < 0.0 {
        return Err("Config validation failed: movement speeds must not be negative".to_string());
    }
    config
        .spawner
        .validate()
        .map_err(|e| format!("Config validation failed: spawner {e}"))?;
    if config.map.start_prefab.is_none() || config.map.connector_prefabs.is_empty() {
        log::warn!("Config has no map prefabs; the run will have no map");
    }
    Ok(())
}

const fn default_fixed_dt() -> f32 {
    0.02
}
