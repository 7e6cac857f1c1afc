use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pile::PileSetup;

pub const CONFIG_PATH_ENV: &str = "CAVERN_CONFIG_PATH";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DigConfig {
    /// Progress per second while the dig key is held.
    pub rate: f32,
    pub unearthed_height: f32,
    pub pile_scale: Vec3,
    pub prize_position: Vec3,
}

impl Default for DigConfig {
    fn default() -> Self {
        Self {
            rate: 0.35,
            unearthed_height: 1.5,
            pile_scale: Vec3::ONE,
            prize_position: Vec3::new(0.0, -0.5, 0.0),
        }
    }
}

impl DigConfig {
    pub fn pile_setup(&self) -> PileSetup {
        PileSetup {
            pile_scale: self.pile_scale,
            prize_position: self.prize_position,
            unearthed_height: self.unearthed_height,
            dig_rate: self.rate,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OxygenConfig {
    pub initial: f32,
    /// Units per second on the first floor.
    pub decay_rate: f32,
}

impl Default for OxygenConfig {
    fn default() -> Self {
        Self {
            initial: 100.0,
            decay_rate: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShopConfig {
    pub base_light_price: u32,
    pub base_wall_price: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            base_light_price: 50,
            base_wall_price: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FloorsConfig {
    pub ground_floors: usize,
    pub big_light: bool,
}

impl Default for FloorsConfig {
    fn default() -> Self {
        Self {
            ground_floors: 4,
            big_light: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameOverConfig {
    #[serde(with = "crate::serde_duration")]
    pub fade_delay: Duration,
}

impl Default for GameOverConfig {
    fn default() -> Self {
        Self {
            fade_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub dig: DigConfig,
    #[serde(default)]
    pub oxygen: OxygenConfig,
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub floors: FloorsConfig,
    #[serde(default)]
    pub game_over: GameOverConfig,
}

impl GameConfig {
    /// Replaces values that would break the game with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.dig.rate.is_finite() || self.dig.rate <= 0.0 {
            self.dig.rate = defaults.dig.rate;
        }
        if !self.dig.unearthed_height.is_finite() {
            self.dig.unearthed_height = defaults.dig.unearthed_height;
        }
        if !self.oxygen.initial.is_finite() || self.oxygen.initial <= 0.0 {
            self.oxygen.initial = defaults.oxygen.initial;
        }
        if !self.oxygen.decay_rate.is_finite() || self.oxygen.decay_rate < 0.0 {
            self.oxygen.decay_rate = defaults.oxygen.decay_rate;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("cavern");
        path.push("config.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load(&self) -> GameConfig {
        match self.load_strict() {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) => GameConfig::default(),
            Err(err) => {
                log::warn!("{err}; using default config");
                GameConfig::default()
            }
        }
    }

    pub fn load_strict(&self) -> Result<GameConfig, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let config = serde_json::from_slice::<GameConfig>(&bytes).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(config.sanitized())
    }

    pub fn save(&self, config: &GameConfig) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let text = serde_json::to_string_pretty(config).map_err(|e| {
            write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        fs::write(&self.path, text).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_defaults_fill_missing_sections() {
        let parsed: GameConfig = serde_json::from_str(r#"{"dig":{"rate":0.5}}"#)
            .expect("config JSON should parse");
        assert_eq!(parsed.dig.rate, 0.5);
        assert_eq!(parsed.dig.unearthed_height, DigConfig::default().unearthed_height);
        assert_eq!(parsed.oxygen, OxygenConfig::default());
        assert_eq!(parsed.game_over.fade_delay, Duration::from_secs(3));
    }

    #[test]
    fn fade_delay_reads_fractional_seconds() {
        let parsed: GameConfig = serde_json::from_str(r#"{"game_over":{"fade_delay":1.5}}"#)
            .expect("config JSON should parse");
        assert_eq!(parsed.game_over.fade_delay, Duration::from_millis(1500));
    }

    #[test]
    fn sanitized_replaces_broken_values() {
        let mut config = GameConfig::default();
        config.dig.rate = -1.0;
        config.oxygen.initial = 0.0;
        config.oxygen.decay_rate = f32::NAN;
        let config = config.sanitized();
        assert_eq!(config.dig.rate, DigConfig::default().rate);
        assert_eq!(config.oxygen, OxygenConfig::default());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = ConfigStore::new("/definitely/not/here/config.json");
        assert_eq!(store.load(), GameConfig::default());
        assert!(matches!(store.load_strict(), Err(ConfigError::Read { .. })));
    }
}
