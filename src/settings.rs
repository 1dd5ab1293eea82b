//! Game tuning
//!
//! Every gameplay constant can be overridden from a JSON file. Missing keys
//! fall back to the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::participants::ShipTuning;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value outside its usable range
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    /// Side of the square field
    pub field_size: f32,
    /// Distance of the seeded asteroids from the corners
    pub edge_offset: f32,
    /// RNG seed; the same seed and inputs replay the same game
    pub seed: u64,

    // === Rules ===
    pub lives: u8,
    /// Maximum bullets alive at once
    pub bullet_limit: usize,
    /// Frames between a ship loss or level clear and what follows
    pub end_delay: u32,

    // === Ship ===
    pub ship_turn_rate: f32,
    pub ship_acceleration: f32,
    pub ship_speed_limit: f32,
    pub ship_friction: f32,

    // === Projectiles ===
    pub bullet_speed: f32,
    /// Bullet lifespan in frames
    pub bullet_lifespan: u32,
    /// Asteroid speed per size (small, medium, large)
    pub asteroid_speed: [f32; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_size: FIELD_SIZE,
            edge_offset: EDGE_OFFSET,
            seed: 0,

            lives: LIVES,
            bullet_limit: BULLET_LIMIT,
            end_delay: END_DELAY,

            ship_turn_rate: SHIP_TURN_RATE,
            ship_acceleration: SHIP_ACCELERATION,
            ship_speed_limit: SHIP_SPEED_LIMIT,
            ship_friction: SHIP_FRICTION,

            bullet_speed: BULLET_SPEED,
            bullet_lifespan: BULLET_LIFESPAN,
            asteroid_speed: ASTEROID_SPEED,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.field_size.is_finite() || self.field_size <= 0.0 {
            return Err(invalid("field_size", "must be a positive number"));
        }
        if !self.edge_offset.is_finite()
            || self.edge_offset < 0.0
            || self.edge_offset * 2.0 >= self.field_size
        {
            return Err(invalid("edge_offset", "must lie within half the field"));
        }
        if !(0.0..=1.0).contains(&self.ship_friction) {
            return Err(invalid("ship_friction", "must be within 0..=1"));
        }

        let non_negative = [
            ("ship_turn_rate", self.ship_turn_rate),
            ("ship_acceleration", self.ship_acceleration),
            ("ship_speed_limit", self.ship_speed_limit),
            ("bullet_speed", self.bullet_speed),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("{} is not a non-negative number", value)));
            }
        }
        if self.asteroid_speed.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(invalid("asteroid_speed", "speeds must be non-negative numbers"));
        }

        if self.bullet_lifespan == 0 {
            return Err(invalid("bullet_lifespan", "must be at least one frame"));
        }
        Ok(())
    }

    /// Ship handling derived from these settings
    pub fn ship_tuning(&self) -> ShipTuning {
        ShipTuning {
            turn_rate: self.ship_turn_rate,
            acceleration: self.ship_acceleration,
            speed_limit: self.ship_speed_limit,
            friction: self.ship_friction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.field_size, 750.0);
        assert_eq!(settings.bullet_limit, 8);
        assert_eq!(settings.bullet_lifespan, 30);
        assert_eq!(settings.lives, 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "field_size": 500.0, "lives": 3 }"#).unwrap();
        assert_eq!(settings.field_size, 500.0);
        assert_eq!(settings.lives, 3);
        assert_eq!(settings.bullet_speed, BULLET_SPEED);
        assert_eq!(settings.ship_tuning(), ShipTuning::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Settings::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            (r#"{ "field_size": -1.0 }"#, "field_size"),
            (r#"{ "field_size": 150.0 }"#, "edge_offset"),
            (r#"{ "ship_friction": 1.5 }"#, "ship_friction"),
            (r#"{ "bullet_speed": -2.0 }"#, "bullet_speed"),
            (r#"{ "asteroid_speed": [1.0, -1.0, 1.0] }"#, "asteroid_speed"),
            (r#"{ "bullet_lifespan": 0 }"#, "bullet_lifespan"),
        ];
        for (json, expected) in cases {
            match Settings::from_json(json) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{}", json),
                other => panic!("{} gave {:?}", json, other),
            }
        }
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let settings = Settings {
            seed: 42,
            ..Default::default()
        };
        let name = format!("asteroid-field-settings-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, settings.to_json().unwrap()).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Settings::load("/definitely/not/here/settings.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
