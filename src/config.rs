//! Game Configuration
//!
//! Every tunable of a session lives in [`GameConfig`]. The defaults are the
//! values the live server ships with; a JSON file can override any subset.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::position::Position;

/// Largest hunter quota the setup menu may offer.
pub const HUNTER_LIMIT: u8 = 3;

/// A playable map: display name plus the spawn point every role is sent to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    /// Name shown in the map selector.
    pub name: String,
    /// Spawn coordinate for both roles.
    pub spawn: Position,
}

impl MapSpec {
    /// Create a map entry.
    pub fn new(name: impl Into<String>, spawn: Position) -> Self {
        Self { name: name.into(), spawn }
    }
}

/// On-screen banner timing, in host ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerTiming {
    /// Fade-in duration
    pub fade_in: u32,
    /// Time fully visible
    pub stay: u32,
    /// Fade-out duration
    pub fade_out: u32,
}

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Where newly arrived participants are sent.
    pub lobby_position: Position,
    /// Banner shown on arrival.
    pub lobby_title: String,
    /// Arrival banner timing.
    pub lobby_title_timing: BannerTiming,
    /// Ordered list of maps the owner can pick from.
    pub maps: Vec<MapSpec>,
    /// Upper bound for the selectable hunter count, in [1, HUNTER_LIMIT].
    pub max_hunters: u8,
    /// Cooldown set by a successful disguise, in fast-clock ticks.
    pub disguise_cooldown: u32,
    /// How far below the hider's position the proxy is kept.
    pub proxy_vertical_offset: f64,
    /// Hearts a hider starts a round with.
    pub initial_hearts: u32,
    /// Host tick rate (Hz).
    pub tick_rate_hz: u32,
    /// Fast clock period, in host ticks.
    pub fast_interval_ticks: u32,
    /// Slow clock period, in host ticks.
    pub slow_interval_ticks: u32,
    /// Role banner timing.
    pub role_title_timing: BannerTiming,
    /// Entity type spawned as a disguise proxy.
    pub proxy_entity_type: String,
    /// Tag put on every proxy entity.
    pub proxy_tag: String,
    /// Tag put on every hider at game start.
    pub hider_tag: String,
    /// Item type of the owner's admin item.
    pub admin_item_type: String,
    /// Name tag of the owner's admin item.
    pub admin_item_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lobby_position: Position::new(0.0, -60.0, 0.0),
            lobby_title: "§l§6Prop Hunt: §bAstralis".to_string(),
            lobby_title_timing: BannerTiming { fade_in: 1, stay: 80, fade_out: 20 },
            maps: vec![
                MapSpec::new("Astralis Forest", Position::new(100.0, -60.0, 100.0)),
                MapSpec::new("Urban Market", Position::new(300.0, -60.0, 200.0)),
                MapSpec::new("Kazakh Village", Position::new(500.0, -60.0, 300.0)),
            ],
            max_hunters: 3,
            disguise_cooldown: 30,
            proxy_vertical_offset: 1.4,
            initial_hearts: 3,
            tick_rate_hz: crate::TICK_RATE,
            fast_interval_ticks: 2,
            slow_interval_ticks: 20,
            role_title_timing: BannerTiming { fade_in: 1, stay: 60, fade_out: 20 },
            proxy_entity_type: "minecraft:armor_stand".to_string(),
            proxy_tag: "block".to_string(),
            hider_tag: "hider".to_string(),
            admin_item_type: "minecraft:compass".to_string(),
            admin_item_name: "Admin Compass".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the session core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maps.is_empty() {
            return Err(ConfigError::NoMaps);
        }
        if self.max_hunters == 0 {
            return Err(ConfigError::NoHunters);
        }
        if self.max_hunters > HUNTER_LIMIT {
            return Err(ConfigError::TooManyHunters(self.max_hunters));
        }
        if self.tick_rate_hz == 0 || self.fast_interval_ticks == 0 || self.slow_interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Wall-clock period of the fast clock.
    pub fn fast_period(&self) -> Duration {
        self.ticks_to_duration(self.fast_interval_ticks)
    }

    /// Wall-clock period of the slow clock.
    pub fn slow_period(&self) -> Duration {
        self.ticks_to_duration(self.slow_interval_ticks)
    }

    fn ticks_to_duration(&self, ticks: u32) -> Duration {
        let hz = self.tick_rate_hz.max(1) as u64;
        Duration::from_millis(ticks as u64 * 1000 / hz)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Document is not valid JSON for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Map list is empty.
    #[error("At least one map is required")]
    NoMaps,

    /// Hunter bound is zero.
    #[error("max_hunters must be at least 1")]
    NoHunters,

    /// Hunter bound above [`HUNTER_LIMIT`].
    #[error("max_hunters is {0}, at most {HUNTER_LIMIT} allowed")]
    TooManyHunters(u8),

    /// A tick rate or interval is zero.
    #[error("Tick rate and clock intervals must be non-zero")]
    ZeroInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.maps.len(), 3);
        assert_eq!(config.disguise_cooldown, 30);
    }

    #[test]
    fn test_clock_periods() {
        let config = GameConfig::default();
        assert_eq!(config.fast_period(), Duration::from_millis(100));
        assert_eq!(config.slow_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{ "max_hunters": 2, "disguise_cooldown": 10 }"#).unwrap();
        assert_eq!(config.max_hunters, 2);
        assert_eq!(config.disguise_cooldown, 10);
        assert_eq!(config.hider_tag, "hider");
    }

    #[test]
    fn test_custom_maps() {
        let json = r#"{ "maps": [ { "name": "Docks", "spawn": { "x": 1.0, "y": 2.0, "z": 3.0 } } ] }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.maps, vec![MapSpec::new("Docks", Position::new(1.0, 2.0, 3.0))]);
    }

    #[test]
    fn test_rejects_empty_maps() {
        let err = GameConfig::from_json_str(r#"{ "maps": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoMaps));
    }

    #[test]
    fn test_hunter_bound_limits() {
        let err = GameConfig::from_json_str(r#"{ "max_hunters": 4 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyHunters(4)));
        let err = GameConfig::from_json_str(r#"{ "max_hunters": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoHunters));
        assert!(GameConfig::from_json_str(r#"{ "max_hunters": 3 }"#).is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = GameConfig::from_json_str(r#"{ "fast_interval_ticks": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(GameConfig::from_json_str("nope"), Err(ConfigError::Parse(_))));
    }
}
