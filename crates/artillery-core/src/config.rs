//! Engine-wide constants that depend on the map rather than on the weapon.

use serde::{Deserialize, Serialize};

use crate::{CoreError, GRAVITY};

/// Map-specific and numeric settings shared by every solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gravity before the weapon's own gravity scale is applied [m/s²]
    pub gravity_mps2: f64,
    /// Map units per game meter
    pub game_to_map_scale: f64,
    /// Arcs whose |cos θ| falls below this are treated as vertical
    pub vertical_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity_mps2: GRAVITY,
            game_to_map_scale: 1.0,
            vertical_epsilon: 1e-9,
        }
    }
}

impl EngineConfig {
    pub fn with_scale(game_to_map_scale: f64) -> Self {
        Self { game_to_map_scale, ..Self::default() }
    }

    /// Parse a (possibly partial) JSON override; missing fields keep defaults.
    pub fn from_json_str(doc: &str) -> Result<Self, CoreError> {
        let cfg: EngineConfig = serde_json::from_str(doc)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.gravity_mps2.is_finite() && self.gravity_mps2 > 0.0) {
            return Err(CoreError::InvalidGravity(self.gravity_mps2));
        }
        if !(self.game_to_map_scale.is_finite() && self.game_to_map_scale > 0.0) {
            return Err(CoreError::InvalidScale(self.game_to_map_scale));
        }
        if !(self.vertical_epsilon > 0.0 && self.vertical_epsilon < 1.0) {
            return Err(CoreError::InvalidEpsilon(self.vertical_epsilon));
        }
        Ok(())
    }

    /// Map units -> meters
    pub fn map_to_m(&self, map_units: f64) -> f64 {
        map_units / self.game_to_map_scale
    }

    /// Meters -> map units
    pub fn m_to_map(&self, meters: f64) -> f64 {
        meters * self.game_to_map_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{ "game_to_map_scale": 0.25 }"#).unwrap();
        assert_eq!(cfg.gravity_mps2, GRAVITY);
        assert_eq!(cfg.game_to_map_scale, 0.25);
        assert_eq!(cfg.map_to_m(50.0), 200.0);
        assert_eq!(cfg.m_to_map(200.0), 50.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            EngineConfig::from_json_str(r#"{ "gravity_mps2": 0.0 }"#),
            Err(CoreError::InvalidGravity(0.0))
        );
        assert_eq!(
            EngineConfig::with_scale(-1.0).validate(),
            Err(CoreError::InvalidScale(-1.0))
        );
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(CoreError::Parse(_))
        ));
    }
}
