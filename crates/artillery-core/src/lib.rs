//! Core artillery math utilities
//!
//! Includes:
//! - Angle units & conversions (radians/degrees/NATO mils/MOA)
//! - Map positions and weapon emplacements
//! - Engine configuration (gravity, game-to-map scale)
//! - Heightmap collaborator trait with flat and gridded implementations

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod heightmap;
pub mod position;

pub use config::EngineConfig;
pub use error::CoreError;
pub use heightmap::{FlatTerrain, GridHeightmap, Heightmap, ProfilePoint, MAX_PROFILE_STEPS};
pub use position::{Emplacement, Position, MAX_HEIGHT_OFFSET_M};

/// Standard gravity used by the game's projectile model [m/s²]
pub const GRAVITY: f64 = 9.8;

/// NATO mils in a full circle
pub const MILS_PER_CIRCLE: f64 = 6400.0;

/// -------------------------
/// Units & Conversions
/// -------------------------

pub fn rad_to_deg(rad: f64) -> f64 { rad.to_degrees() }
pub fn deg_to_rad(deg: f64) -> f64 { deg.to_radians() }

pub fn rad_to_mil(rad: f64) -> f64 { rad * (MILS_PER_CIRCLE / (2.0 * PI)) }
pub fn mil_to_rad(mil: f64) -> f64 { mil * (2.0 * PI / MILS_PER_CIRCLE) }

pub fn deg_to_mil(deg: f64) -> f64 { deg * (MILS_PER_CIRCLE / 360.0) }
pub fn mil_to_deg(mil: f64) -> f64 { mil * (360.0 / MILS_PER_CIRCLE) }

/// Minutes of angle to degrees (60 MOA per degree)
pub fn moa_to_deg(moa: f64) -> f64 { moa / 60.0 }
pub fn moa_to_rad(moa: f64) -> f64 { moa_to_deg(moa).to_radians() }

/// Wrap any angle in degrees into [0, 360)
pub fn normalize_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// -------------------------
/// Angle unit preference
/// -------------------------

/// How a weapon's sight is graduated. Pure numeric preference: formatting
/// stays with the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Mils,
    Degrees,
}

impl AngleUnit {
    /// Express an angle given in radians in this unit.
    pub fn from_rad(self, rad: f64) -> f64 {
        match self {
            AngleUnit::Mils => rad_to_mil(rad),
            AngleUnit::Degrees => rad_to_deg(rad),
        }
    }

    /// Convert a value in this unit back to radians.
    pub fn to_rad(self, value: f64) -> f64 {
        match self {
            AngleUnit::Mils => mil_to_rad(value),
            AngleUnit::Degrees => deg_to_rad(value),
        }
    }
}

/* -------------------------------- tests -------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mils_cover_full_circle() {
        assert_relative_eq!(rad_to_mil(2.0 * PI), 6400.0, epsilon = 1e-9);
        assert_relative_eq!(deg_to_mil(90.0), 1600.0, epsilon = 1e-9);
        assert_relative_eq!(mil_to_deg(800.0), 45.0, epsilon = 1e-9);
        assert_relative_eq!(mil_to_rad(rad_to_mil(0.7)), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn moa_conversion() {
        assert_relative_eq!(moa_to_deg(50.0), 50.0 / 60.0);
        assert_relative_eq!(moa_to_rad(60.0), 1.0_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn normalize_wraps_into_compass_range() {
        assert_relative_eq!(normalize_deg(-90.0), 270.0);
        assert_relative_eq!(normalize_deg(360.0), 0.0);
        assert_relative_eq!(normalize_deg(725.0), 5.0, epsilon = 1e-9);
        assert!(normalize_deg(-1e-18) < 360.0);
    }

    #[test]
    fn angle_unit_round_trip() {
        for unit in [AngleUnit::Mils, AngleUnit::Degrees] {
            assert_relative_eq!(unit.to_rad(unit.from_rad(1.1)), 1.1, epsilon = 1e-12);
        }
        assert_relative_eq!(AngleUnit::Degrees.from_rad(PI / 4.0), 45.0, epsilon = 1e-12);
    }
}
