//! Ground positions in map units and weapon/target emplacements.
//!
//! Conventions:
//! - x grows towards map east, y grows towards map **south** (screen coords),
//!   so "north" on the map is -y.
//! - Elevations and height offsets are meters; x/y are map units. Use
//!   `EngineConfig::map_to_m` to convert planar distances.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::Heightmap;

/// Largest height offset an emplacement may claim above its terrain [m]
pub const MAX_HEIGHT_OFFSET_M: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other` in map units
    pub fn delta_to(&self, other: &Position) -> Vector2<f64> {
        Vector2::new(other.x - self.x, other.y - self.y)
    }

    pub fn map_distance_to(&self, other: &Position) -> f64 {
        self.delta_to(other).norm()
    }

    /// Point at fraction `t` (0..=1) of the segment self -> other
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        let d = self.delta_to(other) * t;
        Position::new(self.x + d.x, self.y + d.y)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

/// A position plus the altitude the engine needs for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Emplacement {
    pub position: Position,
    /// Terrain elevation under the position [m]
    pub elevation_m: f64,
    /// Extra height above terrain (roof, ridge) [m], within [0, 100]
    pub height_offset_m: f64,
}

impl Emplacement {
    pub fn new(position: Position, elevation_m: f64) -> Self {
        Self { position, elevation_m, height_offset_m: 0.0 }
    }

    /// Builder-style offset; values outside [0, 100] are clamped and NaN becomes 0.
    #[must_use]
    pub fn with_height_offset(mut self, offset_m: f64) -> Self {
        self.height_offset_m = clamp_offset(offset_m);
        self
    }

    /// Look the baseline elevation up in a heightmap. Off-map positions sit at 0 m.
    pub fn on_terrain<H: Heightmap + ?Sized>(position: Position, heightmap: &H) -> Self {
        let elevation_m = heightmap.elevation_at(&position).unwrap_or(0.0);
        Self::new(position, elevation_m)
    }

    /// Absolute altitude of the emplacement (baseline + offset) [m]
    pub fn altitude_m(&self) -> f64 {
        self.elevation_m + clamp_offset(self.height_offset_m)
    }
}

fn clamp_offset(offset_m: f64) -> f64 {
    if offset_m.is_nan() {
        return 0.0;
    }
    offset_m.clamp(0.0, MAX_HEIGHT_OFFSET_M)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatTerrain;
    use approx::assert_relative_eq;

    #[test]
    fn distance_and_delta() {
        let a = Position::new(10.0, 10.0);
        let b = Position::new(13.0, 14.0);
        assert_relative_eq!(a.map_distance_to(&b), 5.0);
        let d = a.delta_to(&b);
        assert_eq!((d.x, d.y), (3.0, 4.0));
        assert_eq!(a.lerp(&b, 0.5), Position::new(11.5, 12.0));
    }

    #[test]
    fn height_offset_is_clamped() {
        let p = Position::new(0.0, 0.0);
        assert_eq!(Emplacement::new(p, 20.0).with_height_offset(250.0).altitude_m(), 120.0);
        assert_eq!(Emplacement::new(p, 20.0).with_height_offset(-5.0).altitude_m(), 20.0);
        assert_eq!(Emplacement::new(p, 20.0).with_height_offset(f64::NAN).height_offset_m, 0.0);

        // Fields are public: altitude still honours the bound if set directly.
        let raw = Emplacement { position: p, elevation_m: 0.0, height_offset_m: 500.0 };
        assert_eq!(raw.altitude_m(), MAX_HEIGHT_OFFSET_M);
    }

    #[test]
    fn on_terrain_reads_heightmap() {
        let e = Emplacement::on_terrain(Position::new(4.0, 2.0), &FlatTerrain::new(37.5));
        assert_eq!(e.elevation_m, 37.5);
        assert_eq!(e.height_offset_m, 0.0);

        let off_map = |_: &Position| -> Option<f64> { None };
        assert_eq!(Emplacement::on_terrain(Position::new(1.0, 1.0), &off_map).elevation_m, 0.0);
    }
}
