//! Heightmap collaborator.
//!
//! The engine never owns terrain data. Callers hand in anything implementing
//! [`Heightmap`]; the trait's provided `terrain_profile` steps along the
//! straight ground segment between two positions, the way the map front end
//! builds its height path for the flight simulation.

use serde::{Deserialize, Serialize};

use crate::{CoreError, EngineConfig, Position};

/// Default spacing between profile samples along the ground track [m]
pub const DEFAULT_PROFILE_STEP_M: f64 = 10.0;

/// Upper bound on profile samples; longer segments get a wider step.
pub const MAX_PROFILE_STEPS: usize = 10_000;

/// Terrain altitude at a horizontal distance from the segment start.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub distance_m: f64,
    pub altitude_m: f64,
}

impl ProfilePoint {
    pub const fn new(distance_m: f64, altitude_m: f64) -> Self {
        Self { distance_m, altitude_m }
    }
}

pub trait Heightmap {
    /// Terrain elevation [m] under a map position, `None` when off-map.
    fn elevation_at(&self, position: &Position) -> Option<f64>;

    /// Spacing used by [`Heightmap::terrain_profile`] [m]
    fn profile_step_m(&self) -> f64 {
        DEFAULT_PROFILE_STEP_M
    }

    /// Ordered (distance, altitude) pairs along `from -> to`, distance in meters.
    ///
    /// Off-map samples are skipped, so the result may be shorter than the step
    /// count or empty. A zero-length segment yields at most one point. At most
    /// [`MAX_PROFILE_STEPS`] + 1 points are produced.
    fn terrain_profile(&self, from: &Position, to: &Position, config: &EngineConfig) -> Vec<ProfilePoint> {
        let length_m = config.map_to_m(from.map_distance_to(to));
        #[allow(clippy::cast_precision_loss)]
        let step = self.profile_step_m().max(1e-3).max(length_m / MAX_PROFILE_STEPS as f64);

        if !length_m.is_finite() || length_m <= 0.0 {
            return self
                .elevation_at(from)
                .map(|alt| vec![ProfilePoint::new(0.0, alt)])
                .unwrap_or_default();
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = ((length_m / step).ceil().max(1.0) as usize).min(MAX_PROFILE_STEPS);
        let mut out = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / steps as f64;
            if let Some(alt) = self.elevation_at(&from.lerp(to, t)) {
                out.push(ProfilePoint::new(length_m * t, alt));
            }
        }
        log::trace!("terrain profile: {:.1} m, {} of {} samples on map", length_m, out.len(), steps + 1);
        out
    }
}

impl<F> Heightmap for F
where
    F: Fn(&Position) -> Option<f64>,
{
    fn elevation_at(&self, position: &Position) -> Option<f64> {
        self(position)
    }
}

/// Level ground at a fixed altitude, everywhere on the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatTerrain {
    pub altitude_m: f64,
}

impl FlatTerrain {
    pub const fn new(altitude_m: f64) -> Self {
        Self { altitude_m }
    }
}

impl Heightmap for FlatTerrain {
    fn elevation_at(&self, _position: &Position) -> Option<f64> {
        Some(self.altitude_m)
    }
}

/// Regular grid of altitudes anchored at map (0, 0).
///
/// `altitudes` is row-major: row `r` covers y = r * cell_size, column `c`
/// covers x = c * cell_size. Elevation between nodes is bilinear.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridHeightmapDoc")]
pub struct GridHeightmap {
    width: usize,
    height: usize,
    cell_size: f64,
    altitudes: Vec<f64>,
    profile_step_m: f64,
}

fn default_step() -> f64 {
    DEFAULT_PROFILE_STEP_M
}

// Wire shape of a grid; every document goes through `GridHeightmap::new`.
#[derive(Deserialize)]
struct GridHeightmapDoc {
    width: usize,
    height: usize,
    cell_size: f64,
    altitudes: Vec<f64>,
    #[serde(default = "default_step")]
    profile_step_m: f64,
}

impl TryFrom<GridHeightmapDoc> for GridHeightmap {
    type Error = CoreError;

    fn try_from(doc: GridHeightmapDoc) -> Result<Self, Self::Error> {
        Ok(Self::new(doc.width, doc.height, doc.cell_size, doc.altitudes)?.with_profile_step(doc.profile_step_m))
    }
}

impl GridHeightmap {
    pub fn new(width: usize, height: usize, cell_size: f64, altitudes: Vec<f64>) -> Result<Self, CoreError> {
        let expected = width.saturating_mul(height);
        if width < 2 || height < 2 || altitudes.len() != expected {
            return Err(CoreError::GridShape { width, height, expected, actual: altitudes.len() });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(CoreError::InvalidCellSize(cell_size));
        }
        Ok(Self { width, height, cell_size, altitudes, profile_step_m: DEFAULT_PROFILE_STEP_M })
    }

    /// Change the profile spacing (meters); non-positive values are ignored.
    #[must_use]
    pub fn with_profile_step(mut self, step_m: f64) -> Self {
        if step_m.is_finite() && step_m > 0.0 {
            self.profile_step_m = step_m;
        }
        self
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn cell_size(&self) -> f64 { self.cell_size }

    fn node(&self, col: usize, row: usize) -> f64 {
        self.altitudes[row * self.width + col]
    }
}

impl Heightmap for GridHeightmap {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn elevation_at(&self, position: &Position) -> Option<f64> {
        let gx = position.x / self.cell_size;
        let gy = position.y / self.cell_size;
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        if !(0.0..=max_x).contains(&gx) || !(0.0..=max_y).contains(&gy) {
            return None;
        }

        // Keep the cell index one short of the far edge so (c+1, r+1) exists.
        let c = (gx.floor() as usize).min(self.width - 2);
        let r = (gy.floor() as usize).min(self.height - 2);
        let fx = gx - c as f64;
        let fy = gy - r as f64;

        let top = self.node(c, r) * (1.0 - fx) + self.node(c + 1, r) * fx;
        let bottom = self.node(c, r + 1) * (1.0 - fx) + self.node(c + 1, r + 1) * fx;
        Some(top * (1.0 - fy) + bottom * fy)
    }

    fn profile_step_m(&self) -> f64 {
        self.profile_step_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> GridHeightmap {
        // 3x3 grid, 10 map units per cell, altitude grows with x
        GridHeightmap::new(3, 3, 10.0, vec![
            0.0, 10.0, 20.0,
            0.0, 10.0, 20.0,
            0.0, 10.0, 20.0,
        ])
        .unwrap()
    }

    #[test]
    fn grid_rejects_bad_shape() {
        assert!(matches!(
            GridHeightmap::new(3, 3, 10.0, vec![0.0; 8]),
            Err(CoreError::GridShape { expected: 9, actual: 8, .. })
        ));
        assert!(GridHeightmap::new(1, 4, 10.0, vec![0.0; 4]).is_err());
        assert_eq!(
            GridHeightmap::new(2, 2, 0.0, vec![0.0; 4]),
            Err(CoreError::InvalidCellSize(0.0))
        );
    }

    #[test]
    fn grid_interpolates_bilinearly() {
        let g = ramp();
        assert_relative_eq!(g.elevation_at(&Position::new(5.0, 5.0)).unwrap(), 5.0);
        assert_relative_eq!(g.elevation_at(&Position::new(20.0, 20.0)).unwrap(), 20.0);
        assert_relative_eq!(g.elevation_at(&Position::new(15.0, 3.0)).unwrap(), 15.0);
        assert_eq!(g.elevation_at(&Position::new(-0.1, 5.0)), None);
        assert_eq!(g.elevation_at(&Position::new(5.0, 20.5)), None);
    }

    #[test]
    fn profile_steps_along_segment() {
        let g = ramp().with_profile_step(5.0);
        let cfg = EngineConfig::default();
        let profile = g.terrain_profile(&Position::new(0.0, 10.0), &Position::new(20.0, 10.0), &cfg);
        assert_eq!(profile.len(), 5);
        assert_relative_eq!(profile[0].distance_m, 0.0);
        assert_relative_eq!(profile[4].distance_m, 20.0);
        for p in &profile {
            // altitude equals x on this ramp
            assert_relative_eq!(p.altitude_m, p.distance_m, epsilon = 1e-9);
        }
    }

    #[test]
    fn profile_uses_meters_not_map_units() {
        let flat = FlatTerrain::new(3.0);
        let cfg = EngineConfig::with_scale(0.5); // 1 m = 0.5 map units
        let profile = flat.terrain_profile(&Position::new(0.0, 0.0), &Position::new(0.0, 50.0), &cfg);
        assert_relative_eq!(profile.last().unwrap().distance_m, 100.0);
        assert_eq!(profile.len(), 11);
    }

    #[test]
    fn profile_edge_cases() {
        let cfg = EngineConfig::default();
        let p = Position::new(1.0, 1.0);
        assert_eq!(FlatTerrain::new(2.0).terrain_profile(&p, &p, &cfg), vec![ProfilePoint::new(0.0, 2.0)]);

        let nowhere = |_: &Position| -> Option<f64> { None };
        assert!(nowhere.terrain_profile(&p, &Position::new(100.0, 1.0), &cfg).is_empty());

        // off-map half of the segment is dropped
        let profile = ramp().terrain_profile(&Position::new(0.0, 0.0), &Position::new(40.0, 0.0), &cfg);
        assert!(profile.iter().all(|pt| pt.distance_m <= 20.0 + 1e-9));
        assert_eq!(profile.len(), 3);
    }

    #[test]
    fn grid_documents_are_validated() {
        let short = r#"{"width":3,"height":3,"cell_size":10.0,"altitudes":[0.0,1.0]}"#;
        assert!(serde_json::from_str::<GridHeightmap>(short).is_err());
        let no_width = r#"{"width":0,"height":3,"cell_size":10.0,"altitudes":[]}"#;
        assert!(serde_json::from_str::<GridHeightmap>(no_width).is_err());

        let g: GridHeightmap = serde_json::from_str(&serde_json::to_string(&ramp()).unwrap()).unwrap();
        assert_eq!(g, ramp());
        assert_relative_eq!(g.elevation_at(&Position::new(15.0, 15.0)).unwrap(), 15.0);
    }

    #[test]
    fn long_segments_are_capped() {
        let cfg = EngineConfig::default();
        let to = Position::new(1e12, 0.0);
        let profile = FlatTerrain::new(0.0).terrain_profile(&Position::new(0.0, 0.0), &to, &cfg);
        assert_eq!(profile.len(), MAX_PROFILE_STEPS + 1);
        assert_relative_eq!(profile.last().unwrap().distance_m, 1e12);
    }
}
