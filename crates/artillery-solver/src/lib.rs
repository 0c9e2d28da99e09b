//! artillery-solver
//!
//! Closed-form firing solutions for indirect-fire weapons.
//! - Planar distance (map units -> meters) and compass bearing from firer to target.
//! - Height difference between emplacements (firer height offset included).
//! - Both real roots of the elevation equation: High and Low arc.
//! - Time of flight per arc and a spread ellipse derived from the weapon's MOA.
//!
//! Maths (no drag, flat earth):
//!   h = d·tanθ − g·d² / (2·v²·cos²θ)
//!   ⇒ g·d²·T² − 2·v²·d·T + (g·d² + 2·h·v²) = 0,  T = tanθ
//!   ⇒ T = (v² ± √(v⁴ − g·(g·d² + 2·h·v²))) / (g·d)
//!
//! Conventions:
//! - Map y grows towards south; bearing 0° = map north, clockwise.
//! - Elevations are measured from the horizontal, positive up.
//! - An arc either exists completely (angle, time of flight, spread) or is a
//!   [`NoSolution`] value. Nothing here panics or returns an error: every input,
//!   however degenerate, gives an inspectable [`FiringSolution`].

use artillery_core::{moa_to_rad, normalize_deg, rad_to_mil};

pub use artillery_core::{AngleUnit, Emplacement, EngineConfig, Position};
pub use artillery_models::{ArcKind, DispersionModel, WeaponProfile};

pub mod footprint;

pub use footprint::{damage_footprint, range_rings, target_status, DamageFootprint, Footprint, RangeRings, TargetStatus};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Laying angle in the three units a sight may use.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Elevation {
    pub rad: f64,
    pub deg: f64,
    pub mil: f64,
}

impl Elevation {
    pub fn from_rad(rad: f64) -> Self {
        Self { rad, deg: rad.to_degrees(), mil: rad_to_mil(rad) }
    }

    pub fn in_unit(&self, unit: AngleUnit) -> f64 {
        match unit {
            AngleUnit::Mils => self.mil,
            AngleUnit::Degrees => self.deg,
        }
    }
}

/// Modeled impact scatter around the aim point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DispersionEllipse {
    /// Half-length along the line of fire [m]
    pub semi_major_m: f64,
    /// Half-length across the line of fire [m]
    pub semi_minor_m: f64,
    /// Orientation of the major axis: the firing bearing [deg]
    pub tilt_deg: f64,
}

impl DispersionEllipse {
    pub fn largest_semi_axis(&self) -> f64 {
        self.semi_major_m.max(self.semi_minor_m)
    }

    pub fn area_m2(&self) -> f64 {
        std::f64::consts::PI * self.semi_major_m * self.semi_minor_m
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ArcSolution {
    pub kind: ArcKind,
    pub elevation: Elevation,
    pub time_of_flight_s: f64,
    pub dispersion: DispersionEllipse,
}

/// Why an arc has no valid shot. This is a result, not a failure: callers
/// render it (e.g. as `---`) and never retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoSolution {
    /// Negative discriminant: the velocity cannot reach this (distance, height).
    OutOfEnvelope,
    BelowMinRange,
    BeyondMaxRange,
    /// Firer and target coincide, or the arc is (numerically) vertical.
    Degenerate,
    /// The root exists but the mount cannot lay that elevation.
    MountLimit,
}

impl NoSolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoSolution::OutOfEnvelope => "out_of_envelope",
            NoSolution::BelowMinRange => "below_min_range",
            NoSolution::BeyondMaxRange => "beyond_max_range",
            NoSolution::Degenerate => "degenerate",
            NoSolution::MountLimit => "mount_limit",
        }
    }
}

impl std::fmt::Display for NoSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type ArcResult = Result<ArcSolution, NoSolution>;

/// Everything needed to lay one weapon on one target. Recomputed on every input
/// change, never patched in place.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FiringSolution {
    pub distance_m: f64,
    pub bearing_deg: f64,
    /// Target altitude minus firer altitude (offset included) [m]
    pub height_diff_m: f64,
    /// Launch altitude: firer terrain + height offset [m]
    pub firer_altitude_m: f64,
    pub velocity_mps: f64,
    /// Effective gravity for the projectile [m/s²]
    pub gravity_mps2: f64,
    pub high: ArcResult,
    pub low: ArcResult,
}

impl FiringSolution {
    pub fn arc(&self, kind: ArcKind) -> &ArcResult {
        match kind {
            ArcKind::High => &self.high,
            ArcKind::Low => &self.low,
        }
    }

    /// The arc the weapon is normally laid on.
    pub fn preferred(&self, profile: &WeaponProfile) -> &ArcResult {
        self.arc(profile.preferred_arc)
    }

    pub fn is_reachable(&self) -> bool {
        self.high.is_ok() || self.low.is_ok()
    }

    /// First reason found when neither arc is valid.
    pub fn rejection(&self) -> Option<NoSolution> {
        match (&self.high, &self.low) {
            (Err(reason), Err(_)) => Some(*reason),
            _ => None,
        }
    }
}

/// Which side of the apex the projectile meets the target's height on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Branch {
    Ascending,
    Descending,
}

/// Compute a full firing solution for `profile` from `firer` onto `target`.
pub fn solve(
    firer: &Emplacement,
    target: &Emplacement,
    profile: &WeaponProfile,
    config: &EngineConfig,
) -> FiringSolution {
    let distance = distance_m(&firer.position, &target.position, config);
    let bearing = bearing_deg(&firer.position, &target.position);
    let height_diff = height_diff_m(firer, target);
    let g = profile.gravity(config.gravity_mps2);
    let v = profile.velocity_mps;

    let (high, low) = match envelope_check(distance, height_diff, v, g, profile) {
        Ok((low_rad, high_rad)) => {
            let arc = |kind, theta| build_arc(kind, theta, distance, height_diff, bearing, v, g, profile, config);
            (arc(ArcKind::High, high_rad), arc(ArcKind::Low, low_rad))
        }
        Err(reason) => (Err(reason), Err(reason)),
    };

    let solution = FiringSolution {
        distance_m: distance,
        bearing_deg: bearing,
        height_diff_m: height_diff,
        firer_altitude_m: firer.altitude_m(),
        velocity_mps: v,
        gravity_mps2: g,
        high,
        low,
    };

    if let Some(reason) = solution.rejection() {
        log::debug!(
            "no firing solution for `{}`: {} (distance {:.1} m, height diff {:.1} m)",
            profile.id, reason, distance, height_diff
        );
    }
    solution
}

/// Planar firer→target distance in meters.
pub fn distance_m(firer: &Position, target: &Position, config: &EngineConfig) -> f64 {
    config.map_to_m(firer.map_distance_to(target))
}

/// Compass bearing in [0, 360). Coincident points report 0.
pub fn bearing_deg(firer: &Position, target: &Position) -> f64 {
    let delta = firer.delta_to(target);
    if delta.x == 0.0 && delta.y == 0.0 {
        return 0.0;
    }
    // map north is -y, so atan2(east, north) = atan2(dx, -dy)
    normalize_deg(delta.x.atan2(-delta.y).to_degrees())
}

/// Signed target-minus-firer altitude; never returns negative zero.
pub fn height_diff_m(firer: &Emplacement, target: &Emplacement) -> f64 {
    let diff = target.altitude_m() - firer.altitude_m();
    if diff == 0.0 { 0.0 } else { diff }
}

/// Both elevation roots `(low, high)` in radians for distance `d`, height
/// difference `h`, velocity `v` and gravity `g`.
pub fn elevation_roots(d: f64, h: f64, v: f64, g: f64) -> Result<(f64, f64), NoSolution> {
    if !(d.is_finite() && d > 0.0) || !(v > 0.0 && g > 0.0) || !h.is_finite() {
        return Err(NoSolution::Degenerate);
    }
    let v2 = v * v;
    let disc = v2 * v2 - g * (g * d * d + 2.0 * h * v2);
    if disc.is_nan() || disc < 0.0 {
        return Err(NoSolution::OutOfEnvelope);
    }
    let root = disc.sqrt();
    let gd = g * d;
    let low = ((v2 - root) / gd).atan();
    let high = ((v2 + root) / gd).atan();
    log::trace!("elevation roots d={d:.2} h={h:.2} v={v:.2} g={g:.3}: low {low:.5} rad, high {high:.5} rad");
    Ok((low, high))
}

/// Horizontal distance at which an arc laid at `elevation_rad` passes height
/// `h` on the given branch, or `None` if it never gets that high.
pub fn reproject_distance(elevation_rad: f64, v: f64, g: f64, h: f64, branch: Branch) -> Option<f64> {
    let (s, c) = elevation_rad.sin_cos();
    if c <= 0.0 || v <= 0.0 || g <= 0.0 {
        return None;
    }
    let q = s * s - 2.0 * g * h / (v * v);
    if q < 0.0 {
        return None;
    }
    let root = q.sqrt();
    let x = match branch {
        Branch::Ascending => v * v * c * (s - root) / g,
        Branch::Descending => v * v * c * (s + root) / g,
    };
    (x >= 0.0).then_some(x)
}

/// Branch an arc is on when it meets the target at distance `d`.
pub fn branch_at(elevation_rad: f64, d: f64, v: f64, g: f64) -> Branch {
    let (s, c) = elevation_rad.sin_cos();
    let apex_x = v * v * s * c / g;
    if d < apex_x { Branch::Ascending } else { Branch::Descending }
}

/// t = d / (v·cosθ), or `None` for a vertical arc.
pub fn time_of_flight(d: f64, elevation_rad: f64, v: f64, vertical_epsilon: f64) -> Option<f64> {
    let c = elevation_rad.cos();
    if c.abs() < vertical_epsilon || v <= 0.0 {
        return None;
    }
    Some(d / (v * c))
}

/* ------------------------------- internals ------------------------------- */

// Rejections that apply to both arcs: geometry, range envelope, discriminant.
fn envelope_check(d: f64, h: f64, v: f64, g: f64, profile: &WeaponProfile) -> Result<(f64, f64), NoSolution> {
    if !(d.is_finite() && d > 0.0) {
        return Err(NoSolution::Degenerate);
    }
    if d < profile.min_range_m {
        return Err(NoSolution::BelowMinRange);
    }
    if d > profile.max_range_m {
        return Err(NoSolution::BeyondMaxRange);
    }
    elevation_roots(d, h, v, g)
}

#[allow(clippy::too_many_arguments)]
fn build_arc(
    kind: ArcKind,
    theta: f64,
    d: f64,
    h: f64,
    bearing: f64,
    v: f64,
    g: f64,
    profile: &WeaponProfile,
    config: &EngineConfig,
) -> ArcResult {
    let tof = time_of_flight(d, theta, v, config.vertical_epsilon).ok_or(NoSolution::Degenerate)?;
    let elevation = Elevation::from_rad(theta);
    if !profile.mount_allows(elevation.deg) {
        return Err(NoSolution::MountLimit);
    }
    Ok(ArcSolution {
        kind,
        elevation,
        time_of_flight_s: tof,
        dispersion: dispersion_ellipse(kind, theta, d, h, bearing, v, g, profile),
    })
}

// MOA cone -> ellipse. Lateral axis: cone width at slant range. Along-range
// axis: spread of impact distances between θ-α and θ+α on the same branch.
#[allow(clippy::too_many_arguments)]
fn dispersion_ellipse(
    kind: ArcKind,
    theta: f64,
    d: f64,
    h: f64,
    bearing: f64,
    v: f64,
    g: f64,
    profile: &WeaponProfile,
) -> DispersionEllipse {
    let gains = &profile.dispersion;
    let half_angle = moa_to_rad(profile.moa) / 2.0;
    let slant = d.hypot(h);

    let lateral = gains.lateral_gain * slant * half_angle.tan();

    let branch = branch_at(theta, d, v, g);
    let short = reproject_distance(theta - half_angle, v, g, h, branch);
    let long = reproject_distance(theta + half_angle, v, g, h, branch);
    let along = gains.range_gain
        * match (short, long) {
            (Some(a), Some(b)) => (a - b).abs() / 2.0,
            (Some(x), None) | (None, Some(x)) => (x - d).abs(),
            (None, None) => 0.0,
        };

    let arc_gain = gains.arc_gain(kind);
    DispersionEllipse {
        semi_major_m: along.max(lateral) * arc_gain,
        semi_minor_m: lateral * arc_gain,
        tilt_deg: bearing,
    }
}

/* ----------------------------------- tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn test_weapon() -> WeaponProfile {
        WeaponProfile {
            id: "test".into(),
            name: "Test Mortar".into(),
            velocity_mps: 109.890938,
            gravity_scale: 1.0,
            min_range_m: 50.0,
            max_range_m: 1230.0,
            moa: 50.0,
            hundred_damage_radius_m: 6.7,
            twenty_five_damage_radius_m: 15.5,
            angle_unit: AngleUnit::Mils,
            preferred_arc: ArcKind::High,
            mount_limits_deg: None,
            dispersion: DispersionModel::default(),
        }
    }

    fn at(x: f64, y: f64, elevation: f64) -> Emplacement {
        Emplacement::new(Position::new(x, y), elevation)
    }

    #[test]
    fn bearing_follows_map_compass() {
        let o = Position::new(100.0, 100.0);
        assert_abs_diff_eq!(bearing_deg(&o, &Position::new(100.0, 0.0)), 0.0);
        assert_abs_diff_eq!(bearing_deg(&o, &Position::new(200.0, 100.0)), 90.0);
        assert_abs_diff_eq!(bearing_deg(&o, &Position::new(100.0, 200.0)), 180.0);
        assert_abs_diff_eq!(bearing_deg(&o, &Position::new(0.0, 100.0)), 270.0);
        assert_abs_diff_eq!(bearing_deg(&o, &Position::new(200.0, 0.0)), 45.0, epsilon = 1e-12);
        assert_eq!(bearing_deg(&o, &o), 0.0);
    }

    #[test]
    fn distance_uses_map_scale() {
        let cfg = EngineConfig::with_scale(0.5);
        assert_relative_eq!(distance_m(&Position::new(0.0, 0.0), &Position::new(30.0, 40.0), &cfg), 100.0);
    }

    #[test]
    fn height_diff_includes_offset_and_has_no_negative_zero() {
        let firer = at(0.0, 0.0, 40.0).with_height_offset(10.0);
        assert_eq!(height_diff_m(&firer, &at(1.0, 0.0, 30.0)), -20.0);
        let flat = height_diff_m(&at(0.0, 0.0, 0.0), &at(1.0, 0.0, -0.0));
        assert_eq!(flat, 0.0);
        assert!(flat.is_sign_positive());
    }

    #[test]
    fn flat_ground_solution() {
        let w = test_weapon();
        let s = solve(&at(0.0, 0.0, 0.0), &at(0.0, -800.0, 0.0), &w, &EngineConfig::default());
        assert_relative_eq!(s.distance_m, 800.0);
        assert_abs_diff_eq!(s.bearing_deg, 0.0);

        let high = s.high.unwrap();
        let low = s.low.unwrap();
        // complementary on flat ground
        assert_relative_eq!(high.elevation.deg + low.elevation.deg, 90.0, epsilon = 1e-9);
        assert!(high.elevation.deg > 45.0 && low.elevation.deg < 45.0);
        assert!(high.time_of_flight_s > low.time_of_flight_s);
        assert_relative_eq!(high.elevation.mil, rad_to_mil(high.elevation.rad));
        assert_eq!(high.elevation.in_unit(AngleUnit::Degrees), high.elevation.deg);
    }

    #[test]
    fn envelope_rejections() {
        let w = test_weapon();
        let cfg = EngineConfig::default();
        let firer = at(0.0, 0.0, 0.0);

        let near = solve(&firer, &at(10.0, 0.0, 0.0), &w, &cfg);
        assert_eq!(near.rejection(), Some(NoSolution::BelowMinRange));
        let far = solve(&firer, &at(2000.0, 0.0, 0.0), &w, &cfg);
        assert_eq!((far.high, far.low), (Err(NoSolution::BeyondMaxRange), Err(NoSolution::BeyondMaxRange)));

        // in range, but a 400 m climb at 1200 m is more than v can deliver
        let uphill = solve(&firer, &at(1200.0, 0.0, 400.0), &w, &cfg);
        assert_eq!(uphill.rejection(), Some(NoSolution::OutOfEnvelope));
        assert!(!uphill.is_reachable());
    }

    #[test]
    fn coincident_positions_are_degenerate() {
        let mut w = test_weapon();
        w.min_range_m = 0.0;
        let s = solve(&at(5.0, 5.0, 0.0), &at(5.0, 5.0, 0.0), &w, &EngineConfig::default());
        assert_eq!(s.high, Err(NoSolution::Degenerate));
        assert_eq!(s.low, Err(NoSolution::Degenerate));
        assert_eq!(s.bearing_deg, 0.0);
    }

    #[test]
    fn mount_limits_reject_single_arc() {
        let mut w = test_weapon();
        w.mount_limits_deg = Some((45.0, 89.0));
        let s = solve(&at(0.0, 0.0, 0.0), &at(600.0, 0.0, 0.0), &w, &EngineConfig::default());
        assert!(s.high.is_ok());
        assert_eq!(s.low, Err(NoSolution::MountLimit));
        assert!(s.is_reachable());
        assert_eq!(s.rejection(), None);
        assert!(s.preferred(&w).is_ok());
    }

    #[test]
    fn roots_reproject_on_slopes() {
        let (v, g) = (109.890938, 9.8);
        for &(d, h) in &[(300.0, 0.0), (900.0, -60.0), (700.0, 80.0), (150.0, 120.0)] {
            let (low, high) = elevation_roots(d, h, v, g).unwrap();
            assert!(high >= low);
            for theta in [low, high] {
                let x = reproject_distance(theta, v, g, h, branch_at(theta, d, v, g)).unwrap();
                assert_abs_diff_eq!(x, d, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn time_of_flight_guards_vertical() {
        assert_eq!(time_of_flight(100.0, std::f64::consts::FRAC_PI_2, 50.0, 1e-9), None);
        assert_relative_eq!(time_of_flight(100.0, 0.0, 50.0, 1e-9).unwrap(), 2.0);
    }

    #[test]
    fn spread_grows_with_range_and_arc() {
        let w = test_weapon();
        let cfg = EngineConfig::default();
        let firer = at(0.0, 0.0, 0.0);
        let short = solve(&firer, &at(300.0, 0.0, 0.0), &w, &cfg).high.unwrap().dispersion;
        let long = solve(&firer, &at(900.0, 0.0, 0.0), &w, &cfg).high.unwrap().dispersion;
        assert!(long.semi_minor_m > short.semi_minor_m);

        let s = solve(&firer, &at(700.0, 0.0, 0.0), &w, &cfg);
        let (hi, lo) = (s.high.unwrap().dispersion, s.low.unwrap().dispersion);
        assert!(hi.area_m2() > lo.area_m2());
        assert!(hi.semi_major_m >= hi.semi_minor_m);
        assert_eq!(hi.tilt_deg, s.bearing_deg);
    }

    #[test]
    fn zero_moa_means_no_spread() {
        let mut w = test_weapon();
        w.moa = 0.0;
        let arc = solve(&at(0.0, 0.0, 0.0), &at(500.0, 0.0, 0.0), &w, &EngineConfig::default())
            .low
            .unwrap();
        assert_abs_diff_eq!(arc.dispersion.semi_major_m, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.dispersion.semi_minor_m, 0.0);
    }
}
