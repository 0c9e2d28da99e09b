//! Read-only aggregation over one or more firing solutions on the same target:
//! damage rings, reachability, and the weapon's range rings.

use artillery_core::EngineConfig;
use artillery_models::{ArcKind, WeaponProfile};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{ArcSolution, FiringSolution};

/// An ellipse on the ground, semi-axes in meters, major axis along `tilt_deg`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Footprint {
    pub semi_major_m: f64,
    pub semi_minor_m: f64,
    pub tilt_deg: f64,
}

impl Footprint {
    pub fn circle(radius_m: f64) -> Self {
        Self { semi_major_m: radius_m, semi_minor_m: radius_m, tilt_deg: 0.0 }
    }

    pub fn is_circle(&self) -> bool {
        self.semi_major_m == self.semi_minor_m
    }
}

/// 100% and 25% damage rings around the aim point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DamageFootprint {
    pub hundred: Footprint,
    pub twenty_five: Footprint,
}

/// Damage rings for the shots laid on one target.
///
/// Each entry is a solution plus the arc its weapon is laid on. Shots without a
/// valid arc are ignored; with none left the result is `None`. When
/// `include_spread` is set the rings are grown by the spread ellipse: a single
/// shot keeps its ellipse and bearing, several shots collapse into one circle
/// sized by the largest semi-axis among them.
pub fn damage_footprint(
    shots: &[(&FiringSolution, ArcKind)],
    profile: &WeaponProfile,
    include_spread: bool,
) -> Option<DamageFootprint> {
    let valid: Vec<&ArcSolution> = shots
        .iter()
        .filter_map(|(solution, kind)| solution.arc(*kind).as_ref().ok())
        .collect();

    let r100 = profile.hundred_damage_radius_m;
    let r25 = profile.twenty_five_damage_radius_m;

    let base = match valid.as_slice() {
        [] => return None,
        _ if !include_spread => Footprint::circle(0.0),
        [only] => Footprint {
            semi_major_m: only.dispersion.semi_major_m,
            semi_minor_m: only.dispersion.semi_minor_m,
            tilt_deg: only.dispersion.tilt_deg,
        },
        many => Footprint::circle(
            many.iter()
                .map(|arc| arc.dispersion.largest_semi_axis())
                .fold(0.0, f64::max),
        ),
    };

    let grow = |r: f64| Footprint {
        semi_major_m: base.semi_major_m + r,
        semi_minor_m: base.semi_minor_m + r,
        tilt_deg: base.tilt_deg,
    };
    Some(DamageFootprint { hundred: grow(r100), twenty_five: grow(r25) })
}

/// Whether any weapon laid on a target has a valid shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TargetStatus {
    Reachable,
    Unreachable,
}

pub fn target_status(solutions: &[&FiringSolution]) -> TargetStatus {
    if solutions.iter().any(|s| s.is_reachable()) {
        TargetStatus::Reachable
    } else {
        TargetStatus::Unreachable
    }
}

/// Weapon min/max range circles in map units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RangeRings {
    /// `None` when the weapon has no minimum range
    pub min_map: Option<f64>,
    pub max_map: f64,
}

pub fn range_rings(profile: &WeaponProfile, config: &EngineConfig) -> RangeRings {
    let min = config.m_to_map(profile.min_range_m);
    RangeRings {
        min_map: (min > 0.0).then_some(min),
        max_map: config.m_to_map(profile.max_range_m),
    }
}
