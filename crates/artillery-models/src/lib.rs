//! artillery-models
//!
//! Per-weapon ballistic constants used by the solver:
//!
//!   - muzzle velocity and gravity scale (the game lets some projectiles fall
//!     faster than others),
//!   - minimum / maximum range envelope,
//!   - angular dispersion in MOA and the tuning gains that turn it into a
//!     spread ellipse,
//!   - 100% / 25% damage radii,
//!   - sight graduation (degrees or mils), preferred arc and mount limits.
//!
//! Profiles are immutable once loaded. The built-in catalog mirrors the game's
//! indirect-fire weapons; a JSON document can replace it.
//!
//! Exports:
//!   - `WeaponProfile`, `DispersionModel`, `ArcKind`
//!   - `WeaponCatalog::builtin()`, `WeaponCatalog::from_json_str(..)`

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use artillery_core::AngleUnit;

/// One of the two roots of the elevation equation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcKind {
    #[default]
    High,
    Low,
}

impl ArcKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArcKind::High => "high",
            ArcKind::Low => "low",
        }
    }

    pub fn other(self) -> ArcKind {
        match self {
            ArcKind::High => ArcKind::Low,
            ArcKind::Low => ArcKind::High,
        }
    }
}

impl std::fmt::Display for ArcKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("weapon `{id}`: muzzle velocity must be positive, got {value}")]
    InvalidVelocity { id: String, value: f64 },

    #[error("weapon `{id}`: gravity scale must be positive, got {value}")]
    InvalidGravityScale { id: String, value: f64 },

    #[error("weapon `{id}`: range envelope [{min}, {max}] is invalid")]
    InvalidRange { id: String, min: f64, max: f64 },

    #[error("weapon `{id}`: dispersion parameters must be non-negative")]
    InvalidDispersion { id: String },

    #[error("weapon `{id}`: damage radii must satisfy 0 <= 100% <= 25%, got {hundred} / {twenty_five}")]
    InvalidDamageRadii { id: String, hundred: f64, twenty_five: f64 },

    #[error("weapon `{id}`: mount limits ({min}°, {max}°) are invalid")]
    InvalidMountLimits { id: String, min: f64, max: f64 },

    #[error("duplicate weapon id `{0}`")]
    DuplicateId(String),

    #[error("unknown weapon `{0}`")]
    UnknownWeapon(String),

    #[error("weapon catalog is empty")]
    EmptyCatalog,

    #[error("invalid weapon catalog document: {0}")]
    Parse(String),
}

/// Gains applied to the MOA cone when building the spread ellipse.
///
/// These are weapon-tuning values fitted against in-game impact patterns, not
/// physics: `lateral_gain` scales the cross-range axis, `range_gain` the
/// along-range axis, and `high_arc_gain` enlarges both for high-arc shots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispersionModel {
    pub lateral_gain: f64,
    pub range_gain: f64,
    pub high_arc_gain: f64,
}

impl Default for DispersionModel {
    fn default() -> Self {
        Self { lateral_gain: 1.0, range_gain: 1.0, high_arc_gain: 1.25 }
    }
}

impl DispersionModel {
    /// Combined multiplier for a given arc
    pub fn arc_gain(&self, arc: ArcKind) -> f64 {
        match arc {
            ArcKind::High => self.high_arc_gain,
            ArcKind::Low => 1.0,
        }
    }
}

fn default_gravity_scale() -> f64 { 1.0 }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub id: String,
    pub name: String,
    pub velocity_mps: f64,         // muzzle velocity
    #[serde(default = "default_gravity_scale")]
    pub gravity_scale: f64,        // multiplies engine gravity
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub moa: f64,                  // angular dispersion, minutes of angle
    pub hundred_damage_radius_m: f64,
    pub twenty_five_damage_radius_m: f64,
    #[serde(default)]
    pub angle_unit: AngleUnit,
    #[serde(default)]
    pub preferred_arc: ArcKind,
    /// Elevation the mount can physically reach, degrees (min, max)
    #[serde(default)]
    pub mount_limits_deg: Option<(f64, f64)>,
    #[serde(default)]
    pub dispersion: DispersionModel,
}

impl WeaponProfile {
    /// Effective gravity for this projectile [m/s²]
    pub fn gravity(&self, engine_gravity: f64) -> f64 {
        engine_gravity * self.gravity_scale
    }

    pub fn in_range(&self, distance_m: f64) -> bool {
        distance_m >= self.min_range_m && distance_m <= self.max_range_m
    }

    /// Whether the mount can lay this elevation (degrees). No limits = always.
    pub fn mount_allows(&self, elevation_deg: f64) -> bool {
        match self.mount_limits_deg {
            Some((lo, hi)) => elevation_deg >= lo && elevation_deg <= hi,
            None => true,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let id = || self.id.clone();
        let finite_pos = |v: f64| v.is_finite() && v > 0.0;
        let finite_non_neg = |v: f64| v.is_finite() && v >= 0.0;

        if !finite_pos(self.velocity_mps) {
            return Err(ModelError::InvalidVelocity { id: id(), value: self.velocity_mps });
        }
        if !finite_pos(self.gravity_scale) {
            return Err(ModelError::InvalidGravityScale { id: id(), value: self.gravity_scale });
        }
        if !finite_non_neg(self.min_range_m) || !finite_non_neg(self.max_range_m) || self.min_range_m > self.max_range_m {
            return Err(ModelError::InvalidRange { id: id(), min: self.min_range_m, max: self.max_range_m });
        }
        let d = &self.dispersion;
        if ![self.moa, d.lateral_gain, d.range_gain, d.high_arc_gain].into_iter().all(finite_non_neg) {
            return Err(ModelError::InvalidDispersion { id: id() });
        }
        let (hundred, twenty_five) = (self.hundred_damage_radius_m, self.twenty_five_damage_radius_m);
        if !finite_non_neg(hundred) || !finite_non_neg(twenty_five) || twenty_five < hundred {
            return Err(ModelError::InvalidDamageRadii { id: id(), hundred, twenty_five });
        }
        if let Some((min, max)) = self.mount_limits_deg {
            if !(min.is_finite() && max.is_finite()) || min > max || min < -90.0 || max > 90.0 {
                return Err(ModelError::InvalidMountLimits { id: id(), min, max });
            }
        }
        Ok(())
    }
}

/* --------------------------- built-in weapon table --------------------------- */
/* Game-tuned values. Velocities are the in-game projectile speeds, not real     */
/* muzzle velocities; ranges are the sight envelopes the game enforces.          */

struct BuiltinWeapon {
    id: &'static str,
    name: &'static str,
    velocity: f64,
    gravity_scale: f64,
    min_range: f64,
    max_range: f64,
    moa: f64,
    r100: f64,
    r25: f64,
    unit: AngleUnit,
    arc: ArcKind,
    mount: Option<(f64, f64)>,
    dispersion: DispersionModel,
}

const MORTAR_SPREAD: DispersionModel = DispersionModel { lateral_gain: 1.0, range_gain: 1.0, high_arc_gain: 1.25 };
const ROCKET_SPREAD: DispersionModel = DispersionModel { lateral_gain: 1.0, range_gain: 0.8, high_arc_gain: 1.5 };

const BUILTIN: &[BuiltinWeapon] = &[
    // velocity m/s, ranges m, moa in minutes of angle, r100/r25 damage radii m
    BuiltinWeapon { id: "mortar",      name: "Mortar",           velocity: 109.890938, gravity_scale: 1.0, min_range: 50.0,  max_range: 1230.0, moa: 50.0,  r100: 6.7,  r25: 15.5, unit: AngleUnit::Mils,    arc: ArcKind::High, mount: Some((45.0, 89.0)), dispersion: MORTAR_SPREAD },
    BuiltinWeapon { id: "tech_mortar", name: "Technical Mortar", velocity: 109.890938, gravity_scale: 1.0, min_range: 50.0,  max_range: 1230.0, moa: 50.0,  r100: 6.7,  r25: 15.5, unit: AngleUnit::Mils,    arc: ArcKind::High, mount: Some((45.0, 89.0)), dispersion: MORTAR_SPREAD },
    BuiltinWeapon { id: "hell_cannon", name: "Hell Cannon",      velocity: 95.0,       gravity_scale: 1.0, min_range: 0.0,   max_range: 920.0,  moa: 100.0, r100: 10.0, r25: 20.0, unit: AngleUnit::Degrees, arc: ArcKind::High, mount: None,               dispersion: MORTAR_SPREAD },
    BuiltinWeapon { id: "ub32",        name: "UB-32 Rocket Pod", velocity: 300.0,      gravity_scale: 2.0, min_range: 0.0,   max_range: 1600.0, moa: 300.0, r100: 3.5,  r25: 8.0,  unit: AngleUnit::Degrees, arc: ArcKind::Low,  mount: Some((-5.0, 45.0)), dispersion: ROCKET_SPREAD },
    BuiltinWeapon { id: "bm21",        name: "BM-21 Grad",       velocity: 200.0,      gravity_scale: 1.0, min_range: 900.0, max_range: 4000.0, moa: 200.0, r100: 8.0,  r25: 15.0, unit: AngleUnit::Degrees, arc: ArcKind::Low,  mount: Some((0.0, 55.0)),  dispersion: ROCKET_SPREAD },
];

impl From<&BuiltinWeapon> for WeaponProfile {
    fn from(w: &BuiltinWeapon) -> Self {
        WeaponProfile {
            id: w.id.to_string(),
            name: w.name.to_string(),
            velocity_mps: w.velocity,
            gravity_scale: w.gravity_scale,
            min_range_m: w.min_range,
            max_range_m: w.max_range,
            moa: w.moa,
            hundred_damage_radius_m: w.r100,
            twenty_five_damage_radius_m: w.r25,
            angle_unit: w.unit,
            preferred_arc: w.arc,
            mount_limits_deg: w.mount,
            dispersion: w.dispersion,
        }
    }
}

/* -------------------------------- catalog -------------------------------- */

#[derive(Deserialize)]
struct CatalogDoc {
    weapons: Vec<WeaponProfile>,
}

/// Read-only set of weapon profiles keyed by id, in definition order.
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponCatalog {
    weapons: Vec<WeaponProfile>,
}

impl WeaponCatalog {
    /// Build a catalog, validating every profile and rejecting duplicate ids.
    pub fn new(weapons: Vec<WeaponProfile>) -> Result<Self, ModelError> {
        if weapons.is_empty() {
            return Err(ModelError::EmptyCatalog);
        }
        for (i, w) in weapons.iter().enumerate() {
            w.validate()?;
            if weapons[..i].iter().any(|prev| prev.id == w.id) {
                return Err(ModelError::DuplicateId(w.id.clone()));
            }
        }
        Ok(Self { weapons })
    }

    /// The game's indirect-fire weapons.
    pub fn builtin() -> Self {
        Self { weapons: BUILTIN.iter().map(WeaponProfile::from).collect() }
    }

    /// Parse a `{ "weapons": [ ... ] }` document.
    pub fn from_json_str(doc: &str) -> Result<Self, ModelError> {
        let parsed: CatalogDoc = serde_json::from_str(doc).map_err(|e| ModelError::Parse(e.to_string()))?;
        Self::new(parsed.weapons).map_err(|e| {
            log::warn!("rejected weapon catalog: {e}");
            e
        })
    }

    /// Load a catalog document from disk.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path)
            .with_context(|| format!("reading weapon catalog {}", path.display()))?;
        let catalog = Self::from_json_str(&doc)
            .with_context(|| format!("loading weapon catalog {}", path.display()))?;
        log::debug!("loaded {} weapons from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&WeaponProfile> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&WeaponProfile, ModelError> {
        self.get(id).ok_or_else(|| ModelError::UnknownWeapon(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeaponProfile> {
        self.weapons.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.weapons.iter().map(|w| w.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/* -------------------------------- tests -------------------------------- */
