// crates/artillery-ffi-wasm/src/lib.rs
//
// WASM bindings: firing solution, trajectory sampling and the weapon catalog.

use wasm_bindgen::prelude::*;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;

// --- our crates ---
use artillery_core::{AngleUnit, Emplacement, EngineConfig, Position, ProfilePoint};
use artillery_models::{ArcKind, WeaponCatalog, WeaponProfile};
use artillery_solver::{
    damage_footprint, range_rings, solve, target_status, ArcResult, DamageFootprint, DispersionEllipse,
    FiringSolution, RangeRings, TargetStatus,
};
use artillery_trajectory::{Obstruction, SamplerConfig, Trajectory, TrajectorySample};

// Better panic messages in browser console
#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
}

/* --------------------------- Shared DTOs (JS) --------------------------- */

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JsEmplacement {
    pub x: f64,
    pub y: f64,
    /// Terrain elevation under the marker [m]
    #[serde(default)]
    pub elevation_m: f64,
    /// Roof / ridge offset [m], clamped to 0..=100
    #[serde(default)]
    pub height_offset_m: f64,
}
impl From<JsEmplacement> for Emplacement {
    fn from(e: JsEmplacement) -> Self {
        Emplacement::new(Position::new(e.x, e.y), e.elevation_m).with_height_offset(e.height_offset_m)
    }
}

/// A built-in weapon id, or a full inline profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsWeapon {
    Id(String),
    Inline(WeaponProfile),
}

impl JsWeapon {
    fn resolve(&self) -> Result<WeaponProfile, String> {
        match self {
            JsWeapon::Id(id) => WeaponCatalog::builtin().require(id).cloned().map_err(|e| e.to_string()),
            JsWeapon::Inline(profile) => {
                profile.validate().map_err(|e| e.to_string())?;
                Ok(profile.clone())
            }
        }
    }
}

/* ---------------------------- Firing solution --------------------------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsSolveInput {
    pub firer: JsEmplacement,
    pub target: JsEmplacement,
    pub weapon: JsWeapon,
    #[serde(default)]
    pub config: EngineConfig,
    /// Grow damage rings by the spread ellipse
    #[serde(default)]
    pub include_spread: bool,
}

/// One arc; every optional field is `null` together with a `reason` when the
/// arc has no solution.
#[derive(Debug, Clone, Serialize)]
pub struct JsArc {
    pub kind: ArcKind,
    /// Elevation in the weapon's display unit
    pub elevation: Option<f64>,
    pub elevation_deg: Option<f64>,
    pub elevation_mil: Option<f64>,
    pub time_of_flight_s: Option<f64>,
    pub dispersion: Option<DispersionEllipse>,
    pub reason: Option<&'static str>,
}

impl JsArc {
    fn new(kind: ArcKind, arc: &ArcResult, unit: AngleUnit) -> Self {
        match arc {
            Ok(a) => JsArc {
                kind,
                elevation: Some(a.elevation.in_unit(unit)),
                elevation_deg: Some(a.elevation.deg),
                elevation_mil: Some(a.elevation.mil),
                time_of_flight_s: Some(a.time_of_flight_s),
                dispersion: Some(a.dispersion),
                reason: None,
            },
            Err(reason) => JsArc {
                kind,
                elevation: None,
                elevation_deg: None,
                elevation_mil: None,
                time_of_flight_s: None,
                dispersion: None,
                reason: Some(reason.as_str()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsSolveResult {
    pub weapon_id: String,
    pub angle_unit: AngleUnit,
    pub distance_m: f64,
    pub bearing_deg: f64,
    pub height_diff_m: f64,
    pub preferred_arc: ArcKind,
    pub high: JsArc,
    pub low: JsArc,
    pub status: TargetStatus,
    /// Damage rings on the preferred arc, `null` when it has no solution
    pub footprint: Option<DamageFootprint>,
    pub range_rings: RangeRings,
}

fn solve_input(inp: &JsSolveInput) -> Result<(FiringSolution, WeaponProfile), String> {
    inp.config.validate().map_err(|e| e.to_string())?;
    let profile = inp.weapon.resolve()?;
    let solution = solve(&inp.firer.into(), &inp.target.into(), &profile, &inp.config);
    Ok((solution, profile))
}

fn solve_dto(inp: &JsSolveInput) -> Result<JsSolveResult, String> {
    let (s, profile) = solve_input(inp)?;
    let unit = profile.angle_unit;
    let preferred = profile.preferred_arc;
    Ok(JsSolveResult {
        weapon_id: profile.id.clone(),
        angle_unit: unit,
        distance_m: s.distance_m,
        bearing_deg: s.bearing_deg,
        height_diff_m: s.height_diff_m,
        preferred_arc: preferred,
        high: JsArc::new(ArcKind::High, &s.high, unit),
        low: JsArc::new(ArcKind::Low, &s.low, unit),
        status: target_status(&[&s]),
        footprint: damage_footprint(&[(&s, preferred)], &profile, inp.include_spread),
        range_rings: range_rings(&profile, &inp.config),
    })
}

#[wasm_bindgen]
pub fn solve_js(input: JsValue) -> Result<JsValue, JsValue> {
    let inp: JsSolveInput = swb::from_value(input)?;
    let out = solve_dto(&inp).map_err(|e| JsValue::from_str(&e))?;
    swb::to_value(&out).map_err(|e| e.into())
}

/* ------------------------------ Trajectory ------------------------------ */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsTrajectoryInput {
    pub solve: JsSolveInput,
    /// Defaults to the weapon's preferred arc
    #[serde(default)]
    pub arc: Option<ArcKind>,
    /// Terrain under the ground track, distance from the firer [m]
    pub profile: Vec<ProfilePoint>,
    #[serde(default)]
    pub sampler: SamplerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsTrajectoryResult {
    pub arc: ArcKind,
    pub samples: Vec<TrajectorySample>,
    pub obstruction: Obstruction,
    pub apex: Option<TrajectorySample>,
}

fn trajectory_dto(inp: JsTrajectoryInput) -> Result<JsTrajectoryResult, String> {
    let (s, profile) = solve_input(&inp.solve)?;
    let kind = inp.arc.unwrap_or(profile.preferred_arc);
    let traj = Trajectory::new(&s, kind, inp.profile, inp.sampler);
    Ok(JsTrajectoryResult {
        arc: kind,
        samples: traj.samples().collect(),
        obstruction: traj.obstruction(),
        apex: traj.apex(),
    })
}

#[wasm_bindgen]
pub fn trajectory_js(input: JsValue) -> Result<JsValue, JsValue> {
    let inp: JsTrajectoryInput = swb::from_value(input)?;
    let out = trajectory_dto(inp).map_err(|e| JsValue::from_str(&e))?;
    swb::to_value(&out).map_err(|e| e.into())
}

/* -------------------------------- Catalog ------------------------------- */

#[wasm_bindgen]
pub fn weapons_js() -> Result<JsValue, JsValue> {
    let catalog = WeaponCatalog::builtin();
    let weapons: Vec<&WeaponProfile> = catalog.iter().collect();
    swb::to_value(&weapons).map_err(|e| e.into())
}

/* -------------------------------- tests -------------------------------- */
