//! artillery-trajectory
//!
//! Flight path of one arc of a firing solution, sampled against the terrain
//! under the ground track. No integration: every sample is the closed-form
//! parabola evaluated at its own index, so any sample can be produced in any
//! order, and a replay can stop, resume or restart without carrying state.
//!
//! Per sample i of n steps:
//!   t = tof · i / n
//!   x = v·cosθ · t
//!   y = launch + x·tanθ − g·x² / (2·v²·cos²θ)
//!   terrain = profile interpolated at x (clamped to its end points)
//!
//! Conventions:
//! - Distances are horizontal meters from the firer along the ground track.
//! - Altitudes are absolute meters, the same datum as the heightmap.
//! - Missing data is not an error: an unsolved arc or an empty terrain profile
//!   gives zero samples and [`Obstruction::Unknown`].

use serde::{Deserialize, Serialize};

use artillery_core::{EngineConfig, Heightmap, Position, ProfilePoint};
use artillery_models::ArcKind;
use artillery_solver::FiringSolution;

mod replay;

pub use replay::ReplayCursor;

/// Upper bound on [`SamplerConfig::steps`]; larger requests are clamped.
pub const MAX_STEPS: usize = 100_000;

/// Sampling options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of equal time steps over the flight (samples = steps + 1),
    /// clamped to `1..=MAX_STEPS`
    pub steps: usize,
    /// Distance ignored at each end of the flight when checking obstruction [m]
    pub margin_m: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { steps: 100, margin_m: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub index: usize,
    pub time_s: f64,
    pub distance_m: f64,
    pub projectile_altitude_m: f64,
    pub terrain_altitude_m: f64,
}

impl TrajectorySample {
    /// Height of the projectile above the terrain (negative = underground)
    pub fn clearance_m(&self) -> f64 {
        self.projectile_altitude_m - self.terrain_altitude_m
    }

    pub fn is_below_terrain(&self) -> bool {
        self.projectile_altitude_m < self.terrain_altitude_m
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Obstruction {
    Clear,
    /// First distance where the terrain is above the projectile
    Blocked { distance_m: f64 },
    /// No terrain data or no valid arc
    Unknown,
}

impl Obstruction {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Obstruction::Blocked { .. })
    }
}

/// The flight constants of a solved arc.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Flight {
    distance_m: f64,
    time_of_flight_s: f64,
    launch_altitude_m: f64,
    tan: f64,
    // g / (2·v²·cos²θ)
    drop_coeff: f64,
}

impl Flight {
    fn altitude_at(&self, x: f64) -> f64 {
        self.launch_altitude_m + x * self.tan - self.drop_coeff * x * x
    }
}

/// One arc's flight over a terrain profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    kind: ArcKind,
    flight: Option<Flight>,
    profile: Vec<ProfilePoint>,
    steps: usize,
    margin_m: f64,
}

impl Trajectory {
    /// Prepare the sampler for `kind` of `solution` over `profile`.
    ///
    /// Non-finite profile points are dropped and the rest sorted by distance.
    pub fn new(solution: &FiringSolution, kind: ArcKind, mut profile: Vec<ProfilePoint>, config: SamplerConfig) -> Self {
        profile.retain(|p| p.distance_m.is_finite() && p.altitude_m.is_finite());
        profile.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        let flight = solution.arc(kind).as_ref().ok().map(|arc| {
            let v = solution.velocity_mps;
            let cos = arc.elevation.rad.cos();
            Flight {
                distance_m: solution.distance_m,
                time_of_flight_s: arc.time_of_flight_s,
                launch_altitude_m: solution.firer_altitude_m,
                tan: arc.elevation.rad.tan(),
                drop_coeff: solution.gravity_mps2 / (2.0 * v * v * cos * cos),
            }
        });

        log::trace!(
            "trajectory {kind}: solved={} profile_points={} steps={}",
            flight.is_some(),
            profile.len(),
            config.steps
        );

        Self { kind, flight, profile, steps: config.steps.clamp(1, MAX_STEPS), margin_m: config.margin_m.max(0.0) }
    }

    pub fn kind(&self) -> ArcKind {
        self.kind
    }

    pub fn profile(&self) -> &[ProfilePoint] {
        &self.profile
    }

    /// Number of samples; 0 when the arc is unsolved or there is no terrain.
    pub fn len(&self) -> usize {
        match self.flight {
            Some(_) if !self.profile.is_empty() => self.steps + 1,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample `index`, computed from scratch.
    pub fn sample(&self, index: usize) -> Option<TrajectorySample> {
        if index >= self.len() {
            return None;
        }
        let flight = self.flight.as_ref()?;
        #[allow(clippy::cast_precision_loss)]
        let (i, n) = (index as f64, self.steps as f64);
        let x = flight.distance_m * i / n;
        Some(TrajectorySample {
            index,
            time_s: flight.time_of_flight_s * i / n,
            distance_m: x,
            projectile_altitude_m: flight.altitude_at(x),
            terrain_altitude_m: self.terrain_at(x)?,
        })
    }

    pub fn samples(&self) -> Samples<'_> {
        self.samples_from(0)
    }

    /// Iterate from `index` onwards (resume a paused replay).
    pub fn samples_from(&self, index: usize) -> Samples<'_> {
        let back = self.len();
        Samples { trajectory: self, front: index.min(back), back }
    }

    /// Scan samples and profile knots strictly inside the flight (minus the
    /// end margins) for the first point where terrain is above the projectile.
    pub fn obstruction(&self) -> Obstruction {
        let Some(flight) = self.flight.as_ref().filter(|_| !self.is_empty()) else {
            return Obstruction::Unknown;
        };
        let lo = self.margin_m;
        let hi = flight.distance_m - self.margin_m;

        let sampled = self.samples().map(|s| (s.distance_m, s.terrain_altitude_m));
        let knots = self.profile.iter().map(|p| (p.distance_m, p.altitude_m));

        let first_blocked = sampled
            .chain(knots)
            .filter(|&(x, _)| x > lo && x < hi)
            .filter(|&(x, terrain)| flight.altitude_at(x) < terrain)
            .map(|(x, _)| x)
            .min_by(f64::total_cmp);

        match first_blocked {
            Some(distance_m) => {
                log::debug!("{} arc blocked by terrain at {:.1} m of {:.1} m", self.kind, distance_m, flight.distance_m);
                Obstruction::Blocked { distance_m }
            }
            None => Obstruction::Clear,
        }
    }

    /// Highest sample of the flight.
    pub fn apex(&self) -> Option<TrajectorySample> {
        self.samples()
            .max_by(|a, b| a.projectile_altitude_m.total_cmp(&b.projectile_altitude_m))
    }

    // Linear interpolation over the sorted profile, clamped at both ends.
    fn terrain_at(&self, x: f64) -> Option<f64> {
        let first = self.profile.first()?;
        let last = self.profile.last()?;
        if x <= first.distance_m {
            return Some(first.altitude_m);
        }
        if x >= last.distance_m {
            return Some(last.altitude_m);
        }
        let idx = self.profile.partition_point(|p| p.distance_m < x);
        let b = self.profile[idx];
        let a = self.profile[idx - 1];
        let span = b.distance_m - a.distance_m;
        if span <= 0.0 {
            return Some(b.altitude_m);
        }
        let u = (x - a.distance_m) / span;
        Some(a.altitude_m + u * (b.altitude_m - a.altitude_m))
    }
}

/// Lazy, restartable walk over a [`Trajectory`]. Dropping it cancels the walk.
#[derive(Clone, Debug)]
pub struct Samples<'a> {
    trajectory: &'a Trajectory,
    front: usize,
    back: usize,
}

impl Iterator for Samples<'_> {
    type Item = TrajectorySample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let s = self.trajectory.sample(self.front);
        self.front += 1;
        s
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back.saturating_sub(self.front);
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for Samples<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.trajectory.sample(self.back)
    }
}

impl ExactSizeIterator for Samples<'_> {}

impl std::iter::FusedIterator for Samples<'_> {}

/// Query the heightmap for the ground track `firer -> target` and build the
/// trajectory of `kind`.
pub fn sample_with_heightmap<H: Heightmap + ?Sized>(
    solution: &FiringSolution,
    kind: ArcKind,
    firer: &Position,
    target: &Position,
    heightmap: &H,
    config: SamplerConfig,
    engine: &EngineConfig,
) -> Trajectory {
    let profile = heightmap.terrain_profile(firer, target, engine);
    Trajectory::new(solution, kind, profile, config)
}

/* -------------------------------- tests -------------------------------- */
