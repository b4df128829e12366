//! Judgment Ring - rhythm judgment core for boss encounters
//!
//! Core modules:
//! - `sim`: Tick-driven judgment engine (arc timers, spawn scheduling,
//!   sector matching, session orchestration)
//! - `settings`: Data-driven encounter tuning
//!
//! All angles exposed by this crate are bearings in degrees, 0° pointing
//! along +X and increasing counter-clockwise.

pub mod settings;
pub mod sim;

pub use settings::{EncounterPreset, RhythmSettings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Seconds between arc spawns
    pub const DEFAULT_SPAWN_INTERVAL: f32 = 2.0;
    /// Warning time before an arc becomes judgeable
    pub const DEFAULT_APPROACH_TIME: f32 = 2.0;
    /// Trailing part of an arc's lifetime during which it can be hit
    pub const DEFAULT_JUDGMENT_WINDOW: f32 = 1.0;

    /// Full width of the hit sector (degrees)
    pub const DEFAULT_SECTOR_TOLERANCE: f32 = 30.0;
    /// Radius of the central judgment circle
    pub const DEFAULT_CIRCLE_RADIUS: f32 = 100.0;
    /// Aim must be within `factor * circle_radius` of the center
    pub const DEFAULT_AIM_DISTANCE_FACTOR: f32 = 2.0;

    /// Damage dealt to every enemy on a hit
    pub const DEFAULT_SUCCESS_DAMAGE: f32 = 10.0;
    /// Damage dealt to the player on a miss
    pub const DEFAULT_FAILURE_DAMAGE: f32 = 10.0;

    /// Indicator jumps at or below this snap instead of animating (degrees)
    pub const SNAP_THRESHOLD_DEGREES: f32 = 5.0;
    /// Duration of an animated indicator rotation (seconds)
    pub const TRANSITION_DURATION: f32 = 0.1;

    /// Slack for comparing accumulated f32 time against phase boundaries
    pub const TIME_EPSILON: f32 = 1e-4;

    /// Smallest accepted spawn interval (keeps the spawn loop finite)
    pub const MIN_SPAWN_INTERVAL: f32 = 0.05;
}

/// Normalize a bearing to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Minimal signed angular difference `to - from`, in (-180, 180]
#[inline]
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Convert polar (r, bearing in degrees) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, degrees: f32) -> Vec2 {
    let theta = degrees.to_radians();
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, bearing in degrees, [0, 360))
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), normalize_degrees(pos.y.atan2(pos.x).to_degrees()))
}
