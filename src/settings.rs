//! Encounter tuning
//!
//! One settings struct configures a whole judgment run. Boss variants pick an
//! [`EncounterPreset`] instead of subclassing anything.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::state::ExitCondition;

/// Canned exit rules for common encounter shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EncounterPreset {
    /// Survive a fixed duration
    #[default]
    Timed,
    /// Land a number of judgments
    Combo,
    /// Run until the host says the enemies are gone
    Elimination,
}

impl EncounterPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncounterPreset::Timed => "Timed",
            EncounterPreset::Combo => "Combo",
            EncounterPreset::Elimination => "Elimination",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "timed" | "timer" => Some(EncounterPreset::Timed),
            "combo" | "count" => Some(EncounterPreset::Combo),
            "elimination" | "external" => Some(EncounterPreset::Elimination),
            _ => None,
        }
    }

    pub fn exit_condition(&self) -> ExitCondition {
        match self {
            EncounterPreset::Timed => ExitCondition::Timer { duration: 30.0 },
            EncounterPreset::Combo => ExitCondition::CountTarget { target: 10 },
            EncounterPreset::Elimination => ExitCondition::External,
        }
    }
}

/// Judgment session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmSettings {
    // === Timing ===
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Delay before the first spawn of a session
    pub initial_spawn_delay: f32,
    /// Warning time before an arc becomes judgeable
    pub approach_time: f32,
    /// Seconds during which an arc can be hit
    pub judgment_window: f32,

    // === Matching ===
    /// Full sector width in degrees
    pub sector_tolerance: f32,
    /// Radius of the judgment circle
    pub circle_radius: f32,
    /// Aim must be within `aim_distance_factor * circle_radius` of the center
    pub aim_distance_factor: f32,

    // === Damage ===
    pub success_damage: f32,
    pub failure_damage: f32,

    /// When the session ends
    pub exit_condition: ExitCondition,

    // === Indicator ===
    /// Jumps at or below this (degrees) snap instead of animating
    pub snap_threshold: f32,
    /// Length of an animated indicator rotation (seconds)
    pub transition_duration: f32,
}

impl Default for RhythmSettings {
    fn default() -> Self {
        Self {
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            initial_spawn_delay: 0.0,
            approach_time: DEFAULT_APPROACH_TIME,
            judgment_window: DEFAULT_JUDGMENT_WINDOW,

            sector_tolerance: DEFAULT_SECTOR_TOLERANCE,
            circle_radius: DEFAULT_CIRCLE_RADIUS,
            aim_distance_factor: DEFAULT_AIM_DISTANCE_FACTOR,

            success_damage: DEFAULT_SUCCESS_DAMAGE,
            failure_damage: DEFAULT_FAILURE_DAMAGE,

            exit_condition: ExitCondition::default(),

            snap_threshold: SNAP_THRESHOLD_DEGREES,
            transition_duration: TRANSITION_DURATION,
        }
    }
}

impl RhythmSettings {
    /// Default tuning with the preset's exit rule
    pub fn from_preset(preset: EncounterPreset) -> Self {
        Self {
            exit_condition: preset.exit_condition(),
            ..Self::default()
        }
    }

    /// Seconds from spawn to forced expiry
    pub fn arc_lifetime(&self) -> f32 {
        self.approach_time + self.judgment_window
    }

    /// Aim beyond this distance from the center never hits
    pub fn max_aim_distance(&self) -> f32 {
        self.aim_distance_factor * self.circle_radius
    }

    /// Clamp nonsensical values, warning about each fix
    pub fn sanitized(mut self) -> Self {
        fn fix(name: &str, value: &mut f32, min: f32, max: f32, fallback: f32) {
            let fixed = if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            };
            if fixed != *value {
                log::warn!("settings: {} = {} out of range, using {}", name, value, fixed);
                *value = fixed;
            }
        }

        fix("spawn_interval", &mut self.spawn_interval, MIN_SPAWN_INTERVAL, f32::MAX, DEFAULT_SPAWN_INTERVAL);
        fix("initial_spawn_delay", &mut self.initial_spawn_delay, 0.0, f32::MAX, 0.0);
        fix("approach_time", &mut self.approach_time, 0.0, f32::MAX, DEFAULT_APPROACH_TIME);
        fix("judgment_window", &mut self.judgment_window, 0.0, f32::MAX, DEFAULT_JUDGMENT_WINDOW);
        fix("sector_tolerance", &mut self.sector_tolerance, 0.0, 360.0, DEFAULT_SECTOR_TOLERANCE);
        fix("circle_radius", &mut self.circle_radius, 0.0, f32::MAX, DEFAULT_CIRCLE_RADIUS);
        fix("aim_distance_factor", &mut self.aim_distance_factor, 0.0, f32::MAX, DEFAULT_AIM_DISTANCE_FACTOR);
        fix("success_damage", &mut self.success_damage, 0.0, f32::MAX, DEFAULT_SUCCESS_DAMAGE);
        fix("failure_damage", &mut self.failure_damage, 0.0, f32::MAX, DEFAULT_FAILURE_DAMAGE);
        fix("snap_threshold", &mut self.snap_threshold, 0.0, 180.0, SNAP_THRESHOLD_DEGREES);
        fix("transition_duration", &mut self.transition_duration, 0.0, f32::MAX, TRANSITION_DURATION);

        self.exit_condition = self.exit_condition.sanitized();

        self
    }

    /// Parse JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = RhythmSettings::default();
        assert_eq!(s.arc_lifetime(), 3.0);
        assert_eq!(s.max_aim_distance(), 200.0);
        assert_eq!(s.sector_tolerance, 30.0);
        assert_eq!(s.clone().sanitized(), s);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = RhythmSettings::from_json(
            r#"{ "spawn_interval": 1.5, "exit_condition": { "CountTarget": { "target": 3 } } }"#,
        )
        .unwrap();
        assert_eq!(s.spawn_interval, 1.5);
        assert_eq!(s.judgment_window, DEFAULT_JUDGMENT_WINDOW);
        assert_eq!(s.exit_condition, ExitCondition::CountTarget { target: 3 });
    }

    #[test]
    fn test_json_roundtrip() {
        let s = RhythmSettings::from_preset(EncounterPreset::Elimination);
        let json = s.to_json().unwrap();
        assert_eq!(RhythmSettings::from_json(&json).unwrap(), s);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(RhythmSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_sanitize_clamps() {
        let s = RhythmSettings {
            spawn_interval: 0.0,
            judgment_window: -1.0,
            sector_tolerance: 720.0,
            approach_time: f32::NAN,
            exit_condition: ExitCondition::Timer { duration: -5.0 },
            ..RhythmSettings::default()
        }
        .sanitized();
        assert_eq!(s.spawn_interval, MIN_SPAWN_INTERVAL);
        assert_eq!(s.judgment_window, 0.0);
        assert_eq!(s.sector_tolerance, 360.0);
        assert_eq!(s.approach_time, DEFAULT_APPROACH_TIME);
        assert_eq!(s.exit_condition, ExitCondition::Timer { duration: 0.0 });
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(EncounterPreset::from_str("COMBO"), Some(EncounterPreset::Combo));
        assert_eq!(EncounterPreset::from_str("external"), Some(EncounterPreset::Elimination));
        assert_eq!(EncounterPreset::from_str("nope"), None);
        assert_eq!(EncounterPreset::Timed.as_str(), "Timed");
        assert_eq!(
            RhythmSettings::from_preset(EncounterPreset::Combo).exit_condition,
            ExitCondition::CountTarget { target: 10 }
        );
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let s = RhythmSettings::load(std::path::Path::new("/nonexistent/judgment-ring.json"));
        assert_eq!(s, RhythmSettings::default());
    }
}
