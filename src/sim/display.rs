//! Display output derived from the core each tick
//!
//! Rendering consumes these values; nothing here queries back into the
//! renderer.

use serde::{Deserialize, Serialize};

use super::arc::{ArcPhase, JudgmentArc};
use super::state::{ExitCondition, SessionState};
use crate::consts::TIME_EPSILON;

/// Color ramp hint for an arc, intensity in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColorHint {
    /// Warming up while the arc approaches
    Approaching { intensity: f32 },
    /// Judgeable; intensity rises as the window runs out
    Judging { intensity: f32 },
}

/// Per-arc display values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcDisplay {
    pub arc_id: u32,
    pub display_angle: f32,
    /// Elapsed time while approaching, remaining time while judging
    pub time_value: f32,
    /// Length of the current phase
    pub total_time: f32,
    pub is_judging: bool,
    pub color_hint: ColorHint,
}

impl ArcDisplay {
    pub fn from_arc(arc: &JudgmentArc) -> Self {
        let timer = &arc.timer;
        let intensity = timer.phase_progress();
        let is_judging = arc.phase() == ArcPhase::Judging;
        let (time_value, total_time, color_hint) = if is_judging {
            (
                timer.remaining(),
                timer.judgment_window(),
                ColorHint::Judging { intensity },
            )
        } else {
            (
                timer.elapsed(),
                timer.judgment_start(),
                ColorHint::Approaching { intensity },
            )
        };
        Self {
            arc_id: arc.id,
            display_angle: arc.angle,
            time_value,
            total_time,
            is_judging,
            color_hint,
        }
    }
}

/// Everything the HUD needs for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub arcs: Vec<ArcDisplay>,
    /// Smoothed bearing of the sector indicator
    pub indicator_angle: f32,
    /// Bearing of the next spawn
    pub next_angle: f32,
    /// Bearing of the spawn after next
    pub preview_angle: f32,
    pub countdown_text: String,
}

/// HUD countdown for the session's exit condition
pub fn countdown_text(state: &SessionState) -> String {
    match state.exit_condition {
        ExitCondition::Timer { duration } => {
            let remaining = (duration - state.elapsed_time - TIME_EPSILON).max(0.0);
            format!("{}", remaining.ceil() as u32)
        }
        ExitCondition::CountTarget { target } => {
            format!("{}/{}", state.hits_count.min(target), target)
        }
        ExitCondition::External => format!("{}", state.elapsed_time.floor() as u32),
    }
}
