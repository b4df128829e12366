//! Session state and exit conditions
//!
//! Everything one judgment run accumulates lives here. The state is reset on
//! start and left readable after stop so callers can report the final tally.

use serde::{Deserialize, Serialize};

use crate::consts::TIME_EPSILON;

/// Rule deciding when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExitCondition {
    /// Survive for `duration` seconds
    Timer { duration: f32 },
    /// Land `target` successful judgments
    CountTarget { target: u32 },
    /// Ask an injected predicate (e.g. "all enemies dead")
    External,
}

impl Default for ExitCondition {
    fn default() -> Self {
        ExitCondition::Timer { duration: 30.0 }
    }
}

impl ExitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitCondition::Timer { .. } => "Timer",
            ExitCondition::CountTarget { .. } => "CountTarget",
            ExitCondition::External => "External",
        }
    }

    /// Clamp a negative timer duration to zero; a non-finite one falls back
    /// to the default
    pub fn sanitized(self) -> Self {
        match self {
            ExitCondition::Timer { duration } if !duration.is_finite() || duration < 0.0 => {
                let fixed = if duration.is_finite() {
                    ExitCondition::Timer { duration: 0.0 }
                } else {
                    ExitCondition::default()
                };
                log::warn!("exit condition: timer duration {} invalid, using {:?}", duration, fixed);
                fixed
            }
            other => other,
        }
    }
}

/// Mutable state of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Seconds since the session started
    pub elapsed_time: f32,
    /// Successful judgments
    pub hits_count: u32,
    /// Expired judgment windows
    pub misses_count: u32,
    /// Ticks processed while running
    pub ticks: u64,
    pub running: bool,
    pub exit_condition: ExitCondition,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ExitCondition::default())
    }
}

impl SessionState {
    /// Fresh, not-yet-running state
    pub fn new(exit_condition: ExitCondition) -> Self {
        Self {
            elapsed_time: 0.0,
            hits_count: 0,
            misses_count: 0,
            ticks: 0,
            running: false,
            exit_condition,
        }
    }

    /// Clear counters for a new run
    pub fn reset(&mut self, exit_condition: ExitCondition) {
        *self = Self::new(exit_condition);
    }

    /// Evaluate the exit condition. `external` is only consulted for
    /// `ExitCondition::External`.
    pub fn exit_satisfied(&self, external: impl FnOnce() -> bool) -> bool {
        match self.exit_condition {
            ExitCondition::Timer { duration } => self.elapsed_time + TIME_EPSILON >= duration,
            ExitCondition::CountTarget { target } => self.hits_count >= target,
            ExitCondition::External => external(),
        }
    }

    /// Progress toward the exit condition, 0..=1 (None for External)
    pub fn progress(&self) -> Option<f32> {
        match self.exit_condition {
            ExitCondition::Timer { duration } => {
                if duration <= 0.0 {
                    Some(1.0)
                } else {
                    Some((self.elapsed_time / duration).clamp(0.0, 1.0))
                }
            }
            ExitCondition::CountTarget { target } => {
                if target == 0 {
                    Some(1.0)
                } else {
                    Some((self.hits_count as f32 / target as f32).min(1.0))
                }
            }
            ExitCondition::External => None,
        }
    }

    /// Share of resolved judgments that were hits
    pub fn accuracy(&self) -> Option<f32> {
        let judged = self.hits_count + self.misses_count;
        (judged > 0).then(|| self.hits_count as f32 / judged as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_exit() {
        let mut s = SessionState::new(ExitCondition::Timer { duration: 10.0 });
        s.elapsed_time = 9.9;
        assert!(!s.exit_satisfied(|| true));
        s.elapsed_time = 9.99999;
        assert!(s.exit_satisfied(|| false));
    }

    #[test]
    fn test_sanitized_timer_duration() {
        assert_eq!(
            ExitCondition::Timer { duration: f32::NAN }.sanitized(),
            ExitCondition::default()
        );
        assert_eq!(
            ExitCondition::Timer { duration: f32::INFINITY }.sanitized(),
            ExitCondition::default()
        );
        assert_eq!(
            ExitCondition::Timer { duration: -1.0 }.sanitized(),
            ExitCondition::Timer { duration: 0.0 }
        );
        assert_eq!(
            ExitCondition::Timer { duration: 12.5 }.sanitized(),
            ExitCondition::Timer { duration: 12.5 }
        );
        assert_eq!(ExitCondition::External.sanitized(), ExitCondition::External);
    }

    #[test]
    fn test_count_exit() {
        let mut s = SessionState::new(ExitCondition::CountTarget { target: 3 });
        s.hits_count = 2;
        assert!(!s.exit_satisfied(|| true));
        s.hits_count = 4;
        assert!(s.exit_satisfied(|| false));
        assert_eq!(s.progress(), Some(1.0));
    }

    #[test]
    fn test_external_exit_uses_predicate() {
        let s = SessionState::new(ExitCondition::External);
        assert!(!s.exit_satisfied(|| false));
        assert!(s.exit_satisfied(|| true));
        assert_eq!(s.progress(), None);
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut s = SessionState::new(ExitCondition::External);
        s.hits_count = 5;
        s.misses_count = 2;
        s.running = true;
        s.reset(ExitCondition::CountTarget { target: 1 });
        assert_eq!(s, SessionState::new(ExitCondition::CountTarget { target: 1 }));
    }

    #[test]
    fn test_accuracy() {
        let mut s = SessionState::default();
        assert_eq!(s.accuracy(), None);
        s.hits_count = 3;
        s.misses_count = 1;
        assert_eq!(s.accuracy(), Some(0.75));
    }
}
