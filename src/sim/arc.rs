//! Judgment arc lifecycle
//!
//! Each arc runs a small countdown state machine:
//! - Approaching: warning time, the arc converges on the circle
//! - Judging: the trailing `judgment_window` seconds, a hit is possible
//! - Resolved: Hit (aim matched while judging) or Miss (window expired)
//!
//! Transitions are strictly forward. An arc that enters Judging stays there
//! for at least the rest of that step, so a single oversized `dt` can never
//! skip the judgment check.

use serde::{Deserialize, Serialize};

use crate::consts::TIME_EPSILON;
use crate::normalize_degrees;

/// How a judgment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Hit,
    Miss,
}

/// Lifecycle phase of an arc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcPhase {
    /// Warning period, not yet judgeable
    Approaching,
    /// Inside the judgment window
    Judging,
    /// Terminal; the owning scheduler removes the arc
    Resolved(Resolution),
}

impl ArcPhase {
    /// Position in the lifecycle (used to check forward-only transitions)
    pub fn rank(&self) -> u8 {
        match self {
            ArcPhase::Approaching => 0,
            ArcPhase::Judging => 1,
            ArcPhase::Resolved(_) => 2,
        }
    }
}

/// Per-arc countdown state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcTimer {
    phase: ArcPhase,
    /// Seconds from spawn to forced expiry
    total_lifetime: f32,
    /// Seconds during which a hit is possible
    judgment_window: f32,
    /// Seconds since spawn (clamped to `total_lifetime`)
    elapsed: f32,
    /// Judgment countdown, meaningful while Judging
    remaining: f32,
}

impl ArcTimer {
    pub fn new(total_lifetime: f32, judgment_window: f32) -> Self {
        let total_lifetime = total_lifetime.max(0.0);
        Self {
            phase: ArcPhase::Approaching,
            total_lifetime,
            judgment_window: judgment_window.clamp(0.0, total_lifetime),
            elapsed: 0.0,
            remaining: 0.0,
        }
    }

    #[inline]
    pub fn phase(&self) -> ArcPhase {
        self.phase
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Judgment countdown (zero before Judging)
    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[inline]
    pub fn total_lifetime(&self) -> f32 {
        self.total_lifetime
    }

    #[inline]
    pub fn judgment_window(&self) -> f32 {
        self.judgment_window
    }

    /// Elapsed time at which the arc becomes judgeable
    #[inline]
    pub fn judgment_start(&self) -> f32 {
        self.total_lifetime - self.judgment_window
    }

    #[inline]
    pub fn is_judging(&self) -> bool {
        self.phase == ArcPhase::Judging
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, ArcPhase::Resolved(_))
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self.phase {
            ArcPhase::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    /// Advance by `dt` seconds. Returns the phase entered during this step, if any.
    pub fn advance(&mut self, dt: f32) -> Option<ArcPhase> {
        if !dt.is_finite() || dt < 0.0 {
            return None;
        }

        match self.phase {
            ArcPhase::Approaching => {
                self.elapsed = (self.elapsed + dt).min(self.total_lifetime);
                let start = self.judgment_start();
                if self.elapsed + TIME_EPSILON >= start {
                    let overshoot = (self.elapsed - start).max(0.0);
                    self.remaining = (self.judgment_window - overshoot).max(0.0);
                    self.phase = ArcPhase::Judging;
                    Some(ArcPhase::Judging)
                } else {
                    None
                }
            }
            ArcPhase::Judging => {
                self.elapsed = (self.elapsed + dt).min(self.total_lifetime);
                self.remaining -= dt;
                if self.remaining <= TIME_EPSILON {
                    self.remaining = 0.0;
                    self.elapsed = self.total_lifetime;
                    self.phase = ArcPhase::Resolved(Resolution::Miss);
                    Some(self.phase)
                } else {
                    None
                }
            }
            ArcPhase::Resolved(_) => None,
        }
    }

    /// Resolve as a hit if judging and the aim is in the sector.
    ///
    /// A non-matching attempt is ignored; only window expiry produces a miss.
    pub fn try_hit(&mut self, in_sector: bool) -> bool {
        if self.phase == ArcPhase::Judging && in_sector {
            self.phase = ArcPhase::Resolved(Resolution::Hit);
            true
        } else {
            false
        }
    }

    /// Fraction of the current phase that has passed, 0..=1
    pub fn phase_progress(&self) -> f32 {
        match self.phase {
            ArcPhase::Approaching => {
                let start = self.judgment_start();
                if start <= 0.0 { 1.0 } else { (self.elapsed / start).clamp(0.0, 1.0) }
            }
            ArcPhase::Judging => {
                if self.judgment_window <= 0.0 {
                    1.0
                } else {
                    (1.0 - self.remaining / self.judgment_window).clamp(0.0, 1.0)
                }
            }
            ArcPhase::Resolved(_) => 1.0,
        }
    }
}

/// One judgment target: a bearing plus its timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentArc {
    pub id: u32,
    /// Bearing in degrees [0, 360) the player must aim at
    pub angle: f32,
    pub timer: ArcTimer,
}

impl JudgmentArc {
    pub fn new(id: u32, angle: f32, total_lifetime: f32, judgment_window: f32) -> Self {
        Self {
            id,
            angle: normalize_degrees(angle),
            timer: ArcTimer::new(total_lifetime, judgment_window),
        }
    }

    #[inline]
    pub fn phase(&self) -> ArcPhase {
        self.timer.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timer() -> ArcTimer {
        // 2s approach + 1s window
        ArcTimer::new(3.0, 1.0)
    }

    #[test]
    fn test_enters_judging_at_judgment_start() {
        let mut t = timer();
        for _ in 0..19 {
            assert_eq!(t.advance(0.1), None);
        }
        assert_eq!(t.phase(), ArcPhase::Approaching);
        assert_eq!(t.advance(0.1), Some(ArcPhase::Judging));
        assert!((t.remaining() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_window_expiry_is_miss() {
        let mut t = timer();
        for _ in 0..20 {
            t.advance(0.1);
        }
        for _ in 0..9 {
            assert_eq!(t.advance(0.1), None);
            assert!(t.is_judging());
        }
        assert_eq!(t.advance(0.1), Some(ArcPhase::Resolved(Resolution::Miss)));
        assert_eq!(t.resolution(), Some(Resolution::Miss));
        assert_eq!(t.elapsed(), t.total_lifetime());
    }

    #[test]
    fn test_try_hit_only_while_judging() {
        let mut t = timer();
        assert!(!t.try_hit(true), "hit before the window must be ignored");
        assert_eq!(t.phase(), ArcPhase::Approaching);

        t.advance(2.0);
        assert!(t.is_judging());
        assert!(!t.try_hit(false), "off-sector attempt is ignored, not a miss");
        assert!(t.is_judging());

        assert!(t.try_hit(true));
        assert_eq!(t.resolution(), Some(Resolution::Hit));

        // Terminal
        assert!(!t.try_hit(true));
        assert_eq!(t.advance(5.0), None);
        assert_eq!(t.resolution(), Some(Resolution::Hit));
    }

    #[test]
    fn test_oversized_step_does_not_skip_judging() {
        let mut t = timer();
        assert_eq!(t.advance(10.0), Some(ArcPhase::Judging));
        assert!(t.elapsed() <= t.total_lifetime());
        assert_eq!(t.remaining(), 0.0);
        assert_eq!(t.advance(0.0), Some(ArcPhase::Resolved(Resolution::Miss)));
    }

    #[test]
    fn test_overshoot_carries_into_window() {
        let mut t = timer();
        t.advance(2.25);
        assert!(t.is_judging());
        assert!((t.remaining() - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_window_covering_whole_lifetime() {
        let mut t = ArcTimer::new(1.0, 5.0);
        assert_eq!(t.judgment_window(), 1.0);
        assert_eq!(t.judgment_start(), 0.0);
        assert_eq!(t.advance(0.0), Some(ArcPhase::Judging));
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut t = timer();
        assert_eq!(t.advance(f32::NAN), None);
        assert_eq!(t.advance(-1.0), None);
        assert_eq!(t.elapsed(), 0.0);
    }

    #[test]
    fn test_arc_angle_normalized() {
        let arc = JudgmentArc::new(1, -30.0, 3.0, 1.0);
        assert!((arc.angle - 330.0).abs() < 1e-4);
        assert_eq!(arc.phase(), ArcPhase::Approaching);
    }

    proptest! {
        #[test]
        fn prop_phases_only_move_forward(
            steps in proptest::collection::vec(0.0f32..0.5, 1..200),
            lifetime in 0.1f32..5.0,
            window_frac in 0.0f32..1.0,
        ) {
            let mut t = ArcTimer::new(lifetime, lifetime * window_frac);
            let mut seen_judging = false;
            let mut last_rank = t.phase().rank();
            for dt in steps {
                let before = t.phase();
                if let Some(entered) = t.advance(dt) {
                    prop_assert_eq!(entered.rank(), before.rank() + 1);
                }
                if t.is_judging() {
                    seen_judging = true;
                }
                prop_assert!(t.phase().rank() >= last_rank);
                prop_assert!(t.elapsed() <= t.total_lifetime());
                if t.is_resolved() {
                    prop_assert!(seen_judging, "Resolved without passing through Judging");
                }
                last_rank = t.phase().rank();
            }
        }
    }
}
