//! Sector matching and indicator smoothing
//!
//! Hit detection compares the crosshair bearing against an arc bearing along
//! the shortest angular path, after gating on how far the aim point sits from
//! the circle center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{cartesian_to_polar, normalize_degrees, shortest_delta};

/// One poll of the aim source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimSample {
    /// Crosshair bearing in degrees
    pub bearing: f32,
    /// Distance of the aim point from the circle center
    pub distance: f32,
}

impl AimSample {
    pub fn new(bearing: f32, distance: f32) -> Self {
        Self { bearing, distance }
    }

    /// Sample from an aim point relative to the circle center
    pub fn from_point(point: Vec2) -> Self {
        let (distance, bearing) = cartesian_to_polar(point);
        Self { bearing, distance }
    }

    pub fn is_finite(&self) -> bool {
        self.bearing.is_finite() && self.distance.is_finite()
    }
}

/// True iff `aim` lies within `tolerance / 2` degrees of `arc`, either side
#[inline]
pub fn is_aim_in_sector(aim: f32, arc: f32, tolerance: f32) -> bool {
    shortest_delta(aim, arc).abs() <= tolerance / 2.0
}

/// Hit test with distance gating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorMatcher {
    /// Full sector width in degrees
    pub tolerance_degrees: f32,
    /// Aim farther than this from the center never matches
    pub max_aim_distance: f32,
}

impl Default for SectorMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SECTOR_TOLERANCE, DEFAULT_CIRCLE_RADIUS * DEFAULT_AIM_DISTANCE_FACTOR)
    }
}

impl SectorMatcher {
    pub fn new(tolerance_degrees: f32, max_aim_distance: f32) -> Self {
        Self {
            tolerance_degrees,
            max_aim_distance,
        }
    }

    /// Whether the aim is close enough to the center to be judged at all
    pub fn in_range(&self, aim: &AimSample) -> bool {
        aim.is_finite() && aim.distance <= self.max_aim_distance
    }

    /// Judge one aim poll against an arc bearing. No aim counts as no hit.
    pub fn matches(&self, aim: Option<AimSample>, arc_angle: f32) -> bool {
        match aim {
            Some(aim) if self.in_range(&aim) => {
                is_aim_in_sector(aim.bearing, arc_angle, self.tolerance_degrees)
            }
            _ => false,
        }
    }
}

/// Ease from `current` toward `target` along the shortest path.
///
/// Smoothstep over `duration` seconds; `elapsed` is clamped so the result
/// settles exactly on `target`. Non-positive durations snap.
pub fn smoothed_angle_transition(current: f32, target: f32, duration: f32, elapsed: f32) -> f32 {
    if duration <= 0.0 {
        return normalize_degrees(target);
    }
    let t = (elapsed / duration).clamp(0.0, 1.0);
    let eased = t * t * (3.0 - 2.0 * t);
    normalize_degrees(current + shortest_delta(current, target) * eased)
}

/// Displayed rotation of the sector indicator.
///
/// Small retargets snap, large ones animate for a fixed short duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorIndicator {
    displayed: f32,
    from: f32,
    target: f32,
    elapsed: f32,
    animating: bool,
    snap_threshold: f32,
    duration: f32,
}

impl Default for SectorIndicator {
    fn default() -> Self {
        Self::new(SNAP_THRESHOLD_DEGREES, TRANSITION_DURATION)
    }
}

impl SectorIndicator {
    pub fn new(snap_threshold: f32, duration: f32) -> Self {
        Self {
            displayed: 0.0,
            from: 0.0,
            target: 0.0,
            elapsed: 0.0,
            animating: false,
            snap_threshold,
            duration,
        }
    }

    /// Point at a new bearing
    pub fn retarget(&mut self, angle: f32) {
        let angle = normalize_degrees(angle);
        if self.animating && shortest_delta(self.target, angle).abs() <= f32::EPSILON {
            return;
        }
        if shortest_delta(self.displayed, angle).abs() <= self.snap_threshold {
            self.displayed = angle;
            self.target = angle;
            self.animating = false;
        } else {
            self.from = self.displayed;
            self.target = angle;
            self.elapsed = 0.0;
            self.animating = true;
        }
    }

    /// Advance any running transition; returns the displayed bearing
    pub fn update(&mut self, dt: f32) -> f32 {
        if self.animating {
            self.elapsed += dt.max(0.0);
            if self.elapsed + TIME_EPSILON >= self.duration {
                self.displayed = self.target;
                self.animating = false;
            } else {
                self.displayed =
                    smoothed_angle_transition(self.from, self.target, self.duration, self.elapsed);
            }
        }
        self.displayed
    }

    /// Jump to `angle`, discarding any pending transition
    pub fn reset(&mut self, angle: f32) {
        let angle = normalize_degrees(angle);
        self.displayed = angle;
        self.from = angle;
        self.target = angle;
        self.elapsed = 0.0;
        self.animating = false;
    }

    #[inline]
    pub fn displayed(&self) -> f32 {
        self.displayed
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animating
    }
}
