//! Collaborator contracts
//!
//! The core never knows how enemies, the player, the crosshair or the HUD are
//! represented. It talks to them through these traits, injected at
//! construction.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::display::DisplayFrame;
use super::sector::AimSample;
use crate::{normalize_degrees, polar_to_cartesian, shortest_delta};

/// Receives damage produced by judgments
pub trait DamageSink {
    /// Area damage to every enemy (successful judgment)
    fn damage_all(&mut self, amount: f32);
    /// Damage to the player (expired judgment)
    fn damage_player(&mut self, amount: f32);
}

/// Crosshair position, polled once per tick
pub trait AimSource {
    /// Bearing in degrees, `None` if there is no crosshair right now
    fn current_aim_bearing(&self) -> Option<f32>;
    /// Distance of the aim point from the circle center
    fn current_aim_distance_from_center(&self) -> Option<f32>;

    fn sample(&self) -> Option<AimSample> {
        Some(AimSample::new(
            self.current_aim_bearing()?,
            self.current_aim_distance_from_center()?,
        ))
    }
}

/// Consumes per-tick display output
pub trait DisplaySink {
    fn present(&mut self, frame: &DisplayFrame);
}

impl<T: DamageSink + ?Sized> DamageSink for Rc<RefCell<T>> {
    fn damage_all(&mut self, amount: f32) {
        self.borrow_mut().damage_all(amount);
    }

    fn damage_player(&mut self, amount: f32) {
        self.borrow_mut().damage_player(amount);
    }
}

impl<T: AimSource + ?Sized> AimSource for Rc<RefCell<T>> {
    fn current_aim_bearing(&self) -> Option<f32> {
        self.borrow().current_aim_bearing()
    }

    fn current_aim_distance_from_center(&self) -> Option<f32> {
        self.borrow().current_aim_distance_from_center()
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Rc<RefCell<T>> {
    fn present(&mut self, frame: &DisplayFrame) {
        self.borrow_mut().present(frame);
    }
}

/// A fixed aim point
impl AimSource for AimSample {
    fn current_aim_bearing(&self) -> Option<f32> {
        Some(self.bearing)
    }

    fn current_aim_distance_from_center(&self) -> Option<f32> {
        Some(self.distance)
    }
}

/// Optional aim: `None` means the crosshair is currently absent
impl AimSource for Option<AimSample> {
    fn current_aim_bearing(&self) -> Option<f32> {
        self.map(|aim| aim.bearing)
    }

    fn current_aim_distance_from_center(&self) -> Option<f32> {
        self.map(|aim| aim.distance)
    }
}

/// Running damage totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageLedger {
    pub enemy_damage: f32,
    pub player_damage: f32,
    pub enemy_strikes: u32,
    pub player_strikes: u32,
}

impl DamageSink for DamageLedger {
    fn damage_all(&mut self, amount: f32) {
        self.enemy_damage += amount;
        self.enemy_strikes += 1;
    }

    fn damage_player(&mut self, amount: f32) {
        self.player_damage += amount;
        self.player_strikes += 1;
    }
}

/// Frames kept by a [`FrameRecorder`]
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    pub frames: Vec<DisplayFrame>,
}

impl DisplaySink for FrameRecorder {
    fn present(&mut self, frame: &DisplayFrame) {
        self.frames.push(frame.clone());
    }
}

/// A crosshair whose bearing chases a target at a capped angular speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crosshair {
    /// Current bearing (degrees)
    pub bearing: f32,
    /// Distance from the circle center
    pub distance: f32,
    /// Angular velocity of the last move (degrees/s)
    pub angular_vel: f32,
}

impl Crosshair {
    pub fn new(bearing: f32, distance: f32) -> Self {
        Self {
            bearing: normalize_degrees(bearing),
            distance,
            angular_vel: 0.0,
        }
    }

    /// Rotate toward `target` along the shortest path, at most `max_speed` deg/s
    pub fn move_toward(&mut self, target: f32, dt: f32, max_speed: f32) {
        if dt <= 0.0 {
            return;
        }
        let delta = shortest_delta(self.bearing, target);
        let max_delta = max_speed * dt;
        let clamped = delta.clamp(-max_delta, max_delta);

        self.angular_vel = clamped / dt;
        self.bearing = normalize_degrees(self.bearing + clamped);
    }

    /// Aim point in circle-local coordinates
    pub fn position(&self) -> Vec2 {
        polar_to_cartesian(self.distance, self.bearing)
    }
}

impl AimSource for Crosshair {
    fn current_aim_bearing(&self) -> Option<f32> {
        Some(self.bearing)
    }

    fn current_aim_distance_from_center(&self) -> Option<f32> {
        Some(self.distance)
    }
}
