//! Arc spawning and judgment
//!
//! The scheduler owns every live arc. Each tick runs, in order:
//! 1. spawn one arc from the angle queue when the spawn countdown runs out
//! 2. advance every arc timer by `dt`
//! 3. level-triggered hit test for every judging arc
//! 4. remove resolved arcs, one outcome each, in insertion order

use serde::{Deserialize, Serialize};

use super::arc::{ArcPhase, JudgmentArc, Resolution};
use super::queue::AngleQueue;
use super::sector::{AimSample, SectorMatcher};
use crate::consts::{MIN_SPAWN_INTERVAL, TIME_EPSILON};
use crate::settings::RhythmSettings;

/// A removed arc and how it ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcOutcome {
    pub arc_id: u32,
    pub angle: f32,
    pub resolution: Resolution,
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerTick {
    /// Arcs spawned this tick
    pub spawned: u32,
    /// Resolved arcs, FIFO by spawn order
    pub outcomes: Vec<ArcOutcome>,
}

#[derive(Debug, Clone)]
pub struct JudgmentScheduler {
    /// Live arcs in spawn order
    arcs: Vec<JudgmentArc>,
    spawn_countdown: f32,
    spawn_interval: f32,
    approach_time: f32,
    judgment_window: f32,
    next_arc_id: u32,
    spawned_total: u64,
}

impl JudgmentScheduler {
    pub fn new(spawn_interval: f32, approach_time: f32, judgment_window: f32) -> Self {
        Self {
            arcs: Vec::new(),
            spawn_countdown: 0.0,
            spawn_interval: spawn_interval.max(MIN_SPAWN_INTERVAL),
            approach_time: approach_time.max(0.0),
            judgment_window: judgment_window.max(0.0),
            next_arc_id: 1,
            spawned_total: 0,
        }
    }

    pub fn from_settings(settings: &RhythmSettings) -> Self {
        Self::new(
            settings.spawn_interval,
            settings.approach_time,
            settings.judgment_window,
        )
    }

    /// Begin a run: drop any live arcs, first spawn after `initial_delay`
    pub fn start(&mut self, initial_delay: f32) {
        self.arcs.clear();
        self.spawn_countdown = initial_delay.max(0.0);
    }

    /// Abandon every live arc without resolving it. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.arcs.len();
        self.arcs.clear();
        dropped
    }

    /// Seconds from spawn to forced expiry for new arcs
    pub fn arc_lifetime(&self) -> f32 {
        self.approach_time + self.judgment_window
    }

    fn spawn(&mut self, angle: f32) -> u32 {
        let id = self.next_arc_id;
        self.next_arc_id = self.next_arc_id.wrapping_add(1);
        self.spawned_total += 1;
        self.arcs.push(JudgmentArc::new(
            id,
            angle,
            self.arc_lifetime(),
            self.judgment_window,
        ));
        id
    }

    pub fn tick(
        &mut self,
        dt: f32,
        queue: &mut AngleQueue,
        matcher: &SectorMatcher,
        aim: Option<AimSample>,
    ) -> SchedulerTick {
        let mut result = SchedulerTick::default();
        if !dt.is_finite() || dt < 0.0 {
            return result;
        }

        // 1. Spawn, at most one arc per tick; a long hitch does not queue up
        // a burst of spawns
        if self.spawn_countdown <= TIME_EPSILON {
            let angle = queue.next_angle();
            let id = self.spawn(angle);
            queue.advance();
            self.spawn_countdown = self.spawn_countdown.max(0.0) + self.spawn_interval;
            result.spawned = 1;
            log::trace!("spawned arc {} at {:.1}°", id, angle);
        }
        self.spawn_countdown -= dt;

        // 2. Advance timers
        for arc in &mut self.arcs {
            if arc.timer.advance(dt) == Some(ArcPhase::Judging) {
                log::trace!("arc {} judging", arc.id);
            }
        }

        // 3. Level-triggered judgment
        for arc in &mut self.arcs {
            if arc.timer.is_judging() {
                arc.timer.try_hit(matcher.matches(aim, arc.angle));
            }
        }

        // 4. Collect resolved arcs in spawn order
        for arc in &self.arcs {
            if let Some(resolution) = arc.timer.resolution() {
                result.outcomes.push(ArcOutcome {
                    arc_id: arc.id,
                    angle: arc.angle,
                    resolution,
                });
            }
        }
        self.arcs.retain(|arc| !arc.timer.is_resolved());

        result
    }

    /// Live arcs in spawn order
    pub fn arcs(&self) -> &[JudgmentArc] {
        &self.arcs
    }

    /// Oldest live arc
    pub fn active_arc(&self) -> Option<&JudgmentArc> {
        self.arcs.first()
    }

    pub fn spawn_countdown(&self) -> f32 {
        self.spawn_countdown
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    /// Arcs spawned over the scheduler's lifetime
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::queue::ScriptedAngles;

    fn setup(angles: Vec<f32>) -> (JudgmentScheduler, AngleQueue, SectorMatcher) {
        let mut queue = AngleQueue::new(Box::new(ScriptedAngles::new(angles)));
        queue.prime();
        let mut scheduler = JudgmentScheduler::new(2.0, 2.0, 1.0);
        scheduler.start(0.0);
        (scheduler, queue, SectorMatcher::new(30.0, 200.0))
    }

    #[test]
    fn test_spawn_cadence() {
        let (mut s, mut q, m) = setup(vec![10.0, 20.0, 30.0, 40.0]);
        let mut spawn_ticks = Vec::new();
        for i in 1..=45 {
            if s.tick(0.1, &mut q, &m, None).spawned > 0 {
                spawn_ticks.push(i);
            }
        }
        // t = 0.0, 2.0, 4.0
        assert_eq!(spawn_ticks, vec![1, 21, 41]);
        assert_eq!(s.spawned_total(), 3);
    }

    #[test]
    fn test_spawn_uses_next_then_preview() {
        let (mut s, mut q, m) = setup(vec![10.0, 20.0, 30.0]);
        assert_eq!(q.preview_angle(), 20.0);
        s.tick(0.1, &mut q, &m, None);
        assert_eq!(s.arcs()[0].angle, 10.0);
        assert_eq!(q.next_angle(), 20.0);
        assert_eq!(q.preview_angle(), 30.0);

        for _ in 0..20 {
            s.tick(0.1, &mut q, &m, None);
        }
        assert_eq!(s.arcs().last().map(|a| a.angle), Some(20.0));
    }

    #[test]
    fn test_unaimed_arc_misses_at_lifetime() {
        let (mut s, mut q, m) = setup(vec![90.0]);
        let mut misses_at = Vec::new();
        for i in 1..=35 {
            let tick = s.tick(0.1, &mut q, &m, None);
            for o in tick.outcomes {
                assert_eq!(o.resolution, Resolution::Miss);
                misses_at.push((i, o.arc_id));
            }
        }
        // Arc 1 spawned in tick 1 (t=0.0) expires in tick 30 (t=3.0)
        assert_eq!(misses_at, vec![(30, 1)]);
    }

    #[test]
    fn test_aimed_arc_hits_on_entering_judging() {
        let (mut s, mut q, m) = setup(vec![90.0]);
        let aim = Some(AimSample::new(90.0, 50.0));
        for i in 1..=30 {
            let tick = s.tick(0.1, &mut q, &m, aim);
            if i < 20 {
                assert!(tick.outcomes.is_empty(), "no hit before the window (tick {i})");
            } else if i == 20 {
                assert_eq!(tick.outcomes.len(), 1);
                assert_eq!(tick.outcomes[0].resolution, Resolution::Hit);
                return;
            }
        }
        panic!("arc never resolved");
    }

    #[test]
    fn test_aim_outside_distance_gate_misses() {
        let (mut s, mut q, m) = setup(vec![90.0]);
        let aim = Some(AimSample::new(90.0, 500.0));
        let mut outcomes = Vec::new();
        for _ in 0..30 {
            outcomes.extend(s.tick(0.1, &mut q, &m, aim).outcomes);
        }
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].resolution, Resolution::Miss);
    }

    #[test]
    fn test_simultaneous_resolution_is_fifo() {
        let mut queue = AngleQueue::new(Box::new(ScriptedAngles::constant(0.0)));
        queue.prime();
        let matcher = SectorMatcher::new(30.0, 200.0);
        let mut s = JudgmentScheduler::new(0.1, 1.0, 1.0);
        s.start(0.0);

        for _ in 0..14 {
            let tick = s.tick(0.1, &mut queue, &matcher, None);
            assert!(tick.outcomes.is_empty());
        }
        let judging = s.arcs().iter().filter(|a| a.timer.is_judging()).count();
        assert!(judging >= 4, "expected several judging arcs, got {judging}");

        let tick = s.tick(0.1, &mut queue, &matcher, Some(AimSample::new(0.0, 0.0)));
        let ids: Vec<u32> = tick.outcomes.iter().map(|o| o.arc_id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert!(ids.len() > judging.saturating_sub(1));
        assert_eq!(ids, sorted);
        assert!(tick.outcomes.iter().all(|o| o.resolution == Resolution::Hit));
    }

    #[test]
    fn test_long_hitch_spawns_one_arc() {
        let (mut s, mut q, m) = setup(vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(s.tick(0.1, &mut q, &m, None).spawned, 1);
        let hitch = s.tick(10.0, &mut q, &m, None);
        assert_eq!(hitch.spawned, 0);
        assert!(hitch.outcomes.is_empty());

        let next = s.tick(0.1, &mut q, &m, None);
        assert_eq!(next.spawned, 1);
        assert_eq!(next.outcomes.len(), 1);
        assert_eq!(next.outcomes[0].resolution, Resolution::Miss);
        assert_eq!(s.arcs().len(), 1);
        assert!((s.spawn_countdown() - 1.9).abs() < 1e-4);

        // Cadence resumes from the late spawn
        let spawns: u32 = (0..20).map(|_| s.tick(0.1, &mut q, &m, None).spawned).sum();
        assert_eq!(spawns, 1);
        assert_eq!(s.spawned_total(), 3);
    }

    #[test]
    fn test_arc_ids_wrap() {
        let (mut s, mut q, m) = setup(vec![0.0]);
        s.next_arc_id = u32::MAX;
        s.tick(0.1, &mut q, &m, None);
        s.start(0.0);
        s.tick(0.1, &mut q, &m, None);
        assert_eq!(s.arcs()[0].id, 0);
    }

    #[test]
    fn test_clear_abandons_without_outcomes() {
        let (mut s, mut q, m) = setup(vec![90.0]);
        for _ in 0..25 {
            s.tick(0.1, &mut q, &m, None);
        }
        assert!(!s.arcs().is_empty());
        assert_eq!(s.clear(), 2);
        assert_eq!(s.clear(), 0);
        assert!(s.active_arc().is_none());
    }

    #[test]
    fn test_initial_delay() {
        let mut queue = AngleQueue::new(Box::new(ScriptedAngles::constant(0.0)));
        queue.prime();
        let m = SectorMatcher::default();
        let mut s = JudgmentScheduler::new(2.0, 2.0, 1.0);
        s.start(0.5);
        let first = (1..=10)
            .find(|_| s.tick(0.1, &mut queue, &m, None).spawned > 0)
            .unwrap();
        assert_eq!(first, 6);
    }
}
