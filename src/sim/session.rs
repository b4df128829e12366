//! Judgment session orchestration
//!
//! `GameSession` is the only entry point a host needs: start it, call
//! [`GameSession::tick`] once per frame, stop it (or let the exit condition
//! stop it). Damage, aim and display are injected collaborators; events go
//! to subscribed observers.

use std::cell::Cell;
use std::rc::Rc;

use super::arc::Resolution;
use super::display::{ArcDisplay, DisplayFrame, countdown_text};
use super::events::{EventBus, SessionEvent, SubscriptionId};
use super::hooks::{AimSource, DamageSink, DisplaySink};
use super::queue::{AngleQueue, AngleSource};
use super::scheduler::{ArcOutcome, JudgmentScheduler};
use super::sector::{SectorIndicator, SectorMatcher};
use super::state::{ExitCondition, SessionState};
use super::JudgmentArc;
use crate::settings::RhythmSettings;

/// Injected "is the encounter over" query for [`ExitCondition::External`]
pub type ExitPredicate = Box<dyn FnMut() -> bool>;

/// Lets observers request a stop while the session is dispatching events.
///
/// During event dispatch the request is honoured before the next outcome is
/// applied and the outcomes left in that tick are abandoned. Otherwise the
/// next tick stops the session without advancing time.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// What one call to [`GameSession::tick`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub spawned: u32,
    pub hits: u32,
    pub misses: u32,
    /// Outcomes dropped because the session stopped mid-tick
    pub abandoned: u32,
    /// The session stopped during this tick
    pub stopped: bool,
}

pub struct GameSession {
    settings: RhythmSettings,
    state: SessionState,
    queue: AngleQueue,
    scheduler: JudgmentScheduler,
    matcher: SectorMatcher,
    indicator: SectorIndicator,
    damage: Box<dyn DamageSink>,
    aim: Option<Box<dyn AimSource>>,
    display: Option<Box<dyn DisplaySink>>,
    exit_predicate: Option<ExitPredicate>,
    events: EventBus,
    stop_handle: StopHandle,
    countdown: String,
}

impl GameSession {
    pub fn new(
        settings: RhythmSettings,
        angles: Box<dyn AngleSource>,
        damage: Box<dyn DamageSink>,
    ) -> Self {
        let settings = settings.sanitized();
        let state = SessionState::new(settings.exit_condition);
        let countdown = countdown_text(&state);
        Self {
            queue: AngleQueue::new(angles),
            scheduler: JudgmentScheduler::from_settings(&settings),
            matcher: SectorMatcher::new(settings.sector_tolerance, settings.max_aim_distance()),
            indicator: SectorIndicator::new(settings.snap_threshold, settings.transition_duration),
            damage,
            aim: None,
            display: None,
            exit_predicate: None,
            events: EventBus::new(),
            stop_handle: StopHandle::default(),
            countdown,
            state,
            settings,
        }
    }

    pub fn with_aim_source(mut self, aim: impl AimSource + 'static) -> Self {
        self.set_aim_source(aim);
        self
    }

    pub fn with_display_sink(mut self, display: impl DisplaySink + 'static) -> Self {
        self.set_display_sink(display);
        self
    }

    pub fn with_exit_predicate(mut self, predicate: impl FnMut() -> bool + 'static) -> Self {
        self.set_exit_predicate(predicate);
        self
    }

    pub fn set_aim_source(&mut self, aim: impl AimSource + 'static) {
        self.aim = Some(Box::new(aim));
    }

    /// Without an aim source every judgment window expires as a miss
    pub fn clear_aim_source(&mut self) {
        self.aim = None;
    }

    pub fn set_display_sink(&mut self, display: impl DisplaySink + 'static) {
        self.display = Some(Box::new(display));
    }

    pub fn set_exit_predicate(&mut self, predicate: impl FnMut() -> bool + 'static) {
        self.exit_predicate = Some(Box::new(predicate));
    }

    pub fn subscribe(&mut self, listener: impl FnMut(SessionEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Handle observers can use to stop the session from inside a callback
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Start with the configured exit condition
    pub fn start(&mut self) -> bool {
        self.start_session(self.settings.exit_condition)
    }

    /// Start a run. Ignored (returns false) while a run is active.
    pub fn start_session(&mut self, exit_condition: ExitCondition) -> bool {
        if self.state.running {
            log::warn!("start_session ignored: a judgment session is already running");
            return false;
        }
        let exit_condition = exit_condition.sanitized();
        if exit_condition == ExitCondition::External && self.exit_predicate.is_none() {
            log::warn!("External exit condition without a predicate; session only ends on stop");
        }

        self.state.reset(exit_condition);
        self.state.running = true;
        self.stop_handle.take();
        self.queue.prime();
        self.scheduler.start(self.settings.initial_spawn_delay);
        self.indicator.reset(self.queue.next_angle());
        self.countdown = countdown_text(&self.state);

        log::info!(
            "Judgment session started ({}, spawn every {:.2}s, window {:.2}s)",
            exit_condition.as_str(),
            self.settings.spawn_interval,
            self.settings.judgment_window
        );
        self.events.emit(SessionEvent::SessionStarted);
        true
    }

    /// Advance the session by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickSummary {
        let mut summary = TickSummary::default();
        if !self.state.running {
            return summary;
        }
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("tick ignored: invalid dt {}", dt);
            return summary;
        }
        // A stop requested between ticks ends the run before any time passes
        if self.stop_handle.take() {
            summary.stopped = self.stop_session();
            return summary;
        }

        self.state.elapsed_time += dt;
        self.state.ticks += 1;

        let aim = self.aim.as_ref().and_then(|source| source.sample());
        let step = self.scheduler.tick(dt, &mut self.queue, &self.matcher, aim);
        summary.spawned = step.spawned;

        let mut outcomes = step.outcomes.into_iter();
        while let Some(outcome) = outcomes.next() {
            if self.stop_handle.take() {
                summary.abandoned = 1 + outcomes.len() as u32;
                summary.stopped = self.stop_session();
                return summary;
            }
            self.apply_outcome(outcome, &mut summary);
        }
        if self.stop_handle.take() {
            summary.stopped = self.stop_session();
            return summary;
        }

        let target = self
            .scheduler
            .active_arc()
            .map(|arc| arc.angle)
            .unwrap_or_else(|| self.queue.next_angle());
        self.indicator.update(dt);
        self.indicator.retarget(target);
        self.countdown = countdown_text(&self.state);

        if self.display.is_some() {
            let frame = self.display_frame();
            if let Some(display) = self.display.as_mut() {
                display.present(&frame);
            }
        }

        let predicate = &mut self.exit_predicate;
        let done = self
            .state
            .exit_satisfied(|| predicate.as_mut().is_some_and(|p| p()));
        if done {
            summary.stopped = self.stop_session();
        }
        summary
    }

    fn apply_outcome(&mut self, outcome: ArcOutcome, summary: &mut TickSummary) {
        match outcome.resolution {
            Resolution::Hit => {
                self.state.hits_count += 1;
                summary.hits += 1;
                self.damage.damage_all(self.settings.success_damage);
                log::debug!("arc {} hit at {:.1}°", outcome.arc_id, outcome.angle);
                self.events.emit(SessionEvent::JudgmentSucceeded);
            }
            Resolution::Miss => {
                self.state.misses_count += 1;
                summary.misses += 1;
                self.damage.damage_player(self.settings.failure_damage);
                log::debug!("arc {} missed at {:.1}°", outcome.arc_id, outcome.angle);
                self.events.emit(SessionEvent::JudgmentFailed);
            }
        }
    }

    /// End the run. Safe to call any number of times; only the first call
    /// of a run emits `SessionEnded`.
    pub fn stop_session(&mut self) -> bool {
        if !self.state.running {
            log::debug!("stop_session: no session running");
            return false;
        }

        let abandoned = self.scheduler.clear();
        self.state.running = false;
        self.stop_handle.take();
        self.indicator.reset(self.indicator.displayed());

        log::info!(
            "Judgment session ended after {:.1}s: {} hits, {} misses, {} arcs abandoned",
            self.state.elapsed_time,
            self.state.hits_count,
            self.state.misses_count,
            abandoned
        );
        self.events.emit(SessionEvent::SessionEnded);
        true
    }

    /// Current display values (also pushed to the display sink every tick)
    pub fn display_frame(&self) -> DisplayFrame {
        DisplayFrame {
            arcs: self.scheduler.arcs().iter().map(ArcDisplay::from_arc).collect(),
            indicator_angle: self.indicator.displayed(),
            next_angle: self.queue.next_angle(),
            preview_angle: self.queue.preview_angle(),
            countdown_text: self.countdown.clone(),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &RhythmSettings {
        &self.settings
    }

    /// Live arcs in spawn order
    pub fn live_arcs(&self) -> &[JudgmentArc] {
        self.scheduler.arcs()
    }

    pub fn countdown_text(&self) -> &str {
        &self.countdown
    }

    pub fn next_angle(&self) -> f32 {
        self.queue.next_angle()
    }

    pub fn preview_angle(&self) -> f32 {
        self.queue.preview_angle()
    }

    pub fn indicator_angle(&self) -> f32 {
        self.indicator.displayed()
    }

    pub fn matcher(&self) -> &SectorMatcher {
        &self.matcher
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("queue", &self.queue)
            .field("live_arcs", &self.scheduler.arcs().len())
            .field("events", &self.events)
            .finish()
    }
}
