//! Tick-driven judgment simulation
//!
//! All gameplay logic lives here. This module must stay pure and synchronous:
//! - One logical step per `tick(dt)`, no threads, no timers of its own
//! - Randomness only through an injected `AngleSource`
//! - Stable iteration order (arcs in spawn order)
//! - No rendering or platform dependencies

pub mod arc;
pub mod display;
pub mod events;
pub mod hooks;
pub mod queue;
pub mod scheduler;
pub mod sector;
pub mod session;
pub mod state;

pub use arc::{ArcPhase, ArcTimer, JudgmentArc, Resolution};
pub use display::{ArcDisplay, ColorHint, DisplayFrame, countdown_text};
pub use events::{EventBus, SessionEvent, SubscriptionId};
pub use hooks::{AimSource, Crosshair, DamageLedger, DamageSink, DisplaySink, FrameRecorder};
pub use queue::{AngleQueue, AngleSource, RandomAngles, ScriptedAngles};
pub use scheduler::{ArcOutcome, JudgmentScheduler, SchedulerTick};
pub use sector::{
    AimSample, SectorIndicator, SectorMatcher, is_aim_in_sector, smoothed_angle_transition,
};
pub use session::{ExitPredicate, GameSession, StopHandle, TickSummary};
pub use state::{ExitCondition, SessionState};
