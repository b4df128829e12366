//! Judgment Ring headless runner
//!
//! Plays one judgment session at a fixed 60 Hz step with an autopilot
//! crosshair and prints the tally.
//!
//! Usage: `judgment-ring [timed|combo|elimination|settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::{Cell, RefCell};
    use std::path::Path;
    use std::rc::Rc;

    use judgment_ring::consts::SIM_DT;
    use judgment_ring::sim::{
        Crosshair, DamageLedger, GameSession, RandomAngles, SessionEvent,
    };
    use judgment_ring::{EncounterPreset, RhythmSettings};

    /// Autopilot turn rate (degrees per second)
    const AUTOPILOT_TURN_RATE: f32 = 240.0;
    /// Hard cap on simulated time
    const MAX_SIM_SECONDS: f32 = 600.0;
    /// Combined enemy health for the Elimination preset
    const ENEMY_POOL_HP: f32 = 100.0;

    fn settings_from_arg(arg: Option<&String>) -> RhythmSettings {
        match arg {
            Some(arg) => match EncounterPreset::from_str(arg) {
                Some(preset) => {
                    log::info!("Using preset: {}", preset.as_str());
                    RhythmSettings::from_preset(preset)
                }
                None => RhythmSettings::load(Path::new(arg)),
            },
            None => RhythmSettings::default(),
        }
    }

    pub fn run() {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let settings = settings_from_arg(args.first());
        let seed = args
            .get(1)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(rand::random::<u64>);
        log::info!("Judgment Ring (headless) starting with seed: {}", seed);

        let ledger = Rc::new(RefCell::new(DamageLedger::default()));
        let crosshair = Rc::new(RefCell::new(Crosshair::new(0.0, settings.circle_radius)));

        let enemies = Rc::clone(&ledger);
        let mut session = GameSession::new(
            settings,
            Box::new(RandomAngles::new(seed)),
            Box::new(Rc::clone(&ledger)),
        )
        .with_aim_source(Rc::clone(&crosshair))
        .with_exit_predicate(move || enemies.borrow().enemy_damage >= ENEMY_POOL_HP);

        let streak = Rc::new(Cell::new(0u32));
        let best_streak = Rc::new(Cell::new(0u32));
        {
            let streak = Rc::clone(&streak);
            let best = Rc::clone(&best_streak);
            session.subscribe(move |event| match event {
                SessionEvent::JudgmentSucceeded => {
                    streak.set(streak.get() + 1);
                    best.set(best.get().max(streak.get()));
                }
                SessionEvent::JudgmentFailed => streak.set(0),
                _ => {}
            });
        }

        session.start();

        let max_ticks = (MAX_SIM_SECONDS / SIM_DT) as u64;
        let mut ticks = 0u64;
        while session.is_running() && ticks < max_ticks {
            // Chase the oldest live arc, or pre-aim at the next spawn
            let target = session
                .live_arcs()
                .first()
                .map(|arc| arc.angle)
                .unwrap_or_else(|| session.next_angle());
            crosshair
                .borrow_mut()
                .move_toward(target, SIM_DT, AUTOPILOT_TURN_RATE);

            session.tick(SIM_DT);
            ticks += 1;
        }
        if session.is_running() {
            log::warn!("Simulation cap of {}s reached", MAX_SIM_SECONDS);
            session.stop_session();
        }

        let state = session.state();
        let totals = ledger.borrow();
        println!("Judgment Ring - seed {}", seed);
        println!("  time:          {:.1}s", state.elapsed_time);
        println!("  hits / misses: {} / {}", state.hits_count, state.misses_count);
        if let Some(accuracy) = state.accuracy() {
            println!("  accuracy:      {:.0}%", accuracy * 100.0);
        }
        println!("  best streak:   {}", best_streak.get());
        println!("  enemy damage:  {:.0}", totals.enemy_damage);
        println!("  player damage: {:.0}", totals.player_damage);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is a library on the web; hosts drive GameSession directly
}
