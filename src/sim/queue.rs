//! Spawn angle lookahead
//!
//! The queue keeps two slots filled from an [`AngleSource`]: `next` is the
//! bearing of the very next spawn, `preview` the one after it, so the UI can
//! hint upcoming targets a full spawn interval early.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::normalize_degrees;

/// Produces target bearings in degrees
pub trait AngleSource {
    fn next_angle(&mut self) -> f32;
}

/// Independent uniform draws in [0, 360) from a seeded PCG stream
#[derive(Debug, Clone)]
pub struct RandomAngles {
    seed: u64,
    rng: Pcg32,
}

impl RandomAngles {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl AngleSource for RandomAngles {
    fn next_angle(&mut self) -> f32 {
        self.rng.random_range(0.0..360.0)
    }
}

/// Cycles through a fixed list of bearings (tutorial patterns, tests)
#[derive(Debug, Clone, Default)]
pub struct ScriptedAngles {
    angles: Vec<f32>,
    cursor: usize,
}

impl ScriptedAngles {
    pub fn new(angles: impl Into<Vec<f32>>) -> Self {
        Self {
            angles: angles.into(),
            cursor: 0,
        }
    }

    /// Same bearing forever
    pub fn constant(angle: f32) -> Self {
        Self::new(vec![angle])
    }
}

impl AngleSource for ScriptedAngles {
    fn next_angle(&mut self) -> f32 {
        if self.angles.is_empty() {
            return 0.0;
        }
        let angle = self.angles[self.cursor % self.angles.len()];
        self.cursor = self.cursor.wrapping_add(1);
        angle
    }
}

/// Two-slot (next, preview) lookahead over an angle source
pub struct AngleQueue {
    source: Box<dyn AngleSource>,
    next: f32,
    preview: f32,
    primed: bool,
    draws: u64,
}

impl AngleQueue {
    pub fn new(source: Box<dyn AngleSource>) -> Self {
        Self {
            source,
            next: 0.0,
            preview: 0.0,
            primed: false,
            draws: 0,
        }
    }

    fn draw(&mut self) -> f32 {
        self.draws += 1;
        normalize_degrees(self.source.next_angle())
    }

    /// Fill both slots with fresh draws. The source is never rewound, so
    /// priming again continues the sequence instead of replaying it.
    pub fn prime(&mut self) {
        self.next = self.draw();
        self.preview = self.draw();
        self.primed = true;
    }

    /// Shift `preview` into `next` and draw a new preview.
    pub fn advance(&mut self) {
        if !self.primed {
            log::warn!("AngleQueue advanced before priming; priming now");
            self.prime();
            return;
        }
        self.next = self.preview;
        self.preview = self.draw();
    }

    /// Bearing of the next spawn
    #[inline]
    pub fn next_angle(&self) -> f32 {
        self.next
    }

    /// Bearing of the spawn after next
    #[inline]
    pub fn preview_angle(&self) -> f32 {
        self.preview
    }

    #[inline]
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Total values drawn from the source
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl std::fmt::Debug for AngleQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AngleQueue")
            .field("next", &self.next)
            .field("preview", &self.preview)
            .field("primed", &self.primed)
            .field("draws", &self.draws)
            .finish()
    }
}
