//! Engine-agnostic host wrapper: build on demand, rebuild on request or timer

use super::{BoardGenerator, GenerationOutcome, GenerationSettings};
use crate::errors::{BoardError, BoardResult};
use crate::grid::BoardGrid;
use crate::rules::{TerrainRule, check_rules};
use tracing::{debug, info};

/// Holds a generator with its rules and settings and drives rebuilds from
/// whatever loop the embedding application runs.
#[derive(Debug, Clone)]
pub struct BoardHost {
    generator: BoardGenerator,
    rules: Vec<TerrainRule>,
    settings: GenerationSettings,
    pending: Option<Option<u64>>,
    auto_rebuild_secs: Option<f32>,
    since_build: f32,
    outcome: Option<GenerationOutcome>,
}

impl BoardHost {
    pub fn new(rules: Vec<TerrainRule>, settings: GenerationSettings) -> BoardResult<Self> {
        check_rules(&rules)?;
        Ok(Self {
            generator: BoardGenerator::new(),
            rules,
            settings,
            pending: None,
            auto_rebuild_secs: None,
            since_build: 0.0,
            outcome: None,
        })
    }

    /// Rebuild with the next seed every `interval` seconds of ticks
    pub fn with_auto_rebuild(mut self, interval: f32) -> BoardResult<Self> {
        if !(interval > 0.0) {
            return Err(BoardError::InvalidArgument {
                reason: format!("auto rebuild interval must be positive, got {interval}"),
            });
        }
        self.auto_rebuild_secs = Some(interval);
        Ok(self)
    }

    /// Generate now with the configured settings
    pub fn build_board(&mut self) -> BoardResult<&GenerationOutcome> {
        let outcome = self.generator.generate(&self.rules, &self.settings)?;
        info!(
            "Board ready (seed {}, {} attempts, accepted: {})",
            outcome.seed, outcome.attempts, outcome.accepted
        );
        self.since_build = 0.0;
        self.pending = None;
        Ok(&*self.outcome.insert(outcome))
    }

    /// Schedule a rebuild for the next tick; `Some(seed)` replaces the configured seed
    pub fn request_rebuild(&mut self, seed: Option<u64>) {
        self.pending = Some(seed);
    }

    /// Advance host time; returns true when the board was rebuilt this tick
    pub fn on_tick(&mut self, delta_secs: f32) -> BoardResult<bool> {
        self.since_build += delta_secs.max(0.0);

        let due = match self.pending.take() {
            Some(seed) => Some(seed),
            None => match self.auto_rebuild_secs {
                Some(interval) if self.since_build >= interval => {
                    Some(self.outcome.as_ref().map(|last| last.seed.wrapping_add(1)))
                }
                _ => None,
            },
        };
        let Some(seed) = due else {
            return Ok(false);
        };

        if let Some(seed) = seed {
            debug!("Rebuilding board with seed {seed}");
            self.settings.seed = seed;
        }
        self.build_board()?;
        Ok(true)
    }

    pub fn grid(&self) -> &BoardGrid {
        self.generator.grid()
    }

    pub fn generator_mut(&mut self) -> &mut BoardGenerator {
        &mut self.generator
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn rules(&self) -> &[TerrainRule] {
        &self.rules
    }

    /// Swap the rule set; takes effect on the next build
    pub fn set_rules(&mut self, rules: Vec<TerrainRule>) -> BoardResult<()> {
        check_rules(&rules)?;
        self.rules = rules;
        Ok(())
    }
}
