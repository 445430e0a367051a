//! Energy simulation store
//!
//! Owns the displayed `EnergyFlow`, regenerates it from pattern triggers and
//! keeps the generation flag that the UI shows while a pattern plays.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::patterns::{self, GeneratedPattern, PatternTable, scatter_particles};
use super::timer::{FlagResetPolicy, FlagResetSchedule};
use super::types::{EnergyFlow, EnergyType, LightningStrike, Particle, ParticleId};
use crate::config::ForgeConfig;

/// Strikes kept for the renderer; older ones are dropped
const STRIKE_HISTORY: usize = 32;

/// Store handle for multi-threaded hosts
pub type SharedEnergyStore = Arc<Mutex<EnergySimulationStore>>;

/// Particle/flow state plus the self-expiring generation flag
#[derive(Debug)]
pub struct EnergySimulationStore {
    flow: EnergyFlow,
    strikes: Vec<LightningStrike>,
    generating: bool,
    /// Bumped on every trigger
    generation: u64,
    resets: FlagResetSchedule,
    patterns: PatternTable,
    policy: FlagResetPolicy,
    next_particle_id: u64,
    /// Mixed with seed text for triggered patterns
    base_seed: u64,
    /// Ambient particles
    rng: StdRng,
}

impl Default for EnergySimulationStore {
    fn default() -> Self {
        Self::with_seed(rand::random())
    }
}

impl EnergySimulationStore {
    pub fn new(patterns: PatternTable, policy: FlagResetPolicy, seed: u64) -> Self {
        Self {
            flow: EnergyFlow::default(),
            strikes: Vec::new(),
            generating: false,
            generation: 0,
            resets: FlagResetSchedule::new(),
            patterns,
            policy,
            next_particle_id: 0,
            base_seed: seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Default tuning with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(PatternTable::default(), FlagResetPolicy::default(), seed)
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        log::info!(
            "Energy store ready (seed {}, reset policy {:?})",
            seed,
            config.flag_reset
        );
        Self::new(config.patterns, config.flag_reset, seed)
    }

    /// Replace the flow with a freshly generated pattern
    ///
    /// Raises the generation flag and schedules its reset. Returns the number
    /// of particles generated.
    ///
    /// The reset is due on the simulation clock, not the wall clock: the flag
    /// only clears once `advance_simulation` has covered the pattern's flag
    /// duration. A host that stops ticking leaves the flag raised.
    pub fn trigger_pattern(&mut self, energy_type: EnergyType, seed_text: &str) -> usize {
        self.generating = true;
        self.generation += 1;

        let tuning = self.patterns.get(energy_type);
        let count = tuning.particle_count(seed_text);
        let GeneratedPattern { mut flow, strike } =
            patterns::generate(energy_type, seed_text, count, self.base_seed);

        self.assign_ids(&mut flow.particles);
        self.flow = flow;

        if let Some(strike) = strike {
            if self.strikes.len() >= STRIKE_HISTORY {
                self.strikes.remove(0);
            }
            self.strikes.push(strike);
        }

        self.resets.schedule(tuning.flag_seconds, self.generation);
        log::debug!(
            "Triggered {} pattern #{} with {} particles",
            energy_type,
            self.generation,
            count
        );
        count
    }

    /// Append background particles without touching flow metadata or the flag
    pub fn add_ambient_particles(&mut self, count: usize, energy_type: EnergyType) {
        let mut particles = scatter_particles(energy_type, count, &mut self.rng);
        self.assign_ids(&mut particles);
        self.flow.particles.extend(particles);
    }

    /// Per-frame step
    ///
    /// Ages and moves every particle and fires due flag resets. Expired
    /// particles stay in the collection.
    pub fn advance_simulation(&mut self, elapsed_seconds: f32) {
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            log::debug!("Ignoring invalid frame delta {}", elapsed_seconds);
            return;
        }

        self.flow.advance(elapsed_seconds);

        for generation in self.resets.advance(elapsed_seconds as f64) {
            let applies = match self.policy {
                FlagResetPolicy::Generational => generation == self.generation,
                FlagResetPolicy::EveryTimer => true,
            };
            if applies {
                self.generating = false;
            }
        }
    }

    /// Back to the empty default flow with no strike history
    pub fn clear_all(&mut self) {
        self.flow = EnergyFlow::default();
        self.strikes.clear();
    }

    /// Swap in an externally built flow
    pub fn replace_flow(&mut self, flow: EnergyFlow) {
        self.flow = flow;
    }

    pub fn energy_flow(&self) -> &EnergyFlow {
        &self.flow
    }

    pub fn strikes(&self) -> &[LightningStrike] {
        &self.strikes
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Number of triggers so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn live_particle_count(&self) -> usize {
        self.flow.live_particles().count()
    }

    /// Simulation seconds elapsed
    pub fn clock(&self) -> f64 {
        self.resets.clock()
    }

    /// Wrap in a mutex for hosts that touch the store from several threads
    pub fn into_shared(self) -> SharedEnergyStore {
        Arc::new(Mutex::new(self))
    }

    fn assign_ids(&mut self, particles: &mut [Particle]) {
        for particle in particles {
            particle.id = ParticleId(self.next_particle_id);
            self.next_particle_id += 1;
        }
    }
}
