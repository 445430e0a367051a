//! Energy simulation
//!
//! Particle batches generated from named patterns, advanced by a per-frame
//! clock and consumed by whatever renders them.

pub mod types;
pub mod patterns;
pub mod timer;
pub mod store;

pub use types::{
    EnergyFlow, EnergyType, FlowPattern, LightningStrike, Particle, ParticleId, ResonanceField,
    Rgb, Vec3,
};
pub use patterns::{GeneratedPattern, PatternTable, PatternTuning, generate};
pub use timer::{FlagResetPolicy, FlagResetSchedule};
pub use store::{EnergySimulationStore, SharedEnergyStore};
