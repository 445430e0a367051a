//! Wirthforge - energy patterns and achievements for a local-AI playground
//!
//! Two leaf components over small collaborators:
//! an achievement registry persisted to key-value storage, and an energy
//! simulation store whose particle batches come from named pattern generators.

pub mod achievements;
pub mod energy;
pub mod storage;
pub mod config;
pub mod error;
pub mod api;
pub mod ui;

// Re-export commonly used types
pub use achievements::{Achievement, AchievementRegistry, UnlockOutcome};
pub use energy::{EnergyFlow, EnergySimulationStore, EnergyType, Particle};
pub use config::{ConfigSource, ForgeConfig};
pub use error::{ConfigError, StorageError};
