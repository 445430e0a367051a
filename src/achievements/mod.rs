//! Achievement system
//!
//! Catalog definitions and the persisted unlock registry.

pub mod catalog;
pub mod registry;

pub use catalog::{Achievement, all_achievements};
pub use registry::{AchievementRegistry, SharedRegistry, UnlockOutcome};
