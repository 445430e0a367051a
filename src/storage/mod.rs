//! Durable storage
//!
//! Key-value persistence shared by the achievement registry and the
//! path selection record.

pub mod store;
pub mod path;

pub use store::{KeyValueStore, MemoryStore, FileStore, load_json, save_json, default_data_dir};
pub use path::{Door, PathSelection, PathTiers, HardwareTier, BudgetTier, ExpertiseTier, select_path, load_path};

/// Key holding the JSON array of unlocked achievement ids
pub const ACHIEVEMENTS_KEY: &str = "wirthforge_achievements";

/// Key holding the JSON path selection object
pub const PATH_KEY: &str = "wirthforge_path";
