//! Door/path selection record
//!
//! The user's chosen "door" plus the tier selections made alongside it.
//! Persisted once per selection and only ever read back for display.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::store::{KeyValueStore, load_json, save_json};
use super::PATH_KEY;
use crate::error::StorageError;

/// The three doors offered on the landing screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Door {
    Forge,
    Scholar,
    Sage,
}

impl Door {
    pub const ALL: [Door; 3] = [Door::Forge, Door::Scholar, Door::Sage];

    pub fn id(&self) -> &'static str {
        match self {
            Door::Forge => "forge",
            Door::Scholar => "scholar",
            Door::Sage => "sage",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Door::Forge => "FORGE",
            Door::Scholar => "SCHOLAR",
            Door::Sage => "SAGE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Door::Forge => "Raw power and instant creation",
            Door::Scholar => "Deep knowledge and wisdom",
            Door::Sage => "Consciousness and transcendence",
        }
    }

    /// Accent colour as hex
    pub fn color(&self) -> &'static str {
        match self {
            Door::Forge => "#ff6b35",
            Door::Scholar => "#4ecdc4",
            Door::Sage => "#45b7d1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareTier {
    Low,
    #[default]
    Mid,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    #[default]
    Free,
    Hobby,
    Pro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseTier {
    #[default]
    Novice,
    Practitioner,
    Expert,
}

/// Tier choices that accompany a door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathTiers {
    pub hardware: HardwareTier,
    pub budget: BudgetTier,
    pub expertise: ExpertiseTier,
}

/// Persisted path selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSelection {
    pub door: Door,
    /// Generated display identity, e.g. `FORGE-3F9A`
    pub identity: String,
    pub hardware: HardwareTier,
    pub budget: BudgetTier,
    pub expertise: ExpertiseTier,
    /// Unix seconds
    pub selected_at: u64,
}

/// Record a door choice and persist it
pub fn select_path<S, R>(
    store: &S,
    door: Door,
    tiers: PathTiers,
    rng: &mut R,
) -> Result<PathSelection, StorageError>
where
    S: KeyValueStore + ?Sized,
    R: Rng,
{
    let selected_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let selection = PathSelection {
        door,
        identity: generate_identity(door, rng),
        hardware: tiers.hardware,
        budget: tiers.budget,
        expertise: tiers.expertise,
        selected_at,
    };

    save_json(store, PATH_KEY, &selection)?;
    log::info!("Path selected: {} as {}", door.id(), selection.identity);
    Ok(selection)
}

/// Read the persisted selection; unreadable data counts as none
pub fn load_path<S: KeyValueStore + ?Sized>(store: &S) -> Option<PathSelection> {
    match load_json(store, PATH_KEY) {
        Ok(selection) => selection,
        Err(e) => {
            log::warn!("Failed to load path selection: {}", e);
            None
        }
    }
}

fn generate_identity<R: Rng>(door: Door, rng: &mut R) -> String {
    let tag: u16 = rng.gen();
    format!("{}-{:04X}", door.name(), tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_select_and_load_path() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(load_path(&store).is_none());

        let tiers = PathTiers {
            hardware: HardwareTier::High,
            budget: BudgetTier::Pro,
            expertise: ExpertiseTier::Expert,
        };
        let chosen = select_path(&store, Door::Sage, tiers, &mut rng).unwrap();
        assert!(chosen.identity.starts_with("SAGE-"));
        assert_eq!(chosen.identity.len(), "SAGE-".len() + 4);

        let loaded = load_path(&store).unwrap();
        assert_eq!(loaded, chosen);
    }

    #[test]
    fn test_path_json_shape() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        select_path(&store, Door::Forge, PathTiers::default(), &mut rng).unwrap();

        let raw = store.get(PATH_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["door"], "forge");
        assert_eq!(value["hardware"], "mid");
        assert_eq!(value["budget"], "free");
        assert_eq!(value["expertise"], "novice");
        assert!(value["selected_at"].is_u64());
    }

    #[test]
    fn test_corrupt_path_is_ignored() {
        let store = MemoryStore::new();
        store.set(PATH_KEY, "\"forge\"").unwrap();
        assert!(load_path(&store).is_none());
    }
}
