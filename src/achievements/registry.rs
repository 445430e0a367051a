//! Achievement registry
//!
//! Tracks which achievements have been earned, persists the unlocked set and
//! holds at most one pending celebration for the UI to consume.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::catalog::{Achievement, all_achievements};
use crate::storage::{ACHIEVEMENTS_KEY, KeyValueStore, load_json, save_json};

/// Result of an unlock request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Newly added to the unlocked set
    Unlocked,
    /// Was already unlocked; nothing changed
    AlreadyUnlocked,
    /// Not in the catalog; ignored
    Unknown,
}

/// Registry handle for multi-threaded hosts
pub type SharedRegistry<S> = Arc<Mutex<AchievementRegistry<S>>>;

/// Owns the catalog, the unlocked set and the pending celebration
#[derive(Debug)]
pub struct AchievementRegistry<S> {
    catalog: Vec<Achievement>,
    unlocked: HashSet<String>,
    pending: Option<Achievement>,
    storage: S,
}

impl<S: KeyValueStore> AchievementRegistry<S> {
    /// Registry over the default catalog
    pub fn new(storage: S) -> Self {
        Self::with_catalog(all_achievements(), storage)
    }

    pub fn with_catalog(catalog: Vec<Achievement>, storage: S) -> Self {
        Self {
            catalog,
            unlocked: HashSet::new(),
            pending: None,
            storage,
        }
    }

    /// Load the persisted unlocked set
    ///
    /// Missing or unreadable data leaves the registry empty; this never fails.
    pub fn initialize(&mut self) {
        self.unlocked.clear();

        let stored: Vec<String> = match load_json(&self.storage, ACHIEVEMENTS_KEY) {
            Ok(Some(ids)) => ids,
            Ok(None) => {
                log::info!("No stored achievements, starting fresh");
                return;
            }
            Err(e) => {
                log::warn!("Failed to load stored achievements: {}, starting fresh", e);
                return;
            }
        };

        for id in stored {
            if self.achievement(&id).is_some() {
                self.unlocked.insert(id);
            } else {
                log::warn!("Dropping unknown stored achievement '{}'", id);
            }
        }

        log::info!(
            "Loaded {} of {} achievements",
            self.unlocked.len(),
            self.catalog.len()
        );
    }

    /// Check if an achievement is unlocked
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlock an achievement
    ///
    /// Unknown and already-unlocked ids are no-ops. A new unlock is persisted
    /// and, for celebratory entries, becomes the pending celebration.
    pub fn unlock_achievement(&mut self, id: &str) -> UnlockOutcome {
        let Some(achievement) = self.achievement(id).cloned() else {
            log::debug!("Ignoring unlock of unknown achievement '{}'", id);
            return UnlockOutcome::Unknown;
        };

        if !self.unlocked.insert(achievement.id.to_string()) {
            return UnlockOutcome::AlreadyUnlocked;
        }

        log::info!("Achievement unlocked: {}", achievement.id);
        self.persist_unlock(achievement.id);

        if achievement.celebratory {
            self.pending = Some(achievement);
        }

        UnlockOutcome::Unlocked
    }

    /// The celebration waiting to be shown, if any
    pub fn pending_celebration(&self) -> Option<&Achievement> {
        self.pending.as_ref()
    }

    /// Clear the pending celebration
    pub fn acknowledge_celebration(&mut self) {
        self.pending = None;
    }

    pub fn catalog(&self) -> &[Achievement] {
        &self.catalog
    }

    /// Look up a catalog entry
    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.catalog.iter().find(|a| a.id == id)
    }

    /// Unlocked ids, sorted
    pub fn unlocked_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.unlocked.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// (unlocked, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.unlocked.len(), self.catalog.len())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Wrap in a mutex for hosts that touch the registry from several threads
    pub fn into_shared(self) -> SharedRegistry<S> {
        Arc::new(Mutex::new(self))
    }

    /// Read-modify-write of the persisted list
    fn persist_unlock(&self, id: &str) {
        let mut stored: Vec<String> = match load_json(&self.storage, ACHIEVEMENTS_KEY) {
            Ok(Some(ids)) => ids,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Stored achievements unreadable ({}), rewriting from memory", e);
                self.unlocked_ids().into_iter().map(String::from).collect()
            }
        };

        if !stored.iter().any(|s| s == id) {
            stored.push(id.to_string());
        }

        if let Err(e) = save_json(&self.storage, ACHIEVEMENTS_KEY, &stored) {
            log::warn!("Failed to persist achievement '{}': {}", id, e);
        }
    }
}
