//! In-memory target store.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{fresh_id, StoreStats, TargetRepository};
use crate::error::{Error, Result};
use crate::target::{NewTarget, Target, TargetPatch};

/// Target store that keeps the collection in process memory.
///
/// Follows the same contract as [`super::CsvStore`], including insertion
/// order and not-found semantics, but nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    targets: Vec<Target>,
    modified: Option<DateTime<Utc>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    #[must_use]
    pub fn with_targets(targets: Vec<Target>) -> Self {
        Self {
            state: Mutex::new(State {
                targets,
                modified: Some(Utc::now()),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl TargetRepository for MemoryStore {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Target>> {
        Ok(self.lock()?.targets.clone())
    }

    fn create(&self, new: NewTarget) -> Result<Target> {
        let mut state = self.lock()?;
        let target = Target::from_new(fresh_id(&state.targets), new);
        state.targets.push(target.clone());
        state.modified = Some(Utc::now());

        debug!(id = %target.id, "Target created in memory");
        Ok(target)
    }

    fn update(&self, id: &str, patch: &TargetPatch) -> Result<Option<Target>> {
        let mut state = self.lock()?;
        let Some(target) = state.targets.iter_mut().find(|t| t.id == id) else {
            warn!(id = %id, "Target not found for update");
            return Ok(None);
        };

        patch.apply(target);
        let updated = target.clone();
        state.modified = Some(Utc::now());
        Ok(Some(updated))
    }

    fn delete(&self, id: &str) -> Result<Option<Target>> {
        let mut state = self.lock()?;
        let Some(index) = state.targets.iter().position(|t| t.id == id) else {
            warn!(id = %id, "Target not found for deletion");
            return Ok(None);
        };

        let removed = state.targets.remove(index);
        state.modified = Some(Utc::now());
        Ok(Some(removed))
    }

    fn stats(&self) -> Result<StoreStats> {
        let state = self.lock()?;
        Ok(StoreStats {
            total_targets: state.targets.len(),
            file_size_bytes: 0,
            modified: state.modified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_new() -> NewTarget {
        NewTarget {
            latitude: -33.8688,
            longitude: 151.2093,
            altitude: -12.0,
            frequency: 915.0,
            speed: 0.0,
            bearing: 0.0,
            ip_address: "10.0.0.7".to_string(),
        }
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.list_all().unwrap().is_empty());
        assert!(store.stats().unwrap().modified.is_none());
    }

    #[test]
    fn test_create_get_update_delete() {
        let store = MemoryStore::new();
        let created = store.create(sample_new()).unwrap();
        assert_eq!(store.get_by_id(&created.id).unwrap(), Some(created.clone()));

        let patch = TargetPatch {
            bearing: Some(90.0),
            ..TargetPatch::default()
        };
        let updated = store.update(&created.id, &patch).unwrap().unwrap();
        assert_eq!(updated.bearing, 90.0);
        assert_eq!(updated.latitude, created.latitude);

        let removed = store.delete(&created.id).unwrap().unwrap();
        assert_eq!(removed, updated);
        assert!(store.get_by_id(&created.id).unwrap().is_none());
    }

    #[test]
    fn test_missing_ids() {
        let store = MemoryStore::new();
        store.create(sample_new()).unwrap();

        assert!(store
            .update("missing", &TargetPatch::default())
            .unwrap()
            .is_none());
        assert!(store.delete("missing").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_with_targets_preserves_order() {
        let targets = vec![
            Target::from_new("a", sample_new()),
            Target::from_new("b", sample_new()),
        ];
        let store = MemoryStore::with_targets(targets.clone());
        assert_eq!(store.list_all().unwrap(), targets);
        assert_eq!(store.stats().unwrap().total_targets, 2);
    }
}
