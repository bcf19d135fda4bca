//! Core VersionStore implementation

use eyre::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::MAX_RETAINED;

/// Unique identifier for a saved version (the id of the plan it snapshots)
pub type VersionId = String;

/// Owner of a set of saved versions
///
/// Versions are partitioned per (tenant, persona); two personas never see
/// each other's saves even within the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub tenant: String,
    pub persona: String,
}

impl Scope {
    pub fn new(tenant: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            persona: persona.into(),
        }
    }

    fn dir(&self, base: &Path) -> PathBuf {
        base.join(&self.tenant).join(&self.persona)
    }
}

/// A durable named snapshot
///
/// The payload is opaque to the store; callers decide what a version
/// carries (replan stores the plan snapshot plus its originating request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVersion<T> {
    /// Version id, equal to the snapshotted plan's id
    pub id: VersionId,
    /// Optional user-supplied version label
    pub label: Option<String>,
    /// Human-readable summary of the snapshotted plan
    pub summary: String,
    /// Save timestamp (Unix milliseconds)
    pub saved_at: i64,
    /// The snapshot itself
    pub payload: T,
}

impl<T> SavedVersion<T> {
    /// Create a new version stamped with the current time
    pub fn new(id: impl Into<String>, summary: impl Into<String>, payload: T) -> Self {
        Self {
            id: id.into(),
            label: None,
            summary: summary.into(),
            saved_at: crate::now_ms(),
            payload,
        }
    }

    /// Attach a user-supplied label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The main version store
pub struct VersionStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl VersionStore {
    /// Open or create a version store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(?base_path, "Opened version store");
        Ok(Self { base_path })
    }

    /// List saved versions for a scope, most recent first
    pub fn list<T: DeserializeOwned>(&self, scope: &Scope) -> Result<Vec<SavedVersion<T>>> {
        let raw = self.read_scope(scope)?;
        raw.into_iter()
            .map(|v| {
                Ok(SavedVersion {
                    id: v.id,
                    label: v.label,
                    summary: v.summary,
                    saved_at: v.saved_at,
                    payload: serde_json::from_value(v.payload).context("Malformed version payload")?,
                })
            })
            .collect()
    }

    /// Save a version, deduplicating by id
    ///
    /// A prior entry with the same id is removed before the new one is
    /// inserted at the front (upsert-to-front). The list is then truncated to
    /// [`MAX_RETAINED`] entries, dropping the oldest tail entries in stable
    /// FIFO order. The write is atomic: a temp file is renamed over the live
    /// one, so a concurrent `list` never observes a partial write.
    pub fn save<T: Serialize>(&self, scope: &Scope, version: SavedVersion<T>) -> Result<()> {
        let mut entries = self.read_scope(scope)?;

        let SavedVersion {
            id,
            label,
            summary,
            saved_at,
            payload,
        } = version;
        let raw = SavedVersion {
            id,
            label,
            summary,
            saved_at,
            payload: serde_json::to_value(&payload).context("Failed to serialize version payload")?,
        };

        entries.retain(|v| v.id != raw.id);
        entries.insert(0, raw);
        entries.truncate(MAX_RETAINED);

        self.write_scope(scope, &entries)?;
        info!(%scope.tenant, %scope.persona, count = entries.len(), "Saved version");
        Ok(())
    }

    /// Fetch a saved version by id without removing it
    pub fn restore<T: DeserializeOwned>(&self, scope: &Scope, id: &str) -> Result<SavedVersion<T>> {
        let raw = self.read_scope(scope)?;
        let found = raw
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| eyre::eyre!("Version not found: {}", id))?;

        Ok(SavedVersion {
            id: found.id,
            label: found.label,
            summary: found.summary,
            saved_at: found.saved_at,
            payload: serde_json::from_value(found.payload).context("Malformed version payload")?,
        })
    }

    /// Delete a saved version by id
    ///
    /// Deleting an id that is not present is a no-op, not an error.
    pub fn delete(&self, scope: &Scope, id: &str) -> Result<()> {
        let mut entries = self.read_scope(scope)?;
        let before = entries.len();
        entries.retain(|v| v.id != id);

        if entries.len() != before {
            self.write_scope(scope, &entries)?;
            info!(%id, "Deleted version");
        } else {
            debug!(%id, "Delete: version not present, no-op");
        }
        Ok(())
    }

    fn versions_path(&self, scope: &Scope) -> PathBuf {
        scope.dir(&self.base_path).join("versions.json")
    }

    fn read_scope(&self, scope: &Scope) -> Result<Vec<SavedVersion<serde_json::Value>>> {
        let path = self.versions_path(scope);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context("Malformed versions file")
    }

    fn write_scope(&self, scope: &Scope, entries: &[SavedVersion<serde_json::Value>]) -> Result<()> {
        let dir = scope.dir(&self.base_path);
        fs::create_dir_all(&dir).context("Failed to create scope directory")?;

        let path = self.versions_path(scope);
        let tmp = dir.join("versions.json.tmp");

        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&tmp, content).context(format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path).context("Failed to commit versions file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn version(id: &str, n: i64) -> SavedVersion<serde_json::Value> {
        SavedVersion {
            id: id.to_string(),
            label: None,
            summary: format!("plan {}", id),
            saved_at: n,
            payload: serde_json::json!({ "n": n }),
        }
    }

    #[test]
    fn test_save_and_restore_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(temp.path()).unwrap();
        let scope = Scope::new("acme", "planner");

        let saved = version("plan-1", 42);
        store.save(&scope, saved.clone()).unwrap();

        let restored: SavedVersion<serde_json::Value> = store.restore(&scope, "plan-1").unwrap();
        assert_eq!(restored, saved);

        // restore does not remove the entry
        let listed: Vec<SavedVersion<serde_json::Value>> = store.list(&scope).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_save_is_upsert_to_front() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(temp.path()).unwrap();
        let scope = Scope::new("acme", "planner");

        store.save(&scope, version("plan-1", 1)).unwrap();
        store.save(&scope, version("plan-2", 2)).unwrap();
        store.save(&scope, version("plan-1", 3)).unwrap();

        let listed: Vec<SavedVersion<serde_json::Value>> = store.list(&scope).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "plan-1");
        assert_eq!(listed[0].saved_at, 3);
        assert_eq!(listed[1].id, "plan-2");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(temp.path()).unwrap();
        let scope = Scope::new("acme", "planner");

        for i in 0..21 {
            store.save(&scope, version(&format!("plan-{}", i), i as i64)).unwrap();
        }

        let listed: Vec<SavedVersion<serde_json::Value>> = store.list(&scope).unwrap();
        assert_eq!(listed.len(), MAX_RETAINED);
        assert_eq!(listed[0].id, "plan-20");
        assert!(!listed.iter().any(|v| v.id == "plan-0"), "oldest save should be evicted");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(temp.path()).unwrap();
        let scope = Scope::new("acme", "planner");

        store.save(&scope, version("plan-1", 1)).unwrap();
        store.delete(&scope, "plan-1").unwrap();
        store.delete(&scope, "plan-1").unwrap();
        store.delete(&scope, "never-existed").unwrap();

        let listed: Vec<SavedVersion<serde_json::Value>> = store.list(&scope).unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn test_scopes_are_isolated() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::open(temp.path()).unwrap();
        let a = Scope::new("acme", "alice");
        let b = Scope::new("acme", "bob");

        store.save(&a, version("plan-1", 1)).unwrap();

        let listed: Vec<SavedVersion<serde_json::Value>> = store.list(&b).unwrap();
        assert!(listed.is_empty());

        assert!(store.restore::<serde_json::Value>(&b, "plan-1").is_err());
    }
}
