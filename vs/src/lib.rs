//! VersionStore - durable named snapshots of refined plans
//!
//! Persists explicit user saves of a plan (together with the request that
//! produced it) in a tenant/persona-scoped key space. Saves are
//! upsert-to-front: re-saving a plan id moves it to the head of the list
//! rather than appending a duplicate. The list is capped; overflow drops the
//! oldest tail entries.
//!
//! # Architecture
//!
//! ```text
//! .versionstore/
//! └── {tenant}/
//!     └── {persona}/
//!         └── versions.json    # SavedVersion entries, most recent first
//! ```
//!
//! # Example
//!
//! ```ignore
//! use versionstore::{Scope, SavedVersion, VersionStore, now_ms};
//!
//! let store = VersionStore::open(".versionstore")?;
//! let scope = Scope::new("acme", "planner-1");
//! store.save(&scope, SavedVersion::new("plan-001", "Baseline plan", payload))?;
//! let versions = store.list::<serde_json::Value>(&scope)?;
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{SavedVersion, Scope, VersionId, VersionStore};

/// Maximum number of retained versions per scope; older entries are evicted
pub const MAX_RETAINED: usize = 20;

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
