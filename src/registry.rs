//! Change-tracking registry
//!
//! Keeps an insertion-ordered list of registered entities plus a name index. A scan walks
//! the list in registration order, fingerprints each entity under its own lock and reports
//! the ones whose fingerprint moved since the previous scan. A checkout hands out an
//! entity together with its lock so the caller can mutate it safely.
//!
//! Registration takes `&mut self`, so it is serialized by construction and cannot overlap
//! a scan or a checkout. Once set up, the registry is typically shared as
//! `Arc<Registry<T>>` between checkout threads and a single poller.

pub mod entry;

pub use entry::{shared, Change, Checkout, SharedEntity};

use crate::config::{DuplicateNamePolicy, RegistryConfig};
use crate::error::RegistryError;
use crate::fingerprint::{Fingerprint, Hashable};
use entry::{hash_failure, RegisteredEntry};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Registry of fingerprinted entities
///
/// `T` defaults to `dyn Hashable` for heterogeneous catalogs. Use a concrete `T` to get
/// typed handles back from [`Registry::checkout`].
///
/// A name registered twice keeps both entries in the scan list while the name index
/// resolves to the most recent one.
pub struct Registry<T: ?Sized = dyn Hashable> {
    entries: Vec<RegisteredEntry<T>>,
    by_name: HashMap<String, usize>,
    duplicate_names: DuplicateNamePolicy,
}

impl<T: Hashable + ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hashable + ?Sized> Registry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::with_policy(DuplicateNamePolicy::default())
    }

    pub fn with_policy(duplicate_names: DuplicateNamePolicy) -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            duplicate_names,
        }
    }

    pub fn with_config(config: &RegistryConfig) -> Self {
        Self::with_policy(config.registry.duplicate_names)
    }

    pub fn duplicate_policy(&self) -> DuplicateNamePolicy {
        self.duplicate_names
    }

    /// Register an entity under `name`
    ///
    /// Fingerprints the entity immediately (under its lock) as the baseline for the first
    /// scan. A name that is already registered is shadowed: `checkout` resolves to the new
    /// entry while the old one stays in the scan list.
    ///
    /// Blocks until the entity's lock is free. Do not hold that lock on the registering
    /// thread, or this call never returns.
    pub fn register(&mut self, name: impl Into<String>, entity: SharedEntity<T>) {
        let name = name.into();
        let initial = entity.lock().hash();
        self.insert(name, entity, initial);
    }

    /// Fallible registration
    ///
    /// Uses [`Hashable::try_hash`] for the baseline and applies the configured
    /// [`DuplicateNamePolicy`]. On error the registry is left untouched.
    pub fn try_register(
        &mut self,
        name: impl Into<String>,
        entity: SharedEntity<T>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.duplicate_names == DuplicateNamePolicy::Reject && self.by_name.contains_key(&name)
        {
            return Err(RegistryError::DuplicateName(name));
        }
        let initial = entity
            .lock()
            .try_hash()
            .map_err(|e| hash_failure(&name, e))?;
        self.insert(name, entity, initial);
        Ok(())
    }

    fn insert(&mut self, name: String, entity: SharedEntity<T>, initial: Fingerprint) {
        let index = self.entries.len();
        debug!(name = %name, index, fingerprint = %initial, "Registered entity");
        if let Some(shadowed) = self.by_name.insert(name.clone(), index) {
            warn!(
                name = %name,
                shadowed_index = shadowed,
                index,
                "Name already registered; lookups now resolve to the newer entry"
            );
        }
        self.entries.push(RegisteredEntry::new(name, entity, initial));
    }

    /// Entities whose fingerprint changed since the previous scan, in registration order
    pub fn scan_changes(&self) -> Vec<SharedEntity<T>> {
        self.scan_changed_names()
            .into_iter()
            .map(|change| change.entity)
            .collect()
    }

    /// Like [`Registry::scan_changes`], keeping the name and both fingerprints
    ///
    /// Each entity lock is held only while its fingerprint is computed, and never more
    /// than one at a time. Running two scans concurrently on the same registry is
    /// memory-safe but each change is reported by only one of them.
    #[instrument(level = "debug", skip(self), fields(entries = self.entries.len()))]
    pub fn scan_changed_names(&self) -> Vec<Change<T>> {
        let mut changed = Vec::new();
        for entry in &self.entries {
            let current = entry.current_fingerprint();
            if let Some(previous) = entry.observe(&current) {
                trace!(name = %entry.name, %previous, %current, "Entity changed");
                changed.push(Change {
                    name: entry.name.clone(),
                    entity: Arc::clone(&entry.entity),
                    previous,
                    fingerprint: current,
                });
            }
        }
        debug!(changed = changed.len(), "Scan complete");
        changed
    }

    /// Fallible scan using [`Hashable::try_hash`]
    ///
    /// Stops at the first entity whose fingerprint cannot be computed. Entries visited
    /// before the failure keep their updated fingerprints.
    pub fn try_scan_changes(&self) -> Result<Vec<SharedEntity<T>>, RegistryError> {
        let mut changed = Vec::new();
        for entry in &self.entries {
            let current = entry
                .try_current_fingerprint()
                .map_err(|e| hash_failure(&entry.name, e))?;
            if entry.observe(&current).is_some() {
                trace!(name = %entry.name, %current, "Entity changed");
                changed.push(Arc::clone(&entry.entity));
            }
        }
        debug!(changed = changed.len(), "Scan complete");
        Ok(changed)
    }

    /// Look up an entity and its lock by name
    ///
    /// The lock is not acquired. Hold the guard from [`Checkout::lock`] for the whole
    /// mutation so that scans observe a consistent fingerprint.
    pub fn checkout(&self, name: &str) -> Result<Checkout<T>, RegistryError> {
        let entry = self.lookup(name)?;
        Ok(Checkout::new(entry.name.clone(), Arc::clone(&entry.entity)))
    }

    /// Run `f` against the named entity while holding its lock
    ///
    /// The lock is released when `f` returns or unwinds.
    pub fn with_entity<R, F>(&self, name: &str, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let entry = self.lookup(name)?;
        let mut guard = entry.entity.lock();
        Ok(f(&mut *guard))
    }

    fn lookup(&self, name: &str) -> Result<&RegisteredEntry<T>, RegistryError> {
        self.by_name
            .get(name)
            .map(|&index| &self.entries[index])
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Fingerprint recorded for `name` at the last scan (or at registration)
    pub fn last_fingerprint(&self, name: &str) -> Option<Fingerprint> {
        self.lookup(name).ok().map(|entry| entry.last_fingerprint())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of entries, counting shadowed duplicates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names in scan order, duplicates included
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "entries",
                &self.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            )
            .field("duplicate_names", &self.duplicate_names)
            .finish()
    }
}
