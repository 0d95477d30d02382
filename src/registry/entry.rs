//! Registered entries and the values handed out by the registry.

use crate::error::{HashError, RegistryError};
use crate::fingerprint::{Fingerprint, Hashable};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

/// Entity handle shared between the registering caller and the registry.
///
/// The mutex is the entry's lock: it is created once, at the caller's side, and the
/// registry never replaces it.
pub type SharedEntity<T = dyn Hashable> = Arc<Mutex<T>>;

/// Wrap a value in a [`SharedEntity`] ready for registration.
///
/// Registration takes the lock to record the first fingerprint, so release any guard on
/// the returned handle before passing it to `Registry::register`.
pub fn shared<T: Hashable>(entity: T) -> SharedEntity<T> {
    Arc::new(Mutex::new(entity))
}

/// One registration: name, entity handle and the fingerprint last observed.
pub(crate) struct RegisteredEntry<T: ?Sized> {
    pub(crate) name: String,
    pub(crate) entity: SharedEntity<T>,
    /// Guarded separately from the entity lock, which only ever covers `hash()`.
    last_fingerprint: Mutex<Fingerprint>,
}

impl<T: Hashable + ?Sized> RegisteredEntry<T> {
    pub(crate) fn new(name: String, entity: SharedEntity<T>, initial: Fingerprint) -> Self {
        Self {
            name,
            entity,
            last_fingerprint: Mutex::new(initial),
        }
    }

    /// Lock the entity, fingerprint it, release.
    pub(crate) fn current_fingerprint(&self) -> Fingerprint {
        let guard = self.entity.lock();
        guard.hash()
    }

    pub(crate) fn try_current_fingerprint(&self) -> Result<Fingerprint, HashError> {
        let guard = self.entity.lock();
        guard.try_hash()
    }

    pub(crate) fn last_fingerprint(&self) -> Fingerprint {
        self.last_fingerprint.lock().clone()
    }

    /// Record `current` as the latest observation.
    ///
    /// Returns the previous fingerprint when it differed, `None` when unchanged.
    pub(crate) fn observe(&self, current: &Fingerprint) -> Option<Fingerprint> {
        let mut last = self.last_fingerprint.lock();
        if *last == *current {
            None
        } else {
            Some(std::mem::replace(&mut *last, current.clone()))
        }
    }
}

/// An entity reported by a scan, with the name it was registered under.
pub struct Change<T: ?Sized = dyn Hashable> {
    pub name: String,
    pub entity: SharedEntity<T>,
    pub previous: Fingerprint,
    pub fingerprint: Fingerprint,
}

impl<T: ?Sized> Clone for Change<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entity: Arc::clone(&self.entity),
            previous: self.previous.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Change<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("name", &self.name)
            .field("previous", &self.previous.to_hex())
            .field("fingerprint", &self.fingerprint.to_hex())
            .finish()
    }
}

/// Result of a checkout: the entity handle, which is also its lock handle.
///
/// Nothing is locked yet. Call [`Checkout::lock`] and keep the guard alive for the whole
/// read-then-mutate sequence; dropping the guard releases the lock on every exit path.
pub struct Checkout<T: ?Sized = dyn Hashable> {
    name: String,
    entity: SharedEntity<T>,
}

impl<T: ?Sized> Checkout<T> {
    pub(crate) fn new(name: String, entity: SharedEntity<T>) -> Self {
        Self { name, entity }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity(&self) -> &SharedEntity<T> {
        &self.entity
    }

    /// Block until the entry's lock is held.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.entity.lock()
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.entity.try_lock()
    }

    pub fn into_entity(self) -> SharedEntity<T> {
        self.entity
    }
}

impl<T: ?Sized> fmt::Debug for Checkout<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout").field("name", &self.name).finish()
    }
}

pub(crate) fn hash_failure(name: &str, source: HashError) -> RegistryError {
    RegistryError::HashComputation {
        name: name.to_string(),
        source,
    }
}
