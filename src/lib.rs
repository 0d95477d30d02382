//! Change Registry: Fingerprint-Based Change Tracking
//!
//! A process-local catalog of mutable entities that can each report a cheap content
//! fingerprint. The registry tells a poller which entities changed since the last scan,
//! and hands out named entities together with their lock for safe read-then-mutate.
//!
//! ```
//! use change_registry::{shared, Fingerprint, Hashable, Registry};
//!
//! struct Setting(String);
//!
//! impl Hashable for Setting {
//!     fn hash(&self) -> Fingerprint {
//!         Fingerprint::from(self.0.as_str())
//!     }
//! }
//!
//! let mut registry: Registry = Registry::new();
//! let theme = shared(Setting("dark".to_string()));
//! registry.register("theme", theme.clone());
//!
//! theme.lock().0 = "light".to_string();
//! assert_eq!(registry.scan_changes().len(), 1);
//! assert!(registry.scan_changes().is_empty());
//! ```

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod poller;
pub mod registry;

pub use crate::config::{ConfigLoader, DuplicateNamePolicy, RegistryConfig};
pub use crate::error::{HashError, RegistryError};
pub use crate::fingerprint::{Fingerprint, FingerprintBuilder, Hashable};
pub use crate::poller::{Poller, PollerConfig, PollerHandle};
pub use crate::registry::{shared, Change, Checkout, Registry, SharedEntity};
