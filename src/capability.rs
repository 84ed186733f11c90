//! Lazily resolved optional native capabilities.
//!
//! Every native integration the coordinator talks to may be missing: wrong
//! platform, module not linked into the build, or a loader that fails. A
//! [`CapabilityHandle`] resolves its capability at most once and remembers a
//! failure for the rest of its lifetime, so every later operation becomes a
//! cheap no-op.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Loader invoked on first use of a capability
pub type CapabilityLoader<T> = Box<dyn FnOnce() -> Result<Arc<T>> + Send>;

/// Resolution state of an optional capability
pub enum CapabilityState<T: ?Sized> {
    /// Not looked up yet
    Unresolved,
    /// Resolved and usable
    Available(Arc<T>),
    /// Lookup failed or the platform lacks it; permanent
    Unavailable,
}

impl<T: ?Sized> CapabilityState<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, CapabilityState::Available(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, CapabilityState::Unresolved)
    }
}

impl<T: ?Sized> Clone for CapabilityState<T> {
    fn clone(&self) -> Self {
        match self {
            CapabilityState::Unresolved => CapabilityState::Unresolved,
            CapabilityState::Available(inner) => CapabilityState::Available(Arc::clone(inner)),
            CapabilityState::Unavailable => CapabilityState::Unavailable,
        }
    }
}

impl<T: ?Sized> fmt::Debug for CapabilityState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityState::Unresolved => f.write_str("Unresolved"),
            CapabilityState::Available(_) => f.write_str("Available"),
            CapabilityState::Unavailable => f.write_str("Unavailable"),
        }
    }
}

struct HandleInner<T: ?Sized> {
    state: CapabilityState<T>,
    loader: Option<CapabilityLoader<T>>,
}

/// Memoized reference to an optional native integration
pub struct CapabilityHandle<T: ?Sized> {
    name: &'static str,
    inner: Mutex<HandleInner<T>>,
}

impl<T: ?Sized> CapabilityHandle<T> {
    /// Handle that runs `loader` the first time the capability is needed
    pub fn new<F>(name: &'static str, loader: F) -> Self
    where
        F: FnOnce() -> Result<Arc<T>> + Send + 'static,
    {
        Self {
            name,
            inner: Mutex::new(HandleInner {
                state: CapabilityState::Unresolved,
                loader: Some(Box::new(loader)),
            }),
        }
    }

    /// Handle that is already resolved
    pub fn available(name: &'static str, capability: Arc<T>) -> Self {
        Self {
            name,
            inner: Mutex::new(HandleInner {
                state: CapabilityState::Available(capability),
                loader: None,
            }),
        }
    }

    /// Handle for a capability this platform does not offer
    pub fn absent(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(HandleInner {
                state: CapabilityState::Unavailable,
                loader: None,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current state without triggering resolution
    pub fn state(&self) -> CapabilityState<T> {
        self.lock().state.clone()
    }

    /// Resolve the capability, running the loader on first call only
    pub fn resolve(&self) -> Option<Arc<T>> {
        let mut inner = self.lock();
        match &inner.state {
            CapabilityState::Available(capability) => return Some(Arc::clone(capability)),
            CapabilityState::Unavailable => return None,
            CapabilityState::Unresolved => {}
        }

        let Some(loader) = inner.loader.take() else {
            inner.state = CapabilityState::Unavailable;
            return None;
        };

        match loader() {
            Ok(capability) => {
                debug!("Resolved capability {}", self.name);
                inner.state = CapabilityState::Available(Arc::clone(&capability));
                Some(capability)
            }
            Err(e) => {
                warn!("[{}] module not available: {}", self.name, e);
                inner.state = CapabilityState::Unavailable;
                None
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HandleInner<T>> {
        crate::subscription::lock(&self.inner)
    }
}

impl<T: ?Sized> fmt::Debug for CapabilityHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityHandle")
            .field("name", &self.name)
            .field("state", &self.lock().state)
            .finish()
    }
}

/// What happened to a request forwarded to a native capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The capability performed the request
    Ok,
    /// Capability absent or operation unsupported; nothing was attempted
    Skipped,
    /// The capability was present but failed
    Degraded(String),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded(_))
    }
}

/// Convert a native call result into an [`Outcome`], logging failures.
///
/// Absence errors are expected on most platforms and only reach `debug`.
pub fn degrade_on_failure(capability: &str, operation: &str, result: Result<()>) -> Outcome {
    match result {
        Ok(()) => Outcome::Ok,
        Err(e) if e.is_absence() => {
            debug!("[{}] {} skipped: {}", capability, operation, e);
            Outcome::Skipped
        }
        Err(e) => {
            warn!("[{}] {} failed: {}", capability, operation, e);
            Outcome::Degraded(e.to_string())
        }
    }
}

/// Error used by loaders when a module cannot be found
pub fn missing_module(capability: &str) -> Error {
    Error::CapabilityUnavailable {
        capability: capability.to_string(),
    }
}
