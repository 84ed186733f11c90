//! Listener registrations with idempotent release.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Callback invoked by native events
pub type Callback = Arc<dyn Fn() + Send + Sync>;

type Release = Box<dyn FnOnce() + Send>;

/// Handle to one registered listener.
///
/// The listener stays registered until [`Subscription::unsubscribe`] is
/// called. Only the first call releases anything; later calls are no-ops.
#[must_use = "dropping a Subscription leaves the listener registered"]
#[derive(Clone)]
pub struct Subscription {
    release: Arc<Mutex<Option<Release>>>,
}

impl Subscription {
    /// Wrap a release function
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Arc::new(Mutex::new(Some(Box::new(release)))),
        }
    }

    /// A subscription with nothing to release
    pub fn noop() -> Self {
        Self {
            release: Arc::new(Mutex::new(None)),
        }
    }

    /// Combine several subscriptions behind a single release
    pub fn compose(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || {
            for subscription in subscriptions {
                subscription.unsubscribe();
            }
        })
    }

    /// Release the listener. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        let release = lock(&self.release).take();
        if let Some(release) = release {
            release();
        }
    }

    /// Whether a release is still pending
    pub fn is_active(&self) -> bool {
        lock(&self.release).is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Keeps at most one live subscription of a given listener kind
#[derive(Debug, Default)]
pub struct ListenerSlot {
    current: Arc<Mutex<Option<(u64, Subscription)>>>,
    generation: Mutex<u64>,
}

impl ListenerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the held subscription, if any, then hold `subscription`.
    ///
    /// The returned handle releases `subscription` and empties the slot,
    /// unless a newer registration has taken the slot in the meantime.
    pub fn replace(&self, subscription: Subscription) -> Subscription {
        self.release();

        let generation = {
            let mut next = lock(&self.generation);
            *next += 1;
            *next
        };
        *lock(&self.current) = Some((generation, subscription.clone()));

        let current = Arc::clone(&self.current);
        Subscription::new(move || {
            subscription.unsubscribe();
            let mut held = lock(&current);
            if matches!(held.as_ref(), Some((held_generation, _)) if *held_generation == generation) {
                *held = None;
            }
        })
    }

    /// Release whatever the slot holds
    pub fn release(&self) {
        let previous = lock(&self.current).take();
        if let Some((_, previous)) = previous {
            previous.unsubscribe();
        }
    }

    pub fn is_occupied(&self) -> bool {
        lock(&self.current).is_some()
    }
}

/// Lock `mutex`, recovering the guard if a listener panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
