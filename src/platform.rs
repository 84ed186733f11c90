//! Platform identification and the app-lifecycle signal.

use crate::subscription::{lock, Subscription};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Platform family the coordinator runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Native call UX through the telephony provider
    Ios,
    /// Persistent foreground notification instead of a call card
    Android,
    /// Neither (web, desktop, tests)
    Other,
}

impl Platform {
    pub fn has_call_provider(self) -> bool {
        self == Platform::Ios
    }

    pub fn has_foreground_service(self) -> bool {
        self == Platform::Android
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => f.write_str("ios"),
            Platform::Android => f.write_str("android"),
            Platform::Other => f.write_str("other"),
        }
    }
}

/// Application state reported by the host OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Active,
    Background,
    Inactive,
}

/// Listener for app state changes
pub type StateListener = Arc<dyn Fn(AppState) + Send + Sync>;

/// Subscribable "state changed" signal of the host application
pub trait AppLifecycle: Send + Sync {
    fn add_state_listener(&self, listener: StateListener) -> Subscription;
}

/// In-memory lifecycle signal driven by tests and the simulator
#[derive(Default)]
pub struct MockAppLifecycle {
    listeners: Arc<Mutex<HashMap<u64, StateListener>>>,
    next_id: Mutex<u64>,
}

impl MockAppLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a state change to every registered listener
    pub fn set_state(&self, state: AppState) {
        let listeners: Vec<StateListener> = lock(&self.listeners).values().cloned().collect();
        for listener in listeners {
            listener(state);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

impl AppLifecycle for MockAppLifecycle {
    fn add_state_listener(&self, listener: StateListener) -> Subscription {
        let id = {
            let mut next = lock(&self.next_id);
            *next += 1;
            *next
        };
        lock(&self.listeners).insert(id, listener);

        let listeners = Arc::clone(&self.listeners);
        Subscription::new(move || {
            lock(&listeners).remove(&id);
        })
    }
}
