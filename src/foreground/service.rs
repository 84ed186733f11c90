//! Foreground service capability and an in-memory implementation.

use super::descriptor::{ForegroundEvent, ForegroundNotification};
use crate::subscription::{lock, Subscription};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub(crate) const CAPABILITY: &str = "ForegroundService";

/// Listener for indicator presses
pub type ForegroundListener = Arc<dyn Fn(&ForegroundEvent) + Send + Sync>;

/// Native persistent-notification primitive.
///
/// Only `start` is mandatory; builds of the native module may lack the rest.
#[async_trait]
pub trait ForegroundService: Send + Sync {
    async fn start(&self, notification: &ForegroundNotification) -> Result<()>;

    async fn update(&self, _notification: &ForegroundNotification) -> Result<()> {
        Err(Error::unsupported(CAPABILITY, "update"))
    }

    async fn stop(&self) -> Result<()> {
        Err(Error::unsupported(CAPABILITY, "stop"))
    }

    async fn stop_all(&self) -> Result<()> {
        Err(Error::unsupported(CAPABILITY, "stopAll"))
    }

    fn event_listener(&self, _listener: ForegroundListener) -> Result<Subscription> {
        Err(Error::unsupported(CAPABILITY, "eventListener"))
    }
}

/// Operations of [`ForegroundService`], used to configure the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForegroundOp {
    Start,
    Update,
    Stop,
    StopAll,
    EventListener,
}

/// A request observed by [`MockForegroundService`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceCall {
    Start(ForegroundNotification),
    Update(ForegroundNotification),
    Stop,
    StopAll,
    AddListener,
    RemoveListener,
}

/// Mock foreground service for development and testing
pub struct MockForegroundService {
    calls: Arc<Mutex<Vec<ServiceCall>>>,
    listeners: Arc<Mutex<HashMap<u64, ForegroundListener>>>,
    next_listener: Mutex<u64>,
    unsupported: HashSet<ForegroundOp>,
    failing: HashSet<ForegroundOp>,
}

impl MockForegroundService {
    /// Service supporting every operation
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            listeners: Arc::new(Mutex::new(HashMap::new())),
            next_listener: Mutex::new(0),
            unsupported: HashSet::new(),
            failing: HashSet::new(),
        }
    }

    /// Behave like a native build lacking `op`
    pub fn without(mut self, op: ForegroundOp) -> Self {
        self.unsupported.insert(op);
        self
    }

    /// Make `op` fail with a native error
    pub fn failing(mut self, op: ForegroundOp) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        lock(&self.calls).clone()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Simulate the user pressing the indicator
    pub fn press(&self, event: ForegroundEvent) {
        let listeners: Vec<ForegroundListener> = lock(&self.listeners).values().cloned().collect();
        for listener in listeners {
            listener(&event);
        }
    }

    fn invoke(&self, op: ForegroundOp, call: ServiceCall, name: &str) -> Result<()> {
        if self.unsupported.contains(&op) {
            return Err(Error::unsupported(CAPABILITY, name));
        }
        lock(&self.calls).push(call);
        if self.failing.contains(&op) {
            return Err(Error::native(CAPABILITY, format!("{} rejected by mock", name)));
        }
        Ok(())
    }
}

impl Default for MockForegroundService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForegroundService for MockForegroundService {
    async fn start(&self, notification: &ForegroundNotification) -> Result<()> {
        self.invoke(ForegroundOp::Start, ServiceCall::Start(notification.clone()), "start")
    }

    async fn update(&self, notification: &ForegroundNotification) -> Result<()> {
        self.invoke(ForegroundOp::Update, ServiceCall::Update(notification.clone()), "update")
    }

    async fn stop(&self) -> Result<()> {
        self.invoke(ForegroundOp::Stop, ServiceCall::Stop, "stop")
    }

    async fn stop_all(&self) -> Result<()> {
        self.invoke(ForegroundOp::StopAll, ServiceCall::StopAll, "stopAll")
    }

    fn event_listener(&self, listener: ForegroundListener) -> Result<Subscription> {
        self.invoke(ForegroundOp::EventListener, ServiceCall::AddListener, "eventListener")?;

        let id = {
            let mut next = lock(&self.next_listener);
            *next += 1;
            *next
        };
        lock(&self.listeners).insert(id, listener);

        let listeners = Arc::clone(&self.listeners);
        let calls = Arc::clone(&self.calls);
        Ok(Subscription::new(move || {
            if lock(&listeners).remove(&id).is_some() {
                lock(&calls).push(ServiceCall::RemoveListener);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForegroundConfig;

    #[tokio::test]
    async fn test_unsupported_ops_are_not_recorded() {
        let service = MockForegroundService::new()
            .without(ForegroundOp::Update)
            .without(ForegroundOp::Stop);
        let notification = ForegroundNotification::build(None, &ForegroundConfig::default());

        assert!(service.start(&notification).await.is_ok());
        assert!(service.update(&notification).await.unwrap_err().is_absence());
        assert!(service.stop().await.unwrap_err().is_absence());
        assert!(service.stop_all().await.is_ok());
        assert_eq!(service.calls(), vec![ServiceCall::Start(notification), ServiceCall::StopAll]);
    }

    #[tokio::test]
    async fn test_failing_op_reports_native_error() {
        let service = MockForegroundService::new().failing(ForegroundOp::Start);
        let notification = ForegroundNotification::build(None, &ForegroundConfig::default());

        let err = service.start(&notification).await.unwrap_err();
        assert!(!err.is_absence());
    }
}
