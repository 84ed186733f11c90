//! Telephony provider trait and an in-memory implementation.
//!
//! The provider is the OS call-presentation service (a native call card with
//! system hang-up controls). It exists on one platform family only; the
//! adapter treats its absence as normal.

use crate::config::TelephonyConfig;
use crate::subscription::{lock, Callback, Subscription};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Setup payload passed to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallProviderOptions {
    pub ios: IosOptions,
    pub android: AndroidOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosOptions {
    pub app_name: String,
    pub supports_video: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidOptions {
    pub alert_title: String,
    pub alert_description: String,
    pub cancel_button: String,
    pub ok_button: String,
    pub additional_permissions: Vec<String>,
}

impl From<&TelephonyConfig> for CallProviderOptions {
    fn from(config: &TelephonyConfig) -> Self {
        Self {
            ios: IosOptions {
                app_name: config.app_name.clone(),
                supports_video: config.supports_video,
            },
            android: AndroidOptions {
                alert_title: config.alert_title.clone(),
                alert_description: config.alert_description.clone(),
                cancel_button: config.cancel_button.clone(),
                ok_button: config.ok_button.clone(),
                additional_permissions: config.additional_permissions.clone(),
            },
        }
    }
}

/// Events emitted by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallEvent {
    /// User hung up from the system call UI
    EndCall,
}

impl CallEvent {
    pub fn name(self) -> &'static str {
        match self {
            CallEvent::EndCall => "endCall",
        }
    }
}

/// How the remote party is addressed on the call card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleType {
    Generic,
    Number,
    Email,
}

impl HandleType {
    pub fn parse(value: &str) -> Self {
        match value {
            "number" => HandleType::Number,
            "email" => HandleType::Email,
            _ => HandleType::Generic,
        }
    }
}

/// OS-level call presentation capability
#[async_trait]
pub trait CallProvider: Send + Sync {
    /// One-time registration of the app as a call provider
    async fn setup(&self, options: &CallProviderOptions) -> Result<()>;

    fn set_available(&self, available: bool) -> Result<()>;

    fn start_call(
        &self,
        call_id: &str,
        handle: &str,
        display_name: &str,
        handle_type: HandleType,
        video: bool,
    ) -> Result<()>;

    fn set_current_call_active(&self, call_id: &str) -> Result<()>;

    fn end_call(&self, call_id: &str) -> Result<()>;

    fn add_event_listener(&self, event: CallEvent, callback: Callback) -> Result<Subscription>;
}

/// A request observed by [`MockCallProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderCall {
    Setup { app_name: String },
    SetAvailable(bool),
    StartCall {
        call_id: String,
        handle: String,
        display_name: String,
        video: bool,
    },
    SetCurrentCallActive(String),
    EndCall(String),
    AddEventListener(CallEvent),
    RemoveEventListener(CallEvent),
}

type ListenerMap = HashMap<u64, (CallEvent, Callback)>;

/// Mock telephony provider for development and testing
#[derive(Default)]
pub struct MockCallProvider {
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    listeners: Arc<Mutex<ListenerMap>>,
    next_listener: Mutex<u64>,
    fail_setup: bool,
    fail_set_available: bool,
}

impl MockCallProvider {
    /// Create a new mock telephony provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider whose setup always fails
    pub fn failing_setup() -> Self {
        Self {
            fail_setup: true,
            ..Self::default()
        }
    }

    /// Provider that registers but refuses to be marked available
    pub fn failing_set_available() -> Self {
        Self {
            fail_set_available: true,
            ..Self::default()
        }
    }

    /// Every request received so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        lock(&self.calls).clone()
    }

    pub fn listener_count(&self, event: CallEvent) -> usize {
        lock(&self.listeners)
            .values()
            .filter(|(kind, _)| *kind == event)
            .count()
    }

    /// Simulate the system UI firing `event`
    pub fn emit(&self, event: CallEvent) {
        let callbacks: Vec<Callback> = lock(&self.listeners)
            .values()
            .filter(|(kind, _)| *kind == event)
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    fn record(&self, call: ProviderCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl CallProvider for MockCallProvider {
    async fn setup(&self, options: &CallProviderOptions) -> Result<()> {
        self.record(ProviderCall::Setup {
            app_name: options.ios.app_name.clone(),
        });
        if self.fail_setup {
            return Err(Error::native("CallKeep", "setup rejected by mock"));
        }
        Ok(())
    }

    fn set_available(&self, available: bool) -> Result<()> {
        self.record(ProviderCall::SetAvailable(available));
        if self.fail_set_available {
            return Err(Error::native("CallKeep", "setAvailable threw"));
        }
        Ok(())
    }

    fn start_call(
        &self,
        call_id: &str,
        handle: &str,
        display_name: &str,
        _handle_type: HandleType,
        video: bool,
    ) -> Result<()> {
        self.record(ProviderCall::StartCall {
            call_id: call_id.to_string(),
            handle: handle.to_string(),
            display_name: display_name.to_string(),
            video,
        });
        Ok(())
    }

    fn set_current_call_active(&self, call_id: &str) -> Result<()> {
        self.record(ProviderCall::SetCurrentCallActive(call_id.to_string()));
        Ok(())
    }

    fn end_call(&self, call_id: &str) -> Result<()> {
        self.record(ProviderCall::EndCall(call_id.to_string()));
        Ok(())
    }

    fn add_event_listener(&self, event: CallEvent, callback: Callback) -> Result<Subscription> {
        let id = {
            let mut next = lock(&self.next_listener);
            *next += 1;
            *next
        };
        lock(&self.listeners).insert(id, (event, callback));
        self.record(ProviderCall::AddEventListener(event));

        let listeners = Arc::clone(&self.listeners);
        let calls = Arc::clone(&self.calls);
        Ok(Subscription::new(move || {
            if lock(&listeners).remove(&id).is_some() {
                lock(&calls).push(ProviderCall::RemoveEventListener(event));
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_options_from_config() {
        let options = CallProviderOptions::from(&TelephonyConfig::default());
        assert_eq!(options.ios.app_name, "Conclave");
        assert!(options.ios.supports_video);
        assert_eq!(options.android.ok_button, "Ok");

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["ios"]["appName"], "Conclave");
        assert_eq!(json["android"]["alertTitle"], "Phone account required");
    }

    #[test]
    fn test_handle_type_parse() {
        assert_eq!(HandleType::parse("number"), HandleType::Number);
        assert_eq!(HandleType::parse("email"), HandleType::Email);
        assert_eq!(HandleType::parse("generic"), HandleType::Generic);
        assert_eq!(HandleType::parse("whatever"), HandleType::Generic);
    }

    #[tokio::test]
    async fn test_mock_provider_setup_failure() {
        let provider = MockCallProvider::failing_setup();
        let options = CallProviderOptions::from(&TelephonyConfig::default());

        let result = provider.setup(&options).await;
        assert!(matches!(result, Err(Error::Native { .. })));
        assert_eq!(provider.calls().len(), 1);
    }

    #[test]
    fn test_mock_provider_listener_lifecycle() {
        let provider = MockCallProvider::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let sub = provider
            .add_event_listener(
                CallEvent::EndCall,
                Arc::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        provider.emit(CallEvent::EndCall);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        provider.emit(CallEvent::EndCall);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(provider.listener_count(CallEvent::EndCall), 0);
    }
}
