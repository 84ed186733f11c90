//! Bridge between the session manager and the OS call provider.

use super::provider::{CallEvent, CallProvider, CallProviderOptions, HandleType};
use crate::capability::{degrade_on_failure, CapabilityHandle, Outcome};
use crate::platform::{AppLifecycle, AppState};
use crate::subscription::{Callback, ListenerSlot, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub(crate) const CAPABILITY: &str = "CallKeep";

/// Best-effort integration with the native call UI
pub struct TelephonyAdapter {
    provider: CapabilityHandle<dyn CallProvider>,
    options: CallProviderOptions,
    handle_type: HandleType,
    ready: AtomicBool,
    hangup: ListenerSlot,
}

impl TelephonyAdapter {
    pub fn new(
        provider: CapabilityHandle<dyn CallProvider>,
        options: CallProviderOptions,
        handle_type: HandleType,
    ) -> Self {
        Self {
            provider,
            options,
            handle_type,
            ready: AtomicBool::new(false),
            hangup: ListenerSlot::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn is_available(&self) -> bool {
        self.provider.resolve().is_some()
    }

    /// Register with the provider once. Failures leave the adapter not ready.
    pub async fn ensure_ready(&self) -> Outcome {
        let Some(provider) = self.provider.resolve() else {
            return Outcome::Skipped;
        };
        if self.is_ready() {
            return Outcome::Ok;
        }

        if let Err(e) = provider.setup(&self.options).await {
            warn!("[{}] setup failed: {}", CAPABILITY, e);
            return Outcome::Degraded(e.to_string());
        }

        let outcome = degrade_on_failure(CAPABILITY, "setAvailable", provider.set_available(true));
        if outcome.is_degraded() {
            return outcome;
        }
        self.ready.store(true, Ordering::SeqCst);
        info!("[{}] ready", CAPABILITY);
        outcome
    }

    pub fn start_call(&self, call_id: &str, handle: &str, display_name: &str) -> Outcome {
        match self.ready_provider() {
            Some(provider) => degrade_on_failure(
                CAPABILITY,
                "startCall",
                provider.start_call(call_id, handle, display_name, self.handle_type, true),
            ),
            None => Outcome::Skipped,
        }
    }

    pub fn set_active(&self, call_id: &str) -> Outcome {
        match self.ready_provider() {
            Some(provider) => degrade_on_failure(
                CAPABILITY,
                "setCurrentCallActive",
                provider.set_current_call_active(call_id),
            ),
            None => Outcome::Skipped,
        }
    }

    pub fn end_call(&self, call_id: &str) -> Outcome {
        match self.ready_provider() {
            Some(provider) => {
                degrade_on_failure(CAPABILITY, "endCall", provider.end_call(call_id))
            }
            None => Outcome::Skipped,
        }
    }

    /// Subscribe `on_hangup` to the provider's end-call event.
    ///
    /// Also re-asserts availability whenever the app returns to the
    /// foreground, since the OS may revoke it while backgrounded. A previous
    /// registration is released first.
    pub fn register_hangup_handler(
        &self,
        on_hangup: Callback,
        lifecycle: Option<Arc<dyn AppLifecycle>>,
    ) -> Subscription {
        self.hangup.release();

        let Some(provider) = self.provider.resolve() else {
            debug!("[{}] no provider, hang-up handler not registered", CAPABILITY);
            return Subscription::noop();
        };

        let mut parts = Vec::with_capacity(2);
        let event = CallEvent::EndCall;
        match provider.add_event_listener(event, on_hangup) {
            Ok(subscription) => {
                debug!("[{}] listening for {}", CAPABILITY, event.name());
                parts.push(subscription);
            }
            Err(e) => warn!("[{}] addEventListener({}) failed: {}", CAPABILITY, event.name(), e),
        }

        if let Some(lifecycle) = lifecycle {
            let provider = Arc::clone(&provider);
            parts.push(lifecycle.add_state_listener(Arc::new(move |state: AppState| {
                if state == AppState::Active {
                    degrade_on_failure(CAPABILITY, "setAvailable", provider.set_available(true));
                }
            })));
        }

        self.hangup.replace(Subscription::compose(parts))
    }

    /// Drop the current hang-up registration
    pub fn release_handlers(&self) {
        self.hangup.release();
    }

    fn ready_provider(&self) -> Option<Arc<dyn CallProvider>> {
        if !self.is_ready() {
            return None;
        }
        self.provider.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelephonyConfig;
    use crate::platform::MockAppLifecycle;
    use crate::telephony::provider::{MockCallProvider, ProviderCall};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    fn adapter_with(provider: Arc<MockCallProvider>) -> TelephonyAdapter {
        let provider: Arc<dyn CallProvider> = provider;
        TelephonyAdapter::new(
            CapabilityHandle::available(CAPABILITY, provider),
            CallProviderOptions::from(&TelephonyConfig::default()),
            HandleType::Generic,
        )
    }

    #[tokio::test]
    async fn test_ensure_ready_is_idempotent() {
        let provider = Arc::new(MockCallProvider::new());
        let adapter = adapter_with(Arc::clone(&provider));

        assert_eq!(adapter.ensure_ready().await, Outcome::Ok);
        assert_eq!(adapter.ensure_ready().await, Outcome::Ok);
        assert!(adapter.is_ready());
        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::Setup {
                    app_name: "Conclave".to_string()
                },
                ProviderCall::SetAvailable(true),
            ]
        );
    }

    #[tokio::test]
    async fn test_setup_failure_degrades_to_noops() {
        let provider = Arc::new(MockCallProvider::failing_setup());
        let adapter = adapter_with(Arc::clone(&provider));

        assert!(adapter.ensure_ready().await.is_degraded());
        assert!(!adapter.is_ready());
        assert_eq!(adapter.start_call("id", "handle", "Alice"), Outcome::Skipped);
        assert_eq!(adapter.end_call("id"), Outcome::Skipped);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_set_available_failure_leaves_adapter_not_ready() {
        let provider = Arc::new(MockCallProvider::failing_set_available());
        let adapter = adapter_with(Arc::clone(&provider));

        assert!(adapter.ensure_ready().await.is_degraded());
        assert!(!adapter.is_ready());
        assert_eq!(adapter.start_call("id", "handle", "Alice"), Outcome::Skipped);
        assert_eq!(adapter.set_active("id"), Outcome::Skipped);

        assert!(adapter.ensure_ready().await.is_degraded());
        let setups = provider
            .calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::Setup { .. }))
            .count();
        assert_eq!(setups, 2);
        assert!(!provider
            .calls()
            .iter()
            .any(|call| matches!(call, ProviderCall::StartCall { .. })));
    }

    #[tokio::test]
    async fn test_absent_provider() {
        let adapter = TelephonyAdapter::new(
            CapabilityHandle::absent(CAPABILITY),
            CallProviderOptions::from(&TelephonyConfig::default()),
            HandleType::Generic,
        );
        assert_eq!(adapter.ensure_ready().await, Outcome::Skipped);
        assert!(!adapter.is_available());

        let sub = adapter.register_hangup_handler(Arc::new(|| {}), None);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }

    #[test]
    fn test_hangup_handler_and_foreground_resume() {
        let provider = Arc::new(MockCallProvider::new());
        let lifecycle = Arc::new(MockAppLifecycle::new());
        let adapter = adapter_with(Arc::clone(&provider));
        let hangups = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hangups);

        let sub = adapter.register_hangup_handler(
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Some(lifecycle.clone() as Arc<dyn AppLifecycle>),
        );

        provider.emit(CallEvent::EndCall);
        lifecycle.set_state(AppState::Background);
        lifecycle.set_state(AppState::Active);
        assert_eq!(hangups.load(Ordering::SeqCst), 1);
        assert!(provider.calls().contains(&ProviderCall::SetAvailable(true)));

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(provider.listener_count(CallEvent::EndCall), 0);
        assert_eq!(lifecycle.listener_count(), 0);
        let removals = provider
            .calls()
            .iter()
            .filter(|call| **call == ProviderCall::RemoveEventListener(CallEvent::EndCall))
            .count();
        assert_eq!(removals, 1);
    }

    #[test]
    fn test_reregistering_releases_previous_handler() {
        let provider = Arc::new(MockCallProvider::new());
        let adapter = adapter_with(Arc::clone(&provider));

        let _first = adapter.register_hangup_handler(Arc::new(|| {}), None);
        let second = adapter.register_hangup_handler(Arc::new(|| {}), None);
        assert_eq!(provider.listener_count(CallEvent::EndCall), 1);

        second.unsubscribe();
        assert_eq!(provider.listener_count(CallEvent::EndCall), 0);
    }
}
