//! Session manager composing telephony, foreground presence and audio.
//!
//! [`CallCoordinator`] is the single owner of "is a call active, and what is
//! its id". Every native request it makes goes through an optional
//! capability; a missing or failing capability degrades the call UX but never
//! the call itself.

use crate::audio::{AudioRoute, AudioRouteController, InCallAudio};
use crate::capability::{CapabilityHandle, CapabilityLoader, Outcome};
use crate::config::CallConfig;
use crate::foreground::{ForegroundHandlers, ForegroundOptions, ForegroundPresence, ForegroundService};
use crate::platform::{AppLifecycle, Platform};
use crate::session::{CallId, CallSession, SessionSlot};
use crate::subscription::{lock, Callback, Subscription};
use crate::telephony::{CallProvider, CallProviderOptions, HandleType, TelephonyAdapter};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Builder for [`CallCoordinator`]
pub struct CallCoordinatorBuilder {
    platform: Platform,
    config: CallConfig,
    telephony: Option<CapabilityLoader<dyn CallProvider>>,
    foreground: Option<CapabilityLoader<dyn ForegroundService>>,
    audio: Option<Arc<dyn InCallAudio>>,
    lifecycle: Option<Arc<dyn AppLifecycle>>,
}

impl CallCoordinatorBuilder {
    pub fn config(mut self, config: CallConfig) -> Self {
        self.config = config;
        self
    }

    /// Loader for the call provider, run on first use
    pub fn telephony<F>(mut self, loader: F) -> Self
    where
        F: FnOnce() -> crate::Result<Arc<dyn CallProvider>> + Send + 'static,
    {
        self.telephony = Some(Box::new(loader));
        self
    }

    pub fn telephony_provider(self, provider: Arc<dyn CallProvider>) -> Self {
        self.telephony(move || Ok(provider))
    }

    /// Loader for the foreground service, run on first use
    pub fn foreground<F>(mut self, loader: F) -> Self
    where
        F: FnOnce() -> crate::Result<Arc<dyn ForegroundService>> + Send + 'static,
    {
        self.foreground = Some(Box::new(loader));
        self
    }

    pub fn foreground_service(self, service: Arc<dyn ForegroundService>) -> Self {
        self.foreground(move || Ok(service))
    }

    pub fn audio(mut self, audio: Arc<dyn InCallAudio>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn lifecycle(mut self, lifecycle: Arc<dyn AppLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn build(self) -> CallCoordinator {
        let provider = match self.telephony {
            Some(loader) if self.platform.has_call_provider() => {
                CapabilityHandle::new(crate::telephony::adapter::CAPABILITY, loader)
            }
            Some(_) => {
                debug!("Call provider ignored on {}", self.platform);
                CapabilityHandle::absent(crate::telephony::adapter::CAPABILITY)
            }
            None => CapabilityHandle::absent(crate::telephony::adapter::CAPABILITY),
        };

        let service = match self.foreground {
            Some(loader) if self.platform.has_foreground_service() => {
                CapabilityHandle::new(crate::foreground::service::CAPABILITY, loader)
            }
            Some(_) => {
                debug!("Foreground service ignored on {}", self.platform);
                CapabilityHandle::absent(crate::foreground::service::CAPABILITY)
            }
            None => CapabilityHandle::absent(crate::foreground::service::CAPABILITY),
        };

        let telephony = TelephonyAdapter::new(
            provider,
            CallProviderOptions::from(&self.config.telephony),
            HandleType::parse(&self.config.telephony.handle_type),
        );
        let presence = ForegroundPresence::new(service, self.config.foreground.clone());
        let audio = AudioRouteController::new(self.audio, self.config.audio.clone());

        CallCoordinator {
            platform: self.platform,
            slot: Mutex::new(SessionSlot::new()),
            telephony,
            presence,
            audio,
            lifecycle: self.lifecycle,
        }
    }
}

/// Owns the call lifecycle for one process
pub struct CallCoordinator {
    platform: Platform,
    slot: Mutex<SessionSlot>,
    telephony: TelephonyAdapter,
    presence: ForegroundPresence,
    audio: AudioRouteController,
    lifecycle: Option<Arc<dyn AppLifecycle>>,
}

impl CallCoordinator {
    pub fn builder(platform: Platform) -> CallCoordinatorBuilder {
        CallCoordinatorBuilder {
            platform,
            config: CallConfig::default(),
            telephony: None,
            foreground: None,
            audio: None,
            lifecycle: None,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// One-time call-provider setup; expected once at startup
    pub async fn ensure_call_keep(&self) -> Outcome {
        self.telephony.ensure_ready().await
    }

    /// Begin a session and return its id, whether or not a native call UI exists.
    ///
    /// An already active session is overwritten; callers serialize start/end.
    pub fn start_call_session(&self, handle: &str, display_name: &str) -> CallId {
        let call_id = CallId::generate();
        let session = CallSession {
            call_id: call_id.clone(),
            handle: handle.to_string(),
            display_name: display_name.to_string(),
            room_id: None,
            started_at: Utc::now(),
        };

        if let Some(previous) = self.lock_slot().begin(session) {
            warn!(
                "Starting call {} while {} is still active; overwriting",
                call_id, previous.call_id
            );
        }

        if self.telephony.start_call(call_id.as_str(), handle, display_name).is_ok() {
            self.telephony.set_active(call_id.as_str());
        }

        info!("Call session {} started", call_id);
        call_id
    }

    /// End `call_id`, or the current session when `None`.
    ///
    /// Ending an unknown, stale or already ended session is a silent no-op
    /// for the stored state.
    pub fn end_call_session(&self, call_id: Option<&CallId>) -> Outcome {
        let target = {
            let slot = self.lock_slot();
            match slot.resolve_target(call_id) {
                Some(target) if !slot.already_ended(&target) => target,
                _ => {
                    debug!("No call session to end");
                    return Outcome::Skipped;
                }
            }
        };

        let outcome = self.telephony.end_call(target.as_str());
        if self.lock_slot().finish(&target).is_some() {
            info!("Call session {} ended", target);
        } else {
            debug!("Ended call {} was not the active session", target);
        }
        outcome
    }

    pub fn current_session(&self) -> Option<CallSession> {
        self.lock_slot().current().cloned()
    }

    pub fn current_call_id(&self) -> Option<CallId> {
        self.lock_slot().current_id().cloned()
    }

    pub fn start_in_call(&self) -> Outcome {
        self.audio.start_in_call()
    }

    pub fn stop_in_call(&self) -> Outcome {
        self.audio.stop_in_call()
    }

    pub fn set_audio_route(&self, route: AudioRoute) -> Outcome {
        self.audio.set_audio_route(route)
    }

    pub fn audio_route(&self) -> Option<AudioRoute> {
        self.audio.current_route()
    }

    pub async fn start_foreground_call_service(&self, options: Option<&ForegroundOptions>) -> Outcome {
        self.remember_room(options);
        self.presence.start(options).await
    }

    pub async fn update_foreground_call_service(&self, options: Option<&ForegroundOptions>) -> Outcome {
        self.remember_room(options);
        self.presence.update(options).await
    }

    pub async fn stop_foreground_call_service(&self) -> Outcome {
        self.presence.stop().await
    }

    pub fn register_foreground_call_service_handlers(&self, handlers: ForegroundHandlers) -> Subscription {
        self.presence.register_action_handlers(handlers)
    }

    pub fn register_call_keep_handlers(&self, on_hangup: Callback) -> Subscription {
        self.telephony.register_hangup_handler(on_hangup, self.lifecycle.clone())
    }

    /// End the current session and release every listener this coordinator holds
    pub fn shutdown(&self) {
        self.end_call_session(None);
        self.telephony.release_handlers();
        self.presence.release_handlers();
        self.lock_slot().clear();
        info!("Call coordinator shut down");
    }

    fn remember_room(&self, options: Option<&ForegroundOptions>) {
        if let Some(options) = options {
            self.lock_slot().set_room(options.room_id.clone());
        }
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, SessionSlot> {
        lock(&self.slot)
    }
}
