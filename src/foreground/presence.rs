//! Persistent call indicator for platforms without a native call UI.

use super::descriptor::{ForegroundAction, ForegroundEvent, ForegroundNotification, ForegroundOptions};
use super::service::{ForegroundService, CAPABILITY};
use crate::capability::{degrade_on_failure, CapabilityHandle, Outcome};
use crate::config::ForegroundConfig;
use crate::subscription::{Callback, ListenerSlot, Subscription};
use crate::Error;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callbacks for the indicator's two actions
#[derive(Clone, Default)]
pub struct ForegroundHandlers {
    pub on_leave: Option<Callback>,
    pub on_open: Option<Callback>,
}

impl ForegroundHandlers {
    fn dispatch(&self, event: &ForegroundEvent) {
        let callback = match event.action() {
            Some(ForegroundAction::Leave) => self.on_leave.as_ref(),
            Some(ForegroundAction::Open) => self.on_open.as_ref(),
            None => None,
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

pub struct ForegroundPresence {
    service: CapabilityHandle<dyn ForegroundService>,
    config: ForegroundConfig,
    actions: ListenerSlot,
}

impl ForegroundPresence {
    pub fn new(service: CapabilityHandle<dyn ForegroundService>, config: ForegroundConfig) -> Self {
        Self {
            service,
            config,
            actions: ListenerSlot::new(),
        }
    }

    pub fn descriptor(&self, options: Option<&ForegroundOptions>) -> ForegroundNotification {
        ForegroundNotification::build(options, &self.config)
    }

    pub async fn start(&self, options: Option<&ForegroundOptions>) -> Outcome {
        let Some(service) = self.service.resolve() else {
            return Outcome::Skipped;
        };
        let notification = self.descriptor(options);
        degrade_on_failure(CAPABILITY, "start", service.start(&notification).await)
    }

    pub async fn update(&self, options: Option<&ForegroundOptions>) -> Outcome {
        let Some(service) = self.service.resolve() else {
            return Outcome::Skipped;
        };
        let notification = self.descriptor(options);
        degrade_on_failure(CAPABILITY, "update", service.update(&notification).await)
    }

    /// Stop the indicator, falling back to `stop_all` on builds without `stop`
    pub async fn stop(&self) -> Outcome {
        let Some(service) = self.service.resolve() else {
            return Outcome::Skipped;
        };
        match service.stop().await {
            Err(Error::Unsupported { .. }) => {
                degrade_on_failure(CAPABILITY, "stopAll", service.stop_all().await)
            }
            result => degrade_on_failure(CAPABILITY, "stop", result),
        }
    }

    /// Route indicator presses to `handlers`.
    ///
    /// Any listener from an earlier call is released before the new one is
    /// attached. Discriminators other than leave/open are ignored.
    pub fn register_action_handlers(&self, handlers: ForegroundHandlers) -> Subscription {
        self.actions.release();

        let Some(service) = self.service.resolve() else {
            return Subscription::noop();
        };

        let listener = Arc::new(move |event: &ForegroundEvent| handlers.dispatch(event));
        match service.event_listener(listener) {
            Ok(subscription) => self.actions.replace(subscription),
            Err(e) if e.is_absence() => {
                debug!("[{}] no event listener support", CAPABILITY);
                Subscription::noop()
            }
            Err(e) => {
                warn!("[{}] eventListener failed: {}", CAPABILITY, e);
                Subscription::noop()
            }
        }
    }

    /// Drop the current action listener
    pub fn release_handlers(&self) {
        self.actions.release();
    }

    pub fn has_action_listener(&self) -> bool {
        self.actions.is_occupied()
    }
}
