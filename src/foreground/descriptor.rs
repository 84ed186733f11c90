//! Payload of the persistent "call in progress" notification.

use crate::config::ForegroundConfig;
use crate::Result;
use serde::{Deserialize, Serialize};

pub const FOREGROUND_NOTIFICATION_ID: u32 = 4242;
pub const FOREGROUND_ACTION_LEAVE: &str = "leave";
pub const FOREGROUND_ACTION_OPEN: &str = "open";
pub const FOREGROUND_COLOR: &str = "#F95F4A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Min,
    Low,
    Default,
    High,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Secret,
}

/// Caller-supplied data for the indicator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForegroundOptions {
    pub room_id: Option<String>,
}

impl ForegroundOptions {
    pub fn for_room(room_id: impl Into<String>) -> Self {
        Self {
            room_id: Some(room_id.into()),
        }
    }
}

/// Action pressed on the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForegroundAction {
    /// The explicit "Leave" button
    Leave,
    /// Tapping the notification body
    Open,
}

impl ForegroundAction {
    pub fn from_discriminator(value: &str) -> Option<Self> {
        match value {
            FOREGROUND_ACTION_LEAVE => Some(ForegroundAction::Leave),
            FOREGROUND_ACTION_OPEN => Some(ForegroundAction::Open),
            _ => None,
        }
    }

    pub fn discriminator(self) -> &'static str {
        match self {
            ForegroundAction::Leave => FOREGROUND_ACTION_LEAVE,
            ForegroundAction::Open => FOREGROUND_ACTION_OPEN,
        }
    }
}

/// Event delivered by the foreground service when the user presses something
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForegroundEvent {
    pub button: Option<String>,
    pub main: Option<String>,
}

impl ForegroundEvent {
    pub fn button(value: &str) -> Self {
        Self {
            button: Some(value.to_string()),
            main: None,
        }
    }

    pub fn main(value: &str) -> Self {
        Self {
            button: None,
            main: Some(value.to_string()),
        }
    }

    /// Button discriminator takes precedence over the body one
    pub fn action(&self) -> Option<ForegroundAction> {
        let raw = self
            .button
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.main.as_deref().filter(|s| !s.is_empty()))?;
        ForegroundAction::from_discriminator(raw)
    }
}

/// Declarative notification descriptor handed to the native service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForegroundNotification {
    pub id: u32,
    pub title: String,
    pub message: String,
    pub importance: Importance,
    pub visibility: Visibility,
    pub vibration: bool,
    pub color: String,
    #[serde(rename = "ServiceType")]
    pub service_type: String,
    pub button: bool,
    pub button_text: String,
    pub button_on_press: String,
    pub main_on_press: String,
}

impl ForegroundNotification {
    /// Build a fresh descriptor. Never mutated afterwards.
    pub fn build(options: Option<&ForegroundOptions>, config: &ForegroundConfig) -> Self {
        Self {
            id: config.notification_id,
            title: config.title.clone(),
            message: message_for(options),
            importance: config.importance,
            visibility: config.visibility,
            vibration: config.vibration,
            color: config.accent_color.clone(),
            service_type: config.service_type.clone(),
            button: true,
            button_text: config.leave_button_text.clone(),
            button_on_press: FOREGROUND_ACTION_LEAVE.to_string(),
            main_on_press: FOREGROUND_ACTION_OPEN.to_string(),
        }
    }

    /// Pretty JSON in the shape the native module expects
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn message_for(options: Option<&ForegroundOptions>) -> String {
    let room_id = options
        .and_then(|o| o.room_id.as_deref())
        .map(str::trim)
        .filter(|id| !id.is_empty());
    match room_id {
        Some(room_id) => format!("Meeting code: {}", room_id),
        None => "Meeting in progress".to_string(),
    }
}
