//! Coordinator configuration loaded from TOML.

use crate::foreground::descriptor::{
    Importance, Visibility, FOREGROUND_COLOR, FOREGROUND_NOTIFICATION_ID,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallConfig {
    pub telephony: TelephonyConfig,
    pub foreground: ForegroundConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    /// Name shown on the native call card
    pub app_name: String,
    pub supports_video: bool,
    pub handle_type: String,
    pub alert_title: String,
    pub alert_description: String,
    pub cancel_button: String,
    pub ok_button: String,
    pub additional_permissions: Vec<String>,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            app_name: "Conclave".to_string(),
            supports_video: true,
            handle_type: "generic".to_string(),
            alert_title: "Phone account required".to_string(),
            alert_description: "This app needs access to your phone accounts to manage calls."
                .to_string(),
            cancel_button: "Cancel".to_string(),
            ok_button: "Ok".to_string(),
            additional_permissions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForegroundConfig {
    pub notification_id: u32,
    pub title: String,
    pub accent_color: String,
    pub service_type: String,
    pub leave_button_text: String,
    pub importance: Importance,
    pub visibility: Visibility,
    pub vibration: bool,
}

impl Default for ForegroundConfig {
    fn default() -> Self {
        Self {
            notification_id: FOREGROUND_NOTIFICATION_ID,
            title: "Conclave".to_string(),
            accent_color: FOREGROUND_COLOR.to_string(),
            service_type: "camera|microphone".to_string(),
            leave_button_text: "Leave".to_string(),
            importance: Importance::High,
            visibility: Visibility::Public,
            vibration: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub media: crate::audio::MediaKind,
    /// Force the loudspeaker when in-call audio starts
    pub speaker_on_start: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            media: crate::audio::MediaKind::Video,
            speaker_on_start: true,
        }
    }
}

impl CallConfig {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CallConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.telephony.app_name.trim().is_empty() {
            return Err(config_error("telephony.app_name must not be empty"));
        }
        if self.foreground.title.trim().is_empty() {
            return Err(config_error("foreground.title must not be empty"));
        }
        if self.foreground.leave_button_text.trim().is_empty() {
            return Err(config_error("foreground.leave_button_text must not be empty"));
        }
        if !is_hex_color(&self.foreground.accent_color) {
            return Err(config_error(&format!(
                "foreground.accent_color must be #RRGGBB, got {:?}",
                self.foreground.accent_color
            )));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .map(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

fn config_error(reason: &str) -> Error {
    Error::Configuration {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_fixed_constants() {
        let config = CallConfig::default();
        assert_eq!(config.foreground.notification_id, 4242);
        assert_eq!(config.foreground.accent_color, "#F95F4A");
        assert_eq!(config.telephony.app_name, "Conclave");
        assert!(config.audio.speaker_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() -> Result<()> {
        let config = CallConfig::from_toml_str(
            r#"
[foreground]
title = "Standup"
importance = "low"
"#,
        )?;
        assert_eq!(config.foreground.title, "Standup");
        assert_eq!(config.foreground.importance, Importance::Low);
        assert_eq!(config.foreground.notification_id, 4242);
        assert_eq!(config.telephony, TelephonyConfig::default());
        Ok(())
    }

    #[test]
    fn test_invalid_color_rejected() {
        let result = CallConfig::from_toml_str("[foreground]\naccent_color = \"red\"\n");
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[telephony]\napp_name = \"Conclave Beta\"\nsupports_video = false")?;

        let config = CallConfig::load(file.path())?;
        assert_eq!(config.telephony.app_name, "Conclave Beta");
        assert!(!config.telephony.supports_video);
        Ok(())
    }
}
