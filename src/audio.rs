//! In-call audio engine and output routing.

use crate::capability::{degrade_on_failure, Outcome};
use crate::config::AudioConfig;
use crate::subscription::lock;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

const CAPABILITY: &str = "InCallManager";

/// Output device class for call audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AudioRoute {
    Speaker,
    Earpiece,
}

impl AudioRoute {
    fn force_speaker(self) -> bool {
        self == AudioRoute::Speaker
    }
}

impl fmt::Display for AudioRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioRoute::Speaker => f.write_str("speaker"),
            AudioRoute::Earpiece => f.write_str("earpiece"),
        }
    }
}

/// Media profile the audio engine is started for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// Native in-call audio manager
pub trait InCallAudio: Send + Sync {
    fn start(&self, media: MediaKind) -> Result<()>;

    fn stop(&self) -> Result<()>;

    /// Missing on some builds of the native module
    fn set_force_speakerphone_on(&self, _on: bool) -> Result<()> {
        Err(Error::unsupported(CAPABILITY, "setForceSpeakerphoneOn"))
    }
}

/// A request observed by [`MockInCallAudio`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCall {
    Start(MediaKind),
    Stop,
    ForceSpeakerphone(bool),
}

/// Mock audio manager for development and testing
pub struct MockInCallAudio {
    calls: Mutex<Vec<AudioCall>>,
    speaker_toggle: bool,
}

impl MockInCallAudio {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            speaker_toggle: true,
        }
    }

    /// A build without the speakerphone toggle
    pub fn without_speaker_toggle() -> Self {
        Self {
            speaker_toggle: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: AudioCall) {
        lock(&self.calls).push(call);
    }
}

impl Default for MockInCallAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl InCallAudio for MockInCallAudio {
    fn start(&self, media: MediaKind) -> Result<()> {
        self.record(AudioCall::Start(media));
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.record(AudioCall::Stop);
        Ok(())
    }

    fn set_force_speakerphone_on(&self, on: bool) -> Result<()> {
        if !self.speaker_toggle {
            return Err(Error::unsupported(CAPABILITY, "setForceSpeakerphoneOn"));
        }
        self.record(AudioCall::ForceSpeakerphone(on));
        Ok(())
    }
}

/// Starts/stops call audio and switches between loudspeaker and earpiece
pub struct AudioRouteController {
    audio: Option<Arc<dyn InCallAudio>>,
    config: AudioConfig,
    route: Mutex<Option<AudioRoute>>,
}

impl AudioRouteController {
    pub fn new(audio: Option<Arc<dyn InCallAudio>>, config: AudioConfig) -> Self {
        Self {
            audio,
            config,
            route: Mutex::new(None),
        }
    }

    pub fn start_in_call(&self) -> Outcome {
        let Some(audio) = &self.audio else {
            return Outcome::Skipped;
        };
        let outcome = degrade_on_failure(CAPABILITY, "start", audio.start(self.config.media));
        if self.config.speaker_on_start {
            self.set_audio_route(AudioRoute::Speaker);
        }
        outcome
    }

    pub fn stop_in_call(&self) -> Outcome {
        let Some(audio) = &self.audio else {
            return Outcome::Skipped;
        };
        *lock(&self.route) = None;
        degrade_on_failure(CAPABILITY, "stop", audio.stop())
    }

    pub fn set_audio_route(&self, route: AudioRoute) -> Outcome {
        let Some(audio) = &self.audio else {
            return Outcome::Skipped;
        };
        let outcome = degrade_on_failure(
            CAPABILITY,
            "setForceSpeakerphoneOn",
            audio.set_force_speakerphone_on(route.force_speaker()),
        );
        if outcome.is_ok() {
            *lock(&self.route) = Some(route);
        }
        outcome
    }

    /// Last route successfully applied during this call
    pub fn current_route(&self) -> Option<AudioRoute> {
        *lock(&self.route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller(audio: Arc<MockInCallAudio>) -> AudioRouteController {
        AudioRouteController::new(Some(audio as Arc<dyn InCallAudio>), AudioConfig::default())
    }

    #[test]
    fn test_route_toggle_order() {
        let audio = Arc::new(MockInCallAudio::new());
        let controller = controller(Arc::clone(&audio));

        controller.set_audio_route(AudioRoute::Speaker);
        controller.set_audio_route(AudioRoute::Earpiece);

        assert_eq!(
            audio.calls(),
            vec![AudioCall::ForceSpeakerphone(true), AudioCall::ForceSpeakerphone(false)]
        );
        assert_eq!(controller.current_route(), Some(AudioRoute::Earpiece));
    }

    #[test]
    fn test_start_in_call_forces_speaker() {
        let audio = Arc::new(MockInCallAudio::new());
        let controller = controller(Arc::clone(&audio));

        assert_eq!(controller.start_in_call(), Outcome::Ok);
        assert_eq!(controller.stop_in_call(), Outcome::Ok);
        assert_eq!(
            audio.calls(),
            vec![
                AudioCall::Start(MediaKind::Video),
                AudioCall::ForceSpeakerphone(true),
                AudioCall::Stop,
            ]
        );
        assert_eq!(controller.current_route(), None);
    }

    #[test]
    fn test_missing_speaker_toggle_is_skipped() {
        let audio = Arc::new(MockInCallAudio::without_speaker_toggle());
        let controller = controller(Arc::clone(&audio));

        assert_eq!(controller.set_audio_route(AudioRoute::Speaker), Outcome::Skipped);
        assert_eq!(controller.start_in_call(), Outcome::Ok);
        assert_eq!(audio.calls(), vec![AudioCall::Start(MediaKind::Video)]);
        assert_eq!(controller.current_route(), None);
    }

    #[test]
    fn test_no_audio_module() {
        let controller = AudioRouteController::new(None, AudioConfig::default());
        assert_eq!(controller.start_in_call(), Outcome::Skipped);
        assert_eq!(controller.set_audio_route(AudioRoute::Earpiece), Outcome::Skipped);
        assert_eq!(controller.stop_in_call(), Outcome::Skipped);
    }
}
