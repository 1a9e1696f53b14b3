//! Audio, speech and auto-play preferences kept between runs.
//!
//! Everything here is best effort. A missing or broken settings file
//! falls back to the defaults and a failed write is only logged.

use std::{
    io,
    path::{Path, PathBuf},
};

use etcetera::base_strategy::{choose_base_strategy, BaseStrategy};
use navi_player::{AudioMode, AutoPlayDelay};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

const APP_DIR: &str = "slide-navi";
const SETTINGS_FILE: &str = "settings.json";

fn unit(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default
    }
}

fn speech_factor(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.5, 2.0)
    } else {
        1.0
    }
}

/// The typewriter sound
#[derive(SmartDefault, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioSettings {
    #[default = true]
    #[serde(alias = "typewriterEnabled")]
    pub enabled: bool,
    #[default = 0.3]
    #[serde(alias = "typewriterVolume")]
    pub volume: f64,
}

impl AudioSettings {
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = unit(volume, 0.3);
    }

    fn clamped(mut self) -> Self {
        self.set_volume(self.volume);
        self
    }
}

#[derive(SmartDefault, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechSettings {
    pub enabled: bool,
    #[default = 1.0]
    pub volume: f64,
    #[default = 1.0]
    pub rate: f64,
    #[default = 1.0]
    pub pitch: f64,
    pub voice_name: Option<String>,
}

impl SpeechSettings {
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = unit(volume, 1.0);
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = speech_factor(rate);
    }

    pub fn set_pitch(&mut self, pitch: f64) {
        self.pitch = speech_factor(pitch);
    }

    fn clamped(mut self) -> Self {
        self.set_volume(self.volume);
        self.set_rate(self.rate);
        self.set_pitch(self.pitch);
        self.voice_name = self
            .voice_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        self
    }
}

#[derive(SmartDefault, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub speech: SpeechSettings,
    #[default(AutoPlayDelay::DEFAULT.seconds())]
    pub auto_play_delay: u32,
}

impl Settings {
    /// Typewriter wins over speech when both are somehow enabled
    pub fn audio_mode(&self) -> AudioMode {
        if self.audio.enabled {
            AudioMode::Typewriter
        } else if self.speech.enabled {
            AudioMode::Speech
        } else {
            AudioMode::None
        }
    }

    /// Enables exactly the output `audio_mode` names
    pub fn set_audio_mode(&mut self, audio_mode: AudioMode) {
        self.audio.enabled = audio_mode == AudioMode::Typewriter;
        self.speech.enabled = audio_mode == AudioMode::Speech;
    }

    pub fn auto_play_delay(&self) -> AutoPlayDelay {
        AutoPlayDelay::new(self.auto_play_delay.into())
    }

    pub fn set_auto_play_delay(&mut self, delay: AutoPlayDelay) {
        self.auto_play_delay = delay.seconds();
    }

    fn clamped(self) -> Self {
        Self {
            audio: self.audio.clamped(),
            speech: self.speech.clamped(),
            auto_play_delay: AutoPlayDelay::new(self.auto_play_delay.into()).seconds(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::clamped)
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No settings saved yet");
                return Self::default();
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to read settings, using defaults");
                return Self::default();
            }
        };

        Self::from_json(&json).unwrap_or_else(|error| {
            tracing::warn!(%error, "Settings file is invalid, using defaults");
            Self::default()
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn save(&self, path: &Path) {
        let result = serde_json::to_string_pretty(self)
            .map_err(io::Error::from)
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, json)
            });
        if let Err(error) = result {
            tracing::warn!(%error, "Failed to save settings");
        }
    }
}

/// `<config dir>/slide-navi/settings.json`, if the platform has a config dir
pub fn settings_path() -> Option<PathBuf> {
    match choose_base_strategy() {
        Ok(strategy) => Some(strategy.config_dir().join(APP_DIR).join(SETTINGS_FILE)),
        Err(error) => {
            tracing::warn!(%error, "Unable to find the config directory, settings won't persist");
            None
        }
    }
}
