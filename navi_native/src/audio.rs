use std::{
    cell::RefCell,
    io::Write,
    process::{Child, Command, Stdio},
};

use navi_player::{SoundKey, SpeechSink, Voice};

use crate::settings::{AudioSettings, SpeechSettings};

/// Rings the terminal bell for one-shot sounds.
///
/// A terminal has no way to loop a sound, so the typing voice stays quiet.
#[derive(Debug)]
pub struct TerminalVoice {
    key: SoundKey,
    audible: bool,
}

impl TerminalVoice {
    pub fn new(key: SoundKey, settings: &AudioSettings) -> Self {
        Self {
            key,
            audible: settings.volume > 0.0,
        }
    }
}

impl Voice for TerminalVoice {
    fn play(&mut self) {
        if !self.audible || self.key == SoundKey::Typing {
            tracing::trace!(key = ?self.key, "Quiet voice");
            return;
        }
        let mut stderr = std::io::stderr();
        if let Err(error) = stderr.write_all(b"\x07").and_then(|()| stderr.flush()) {
            tracing::warn!(%error, key = ?self.key, "Failed to ring the bell");
        }
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Espeak(&'static str),
    Say,
}

impl Engine {
    fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            return Some(Self::Say);
        }
        ["espeak-ng", "espeak"].into_iter().find_map(|program| {
            Command::new(program)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .ok()
                .filter(|status| status.success())
                .map(|_| Self::Espeak(program))
        })
    }

    fn command(self, text: &str, settings: &SpeechSettings) -> Command {
        let words_per_minute = (175.0 * settings.rate).round() as u32;
        let mut command;
        match self {
            Self::Espeak(program) => {
                command = Command::new(program);
                command
                    .arg("-a")
                    .arg(((settings.volume * 100.0).round() as u32).to_string())
                    .arg("-s")
                    .arg(words_per_minute.to_string())
                    .arg("-p")
                    .arg(((settings.pitch * 50.0).round() as u32).min(99).to_string());
            }
            Self::Say => {
                command = Command::new("say");
                command.arg("-r").arg(words_per_minute.to_string());
            }
        }
        if let Some(voice) = settings.voice_name.as_deref() {
            command.arg("-v").arg(voice);
        }
        command
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

/// Reads text aloud through whichever speech synthesizer is installed
#[derive(Debug)]
pub struct CommandSpeech {
    engine: Option<Engine>,
    settings: SpeechSettings,
    utterance: RefCell<Option<Child>>,
}

impl CommandSpeech {
    pub fn new(settings: SpeechSettings) -> Self {
        let engine = Engine::detect();
        tracing::debug!(?engine, "Speech engine");
        Self {
            engine,
            settings,
            utterance: RefCell::new(None),
        }
    }
}

impl SpeechSink for CommandSpeech {
    fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    fn speak(&mut self, text: &str) {
        self.stop_speech();
        let Some(engine) = self.engine else {
            return;
        };
        match engine.command(text, &self.settings).spawn() {
            Ok(child) => *self.utterance.get_mut() = Some(child),
            Err(error) => tracing::warn!(%error, ?engine, "Failed to start speaking"),
        }
    }

    fn stop_speech(&mut self) {
        if let Some(mut child) = self.utterance.get_mut().take() {
            // It may already have exited on its own
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_speaking(&self) -> bool {
        self.utterance
            .borrow_mut()
            .as_mut()
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        self.stop_speech();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn espeak_arguments_follow_settings() {
        let mut settings = SpeechSettings::default();
        settings.set_rate(2.0);
        settings.set_pitch(2.0);
        settings.set_volume(0.5);
        settings.voice_name = Some("en-us".into());

        let command = Engine::Espeak("espeak-ng").command("Hi there.", &settings);
        assert_eq!(command.get_program(), "espeak-ng");
        assert_eq!(
            args(&command),
            ["-a", "50", "-s", "350", "-p", "99", "-v", "en-us", "--", "Hi there."]
        );
    }

    #[test]
    fn say_arguments() {
        let command = Engine::Say.command("Hi", &SpeechSettings::default());
        assert_eq!(args(&command), ["-r", "175", "--", "Hi"]);
    }
}
