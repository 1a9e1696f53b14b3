use std::{collections::HashMap, fmt, hash::Hash, str::FromStr};

use navi_parser::Animation;
use thiserror::Error;

/// Sound effects played alongside the typewriter.
///
/// Playback only ever calls these, whatever produces the sound is owned
/// by the implementation.
pub trait AudioSink {
    /// Starting the typing sound stops any typing sound that is still going
    fn start_typing_sound(&mut self);
    fn stop_typing_sound(&mut self);
    fn play_completion_sound(&mut self) {}
    /// Fired once per group that carries an animation
    fn cue(&mut self, _animation: &Animation) {}
}

pub trait SpeechSink {
    fn is_supported(&self) -> bool;
    /// Speaking stops any utterance that is still going
    fn speak(&mut self, text: &str);
    fn stop_speech(&mut self);
    fn is_speaking(&self) -> bool;
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn start_typing_sound(&mut self) {}
    fn stop_typing_sound(&mut self) {}
}

impl SpeechSink for Silent {
    fn is_supported(&self) -> bool {
        false
    }
    fn speak(&mut self, _text: &str) {}
    fn stop_speech(&mut self) {}
    fn is_speaking(&self) -> bool {
        false
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Box<T> {
    fn start_typing_sound(&mut self) {
        (**self).start_typing_sound()
    }
    fn stop_typing_sound(&mut self) {
        (**self).stop_typing_sound()
    }
    fn play_completion_sound(&mut self) {
        (**self).play_completion_sound()
    }
    fn cue(&mut self, animation: &Animation) {
        (**self).cue(animation)
    }
}

impl<T: SpeechSink + ?Sized> SpeechSink for Box<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }
    fn speak(&mut self, text: &str) {
        (**self).speak(text)
    }
    fn stop_speech(&mut self) {
        (**self).stop_speech()
    }
    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }
}

/// Which of the two audio outputs follows the text. Only one is ever active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AudioMode {
    #[default]
    Typewriter,
    Speech,
    None,
}

impl AudioMode {
    pub const ALL: [AudioMode; 3] = [Self::Typewriter, Self::Speech, Self::None];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Typewriter => "typewriter",
            Self::Speech => "speech",
            Self::None => "none",
        }
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown audio mode `{0}`")]
pub struct UnknownAudioMode(pub String);

impl FromStr for AudioMode {
    type Err = UnknownAudioMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownAudioMode(s.to_owned()))
    }
}

/// One playable sound
pub trait Voice {
    fn play(&mut self);
    fn stop(&mut self);
}

/// Sounds created on first use and kept around until released.
///
/// At most one voice exists per key and playing a key again stops it first,
/// so the same sound never overlaps itself.
pub struct SoundPool<K, V: Voice, F> {
    voices: HashMap<K, V>,
    make_voice: F,
}

impl<K, V, F> SoundPool<K, V, F>
where
    K: Eq + Hash + Copy + fmt::Debug,
    V: Voice,
    F: FnMut(K) -> V,
{
    pub fn new(make_voice: F) -> Self {
        Self {
            voices: HashMap::new(),
            make_voice,
        }
    }

    pub fn acquire(&mut self, key: K) -> &mut V {
        let make_voice = &mut self.make_voice;
        self.voices.entry(key).or_insert_with(|| {
            tracing::debug!(?key, "Creating voice");
            make_voice(key)
        })
    }

    /// Stops then starts the voice for `key`
    pub fn restart(&mut self, key: K) {
        let voice = self.acquire(key);
        voice.stop();
        voice.play();
    }

    /// Stops the voice if it was ever created, without creating it
    pub fn stop(&mut self, key: K) {
        if let Some(voice) = self.voices.get_mut(&key) {
            voice.stop();
        }
    }

    pub fn release(&mut self, key: K) {
        if let Some(mut voice) = self.voices.remove(&key) {
            voice.stop();
        }
    }

    pub fn stop_all(&mut self) {
        self.voices.values_mut().for_each(Voice::stop);
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn shutdown(&mut self) {
        for (_, mut voice) in self.voices.drain() {
            voice.stop();
        }
    }
}

impl<K, V: Voice, F> Drop for SoundPool<K, V, F> {
    fn drop(&mut self) {
        self.voices.values_mut().for_each(Voice::stop);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKey {
    Typing,
    Completion,
    Explosion,
    Fight,
}

/// An [`AudioSink`] that plays pooled voices
pub struct PooledAudio<V: Voice, F> {
    pub pool: SoundPool<SoundKey, V, F>,
}

impl<V, F> PooledAudio<V, F>
where
    V: Voice,
    F: FnMut(SoundKey) -> V,
{
    pub fn new(make_voice: F) -> Self {
        Self {
            pool: SoundPool::new(make_voice),
        }
    }
}

impl<V, F> AudioSink for PooledAudio<V, F>
where
    V: Voice,
    F: FnMut(SoundKey) -> V,
{
    fn start_typing_sound(&mut self) {
        self.pool.restart(SoundKey::Typing);
    }

    fn stop_typing_sound(&mut self) {
        self.pool.stop(SoundKey::Typing);
    }

    fn play_completion_sound(&mut self) {
        self.pool.restart(SoundKey::Completion);
    }

    fn cue(&mut self, animation: &Animation) {
        match animation {
            Animation::Explosion => self.pool.restart(SoundKey::Explosion),
            Animation::Fight => self.pool.restart(SoundKey::Fight),
            Animation::Other(name) => tracing::trace!(%name, "No sound for animation"),
        }
    }
}
