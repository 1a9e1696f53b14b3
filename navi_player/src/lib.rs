pub mod audio;
pub mod autoplay;
pub mod icon;
pub mod navigator;
pub mod presentation;
pub mod slides;
pub mod typewriter;

pub use audio::{AudioMode, AudioSink, PooledAudio, Silent, SoundKey, SoundPool, SpeechSink, Voice};
pub use autoplay::{AutoPlay, AutoPlayDelay, AutoPlayState};
pub use icon::IconFrame;
pub use presentation::{PlaybackEvent, PlaybackView, Presentation, DEFAULT_SPEAKER};
