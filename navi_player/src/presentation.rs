use std::time::Duration;

use navi_parser::{
    parse::error::ParseError, Animation, MessageGroup, MessageLine, ScriptFile, SlideScript,
};
use tracing::instrument;

use crate::{
    audio::{AudioMode, AudioSink, Silent, SpeechSink},
    autoplay::{AutoPlay, AutoPlayDelay, AutoPlayStep, ScheduleContext},
    icon::{IconFrame, SpeakerIconAnimation},
    navigator::MessageNavigator,
    slides::SlideCursor,
    typewriter::{Typewriter, TypewriterSignal},
};

pub const DEFAULT_SPEAKER: &str = "Navi";

/// Everything that can happen to a presentation, from the user or the clock
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Next group, or the first group of the next slide
    Next,
    /// Previous group, or the last group of the previous slide
    Previous,
    JumpTo(usize),
    ToggleAutoPlay,
    SetAutoPlayDelay(f64),
    ScriptEdited(String),
    /// Slides edited as data rather than as text
    SlidesEdited(Vec<SlideScript>),
    PagesLoaded(usize),
    PagesFailed,
    SetAudioMode(AudioMode),
    /// Nothing happened except time passing
    Tick,
}

/// What the panel shows, detached from the presentation that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackView {
    pub slide_index: usize,
    pub total_pages: usize,
    pub title: Option<String>,
    pub group_index: usize,
    pub group_count: usize,
    pub message_group_id: smartstring::alias::String,
    pub speaker: smartstring::alias::String,
    pub displayed_messages: Vec<MessageLine>,
    pub animated_lines: Vec<String>,
    pub is_typing: bool,
    pub is_clearing: bool,
    pub typing_complete: bool,
    pub is_auto_playing: bool,
    pub pending_slide_transition: bool,
    pub auto_play_delay: u32,
    pub active_animation: Option<Animation>,
    pub icon_frame: IconFrame,
    pub is_speaking: bool,
    pub audio_mode: AudioMode,
    pub script_error: Option<String>,
}

/// The text the typewriter was last pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
struct RevealTarget {
    slide_index: usize,
    group_id: smartstring::alias::String,
    text: String,
}

fn current_groups<'a>(script: &'a ScriptFile, slides: &SlideCursor) -> &'a [MessageGroup] {
    if slides.is_empty() {
        return &[];
    }
    script
        .slide(slides.index())
        .map(|slide| slide.message_groups.as_slice())
        .unwrap_or_default()
}

/// Slide navigation, message groups, the typewriter and auto-play
/// driven as one state machine.
///
/// Time only moves through [`handle`](Self::handle) and [`tick`](Self::tick).
/// Every timer is a deadline, the owner sleeps until
/// [`next_deadline`](Self::next_deadline) and ticks.
pub struct Presentation<A = Silent, S = Silent> {
    script: ScriptFile,
    slides: SlideCursor,
    navigator: MessageNavigator,
    typewriter: Typewriter,
    auto_play: AutoPlay,
    icon: SpeakerIconAnimation,
    typing_complete: bool,
    audio_mode: AudioMode,
    audio: A,
    speech: S,
    typing_sound: bool,
    target: Option<RevealTarget>,
    cue: Option<(usize, smartstring::alias::String)>,
    warned_no_speech: bool,
    default_speaker: smartstring::alias::String,
    now: Duration,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(Silent, Silent)
    }
}

impl<A: AudioSink, S: SpeechSink> Presentation<A, S> {
    pub fn new(audio: A, speech: S) -> Self {
        Self {
            script: ScriptFile::new(0),
            slides: SlideCursor::default(),
            navigator: MessageNavigator::default(),
            typewriter: Typewriter::new(),
            auto_play: AutoPlay::default(),
            icon: SpeakerIconAnimation::default(),
            typing_complete: true,
            audio_mode: AudioMode::default(),
            audio,
            speech,
            typing_sound: false,
            target: None,
            cue: None,
            warned_no_speech: false,
            default_speaker: DEFAULT_SPEAKER.into(),
            now: Duration::ZERO,
        }
    }

    pub fn with_default_speaker(mut self, speaker: impl Into<smartstring::alias::String>) -> Self {
        self.default_speaker = speaker.into();
        self
    }

    pub fn with_audio_mode(mut self, audio_mode: AudioMode) -> Self {
        self.audio_mode = audio_mode;
        self
    }

    pub fn with_auto_play_delay(mut self, delay: AutoPlayDelay) -> Self {
        self.auto_play.set_delay(delay);
        self
    }

    /// Applies one event at `now`.
    ///
    /// Timers that came due before `now` fire first, in deadline order,
    /// so the event sees the state the clock says it should.
    #[instrument(level = "trace", skip(self, event), fields(event = ?std::mem::discriminant(&event)))]
    pub fn handle(&mut self, event: PlaybackEvent, now: Duration) {
        self.fire_due(now);
        self.now = self.now.max(now);

        match event {
            PlaybackEvent::Next => self.next(),
            PlaybackEvent::Previous => self.previous(),
            PlaybackEvent::JumpTo(index) => self.jump_to(index),
            PlaybackEvent::ToggleAutoPlay => self.toggle_auto_play(),
            PlaybackEvent::SetAutoPlayDelay(seconds) => {
                self.auto_play.set_delay(AutoPlayDelay::new(seconds))
            }
            PlaybackEvent::ScriptEdited(source) => self.edit_script(|script| {
                script.set_source(source);
            }),
            PlaybackEvent::SlidesEdited(slides) => self.edit_script(|script| {
                if let Err(error) = script.replace_slides(slides) {
                    tracing::warn!(%error, "Edited slides could not be written back");
                }
            }),
            PlaybackEvent::PagesLoaded(total_pages) => self.load_pages(total_pages),
            PlaybackEvent::PagesFailed => {
                tracing::warn!("Pages failed to load, clearing the deck");
                self.script = ScriptFile::new(0);
                self.load_pages(0);
            }
            PlaybackEvent::SetAudioMode(audio_mode) => self.set_audio_mode(audio_mode),
            PlaybackEvent::Tick => {}
        }

        self.sync(self.now);
    }

    pub fn tick(&mut self, now: Duration) {
        self.handle(PlaybackEvent::Tick, now);
    }

    /// The earliest time something changes on its own
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.typewriter.next_deadline(),
            self.auto_play.next_deadline(),
            self.icon.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn fire_due(&mut self, now: Duration) {
        while let Some(at) = self.next_deadline().filter(|at| *at <= now) {
            self.now = self.now.max(at);
            let signals = self.typewriter.advance(at);
            self.apply_signals(&signals);
            self.icon.advance(at);

            let context = self.schedule_context();
            if let Some(step) = self.auto_play.expire(at, context) {
                self.apply_step(step);
            }
            self.sync(at);
        }
    }

    fn apply_signals(&mut self, signals: &[TypewriterSignal]) {
        for signal in signals {
            match *signal {
                TypewriterSignal::RevealStarted => {
                    if self.audio_mode == AudioMode::Typewriter {
                        self.audio.start_typing_sound();
                        self.typing_sound = true;
                    }
                }
                TypewriterSignal::RevealStopped { finished } => {
                    if std::mem::take(&mut self.typing_sound) {
                        self.audio.stop_typing_sound();
                    }
                    if finished && self.audio_mode == AudioMode::Typewriter {
                        self.audio.play_completion_sound();
                    }
                }
                TypewriterSignal::Completed => self.typing_complete = true,
            }
        }
    }

    fn apply_step(&mut self, step: AutoPlayStep) {
        tracing::debug!(?step, "Auto-play step");
        match step {
            AutoPlayStep::AdvanceGroup => {
                let groups = current_groups(&self.script, &self.slides);
                if !self.navigator.go_to_next_group(groups) {
                    self.auto_play.mark_pending();
                }
            }
            AutoPlayStep::AdvanceSlide => {
                if self.slides.next() {
                    let groups = current_groups(&self.script, &self.slides);
                    self.navigator.reset_for_playback(groups, true);
                }
            }
            AutoPlayStep::Stop => {
                tracing::info!("Reached the end of the deck");
                self.finish_auto_play();
            }
        }
    }

    /// Brings the typewriter, cues, icon and auto-play in line with
    /// whatever group is current now
    fn sync(&mut self, at: Duration) {
        let slide_index = self.slides.index();
        let groups = current_groups(&self.script, &self.slides);
        let group = self.navigator.current_group(groups);
        let target = RevealTarget {
            slide_index,
            group_id: self.navigator.message_group_id(groups, slide_index),
            text: group.map(MessageGroup::full_text).unwrap_or_default(),
        };
        let cue = group.and_then(|g| Some((g.animation.clone()?, g.id.clone())));

        if self.target.as_ref() != Some(&target) {
            self.retarget(target, at);
        }

        match cue {
            Some((animation, group_id)) => {
                let key = (slide_index, group_id);
                if self.cue.as_ref() != Some(&key) {
                    tracing::debug!(%animation, group_id = %key.1, "Animation cue");
                    self.audio.cue(&animation);
                    self.cue = Some(key);
                }
            }
            None => self.cue = None,
        }

        self.icon
            .set_active(self.typewriter.is_typing() || self.speech.is_speaking(), at);
        let context = self.schedule_context();
        self.auto_play.schedule(at, context);
    }

    fn retarget(&mut self, target: RevealTarget, at: Duration) {
        if self.audio_mode == AudioMode::Speech {
            self.speech.stop_speech();
        }

        let signals = self.typewriter.retarget(
            &target.text,
            &target.group_id,
            self.navigator.show_clear_effect(),
            at,
        );
        self.apply_signals(&signals);
        if self.typewriter.is_typing() {
            self.typing_complete = false;
        }

        if self.audio_mode == AudioMode::Speech && !target.text.trim().is_empty() {
            if self.speech.is_supported() {
                self.speech.speak(&target.text);
            } else if !std::mem::replace(&mut self.warned_no_speech, true) {
                tracing::warn!("Speech is not supported here, nothing will be read aloud");
            }
        }
        self.target = Some(target);
    }

    fn schedule_context(&self) -> ScheduleContext {
        ScheduleContext {
            slide_index: self.slides.index(),
            total_pages: self.slides.total(),
            group_index: self.navigator.group_index(),
            group_count: current_groups(&self.script, &self.slides).len(),
            typing_complete: self.typing_complete,
        }
    }

    /// Manual navigation stops auto-play but keeps the current group
    fn interrupt_auto_play(&mut self) {
        if self.auto_play.is_playing() {
            tracing::debug!("Auto-play interrupted");
            self.auto_play.stop();
            self.typing_complete = true;
            self.navigator.set_show_clear_effect(false);
        }
    }

    fn finish_auto_play(&mut self) {
        self.auto_play.stop();
        self.typing_complete = true;
        let groups = current_groups(&self.script, &self.slides);
        self.navigator.reset_for_playback(groups, false);
    }

    fn next(&mut self) {
        self.interrupt_auto_play();
        let groups = current_groups(&self.script, &self.slides);
        if self.navigator.go_to_next_group(groups) {
            return;
        }
        if self.slides.next() {
            let groups = current_groups(&self.script, &self.slides);
            self.navigator.reset_for_playback(groups, false);
        }
    }

    fn previous(&mut self) {
        self.interrupt_auto_play();
        let groups = current_groups(&self.script, &self.slides);
        if self.navigator.go_to_prev_group(groups) {
            return;
        }
        if self.slides.prev() {
            let groups = current_groups(&self.script, &self.slides);
            self.navigator
                .set_group_index(groups, MessageNavigator::last_group_index(groups));
            self.navigator.set_show_clear_effect(false);
        }
    }

    fn jump_to(&mut self, index: usize) {
        if index >= self.slides.total() {
            tracing::debug!(index, total = self.slides.total(), "Ignoring jump past the deck");
            return;
        }
        self.interrupt_auto_play();
        self.slides.jump_to(index);
        let groups = current_groups(&self.script, &self.slides);
        self.navigator.reset_for_playback(groups, false);
    }

    fn toggle_auto_play(&mut self) {
        if self.slides.is_empty() {
            tracing::debug!("No pages to play");
            return;
        }
        if self.auto_play.is_playing() {
            self.finish_auto_play();
        } else {
            self.auto_play.start();
            let groups = current_groups(&self.script, &self.slides);
            self.navigator.reset_for_playback(groups, true);
            // The first group types in again even if it is already on screen
            self.typewriter.invalidate();
            self.target = None;
        }
    }

    fn edit_script(&mut self, edit: impl FnOnce(&mut ScriptFile)) {
        let group_count = current_groups(&self.script, &self.slides).len();
        edit(&mut self.script);
        let groups = current_groups(&self.script, &self.slides);
        if groups.len() != group_count {
            self.navigator
                .reset_for_playback(groups, self.auto_play.is_playing());
        } else {
            // Same position, the group itself may have changed
            let group_index = self.navigator.group_index();
            self.navigator.set_group_index(groups, group_index);
        }
    }

    fn load_pages(&mut self, total_pages: usize) {
        tracing::info!(total_pages, "Resetting playback for new pages");
        self.auto_play.stop();
        self.slides.set_total(total_pages);
        self.script.set_total_pages(total_pages);
        self.navigator.reset_group_state();
        let groups = current_groups(&self.script, &self.slides);
        self.navigator.reset_for_playback(groups, false);
        self.typing_complete = true;
    }

    fn set_audio_mode(&mut self, audio_mode: AudioMode) {
        if audio_mode == self.audio_mode {
            return;
        }
        if std::mem::take(&mut self.typing_sound) {
            self.audio.stop_typing_sound();
        }
        if self.audio_mode == AudioMode::Speech {
            self.speech.stop_speech();
        }
        tracing::info!(%audio_mode, "Audio mode changed");
        self.audio_mode = audio_mode;
    }

    pub fn view(&self) -> PlaybackView {
        let slide_index = self.slides.index();
        let groups = current_groups(&self.script, &self.slides);
        let group = self.navigator.current_group(groups);
        let displayed_messages = self.navigator.displayed_messages(groups);
        let speaker = displayed_messages
            .iter()
            .find_map(|m| m.speaker.clone())
            .or_else(|| group.and_then(|g| g.speaker.clone()))
            .unwrap_or_else(|| self.default_speaker.clone());

        PlaybackView {
            slide_index,
            total_pages: self.slides.total(),
            title: self.current_slide().and_then(|s| s.title.clone()),
            group_index: self.navigator.group_index(),
            group_count: groups.len(),
            message_group_id: self.navigator.message_group_id(groups, slide_index),
            speaker,
            displayed_messages: displayed_messages.to_vec(),
            animated_lines: self
                .typewriter
                .animated_lines()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            is_typing: self.typewriter.is_typing(),
            is_clearing: self.typewriter.is_clearing(),
            typing_complete: self.typing_complete,
            is_auto_playing: self.auto_play.is_playing(),
            pending_slide_transition: self.auto_play.pending_slide_transition(),
            auto_play_delay: self.auto_play.delay().seconds(),
            active_animation: self.navigator.active_animation().cloned(),
            icon_frame: self.icon.frame(),
            is_speaking: self.speech.is_speaking(),
            audio_mode: self.audio_mode,
            script_error: self.script.error().map(ToString::to_string),
        }
    }

    pub fn current_slide(&self) -> Option<&SlideScript> {
        if self.slides.is_empty() {
            return None;
        }
        self.script.slide(self.slides.index())
    }

    pub fn slide_index(&self) -> usize {
        self.slides.index()
    }

    pub fn total_pages(&self) -> usize {
        self.slides.total()
    }

    pub fn group_index(&self) -> usize {
        self.navigator.group_index()
    }

    pub fn is_auto_playing(&self) -> bool {
        self.auto_play.is_playing()
    }

    pub fn typing_complete(&self) -> bool {
        self.typing_complete
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn script(&self) -> &ScriptFile {
        &self.script
    }

    pub fn script_error(&self) -> Option<&ParseError> {
        self.script.error()
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.audio_mode
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SCRIPT: &str = r#"{"slides":[
        {"title":"Intro","groups":[["Hi there."],["Welcome."]]},
        {"groups":[{"speaker":"Guest","messages":["Second"]}]}
    ]}"#;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn loaded() -> Presentation {
        let mut presentation = Presentation::default();
        presentation.handle(PlaybackEvent::ScriptEdited(SCRIPT.into()), ms(0));
        presentation.handle(PlaybackEvent::PagesLoaded(2), ms(0));
        presentation
    }

    #[test]
    fn composed_navigation_crosses_slides() {
        let mut presentation = loaded();
        presentation.handle(PlaybackEvent::Next, ms(0));
        assert_eq!((presentation.slide_index(), presentation.group_index()), (0, 1));
        presentation.handle(PlaybackEvent::Next, ms(0));
        assert_eq!((presentation.slide_index(), presentation.group_index()), (1, 0));
        // No wrap at the end
        presentation.handle(PlaybackEvent::Next, ms(0));
        assert_eq!((presentation.slide_index(), presentation.group_index()), (1, 0));

        presentation.handle(PlaybackEvent::Previous, ms(0));
        assert_eq!((presentation.slide_index(), presentation.group_index()), (0, 1));
    }

    #[test]
    fn jump_out_of_range_is_ignored() {
        let mut presentation = loaded();
        presentation.handle(PlaybackEvent::JumpTo(1), ms(0));
        presentation.handle(PlaybackEvent::JumpTo(2), ms(0));
        assert_eq!(presentation.slide_index(), 1);
    }

    #[test]
    fn view_falls_back_to_default_speaker() {
        let mut presentation = loaded();
        let view = presentation.view();
        assert_eq!(view.title.as_deref(), Some("Intro"));
        assert_eq!(view.speaker, DEFAULT_SPEAKER);
        assert_eq!(view.message_group_id, "slide-0-group-0");

        presentation.handle(PlaybackEvent::JumpTo(1), ms(0));
        assert_eq!(presentation.view().speaker, "Guest");
    }

    #[test]
    fn toggle_needs_pages() {
        let mut presentation = Presentation::default();
        presentation.handle(PlaybackEvent::ToggleAutoPlay, ms(0));
        assert!(!presentation.is_auto_playing());
    }

    #[test]
    fn script_errors_keep_the_deck() {
        let mut presentation = loaded();
        presentation.handle(PlaybackEvent::ScriptEdited("[{".into()), ms(0));
        assert!(presentation.script_error().is_some());
        assert!(presentation.view().script_error.is_some());
        assert_eq!(presentation.current_slide().unwrap().group_count(), 2);
    }

    #[test]
    fn failed_pages_clear_everything() {
        let mut presentation = loaded();
        presentation.handle(PlaybackEvent::PagesFailed, ms(0));
        let view = presentation.view();
        assert_eq!(view.total_pages, 0);
        assert!(view.displayed_messages.is_empty());
        assert_eq!(view.animated_lines, [""]);
        assert_eq!(presentation.script().source(), "");
        assert!(presentation.script().slides().is_empty());
        assert!(presentation.script_error().is_none());

        // The old script does not come back with the next pages
        presentation.handle(PlaybackEvent::PagesLoaded(2), ms(0));
        assert_eq!(presentation.view().group_count, 0);
    }
}
