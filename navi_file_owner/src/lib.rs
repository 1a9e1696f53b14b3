use std::{
    ops::ControlFlow,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwapOption;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use navi_parser::SlideScript;
use navi_player::{
    AudioMode, AudioSink, PlaybackEvent, PlaybackView, Presentation, Silent, SpeechSink,
};

/// The front end never owns the [`Presentation`].
///
/// A single owner thread holds it together with the script, so every
/// input and every timer goes through the same transition function in
/// order. Front ends send [`FileOwnerMessage`]s through the [`AppHandle`]
/// and read back the latest [`PlaybackView`] whenever they are told to
/// redraw.
pub struct DefaultOwner<A = Silent, S = Silent> {
    pub presentation: Presentation<A, S>,
    pub script_path: Option<PathBuf>,
    pub message_receiver: Receiver<FileOwnerMessage>,
    pub shared_data: AppHandle,
    start: Instant,
}

impl<A: AudioSink, S: SpeechSink> DefaultOwner<A, S> {
    pub fn new(
        presentation: Presentation<A, S>,
        script_path: Option<PathBuf>,
        message_receiver: Receiver<FileOwnerMessage>,
        shared_data: AppHandle,
    ) -> Self {
        Self {
            presentation,
            script_path,
            message_receiver,
            shared_data,
            start: Instant::now(),
        }
    }

    /// Serves messages until [`FileOwnerMessage::Shutdown`] arrives.
    /// In between messages the thread sleeps until the presentation's
    /// next deadline.
    pub fn run(mut self) {
        self.publish();
        loop {
            let message = match self.presentation.next_deadline() {
                Some(deadline) => {
                    let timeout = deadline.saturating_sub(self.start.elapsed());
                    match self.message_receiver.recv_timeout(timeout) {
                        Ok(message) => Some(message),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.message_receiver.recv() {
                    Ok(message) => Some(message),
                    Err(_) => break,
                },
            };

            let now = self.start.elapsed();
            let flow = match message {
                Some(message) => self.handle(message, now),
                None => {
                    self.presentation.tick(now);
                    ControlFlow::Continue(())
                }
            };
            if flow.is_break() {
                break;
            }
            self.publish();
        }
        tracing::debug!("File owner shutting down");
    }

    /// Applies one message at `now`, measured from when the owner was created
    pub fn handle(&mut self, message: FileOwnerMessage, now: Duration) -> ControlFlow<()> {
        let event = match message {
            FileOwnerMessage::Index(index) => PlaybackEvent::JumpTo(index),
            FileOwnerMessage::Next => PlaybackEvent::Next,
            FileOwnerMessage::Previous => PlaybackEvent::Previous,
            FileOwnerMessage::ToggleAutoPlay => PlaybackEvent::ToggleAutoPlay,
            FileOwnerMessage::SetDelay(seconds) => PlaybackEvent::SetAutoPlayDelay(seconds),
            FileOwnerMessage::ScriptEdited(source) => PlaybackEvent::ScriptEdited(source),
            FileOwnerMessage::SlidesEdited(slides) => PlaybackEvent::SlidesEdited(slides),
            FileOwnerMessage::ResetFile => match self.read_script() {
                Some(source) => PlaybackEvent::ScriptEdited(source),
                None => return ControlFlow::Continue(()),
            },
            FileOwnerMessage::PagesLoaded(total_pages) => PlaybackEvent::PagesLoaded(total_pages),
            FileOwnerMessage::PagesFailed => PlaybackEvent::PagesFailed,
            FileOwnerMessage::SetAudioMode(audio_mode) => PlaybackEvent::SetAudioMode(audio_mode),
            FileOwnerMessage::Shutdown => return ControlFlow::Break(()),
        };

        self.presentation.handle(event, now);
        if let Some(error) = self.presentation.script_error() {
            tracing::warn!(%error, "Script has errors, keeping the last good slides");
        }
        ControlFlow::Continue(())
    }

    fn read_script(&self) -> Option<String> {
        let path = self.script_path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(source) => Some(source),
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "Failed to reload the script");
                None
            }
        }
    }

    pub fn publish(&self) {
        self.shared_data
            .view
            .store(Some(Arc::new(self.presentation.view())));
        match self.shared_data.redraw_sender.try_send(()) {
            // A redraw is already queued
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => tracing::trace!("Nobody is drawing"),
        }
    }
}

/// Messages to be passed to the
/// owner of the current presentation
#[derive(Debug, Clone, PartialEq)]
pub enum FileOwnerMessage {
    Index(usize),
    Next,
    Previous,
    ToggleAutoPlay,
    SetDelay(f64),
    ScriptEdited(String),
    SlidesEdited(Vec<SlideScript>),
    /// Read the script from disk again
    ResetFile,
    PagesLoaded(usize),
    PagesFailed,
    SetAudioMode(AudioMode),
    Shutdown,
}

#[derive(Clone)]
pub struct AppHandle {
    pub view: Arc<ArcSwapOption<PlaybackView>>,
    pub root_owner_sender: Sender<FileOwnerMessage>,
    /// Holds at most one pending redraw
    pub redraw_sender: Sender<()>,
}

impl AppHandle {
    pub fn new(root_owner_sender: Sender<FileOwnerMessage>, redraw_sender: Sender<()>) -> Self {
        Self {
            view: Arc::new(ArcSwapOption::empty()),
            root_owner_sender,
            redraw_sender,
        }
    }

    /// The last published view
    pub fn view(&self) -> Option<Arc<PlaybackView>> {
        self.view.load_full()
    }

    /// Returns `false` once the owner has shut down
    pub fn send(&self, message: FileOwnerMessage) -> bool {
        self.root_owner_sender.send(message).is_ok()
    }
}

/// Channels for one owner, the owner's end and the front end's end
pub fn channels() -> (AppHandle, Receiver<FileOwnerMessage>, Receiver<()>) {
    let (owner_sender, owner_receiver) = crossbeam_channel::unbounded();
    let (redraw_sender, redraw_receiver) = crossbeam_channel::bounded(1);
    (
        AppHandle::new(owner_sender, redraw_sender),
        owner_receiver,
        redraw_receiver,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn messages_map_onto_playback() {
        let (handle, receiver, _redraw) = channels();
        let mut owner = DefaultOwner::new(Presentation::default(), None, receiver, handle);
        let now = Duration::ZERO;

        let _ = owner.handle(
            FileOwnerMessage::ScriptEdited(r#"[{"groups":[["a"],["b"]]}, {}]"#.into()),
            now,
        );
        let _ = owner.handle(FileOwnerMessage::PagesLoaded(2), now);
        let _ = owner.handle(FileOwnerMessage::Next, now);
        assert_eq!(owner.presentation.group_index(), 1);
        let _ = owner.handle(FileOwnerMessage::Index(1), now);
        assert_eq!(owner.presentation.slide_index(), 1);

        // No script file to reload
        assert!(owner.handle(FileOwnerMessage::ResetFile, now).is_continue());
        assert!(owner.handle(FileOwnerMessage::Shutdown, now).is_break());
    }

    #[test]
    fn publishing_coalesces_redraws() {
        let (handle, receiver, redraw) = channels();
        let owner = DefaultOwner::new(Presentation::default(), None, receiver, handle.clone());
        owner.publish();
        owner.publish();
        assert_eq!(redraw.try_iter().count(), 1);
        assert_eq!(handle.view().map(|view| view.total_pages), Some(0));
    }
}
