use std::time::Duration;

pub const ICON_FRAME_INTERVAL: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IconFrame {
    #[default]
    Resting,
    Talking,
}

impl IconFrame {
    fn flipped(self) -> Self {
        match self {
            Self::Resting => Self::Talking,
            Self::Talking => Self::Resting,
        }
    }
}

/// Flaps the speaker icon while text is typing, clearing or being spoken
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerIconAnimation {
    frame: IconFrame,
    next_flip: Option<Duration>,
}

impl SpeakerIconAnimation {
    pub fn set_active(&mut self, active: bool, now: Duration) {
        match (active, self.next_flip) {
            (true, None) => self.next_flip = Some(now + ICON_FRAME_INTERVAL),
            (false, Some(_)) => *self = Self::default(),
            _ => {}
        }
    }

    pub fn advance(&mut self, now: Duration) {
        while let Some(next_flip) = self.next_flip.filter(|flip| *flip <= now) {
            self.frame = self.frame.flipped();
            self.next_flip = Some(next_flip + ICON_FRAME_INTERVAL);
        }
    }

    pub fn is_active(&self) -> bool {
        self.next_flip.is_some()
    }

    pub fn frame(&self) -> IconFrame {
        self.frame
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_flip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flaps_while_active() {
        let mut icon = SpeakerIconAnimation::default();
        icon.set_active(true, Duration::ZERO);
        assert_eq!(icon.frame(), IconFrame::Resting);

        icon.advance(Duration::from_millis(150));
        assert_eq!(icon.frame(), IconFrame::Talking);
        icon.advance(Duration::from_millis(299));
        assert_eq!(icon.frame(), IconFrame::Talking);
        icon.advance(Duration::from_millis(450));
        assert_eq!(icon.frame(), IconFrame::Talking);
        assert_eq!(icon.next_deadline(), Some(Duration::from_millis(600)));

        // Staying active keeps the rhythm
        icon.set_active(true, Duration::from_millis(500));
        assert_eq!(icon.next_deadline(), Some(Duration::from_millis(600)));
    }

    #[test]
    fn rests_when_idle() {
        let mut icon = SpeakerIconAnimation::default();
        icon.set_active(true, Duration::ZERO);
        icon.advance(Duration::from_millis(150));
        icon.set_active(false, Duration::from_millis(200));
        assert_eq!(icon.frame(), IconFrame::Resting);
        assert!(!icon.is_active());
        assert_eq!(icon.next_deadline(), None);
    }
}
