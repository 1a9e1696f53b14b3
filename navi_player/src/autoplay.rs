use std::time::Duration;

/// Seconds to wait after a group finished typing, a whole number in `1..=60`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AutoPlayDelay(u32);

impl AutoPlayDelay {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(60);
    pub const DEFAULT: Self = Self(2);

    /// Floors and clamps `seconds`. NaN becomes the minimum
    pub fn new(seconds: f64) -> Self {
        if seconds.is_nan() {
            return Self::MIN;
        }
        let seconds = seconds.floor().clamp(Self::MIN.0 as f64, Self::MAX.0 as f64);
        Self(seconds as u32)
    }

    pub const fn seconds(self) -> u32 {
        self.0
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.0 as u64)
    }
}

impl Default for AutoPlayDelay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoPlayState {
    #[default]
    Stopped,
    Playing {
        /// The last group has been shown, the next expiry moves to the next slide
        pending_slide_transition: bool,
    },
}

/// What the scheduler looks at when deciding whether a countdown should run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleContext {
    pub slide_index: usize,
    pub total_pages: usize,
    pub group_index: usize,
    pub group_count: usize,
    pub typing_complete: bool,
}

/// What the owner has to do once a countdown runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlayStep {
    /// Move to the next group. If there is none call [`AutoPlay::mark_pending`]
    AdvanceGroup,
    /// Move to the first group of the next slide
    AdvanceSlide,
    /// The deck is over and auto-play stopped
    Stop,
}

/// A countdown is only valid for the inputs it was armed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduleKey {
    slide_index: usize,
    total_pages: usize,
    group_index: usize,
    group_count: usize,
    pending_slide_transition: bool,
    delay: AutoPlayDelay,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    deadline: Duration,
    key: ScheduleKey,
}

#[derive(Debug, Clone, Default)]
pub struct AutoPlay {
    state: AutoPlayState,
    delay: AutoPlayDelay,
    countdown: Option<Countdown>,
}

impl AutoPlay {
    pub fn new(delay: AutoPlayDelay) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn state(&self) -> AutoPlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, AutoPlayState::Playing { .. })
    }

    pub fn pending_slide_transition(&self) -> bool {
        matches!(
            self.state,
            AutoPlayState::Playing {
                pending_slide_transition: true
            }
        )
    }

    pub fn delay(&self) -> AutoPlayDelay {
        self.delay
    }

    /// A running countdown is re-armed with the new delay
    /// the next time [`schedule`](Self::schedule) runs
    pub fn set_delay(&mut self, delay: AutoPlayDelay) {
        self.delay = delay;
    }

    pub fn start(&mut self) {
        self.state = AutoPlayState::Playing {
            pending_slide_transition: false,
        };
        self.countdown = None;
    }

    pub fn stop(&mut self) {
        self.state = AutoPlayState::Stopped;
        self.countdown = None;
    }

    pub fn mark_pending(&mut self) {
        if self.is_playing() {
            self.state = AutoPlayState::Playing {
                pending_slide_transition: true,
            };
        }
    }

    /// Arms, keeps or drops the countdown to match the current playback.
    ///
    /// Nothing is armed while the typewriter is still going, and a countdown
    /// armed for other inputs is thrown away and started over.
    pub fn schedule(&mut self, now: Duration, context: ScheduleContext) {
        let AutoPlayState::Playing {
            pending_slide_transition,
        } = self.state
        else {
            self.countdown = None;
            return;
        };
        if context.total_pages == 0 || !context.typing_complete {
            self.countdown = None;
            return;
        }

        let key = ScheduleKey {
            slide_index: context.slide_index,
            total_pages: context.total_pages,
            group_index: context.group_index,
            group_count: context.group_count,
            pending_slide_transition,
            delay: self.delay,
        };
        if self.countdown.map(|c| c.key) != Some(key) {
            tracing::trace!(?key, "Arming auto-play countdown");
            self.countdown = Some(Countdown {
                deadline: now + self.delay.as_duration(),
                key,
            });
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.countdown.map(|c| c.deadline)
    }

    /// Consumes the countdown if it ran out by `now`
    pub fn expire(&mut self, now: Duration, context: ScheduleContext) -> Option<AutoPlayStep> {
        let countdown = self.countdown.filter(|c| c.deadline <= now)?;
        self.countdown = None;
        let AutoPlayState::Playing {
            pending_slide_transition,
        } = self.state
        else {
            return None;
        };
        tracing::debug!(key = ?countdown.key, "Auto-play countdown expired");

        if pending_slide_transition {
            if context.slide_index + 1 >= context.total_pages {
                self.stop();
                return Some(AutoPlayStep::Stop);
            }
            self.state = AutoPlayState::Playing {
                pending_slide_transition: false,
            };
            return Some(AutoPlayStep::AdvanceSlide);
        }

        if context.group_count == 0 {
            // Linger for one more delay before leaving an empty slide
            self.mark_pending();
            return None;
        }

        Some(AutoPlayStep::AdvanceGroup)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn secs(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    fn context(slide_index: usize, group_index: usize, group_count: usize) -> ScheduleContext {
        ScheduleContext {
            slide_index,
            total_pages: 2,
            group_index,
            group_count,
            typing_complete: true,
        }
    }

    #[rstest]
    #[case(2.0, 2)]
    #[case(2.9, 2)]
    #[case(0.0, 1)]
    #[case(-5.0, 1)]
    #[case(600.0, 60)]
    #[case(f64::NAN, 1)]
    #[case(f64::INFINITY, 60)]
    fn delays_are_clamped(#[case] seconds: f64, #[case] expected: u32) {
        assert_eq!(AutoPlayDelay::new(seconds).seconds(), expected);
    }

    #[test]
    fn waits_for_typing() {
        let mut auto_play = AutoPlay::default();
        auto_play.start();

        let mut typing = context(0, 0, 2);
        typing.typing_complete = false;
        auto_play.schedule(secs(0), typing);
        assert_eq!(auto_play.next_deadline(), None);

        auto_play.schedule(secs(5), context(0, 0, 2));
        assert_eq!(auto_play.next_deadline(), Some(secs(7)));
        // Same inputs keep the running countdown
        auto_play.schedule(secs(6), context(0, 0, 2));
        assert_eq!(auto_play.next_deadline(), Some(secs(7)));

        assert_eq!(auto_play.expire(secs(6), context(0, 0, 2)), None);
        assert_eq!(
            auto_play.expire(secs(7), context(0, 0, 2)),
            Some(AutoPlayStep::AdvanceGroup)
        );
        assert_eq!(auto_play.next_deadline(), None);
    }

    #[test]
    fn changed_inputs_rearm() {
        let mut auto_play = AutoPlay::default();
        auto_play.start();
        auto_play.schedule(secs(0), context(0, 0, 2));
        auto_play.schedule(secs(1), context(0, 1, 2));
        assert_eq!(auto_play.next_deadline(), Some(secs(3)));

        auto_play.set_delay(AutoPlayDelay::new(10.0));
        auto_play.schedule(secs(2), context(0, 1, 2));
        assert_eq!(auto_play.next_deadline(), Some(secs(12)));
    }

    #[test]
    fn pending_transition_lingers_then_advances() {
        let mut auto_play = AutoPlay::default();
        auto_play.start();
        auto_play.schedule(secs(0), context(0, 1, 2));
        assert_eq!(
            auto_play.expire(secs(2), context(0, 1, 2)),
            Some(AutoPlayStep::AdvanceGroup)
        );
        // The navigator had no group left
        auto_play.mark_pending();
        assert!(auto_play.pending_slide_transition());

        auto_play.schedule(secs(2), context(0, 1, 2));
        assert_eq!(auto_play.next_deadline(), Some(secs(4)));
        assert_eq!(
            auto_play.expire(secs(4), context(0, 1, 2)),
            Some(AutoPlayStep::AdvanceSlide)
        );
        assert!(!auto_play.pending_slide_transition());
    }

    #[test]
    fn empty_slide_defers() {
        let mut auto_play = AutoPlay::default();
        auto_play.start();
        auto_play.schedule(secs(0), context(0, 0, 0));
        assert_eq!(auto_play.expire(secs(2), context(0, 0, 0)), None);
        assert!(auto_play.pending_slide_transition());
    }

    #[test]
    fn stops_on_the_last_slide() {
        let mut auto_play = AutoPlay::default();
        auto_play.start();
        auto_play.mark_pending();
        auto_play.schedule(secs(0), context(1, 0, 1));
        assert_eq!(
            auto_play.expire(secs(2), context(1, 0, 1)),
            Some(AutoPlayStep::Stop)
        );
        assert_eq!(auto_play.state(), AutoPlayState::Stopped);
        assert_eq!(auto_play.next_deadline(), None);
    }

    #[test]
    fn stopped_or_empty_never_arms() {
        let mut auto_play = AutoPlay::default();
        auto_play.schedule(secs(0), context(0, 0, 1));
        assert_eq!(auto_play.next_deadline(), None);

        auto_play.start();
        let mut no_pages = context(0, 0, 1);
        no_pages.total_pages = 0;
        auto_play.schedule(secs(0), no_pages);
        assert_eq!(auto_play.next_deadline(), None);

        auto_play.mark_pending();
        auto_play.stop();
        auto_play.mark_pending();
        assert!(!auto_play.pending_slide_transition());
    }
}
