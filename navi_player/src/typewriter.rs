//! Character by character reveal of a message group's text.
//!
//! The typewriter never owns a timer. Every change reports the deadline of
//! the next step through [`Typewriter::next_deadline`] and the owner calls
//! [`Typewriter::advance`] once that time has passed. Retargeting replaces
//! the pending deadline, so a step scheduled for an old group can never run.

use std::time::Duration;

use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

pub const CHARACTER_TICK: Duration = Duration::from_millis(45);
pub const CLEAR_EFFECT_DURATION: Duration = Duration::from_millis(400);
pub const NEW_GROUP_DELAY: Duration = Duration::from_millis(300);
pub const SAME_GROUP_DELAY: Duration = Duration::from_millis(200);

/// How a new target text gets onto the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStrategy {
    /// The text grew within the same group, keep what is shown
    /// and type the rest starting at byte `from`
    Continuation { from: usize },
    /// Blank the panel for [`CLEAR_EFFECT_DURATION`] and type from the start
    ClearThenType,
    /// Blank the panel, wait `delay` and type from the start
    ImmediateRestart { delay: Duration },
}

pub fn strategy(
    previous_text: &str,
    text: &str,
    is_new_group: bool,
    show_clear_effect: bool,
) -> RevealStrategy {
    let can_clear = show_clear_effect && !previous_text.is_empty();
    if is_new_group {
        if can_clear {
            RevealStrategy::ClearThenType
        } else {
            RevealStrategy::ImmediateRestart {
                delay: NEW_GROUP_DELAY,
            }
        }
    } else if !previous_text.is_empty() && text.starts_with(previous_text) {
        RevealStrategy::Continuation {
            from: previous_text.len(),
        }
    } else if can_clear {
        RevealStrategy::ClearThenType
    } else {
        RevealStrategy::ImmediateRestart {
            delay: SAME_GROUP_DELAY,
        }
    }
}

/// Side effects the owner of a [`Typewriter`] has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterSignal {
    /// Characters started appearing, start the typing sound
    RevealStarted,
    /// Characters stopped appearing, stop the typing sound.
    /// `finished` is set when the whole text was revealed
    RevealStopped { finished: bool },
    /// The full text is visible
    Completed,
}

pub type Signals = SmallVec<[TypewriterSignal; 2]>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Idle,
    Clearing {
        until: Duration,
    },
    Waiting {
        until: Duration,
    },
    Revealing {
        next_tick: Duration,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    text: String,
    group_id: smartstring::alias::String,
    /// Byte offset into `text`, always on a grapheme boundary
    visible: usize,
    phase: Phase,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts converging on a new text, cancelling whatever was in flight
    pub fn retarget(
        &mut self,
        text: &str,
        group_id: &str,
        show_clear_effect: bool,
        now: Duration,
    ) -> Signals {
        let mut signals = self.cancel();
        let is_new_group = self.group_id.as_str() != group_id;
        let previous_text = std::mem::replace(&mut self.text, text.to_owned());
        self.group_id = group_id.into();
        self.visible = 0;

        if text.is_empty() {
            signals.push(TypewriterSignal::Completed);
            return signals;
        }

        let strategy = strategy(&previous_text, text, is_new_group, show_clear_effect);
        tracing::trace!(?strategy, group_id, "Retargeting typewriter");
        match strategy {
            RevealStrategy::Continuation { from } if from >= text.len() => {
                self.visible = text.len();
                signals.push(TypewriterSignal::Completed);
            }
            RevealStrategy::Continuation { from } => {
                self.visible = from;
                self.phase = Phase::Revealing {
                    next_tick: now + CHARACTER_TICK,
                };
                signals.push(TypewriterSignal::RevealStarted);
            }
            RevealStrategy::ClearThenType => {
                self.phase = Phase::Clearing {
                    until: now + CLEAR_EFFECT_DURATION,
                };
            }
            RevealStrategy::ImmediateRestart { delay } => {
                self.phase = Phase::Waiting { until: now + delay };
            }
        }

        signals
    }

    /// Runs every step that was due at or before `now`
    pub fn advance(&mut self, now: Duration) -> Signals {
        let mut signals = Signals::new();
        loop {
            match self.phase {
                Phase::Clearing { until } | Phase::Waiting { until } if until <= now => {
                    signals.push(TypewriterSignal::RevealStarted);
                    // The first character shows up as soon as the wait is over
                    self.reveal_step(until, &mut signals);
                }
                Phase::Revealing { next_tick } if next_tick <= now => {
                    self.reveal_step(next_tick, &mut signals);
                }
                _ => break,
            }
        }
        signals
    }

    fn reveal_step(&mut self, at: Duration, signals: &mut Signals) {
        let step = self.text[self.visible..]
            .graphemes(true)
            .next()
            .map(str::len)
            .unwrap_or_default();
        self.visible += step;

        if self.visible >= self.text.len() {
            self.phase = Phase::Idle;
            signals.push(TypewriterSignal::RevealStopped { finished: true });
            signals.push(TypewriterSignal::Completed);
        } else {
            self.phase = Phase::Revealing {
                next_tick: at + CHARACTER_TICK,
            };
        }
    }

    fn cancel(&mut self) -> Signals {
        let mut signals = Signals::new();
        if matches!(self.phase, Phase::Revealing { .. }) {
            signals.push(TypewriterSignal::RevealStopped { finished: false });
        }
        self.phase = Phase::Idle;
        signals
    }

    /// Forgets the current group so the next retarget counts as a new one,
    /// even when it targets the same text
    pub fn invalidate(&mut self) {
        self.group_id = Default::default();
    }

    /// Back to an empty panel with nothing in flight
    pub fn reset(&mut self) -> Signals {
        let signals = self.cancel();
        *self = Self::default();
        signals
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        match self.phase {
            Phase::Idle => None,
            Phase::Clearing { until } | Phase::Waiting { until } => Some(until),
            Phase::Revealing { next_tick } => Some(next_tick),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn visible_text(&self) -> &str {
        &self.text[..self.visible]
    }

    /// The visible text split into lines, a blank panel is one empty line
    pub fn animated_lines(&self) -> Vec<&str> {
        self.visible_text().split('\n').collect()
    }

    pub fn is_typing(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_clearing(&self) -> bool {
        matches!(self.phase, Phase::Clearing { .. })
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Idle && self.visible == self.text.len()
    }
}
