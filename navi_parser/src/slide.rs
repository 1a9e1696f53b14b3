use std::fmt::{self, Display, Write};

use smallvec::SmallVec;
use smart_default::SmartDefault;

/// The script attached to one rendered slide page
#[derive(SmartDefault, Debug, Clone, PartialEq, Eq)]
pub struct SlideScript {
    pub title: Option<String>,
    pub message_groups: Vec<MessageGroup>,
    #[default(Transition::Immediate)]
    pub transition: Transition,
}

impl SlideScript {
    pub fn group_count(&self) -> usize {
        self.message_groups.len()
    }
}

/// Creates `total_pages` untitled slides without any message groups
pub fn blank_scripts(total_pages: usize) -> Vec<SlideScript> {
    let mut scripts = Vec::with_capacity(total_pages);
    scripts.resize_with(total_pages, SlideScript::default);
    scripts
}

/// A batch of lines that are displayed together and advanced together.
///
/// A group that reaches the playback code always has at least one message,
/// the parser drops groups that normalize to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroup {
    pub id: smartstring::alias::String,
    pub messages: SmallVec<[MessageLine; 2]>,
    pub speaker: Option<smartstring::alias::String>,
    pub animation: Option<Animation>,
}

impl MessageGroup {
    pub fn new(
        id: impl Into<smartstring::alias::String>,
        messages: impl IntoIterator<Item = MessageLine>,
    ) -> Self {
        Self {
            id: id.into(),
            messages: messages.into_iter().collect(),
            speaker: None,
            animation: None,
        }
    }

    /// `slide-{slide_index}-group-{group_index}`
    pub fn default_id(slide_index: usize, group_index: usize) -> smartstring::alias::String {
        let mut id = smartstring::alias::String::new();
        // Writing into a SmartString can't fail
        let _ = write!(id, "slide-{slide_index}-group-{group_index}");
        id
    }

    pub fn has_default_id(&self, slide_index: usize, group_index: usize) -> bool {
        self.id == Self::default_id(slide_index, group_index)
    }

    /// Every message of the group joined by newlines
    pub fn full_text(&self) -> String {
        full_text(&self.messages)
    }
}

pub fn full_text(messages: &[MessageLine]) -> String {
    let mut text = String::with_capacity(messages.iter().map(|m| m.text.len() + 1).sum());
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(&message.text);
    }
    text
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLine {
    /// Always trimmed and non-empty
    pub text: String,
    pub speaker: Option<smartstring::alias::String>,
}

impl MessageLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: None,
        }
    }
}

impl From<&str> for MessageLine {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MessageLine {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    #[default]
    Immediate,
}

impl Transition {
    pub const SUPPORTED: &'static [Transition] = &[Transition::Immediate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::SUPPORTED.iter().copied().find(|t| t.as_str() == name)
    }

    /// The supported names joined for error messages
    pub fn supported_names() -> String {
        Self::SUPPORTED
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A presentation side effect attached to a message group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Animation {
    Fight,
    Explosion,
    Other(smartstring::alias::String),
}

impl Animation {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fight => "fight",
            Self::Explosion => "explosion",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for Animation {
    fn from(value: &str) -> Self {
        match value {
            "fight" => Self::Fight,
            "explosion" => Self::Explosion,
            other => Self::Other(other.into()),
        }
    }
}

impl Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids() {
        assert_eq!(MessageGroup::default_id(0, 0), "slide-0-group-0");
        assert_eq!(MessageGroup::default_id(12, 3), "slide-12-group-3");
    }

    #[test]
    fn full_text_joins_with_newlines() {
        let group = MessageGroup::new("g", [MessageLine::new("Hello"), MessageLine::new("world")]);
        assert_eq!(group.full_text(), "Hello\nworld");
        assert_eq!(full_text(&[]), "");
    }

    #[test]
    fn blank_slides() {
        let blank = blank_scripts(3);
        assert_eq!(blank.len(), 3);
        assert!(blank.iter().all(|s| s.title.is_none()
            && s.message_groups.is_empty()
            && s.transition == Transition::Immediate));
        assert!(blank_scripts(0).is_empty());
    }

    #[test]
    fn animation_names() {
        assert_eq!(Animation::from("fight"), Animation::Fight);
        assert_eq!(Animation::from("explosion").as_str(), "explosion");
        assert_eq!(Animation::from("confetti"), Animation::Other("confetti".into()));
    }

    #[test]
    fn transition_names() {
        assert_eq!(Transition::from_name("immediate"), Some(Transition::Immediate));
        assert_eq!(Transition::from_name("fade"), None);
        assert_eq!(Transition::supported_names(), "immediate");
    }
}
