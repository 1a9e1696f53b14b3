use navi_parser::{Animation, MessageGroup, MessageLine};

/// Which message group of the current slide is on screen.
///
/// The navigator only tracks an index into the slide's groups, the groups
/// themselves are always passed in so a reparsed script can't leave it stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageNavigator {
    group_index: usize,
    show_clear_effect: bool,
    active_animation: Option<Animation>,
}

impl MessageNavigator {
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn show_clear_effect(&self) -> bool {
        self.show_clear_effect
    }

    pub fn set_show_clear_effect(&mut self, show_clear_effect: bool) {
        self.show_clear_effect = show_clear_effect;
    }

    pub fn active_animation(&self) -> Option<&Animation> {
        self.active_animation.as_ref()
    }

    /// Returns `false` on the last group, the caller moves on to the next slide
    pub fn go_to_next_group(&mut self, groups: &[MessageGroup]) -> bool {
        if self.group_index + 1 < groups.len() {
            self.set_group_index(groups, self.group_index + 1);
            true
        } else {
            false
        }
    }

    /// Returns `false` on the first group, the caller moves back a slide
    /// and selects its [`last_group_index`](Self::last_group_index)
    pub fn go_to_prev_group(&mut self, groups: &[MessageGroup]) -> bool {
        if self.group_index > 0 {
            self.set_group_index(groups, self.group_index - 1);
            true
        } else {
            false
        }
    }

    pub fn set_group_index(&mut self, groups: &[MessageGroup], index: usize) {
        self.group_index = index;
        self.active_animation = groups.get(index).and_then(|g| g.animation.clone());
    }

    pub fn last_group_index(groups: &[MessageGroup]) -> usize {
        groups.len().saturating_sub(1)
    }

    /// Back to the first group with no clear effect and no animation
    pub fn reset_group_state(&mut self) {
        *self = Self::default();
    }

    /// Back to the first group of `groups`. Auto-play always clears
    /// the old text before typing so every group visibly types in
    pub fn reset_for_playback(&mut self, groups: &[MessageGroup], auto_playing: bool) {
        self.set_group_index(groups, 0);
        self.show_clear_effect = auto_playing;
    }

    pub fn current_group<'a>(&self, groups: &'a [MessageGroup]) -> Option<&'a MessageGroup> {
        groups.get(self.group_index)
    }

    pub fn displayed_messages<'a>(&self, groups: &'a [MessageGroup]) -> &'a [MessageLine] {
        self.current_group(groups)
            .map(|g| g.messages.as_slice())
            .unwrap_or_default()
    }

    /// The current group's id, or the first group's default id
    /// when the slide has nothing to show
    pub fn message_group_id(
        &self,
        groups: &[MessageGroup],
        slide_index: usize,
    ) -> smartstring::alias::String {
        match self.current_group(groups) {
            Some(group) => group.id.clone(),
            None => MessageGroup::default_id(slide_index, 0),
        }
    }
}
