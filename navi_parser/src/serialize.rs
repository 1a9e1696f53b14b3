use serde::Serialize;

use crate::slide::{MessageGroup, MessageLine, SlideScript, Transition};

#[derive(Serialize)]
struct ScriptOut<'a> {
    slides: Vec<SlideOut<'a>>,
}

#[derive(Serialize)]
struct SlideOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    transition: TransitionOut,
    groups: Vec<GroupOut<'a>>,
}

#[derive(Serialize)]
struct TransitionOut {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl From<Transition> for TransitionOut {
    fn from(value: Transition) -> Self {
        Self {
            kind: value.as_str(),
        }
    }
}

#[derive(Serialize)]
struct GroupOut<'a> {
    // Generated ids are recomputed by the parser, only
    // explicit ones have to be written back
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker: Option<&'a str>,
    messages: Vec<MessageOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    animation: Option<&'a str>,
}

impl<'a> GroupOut<'a> {
    fn new(group: &'a MessageGroup, slide_index: usize, group_index: usize) -> Self {
        Self {
            id: (!group.has_default_id(slide_index, group_index)).then_some(group.id.as_str()),
            speaker: group.speaker.as_deref(),
            messages: group.messages.iter().map(MessageOut::from).collect(),
            animation: group.animation.as_ref().map(|a| a.as_str()),
        }
    }
}

#[derive(Serialize)]
struct MessageOut<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker: Option<&'a str>,
}

impl<'a> From<&'a MessageLine> for MessageOut<'a> {
    fn from(value: &'a MessageLine) -> Self {
        Self {
            text: &value.text,
            speaker: value.speaker.as_deref(),
        }
    }
}

/// Writes the slide scripts back into the canonical `{ "slides": [...] }` form,
/// indented with two spaces.
///
/// Anything this produces parses back into the same model.
pub fn serialize_script(slide_scripts: &[SlideScript]) -> serde_json::Result<String> {
    let script = ScriptOut {
        slides: slide_scripts
            .iter()
            .enumerate()
            .map(|(slide_index, slide)| SlideOut {
                title: slide.title.as_deref(),
                transition: slide.transition.into(),
                groups: slide
                    .message_groups
                    .iter()
                    .enumerate()
                    .map(|(group_index, group)| GroupOut::new(group, slide_index, group_index))
                    .collect(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&script)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::slide::Animation;

    #[test]
    fn sparse_groups() {
        let mut group = MessageGroup::new(MessageGroup::default_id(0, 0), [MessageLine::new("Hi")]);
        group.animation = Some(Animation::Explosion);
        let slides = [SlideScript {
            title: Some("Intro".into()),
            message_groups: vec![group],
            transition: Transition::Immediate,
        }];

        assert_eq!(
            serialize_script(&slides).unwrap(),
            r#"{
  "slides": [
    {
      "title": "Intro",
      "transition": {
        "type": "immediate"
      },
      "groups": [
        {
          "messages": [
            {
              "text": "Hi"
            }
          ],
          "animation": "explosion"
        }
      ]
    }
  ]
}"#
        );
    }

    #[test]
    fn untitled_slide_omits_title() {
        let out = serialize_script(&[SlideScript::default()]).unwrap();
        assert!(!out.contains("title"));
        assert!(out.contains(r#""groups": []"#));
    }

    #[test]
    fn explicit_ids_are_kept() {
        let group = MessageGroup::new("opening", [MessageLine::new("Hi")]);
        let slides = [SlideScript {
            message_groups: vec![group],
            ..Default::default()
        }];
        assert!(serialize_script(&slides)
            .unwrap()
            .contains(r#""id": "opening""#));
    }

    #[test]
    fn empty_deck() {
        assert_eq!(serialize_script(&[]).unwrap(), "{\n  \"slides\": []\n}");
    }
}
