use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::{
    parse::error::{JsonPath, ParseError, ParseResult},
    slide::{Animation, MessageGroup, MessageLine},
};

use super::trimmed_str;

/// The shapes a group can be written in
enum GroupInput<'a> {
    Text(&'a str),
    Lines(&'a [Value]),
    Object {
        object: &'a Map<String, Value>,
        lines: &'a [Value],
    },
}

impl<'a> GroupInput<'a> {
    fn classify(value: &'a Value, path: JsonPath) -> ParseResult<Self> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Array(lines) => Ok(Self::Lines(lines)),
            Value::Object(object) => {
                let lines: &[Value] = match (object.get("messages"), object.get("lines")) {
                    (Some(Value::Array(lines)), _) => lines,
                    (_, Some(Value::Array(lines))) => lines,
                    _ => &[],
                };
                Ok(Self::Object { object, lines })
            }
            _ => Err(ParseError::InvalidGroup(path)),
        }
    }
}

impl MessageGroup {
    /// Normalizes one group. `Ok(None)` means every message was blank
    /// and the group should be left out of the slide
    pub fn parse(
        value: &Value,
        path: JsonPath,
        slide_index: usize,
        group_index: usize,
    ) -> ParseResult<Option<Self>> {
        let default_id = || MessageGroup::default_id(slide_index, group_index);

        let group = match GroupInput::classify(value, path)? {
            GroupInput::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| MessageGroup::new(default_id(), [MessageLine::new(text)]))
            }
            GroupInput::Lines(lines) => {
                let messages = parse_messages(lines, path)?;
                (!messages.is_empty()).then(|| MessageGroup::new(default_id(), messages))
            }
            GroupInput::Object { object, lines } => {
                let messages = parse_messages(lines, path)?;
                (!messages.is_empty()).then(|| MessageGroup {
                    id: trimmed_str(object, "id").map(Into::into).unwrap_or_else(default_id),
                    messages,
                    speaker: trimmed_str(object, "speaker").map(Into::into),
                    animation: trimmed_str(object, "animation").map(Animation::from),
                })
            }
        };

        Ok(group)
    }
}

fn parse_messages(lines: &[Value], path: JsonPath) -> ParseResult<SmallVec<[MessageLine; 2]>> {
    let mut messages = SmallVec::new();
    for (message_index, line) in lines.iter().enumerate() {
        match line {
            Value::String(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    messages.push(MessageLine::new(text));
                }
            }
            Value::Object(object) => match trimmed_str(object, "text") {
                Some(text) => messages.push(MessageLine {
                    text: text.to_owned(),
                    speaker: trimmed_str(object, "speaker").map(Into::into),
                }),
                None => return Err(ParseError::InvalidMessage(path.message(message_index))),
            },
            _ => return Err(ParseError::InvalidMessage(path.message(message_index))),
        }
    }
    Ok(messages)
}
