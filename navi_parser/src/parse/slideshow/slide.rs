use serde_json::Value;
use tracing::instrument;

use crate::{
    parse::error::{JsonPath, ParseError, ParseResult},
    slide::{MessageGroup, SlideScript, Transition},
};

use super::trimmed_str;

impl SlideScript {
    #[instrument(skip(value))]
    pub fn parse(value: &Value, slide_index: usize) -> ParseResult<Self> {
        let path = JsonPath::slide(slide_index);
        let Value::Object(slide) = value else {
            return Err(ParseError::SlideNotObject(path));
        };

        // Bare `messages` is shorthand for a slide with a single group
        let group_values: &[Value] = match (
            slide.get("groups"),
            slide.get("messageGroups"),
            slide.get("messages"),
        ) {
            (Some(Value::Array(groups)), _, _) => groups,
            (_, Some(Value::Array(groups)), _) => groups,
            (_, _, Some(messages @ Value::Array(_))) => std::slice::from_ref(messages),
            _ => &[],
        };

        let mut message_groups = Vec::with_capacity(group_values.len());
        for (source_index, group) in group_values.iter().enumerate() {
            // Ids are numbered over the groups that survive, paths over the source
            if let Some(group) = MessageGroup::parse(
                group,
                path.group(source_index),
                slide_index,
                message_groups.len(),
            )? {
                message_groups.push(group);
            }
        }

        Ok(Self {
            title: trimmed_str(slide, "title").map(str::to_owned),
            message_groups,
            transition: Transition::parse(slide.get("transition"), path)?,
        })
    }
}
