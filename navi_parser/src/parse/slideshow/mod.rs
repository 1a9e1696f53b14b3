use serde_json::Value;
use tracing::instrument;

use crate::slide::SlideScript;

use super::error::{ParseError, ParseResult};

pub mod group;
pub mod slide;
pub mod transition;

/// Picks the slide list out of the document root.
///
/// The root is either the list itself or an object holding it under `slides`.
pub fn slide_values(root: &Value) -> ParseResult<&[Value]> {
    match root {
        Value::Array(slides) => Ok(slides),
        Value::Object(object) => match object.get("slides") {
            Some(Value::Array(slides)) => Ok(slides),
            _ => Err(ParseError::InvalidRoot),
        },
        _ => Err(ParseError::InvalidRoot),
    }
}

#[instrument(skip_all, fields(slides = slides.len()))]
pub fn parse_slides(slides: &[Value]) -> ParseResult<Vec<SlideScript>> {
    slides
        .iter()
        .enumerate()
        .map(|(slide_index, slide)| SlideScript::parse(slide, slide_index))
        .collect()
}

/// Reads an optional string field, trimmed. Blank strings count as missing
pub(crate) fn trimmed_str<'a>(object: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
