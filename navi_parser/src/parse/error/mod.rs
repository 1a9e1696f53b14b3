use std::fmt::{self, Display};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Location of a value inside the script document, printed the
/// way it would be indexed, like `slides[0].groups[2].messages[1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonPath {
    pub slide: usize,
    pub group: Option<usize>,
    pub message: Option<usize>,
}

impl JsonPath {
    pub const fn slide(slide: usize) -> Self {
        Self {
            slide,
            group: None,
            message: None,
        }
    }

    pub const fn group(self, group: usize) -> Self {
        Self {
            group: Some(group),
            ..self
        }
    }

    pub const fn message(self, message: usize) -> Self {
        Self {
            message: Some(message),
            ..self
        }
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slides[{}]", self.slide)?;
        if let Some(group) = self.group {
            write!(f, ".groups[{group}]")?;
        }
        if let Some(message) = self.message {
            write!(f, ".messages[{message}]")?;
        }
        Ok(())
    }
}

#[derive(Diagnostic, Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Script is not valid JSON")]
    InvalidJson {
        message: String,
        #[label("{message}")]
        span: SourceSpan,
    },
    #[error("Script root must be an array of slides or an object with a `slides` array")]
    InvalidRoot,
    #[error("{0} must be an object")]
    SlideNotObject(JsonPath),
    #[error("{0} must be a string, an array of messages or an object")]
    #[diagnostic(help("Groups look like `\"text\"`, `[\"line\", ...]` or `{{ \"messages\": [...] }}`"))]
    InvalidGroup(JsonPath),
    #[error("{0} needs a non-empty `text` string")]
    InvalidMessage(JsonPath),
    #[error("{path}.transition `{value}` is not supported")]
    #[diagnostic(help("Supported transitions: {supported}"))]
    UnsupportedTransition {
        path: JsonPath,
        value: String,
        supported: String,
    },
    #[error("{0}.transition.type must be a string")]
    TransitionNotString(JsonPath),
    #[error("{0}.transition must be a string or an object with a `type`")]
    InvalidTransition(JsonPath),
}

impl ParseError {
    /// Converts a serde_json error into a diagnostic pointing at
    /// the byte where parsing stopped
    pub fn invalid_json(error: &serde_json::Error, source: &str) -> Self {
        let offset = byte_offset(source, error.line(), error.column());
        let mut message = error.to_string();
        // serde_json appends " at line X column Y", the label already shows where
        if let Some(at) = message.rfind(" at line ") {
            message.truncate(at);
        }
        Self::InvalidJson {
            message,
            span: SourceSpan::from(offset..offset),
        }
    }

    pub fn path(&self) -> Option<JsonPath> {
        match self {
            Self::InvalidJson { .. } | Self::InvalidRoot => None,
            Self::SlideNotObject(path)
            | Self::InvalidGroup(path)
            | Self::InvalidMessage(path)
            | Self::TransitionNotString(path)
            | Self::InvalidTransition(path) => Some(*path),
            Self::UnsupportedTransition { path, .. } => Some(*path),
        }
    }
}

/// `line` and `column` are one based, as reported by serde_json
fn byte_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let line_len = source[line_start..]
        .split('\n')
        .next()
        .map(str::len)
        .unwrap_or_default();
    let mut offset = line_start + column.saturating_sub(1).min(line_len);
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_display_like_indexing() {
        assert_eq!(JsonPath::slide(3).to_string(), "slides[3]");
        assert_eq!(
            JsonPath::slide(0).group(2).message(1).to_string(),
            "slides[0].groups[2].messages[1]"
        );
    }

    #[test]
    fn invalid_json_points_into_source() {
        let source = "[\n  {\"title\": }\n]";
        let error = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let ParseError::InvalidJson { span, message } = ParseError::invalid_json(&error, source)
        else {
            panic!("expected InvalidJson");
        };
        let brace = source.find('}').unwrap();
        assert!((brace - 1..=brace + 1).contains(&span.offset()));
        assert!(!message.contains("line"));
    }

    #[test]
    fn offsets_clamp_to_the_line() {
        assert_eq!(byte_offset("ab\ncd", 2, 99), 5);
        assert_eq!(byte_offset("ab\ncd", 1, 1), 0);
        assert_eq!(byte_offset("", 1, 1), 0);
        assert_eq!(byte_offset("é", 1, 2), 0);
    }

    #[test]
    fn unsupported_transition_mentions_value() {
        let error = ParseError::UnsupportedTransition {
            path: JsonPath::slide(1),
            value: "fade".into(),
            supported: "immediate".into(),
        };
        assert_eq!(error.to_string(), "slides[1].transition `fade` is not supported");
        assert_eq!(error.path(), Some(JsonPath::slide(1)));
    }
}
