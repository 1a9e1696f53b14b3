use serde_json::Value;

use crate::{
    parse::error::{JsonPath, ParseError, ParseResult},
    slide::Transition,
};

impl Transition {
    /// Accepts a missing value, a name or `{ "type": name }`.
    /// Blank names fall back to the default
    pub fn parse(value: Option<&Value>, path: JsonPath) -> ParseResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::String(name)) => Self::parse_name(name, path),
            Some(Value::Object(object)) => match object.get("type") {
                None | Some(Value::Null) => Ok(Self::default()),
                Some(Value::String(name)) => Self::parse_name(name, path),
                Some(_) => Err(ParseError::TransitionNotString(path)),
            },
            Some(_) => Err(ParseError::InvalidTransition(path)),
        }
    }

    fn parse_name(name: &str, path: JsonPath) -> ParseResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Self::default());
        }
        Self::from_name(name).ok_or_else(|| ParseError::UnsupportedTransition {
            path,
            value: name.to_owned(),
            supported: Self::supported_names(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const PATH: JsonPath = JsonPath::slide(0);

    #[rstest]
    #[case::null(json!(null))]
    #[case::name(json!("immediate"))]
    #[case::padded(json!("  immediate "))]
    #[case::blank(json!(""))]
    #[case::object(json!({ "type": "immediate" }))]
    #[case::object_without_type(json!({}))]
    fn accepted(#[case] value: Value) {
        assert_eq!(Transition::parse(Some(&value), PATH), Ok(Transition::Immediate));
    }

    #[test]
    fn missing() {
        assert_eq!(Transition::parse(None, PATH), Ok(Transition::Immediate));
    }

    #[rstest]
    #[case::name(json!("fade"))]
    #[case::object(json!({ "type": "fade" }))]
    fn unsupported(#[case] value: Value) {
        assert_eq!(
            Transition::parse(Some(&value), PATH),
            Err(ParseError::UnsupportedTransition {
                path: PATH,
                value: "fade".into(),
                supported: "immediate".into(),
            })
        );
    }

    #[test]
    fn wrong_types() {
        assert_eq!(
            Transition::parse(Some(&json!({ "type": 1 })), PATH),
            Err(ParseError::TransitionNotString(PATH))
        );
        assert_eq!(
            Transition::parse(Some(&json!(["immediate"])), PATH),
            Err(ParseError::InvalidTransition(PATH))
        );
    }
}
