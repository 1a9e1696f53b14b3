use clap::builder::{StringValueParser, TypedValueParser};
use navi_player::AutoPlayDelay;

/// Seconds as a number, floored and clamped into the auto-play range
#[derive(Clone)]
pub struct DelayParser;

impl TypedValueParser for DelayParser {
    type Value = AutoPlayDelay;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let parsed = StringValueParser::new().parse_ref(cmd, arg, value)?;
        let seconds: f64 = parsed
            .trim()
            .trim_end_matches('s')
            .parse()
            .map_err(|_| clap::Error::new(clap::error::ErrorKind::InvalidValue))?;

        Ok(AutoPlayDelay::new(seconds))
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use rstest::rstest;

    use super::*;

    fn parse(value: &str) -> Result<AutoPlayDelay, clap::Error> {
        DelayParser.parse_ref(&clap::Command::new("slide-navi"), None, OsStr::new(value))
    }

    #[rstest]
    #[case("3", 3)]
    #[case("3.9", 3)]
    #[case("5s", 5)]
    #[case("0", 1)]
    #[case("120", 60)]
    fn delays(#[case] value: &str, #[case] expected: u32) {
        assert_eq!(parse(value).unwrap().seconds(), expected);
    }

    #[test]
    fn rejects_words() {
        assert!(parse("soon").is_err());
    }
}
