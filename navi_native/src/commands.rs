use navi_player::{audio::UnknownAudioMode, AudioMode, AutoPlayDelay};
use thiserror::Error;

/// One line typed on stdin
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Previous,
    ToggleAutoPlay,
    /// Zero based, typed one based
    Jump(usize),
    Delay(AutoPlayDelay),
    AudioMode(AudioMode),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `h`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a page number")]
    InvalidPage(String),
    #[error("`{0}` is not a number of seconds")]
    InvalidDelay(String),
    #[error(transparent)]
    AudioMode(#[from] UnknownAudioMode),
}

pub const HELP: &str = "\
enter/n  next      p  previous    a  toggle auto-play
j N      jump to page N           d S  auto-play delay in seconds
m MODE   typewriter|speech|none   r  reload script    q  quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(Command::Next);
    };
    let argument = words.next();

    let command = match name {
        "n" | "next" => Command::Next,
        "p" | "prev" => Command::Previous,
        "a" | "auto" => Command::ToggleAutoPlay,
        "r" | "reload" => Command::Reload,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" => Command::Quit,
        "j" | "jump" => {
            let page = argument.ok_or(CommandError::MissingArgument("j"))?;
            match page.parse::<usize>() {
                Ok(page) if page > 0 => Command::Jump(page - 1),
                _ => return Err(CommandError::InvalidPage(page.to_owned())),
            }
        }
        "d" | "delay" => {
            let seconds = argument.ok_or(CommandError::MissingArgument("d"))?;
            let parsed = seconds
                .parse::<f64>()
                .map_err(|_| CommandError::InvalidDelay(seconds.to_owned()))?;
            Command::Delay(AutoPlayDelay::new(parsed))
        }
        "m" | "mode" => {
            let mode = argument.ok_or(CommandError::MissingArgument("m"))?;
            Command::AudioMode(mode.parse()?)
        }
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", Command::Next)]
    #[case("  n ", Command::Next)]
    #[case("p", Command::Previous)]
    #[case("a", Command::ToggleAutoPlay)]
    #[case("j 3", Command::Jump(2))]
    #[case("d 90", Command::Delay(AutoPlayDelay::MAX))]
    #[case("m speech", Command::AudioMode(AudioMode::Speech))]
    #[case("q", Command::Quit)]
    fn commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_command(line), Ok(expected));
    }

    #[rstest]
    #[case("x", CommandError::Unknown("x".into()))]
    #[case("j", CommandError::MissingArgument("j"))]
    #[case("j 0", CommandError::InvalidPage("0".into()))]
    #[case("d soon", CommandError::InvalidDelay("soon".into()))]
    #[case("m loud", CommandError::AudioMode(UnknownAudioMode("loud".into())))]
    fn errors(#[case] line: &str, #[case] expected: CommandError) {
        assert_eq!(parse_command(line), Err(expected));
    }
}
