use std::fmt::Write;

use navi_player::{IconFrame, PlaybackView};
use owo_colors::Style;

/// Styles for the speaker panel, all plain when colour is off
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    title: Style,
    speaker: Style,
    text: Style,
    dim: Style,
    error: Style,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        if !color {
            return Self {
                title: Style::new(),
                speaker: Style::new(),
                text: Style::new(),
                dim: Style::new(),
                error: Style::new(),
            };
        }
        Self {
            title: Style::new().bold(),
            speaker: Style::new().cyan().bold(),
            text: Style::new().white(),
            dim: Style::new().dimmed(),
            error: Style::new().red(),
        }
    }
}

fn icon(frame: IconFrame) -> &'static str {
    match frame {
        IconFrame::Resting => "(-_-)",
        IconFrame::Talking => "(-o-)",
    }
}

/// The speaker panel as text, one screenful per view
pub fn render(view: &PlaybackView, palette: &Palette) -> String {
    let mut out = String::new();
    // Writing into a String can't fail
    let _ = write_view(&mut out, view, palette);
    out
}

fn write_view(out: &mut String, view: &PlaybackView, palette: &Palette) -> std::fmt::Result {
    if view.total_pages == 0 {
        writeln!(out, "{}", palette.dim.style("No pages loaded"))?;
    } else {
        write!(
            out,
            "{} ",
            palette
                .dim
                .style(format_args!("[{}/{}]", view.slide_index + 1, view.total_pages))
        )?;
        writeln!(
            out,
            "{}",
            palette.title.style(view.title.as_deref().unwrap_or("Untitled"))
        )?;
    }

    let mut status = format!("{} {}", view.audio_mode, view.auto_play_delay);
    status.push('s');
    if view.is_auto_playing {
        status.insert_str(0, "auto ");
        if view.pending_slide_transition {
            status.push_str(" next slide");
        }
    }
    if let Some(animation) = &view.active_animation {
        let _ = write!(status, " *{animation}*");
    }
    writeln!(out, "{}", palette.dim.style(status))?;

    writeln!(
        out,
        "{} {}",
        icon(view.icon_frame),
        palette.speaker.style(&view.speaker)
    )?;
    if view.is_clearing {
        writeln!(out, "  {}", palette.dim.style("..."))?;
    } else {
        for line in &view.animated_lines {
            writeln!(out, "  {}", palette.text.style(line))?;
        }
    }

    if view.group_count > 0 {
        writeln!(
            out,
            "{}",
            palette.dim.style(format_args!(
                "group {}/{} {}",
                view.group_index + 1,
                view.group_count,
                view.message_group_id
            ))
        )?;
    }
    if let Some(error) = &view.script_error {
        writeln!(out, "{}", palette.error.style(error))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use navi_parser::MessageLine;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_panel() {
        let view = PlaybackView {
            slide_index: 0,
            total_pages: 2,
            title: Some("Intro".into()),
            group_count: 2,
            message_group_id: "slide-0-group-0".into(),
            speaker: "Navi".into(),
            displayed_messages: vec![MessageLine::new("Hi there.")],
            animated_lines: vec!["Hi th".into()],
            is_typing: true,
            is_auto_playing: true,
            auto_play_delay: 2,
            icon_frame: IconFrame::Talking,
            ..Default::default()
        };

        assert_eq!(
            render(&view, &Palette::new(false)),
            "[1/2] Intro\n\
             auto typewriter 2s\n\
             (-o-) Navi\n  Hi th\n\
             group 1/2 slide-0-group-0\n"
        );
    }

    #[test]
    fn empty_deck_with_error() {
        let view = PlaybackView {
            animated_lines: vec![String::new()],
            script_error: Some("broken".into()),
            speaker: "Navi".into(),
            ..Default::default()
        };
        let rendered = render(&view, &Palette::new(false));
        assert!(rendered.starts_with("No pages loaded\n"));
        assert!(rendered.ends_with("broken\n"));
    }
}
