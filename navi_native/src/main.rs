use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    thread,
    time::Duration,
};

use args::DelayParser;
use clap::Parser;
use color_eyre::{
    config::Theme,
    eyre::{self, bail, Context},
};
use commands::Command;
use crossbeam_channel::RecvTimeoutError;
use navi_file_owner::{AppHandle, DefaultOwner, FileOwnerMessage};
use navi_parser::{parse_script, serialize_script};
use navi_player::{AudioMode, AutoPlayDelay, PooledAudio, Presentation, DEFAULT_SPEAKER};
use pages::{ImageDirectory, LoadError, PageRenderer};
use settings::Settings;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod audio;
mod commands;
mod pages;
mod settings;
mod view;

const SCRIPT_PLACEHOLDER: &str = include_str!("placeholder.json");

#[derive(Parser)]
#[clap(version, about = "Plays a slide deck with a typewriter speaker panel")]
struct Args {
    /// JSON script, one entry per slide
    script: Option<PathBuf>,
    /// Directory of pre-rendered page images
    #[clap(short, long, conflicts_with = "page_count")]
    pages: Option<PathBuf>,
    /// Number of pages when there are no page images
    #[clap(short = 'n', long)]
    page_count: Option<usize>,
    /// Seconds between groups while auto-playing
    #[clap(short, long, value_parser = DelayParser)]
    delay: Option<AutoPlayDelay>,
    #[clap(short, long)]
    autoplay: bool,
    /// typewriter, speech or none
    #[clap(long)]
    audio: Option<AudioMode>,
    /// Shown when a group names no speaker
    #[clap(long)]
    speaker: Option<String>,
    /// Print the script in canonical form and exit
    #[clap(short, long, conflicts_with = "check")]
    format: bool,
    /// Report problems in the script and exit
    #[clap(short, long)]
    check: bool,
}

impl Args {
    fn read_script(&self) -> eyre::Result<String> {
        match self.script.as_ref() {
            Some(path) => std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read script {}", path.display())),
            None => Ok(String::new()),
        }
    }

    fn load_pages(&self, source: &str) -> Result<usize, LoadError> {
        if let Some(pages) = self.pages.as_ref() {
            return ImageDirectory.render(pages).map(|pages| pages.len());
        }
        if let Some(page_count) = self.page_count {
            return Ok(page_count);
        }
        // One page per scripted slide
        Ok(parse_script(source, 0)
            .map(|slides| slides.len())
            .unwrap_or_default())
    }

    fn check_or_format(&self, source: &str) -> eyre::Result<()> {
        match parse_script(source, self.page_count.unwrap_or_default()) {
            Ok(slides) if self.format => {
                println!(
                    "{}",
                    serialize_script(&slides).wrap_err("Failed to serialize script")?
                );
            }
            Ok(slides) => {
                let groups: usize = slides.iter().map(|slide| slide.group_count()).sum();
                println!("{} slides, {groups} message groups", slides.len());
            }
            Err(error) => {
                let name = self
                    .script
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                let report = miette::Report::new(error)
                    .with_source_code(miette::NamedSource::new(name, source.to_owned()));
                eprintln!("{report:?}");
                bail!("Script contained errors");
            }
        }
        Ok(())
    }
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();
    let color = supports_color::on(supports_color::Stream::Stderr)
        .map(|c| c.has_basic)
        .unwrap_or_default();
    if !color {
        color_eyre::config::HookBuilder::new()
            .theme(Theme::default())
            .install()?;
    } else {
        color_eyre::install()?;
    }

    let one_shot = args.check || args.format;
    #[cfg(debug_assertions)]
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if one_shot {
                EnvFilter::try_new("info")
            } else {
                EnvFilter::try_new("warn")
            }
        })
        .wrap_err("Invalid RUST_LOG filter")?;
    #[cfg(not(debug_assertions))]
    let filter = EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(color)
                .with_writer(io::stderr),
        )
        .init();

    let mut source = args.read_script()?;
    if one_shot {
        return args.check_or_format(&source);
    }

    let settings_path = settings::settings_path();
    let mut settings = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if let Some(audio_mode) = args.audio {
        settings.set_audio_mode(audio_mode);
    }
    if let Some(delay) = args.delay {
        settings.set_auto_play_delay(delay);
    }

    let pages = args.load_pages(&source);
    if source.trim().is_empty() && pages.as_ref().is_ok_and(|total| *total > 0) {
        tracing::info!("No script given, starting from the example script");
        source = SCRIPT_PLACEHOLDER.to_owned();
    }

    let audio_settings = settings.audio.clone();
    let audio = PooledAudio::new(move |key| audio::TerminalVoice::new(key, &audio_settings));
    let speech = audio::CommandSpeech::new(settings.speech.clone());
    let presentation = Presentation::new(audio, speech)
        .with_audio_mode(settings.audio_mode())
        .with_auto_play_delay(settings.auto_play_delay())
        .with_default_speaker(args.speaker.as_deref().unwrap_or(DEFAULT_SPEAKER));

    let (app_handle, owner_receiver, redraw_receiver) = navi_file_owner::channels();
    app_handle.send(FileOwnerMessage::ScriptEdited(source));
    match pages {
        Ok(total_pages) => app_handle.send(FileOwnerMessage::PagesLoaded(total_pages)),
        Err(error) => {
            tracing::error!(%error, "Failed to load pages");
            app_handle.send(FileOwnerMessage::PagesFailed)
        }
    };
    if args.autoplay {
        app_handle.send(FileOwnerMessage::ToggleAutoPlay);
    }

    let owner = DefaultOwner::new(
        presentation,
        args.script.clone(),
        owner_receiver,
        app_handle.clone(),
    );
    let owner_thread = thread::spawn(move || owner.run());
    let input_handle = app_handle.clone();
    thread::spawn(move || read_commands(input_handle, settings, settings_path));

    let panel_color = supports_color::on(supports_color::Stream::Stdout)
        .map(|c| c.has_basic)
        .unwrap_or_default();
    let palette = view::Palette::new(panel_color);
    eprintln!("{}", commands::HELP);

    let mut last_frame = String::new();
    loop {
        match redraw_receiver.recv_timeout(Duration::from_millis(250)) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) if owner_thread.is_finished() => break,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
        let Some(view) = app_handle.view() else {
            continue;
        };
        // Without a terminal to redraw, only settled panels are printed
        if !panel_color && (view.is_typing || view.is_clearing) {
            continue;
        }
        let frame = view::render(&view, &palette);
        if frame == last_frame {
            continue;
        }

        let mut stdout = io::stdout().lock();
        if panel_color {
            stdout.write_all(b"\x1b[2J\x1b[H")?;
        } else {
            writeln!(stdout)?;
        }
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;
        last_frame = frame;
    }

    owner_thread
        .join()
        .map_err(|_| eyre::eyre!("The presentation thread panicked"))?;
    Ok(())
}

fn read_commands(app_handle: AppHandle, mut settings: Settings, settings_path: Option<PathBuf>) {
    let save = |settings: &Settings| {
        if let Some(path) = settings_path.as_deref() {
            settings.save(path);
        }
    };

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(%error, "Failed to read from stdin");
                break;
            }
        };
        let message = match commands::parse_command(&line) {
            Ok(Command::Next) => FileOwnerMessage::Next,
            Ok(Command::Previous) => FileOwnerMessage::Previous,
            Ok(Command::ToggleAutoPlay) => FileOwnerMessage::ToggleAutoPlay,
            Ok(Command::Jump(index)) => FileOwnerMessage::Index(index),
            Ok(Command::Reload) => FileOwnerMessage::ResetFile,
            Ok(Command::Delay(delay)) => {
                settings.set_auto_play_delay(delay);
                save(&settings);
                FileOwnerMessage::SetDelay(delay.seconds().into())
            }
            Ok(Command::AudioMode(audio_mode)) => {
                settings.set_audio_mode(audio_mode);
                save(&settings);
                FileOwnerMessage::SetAudioMode(audio_mode)
            }
            Ok(Command::Help) => {
                eprintln!("{}", commands::HELP);
                continue;
            }
            Ok(Command::Quit) => break,
            Err(error) => {
                eprintln!("{error}");
                continue;
            }
        };
        if !app_handle.send(message) {
            return;
        }
    }
    app_handle.send(FileOwnerMessage::Shutdown);
}
