use color_eyre::{
    config::Theme,
    eyre::{self, Context, OptionExt},
};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eyre::Result<()> {
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

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("info"))
                .wrap_err("Invalid RUST_LOG filter")?,
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(color))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or_eyre("First argument was not passed")?;
    let total_pages = args
        .next()
        .map(|pages| pages.parse::<usize>())
        .transpose()
        .wrap_err("Page count must be a number")?
        .unwrap_or_default();
    let source = std::fs::read_to_string(&path).wrap_err("Failed to read script")?;

    match navi_parser::parse_script(&source, total_pages) {
        Ok(slides) => {
            dbg!(&slides);
        }
        Err(error) => {
            let report = miette::Report::new(error).with_source_code(source);
            eprintln!("{report:?}");
        }
    }

    Ok(())
}
