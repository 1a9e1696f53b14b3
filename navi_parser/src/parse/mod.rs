use std::time::Instant;

use tracing::instrument;

use crate::{
    serialize::serialize_script,
    slide::{blank_scripts, SlideScript},
};

use self::error::ParseError;
pub use self::error::{JsonPath, ParseResult};

pub mod error;
pub mod slideshow;

/// Parses a script into exactly `total_pages` slides.
///
/// With `total_pages == 0` the slides are returned as written.
/// Blank scripts produce blank slides.
#[instrument(skip(source))]
pub fn parse_script(source: &str, total_pages: usize) -> ParseResult<Vec<SlideScript>> {
    if source.trim().is_empty() {
        return Ok(blank_scripts(total_pages));
    }

    let root: serde_json::Value =
        serde_json::from_str(source).map_err(|e| ParseError::invalid_json(&e, source))?;
    let mut slides = slideshow::parse_slides(slideshow::slide_values(&root)?)?;

    if total_pages > 0 {
        slides.truncate(total_pages);
        slides.resize_with(total_pages, SlideScript::default);
    }

    Ok(slides)
}

/// Owns the raw script text alongside the last slides that
/// parsed successfully
#[derive(Debug, Clone, Default)]
pub struct ScriptFile {
    source: String,
    total_pages: usize,
    slides: Vec<SlideScript>,
    error: Option<ParseError>,
}

impl ScriptFile {
    pub fn new(total_pages: usize) -> Self {
        Self {
            total_pages,
            slides: blank_scripts(total_pages),
            ..Default::default()
        }
    }

    pub fn with_source(source: impl Into<String>, total_pages: usize) -> Self {
        let mut file = Self::new(total_pages);
        file.set_source(source);
        file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn slides(&self) -> &[SlideScript] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&SlideScript> {
        self.slides.get(index)
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// The error from the most recent parse, if it failed
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Replaces the script text and reparses it
    pub fn set_source(&mut self, source: impl Into<String>) -> Option<&ParseError> {
        self.source = source.into();
        self.parse()
    }

    /// Reparses against a new page count, like after loading another document
    pub fn set_total_pages(&mut self, total_pages: usize) -> Option<&ParseError> {
        self.total_pages = total_pages;
        self.parse()
    }

    /// Takes slides edited as data and writes them back into the source,
    /// so the text and the slides stay in sync without a reparse
    pub fn replace_slides(&mut self, slides: Vec<SlideScript>) -> serde_json::Result<()> {
        self.source = serialize_script(&slides)?;
        self.slides = slides;
        self.error = None;
        Ok(())
    }

    #[instrument(skip_all, fields(total_pages = self.total_pages))]
    pub fn parse(&mut self) -> Option<&ParseError> {
        let time = Instant::now();
        match parse_script(&self.source, self.total_pages) {
            Ok(slides) => {
                self.slides = slides;
                self.error = None;
                tracing::debug!(slides = self.slides.len(), elapsed = ?time.elapsed(), "Parsed script");
            }
            Err(error) => {
                tracing::warn!(%error, path = ?error.path(), "Script failed to parse");
                // Keep the last good slides unless they no longer line up with the pages
                if self.total_pages > 0 && self.slides.len() != self.total_pages {
                    self.slides = blank_scripts(self.total_pages);
                }
                self.error = Some(error);
            }
        }
        self.error.as_ref()
    }
}
