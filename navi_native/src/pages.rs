use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

/// One rendered page, ready to be shown behind the speaker panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideImage {
    pub image_data: Vec<u8>,
    /// Starts at 1
    pub page_number: usize,
    pub format: ImageFormat,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a supported image", path.display())]
    UnsupportedFileType { path: PathBuf },
    #[error("no pages found in {}", path.display())]
    Empty { path: PathBuf },
}

/// Turns a document into page images. Either every page loads or none do
pub trait PageRenderer {
    fn render(&self, source: &Path) -> Result<Vec<SlideImage>, LoadError>;
}

/// A directory of pre-rendered pages, ordered by file name.
/// Hidden files and subdirectories are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDirectory;

impl PageRenderer for ImageDirectory {
    #[tracing::instrument(skip(self))]
    fn render(&self, source: &Path) -> Result<Vec<SlideImage>, LoadError> {
        let unreadable = |path: &Path| {
            let path = path.to_path_buf();
            move |source| LoadError::Unreadable { path, source }
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(source).map_err(unreadable(source))? {
            let entry = entry.map_err(unreadable(source))?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(LoadError::Empty {
                path: source.to_path_buf(),
            });
        }

        let pages = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let image_data = std::fs::read(&path).map_err(unreadable(&path))?;
                let format = image::guess_format(&image_data)
                    .map_err(|_| LoadError::UnsupportedFileType { path })?;
                Ok(SlideImage {
                    image_data,
                    page_number: i + 1,
                    format,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(pages = pages.len(), "Loaded page images");
        Ok(pages)
    }
}
