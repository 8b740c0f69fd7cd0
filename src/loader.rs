//! Background thumbnail loading.
//!
//! A loader lists one folder (non-recursively), decodes every image it finds
//! into a small RGBA bitmap and posts the results to the UI thread as a
//! stream of [`LoaderEvent`]s terminated by `Done` or `Failed`.

use eframe::egui;
use image::imageops::FilterType;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::session::{SessionId, SessionToken};
use crate::{is_image_file, ImageBrowserError, Result};

/// Sources larger than this multiple of the box get a cheap pre-shrink first.
const PRESHRINK_THRESHOLD: f32 = 8.0;
const PRESHRINK_FACTOR: u32 = 4;

#[derive(Debug)]
pub enum LoaderEvent {
    ImageReady {
        session: SessionId,
        path: PathBuf,
        thumbnail: egui::ColorImage,
    },
    Skipped {
        session: SessionId,
        path: PathBuf,
        reason: String,
    },
    Done {
        session: SessionId,
        loaded: usize,
        skipped: usize,
    },
    Failed {
        session: SessionId,
        folder: PathBuf,
        reason: String,
    },
}

impl LoaderEvent {
    pub fn session(&self) -> SessionId {
        match self {
            LoaderEvent::ImageReady { session, .. }
            | LoaderEvent::Skipped { session, .. }
            | LoaderEvent::Done { session, .. }
            | LoaderEvent::Failed { session, .. } => *session,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub token: SessionToken,
    pub folder: PathBuf,
    pub thumbnail_size: u32,
}

/// What a loader run delivered. `interrupted` is set when the session went
/// stale or the receiving side hung up before the terminal event was sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
    pub interrupted: bool,
}

pub trait ThumbnailDecoder: Send + Sync {
    fn decode(&self, path: &Path, max_size: u32) -> Result<egui::ColorImage>;
}

/// Decodes with the `image` crate, guessing the format from file content.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileDecoder;

impl ThumbnailDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path, max_size: u32) -> Result<egui::ColorImage> {
        let reader = image::io::Reader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| ImageBrowserError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let img = reader.decode().map_err(|source| ImageBrowserError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        make_thumbnail(img, max_size).ok_or_else(|| ImageBrowserError::InvalidThumbnail(path.to_path_buf()))
    }
}

/// Fits `img` inside a `max_size` square, keeping its aspect ratio.
/// Images that already fit are left at their native size.
pub fn make_thumbnail(img: image::DynamicImage, max_size: u32) -> Option<egui::ColorImage> {
    let max_size = max_size.max(1);
    let (width, height) = (img.width(), img.height());

    let thumbnail = if width <= max_size && height <= max_size {
        img
    } else {
        let scale_factor = width.max(height) as f32 / max_size as f32;
        let source = if scale_factor > PRESHRINK_THRESHOLD {
            let step = max_size * PRESHRINK_FACTOR;
            img.resize(step, step, FilterType::Nearest)
        } else {
            img
        };
        source.resize(max_size, max_size, FilterType::Triangle)
    };

    let rgba = thumbnail.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let raw_pixels = rgba.as_raw();

    if size[0] == 0 || size[1] == 0 || raw_pixels.len() != size[0] * size[1] * 4 {
        return None;
    }

    Some(egui::ColorImage::from_rgba_unmultiplied(size, raw_pixels))
}

/// Lists the image files directly inside `folder`, in enumeration order.
pub fn list_image_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(folder).map_err(|source| ImageBrowserError::Io {
        path: folder.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ImageBrowserError::NotADirectory(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ImageBrowserError::ReadDirectory {
                    path: folder.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {}", folder.display(), err);
                continue;
            }
        };

        if entry.file_type().is_file() && is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Runs one load to completion on the calling thread.
///
/// Every event is sent only while `request.token` is still current; `wake`
/// runs after each successful send so the UI can schedule a repaint.
pub fn run_loader(
    request: &LoadRequest,
    decoder: &dyn ThumbnailDecoder,
    sender: &Sender<LoaderEvent>,
    wake: &dyn Fn(),
) -> LoadSummary {
    let session = request.token.id();
    let emit = |event: LoaderEvent| -> bool {
        if !request.token.is_current() {
            debug!("Session {} superseded, stopping loader", session);
            return false;
        }
        if sender.send(event).is_err() {
            debug!("Receiver for session {} closed, stopping loader", session);
            return false;
        }
        wake();
        true
    };

    info!("Loading thumbnails from {} (session {})", request.folder.display(), session);

    let mut summary = LoadSummary::default();

    let files = match list_image_files(&request.folder) {
        Ok(files) => files,
        Err(err) => {
            warn!("Failed to list {}: {}", request.folder.display(), err);
            summary.interrupted = !emit(LoaderEvent::Failed {
                session,
                folder: request.folder.clone(),
                reason: err.to_string(),
            });
            return summary;
        }
    };

    debug!("Found {} image files in {}", files.len(), request.folder.display());

    for path in files {
        if !request.token.is_current() {
            debug!("Session {} superseded, stopping loader", session);
            summary.interrupted = true;
            return summary;
        }

        let (event, decoded) = match decoder.decode(&path, request.thumbnail_size) {
            Ok(thumbnail) => (LoaderEvent::ImageReady { session, path, thumbnail }, true),
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                let reason = err.to_string();
                (LoaderEvent::Skipped { session, path, reason }, false)
            }
        };

        if !emit(event) {
            summary.interrupted = true;
            return summary;
        }

        if decoded {
            summary.loaded += 1;
        } else {
            summary.skipped += 1;
        }
    }

    let done = LoaderEvent::Done {
        session,
        loaded: summary.loaded,
        skipped: summary.skipped,
    };
    if emit(done) {
        info!(
            "Session {} complete: {} loaded, {} skipped",
            session, summary.loaded, summary.skipped
        );
    } else {
        summary.interrupted = true;
    }

    summary
}

/// Starts [`run_loader`] on a dedicated background thread.
pub fn spawn_loader<W>(
    request: LoadRequest,
    decoder: Arc<dyn ThumbnailDecoder>,
    sender: Sender<LoaderEvent>,
    wake: W,
) -> Result<JoinHandle<LoadSummary>>
where
    W: Fn() + Send + 'static,
{
    thread::Builder::new()
        .name(format!("thumbnail-loader-{}", request.token.id()))
        .spawn(move || run_loader(&request, decoder.as_ref(), &sender, &wake))
        .map_err(ImageBrowserError::WorkerSpawn)
}
