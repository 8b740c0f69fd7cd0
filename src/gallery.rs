use eframe::egui;
use log::{debug, error, info};
use std::path::{Path, PathBuf};

use crate::loader::LoaderEvent;
use crate::opener::Opener;
use crate::session::SessionId;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryState {
    /// No folder selected yet.
    Idle,
    Loading,
    Populated,
}

pub struct ImageEntry {
    pub index: usize,
    pub path: PathBuf,
    pub thumbnail: egui::TextureHandle,
}

/// Thumbnails of the current folder session. Only the UI thread touches it.
pub struct Gallery {
    state: GalleryState,
    session: Option<SessionId>,
    folder: Option<PathBuf>,
    entries: Vec<ImageEntry>,
    selected: Option<usize>,
    skipped: usize,
    load_error: Option<String>,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Gallery {
    pub fn new() -> Self {
        Self {
            state: GalleryState::Idle,
            session: None,
            folder: None,
            entries: Vec::new(),
            selected: None,
            skipped: 0,
            load_error: None,
        }
    }

    pub fn state(&self) -> GalleryState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == GalleryState::Loading
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Drops everything from the previous session and shows the loading
    /// indicator until `session` reports completion.
    pub fn begin_session(&mut self, session: SessionId, folder: PathBuf) {
        debug!("Gallery switching to session {} for {}", session, folder.display());
        self.state = GalleryState::Loading;
        self.session = Some(session);
        self.folder = Some(folder);
        self.entries.clear();
        self.selected = None;
        self.skipped = 0;
        self.load_error = None;
    }

    /// Applies one loader event. Returns `false` when the event belongs to
    /// another session and was discarded.
    pub fn apply_event(&mut self, ctx: &egui::Context, event: LoaderEvent) -> bool {
        if self.session != Some(event.session()) {
            debug!("Discarding event from stale session {}", event.session());
            return false;
        }

        match event {
            LoaderEvent::ImageReady { session, path, thumbnail } => {
                let index = self.entries.len();
                let texture = ctx.load_texture(
                    format!("thumbnail_{}_{}", session, index),
                    thumbnail,
                    egui::TextureOptions::default(),
                );
                self.entries.push(ImageEntry {
                    index,
                    path,
                    thumbnail: texture,
                });
            }
            LoaderEvent::Skipped { .. } => {
                self.skipped += 1;
            }
            LoaderEvent::Done { loaded, skipped, .. } => {
                debug!("Session finished with {} loaded, {} skipped", loaded, skipped);
                self.state = GalleryState::Populated;
            }
            LoaderEvent::Failed { folder, reason, .. } => {
                error!("Could not load {}: {}", folder.display(), reason);
                self.load_error = Some(reason);
                self.state = GalleryState::Populated;
            }
        }

        true
    }

    pub fn path_for(&self, index: usize) -> Option<&Path> {
        self.entries.get(index).map(|entry| entry.path.as_path())
    }

    pub fn select(&mut self, index: usize) {
        if index < self.entries.len() {
            self.selected = Some(index);
        }
    }

    /// Opens the image at `index` with `opener`. Unknown indices are a no-op
    /// and return `Ok(false)`.
    pub fn activate(&self, index: usize, opener: &dyn Opener) -> Result<bool> {
        let Some(path) = self.path_for(index) else {
            debug!("Activation of unknown index {} ignored", index);
            return Ok(false);
        };

        info!("Opening {}", path.display());
        opener.open(path)?;
        Ok(true)
    }
}
