use eframe::egui;
use log::{debug, error};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::gallery::{Gallery, GalleryState};
use crate::loader::{spawn_loader, ImageFileDecoder, LoadRequest, LoaderEvent, ThumbnailDecoder};
use crate::opener::{Opener, SystemOpener};
use crate::picker::{FolderPicker, NativeFolderPicker};
use crate::session::{SessionId, SessionTracker};
use crate::{Args, Result};

const CELL_PADDING: f32 = 8.0;
const LOADING_TOP_MARGIN: f32 = 40.0;

pub struct ImageBrowserApp {
    pub args: Args,
    pub gallery: Gallery,
    sessions: SessionTracker,
    event_sender: Sender<LoaderEvent>,
    event_receiver: Receiver<LoaderEvent>,
    decoder: Arc<dyn ThumbnailDecoder>,
    picker: Box<dyn FolderPicker>,
    opener: Box<dyn Opener>,
}

impl ImageBrowserApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: Args) -> Result<Self> {
        let mut app = Self::with_parts(
            args,
            Box::new(NativeFolderPicker),
            Box::new(SystemOpener::for_host()),
            Arc::new(ImageFileDecoder),
        );

        if let Some(directory) = app.args.directory.clone() {
            app.load_folder(&cc.egui_ctx, &directory)?;
        }

        Ok(app)
    }

    /// Builds the app around explicit collaborators, without touching the
    /// windowing system.
    pub fn with_parts(
        args: Args,
        picker: Box<dyn FolderPicker>,
        opener: Box<dyn Opener>,
        decoder: Arc<dyn ThumbnailDecoder>,
    ) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();

        Self {
            args,
            gallery: Gallery::new(),
            sessions: SessionTracker::new(),
            event_sender,
            event_receiver,
            decoder,
            picker,
            opener,
        }
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.sessions.current()
    }

    /// Asks the picker for a folder and loads it. Cancelling leaves the
    /// gallery untouched and returns `Ok(None)`.
    pub fn select_folder(&mut self, ctx: &egui::Context) -> Result<Option<SessionId>> {
        match self.picker.pick_folder(self.gallery.folder()) {
            Some(folder) => self.load_folder(ctx, &folder).map(Some),
            None => {
                debug!("Folder selection cancelled");
                Ok(None)
            }
        }
    }

    /// Starts a new session for `folder`, superseding any load in flight.
    pub fn load_folder(&mut self, ctx: &egui::Context, folder: &Path) -> Result<SessionId> {
        let folder = absolute_folder(folder);
        let token = self.sessions.begin();
        let session = token.id();

        self.gallery.begin_session(session, folder.clone());

        let request = LoadRequest {
            token,
            folder: folder.clone(),
            thumbnail_size: self.args.thumbnail_size,
        };
        let repaint_ctx = ctx.clone();
        let spawned = spawn_loader(
            request,
            Arc::clone(&self.decoder),
            self.event_sender.clone(),
            move || repaint_ctx.request_repaint(),
        );

        if let Err(e) = spawned {
            self.gallery.apply_event(
                ctx,
                LoaderEvent::Failed {
                    session,
                    folder,
                    reason: e.to_string(),
                },
            );
            return Err(e);
        }

        Ok(session)
    }

    /// Drains everything the loaders have posted so far. Returns how many
    /// events were applied to the current session.
    pub fn process_loader_events(&mut self, ctx: &egui::Context) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_receiver.try_recv() {
            if self.gallery.apply_event(ctx, event) {
                applied += 1;
            }
        }
        applied
    }

    pub fn activate(&mut self, index: usize) {
        self.gallery.select(index);
        if let Err(e) = self.gallery.activate(index, self.opener.as_ref()) {
            error!("Failed to open image: {}", e);
        }
    }

    /// Arrow keys move the selection and Enter opens it. Enter belongs to the
    /// focused widget, if any, so it only activates when nothing has focus.
    pub fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if self.gallery.state() != GalleryState::Populated || self.gallery.is_empty() {
            return;
        }

        let (enter, next, previous) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Enter),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowLeft),
            )
        });

        let last = self.gallery.len() - 1;
        if next {
            let index = self.gallery.selected().map_or(0, |i| (i + 1).min(last));
            self.gallery.select(index);
        }
        if previous {
            let index = self.gallery.selected().map_or(0, |i| i.saturating_sub(1));
            self.gallery.select(index);
        }
        if enter && ctx.memory(|m| m.focused().is_none()) {
            if let Some(index) = self.gallery.selected() {
                self.activate(index);
            }
        }
    }

    fn status_text(&self) -> String {
        match self.gallery.state() {
            GalleryState::Idle => "No folder selected".to_owned(),
            GalleryState::Loading => format!("Loading... ({} images so far)", self.gallery.len()),
            GalleryState::Populated => {
                if let Some(err) = self.gallery.load_error() {
                    return err.to_owned();
                }
                let mut text = format!("{} images", self.gallery.len());
                if self.gallery.skipped() > 0 {
                    text.push_str(&format!(", {} skipped", self.gallery.skipped()));
                }
                text
            }
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Select Folder").clicked() {
                if let Err(e) = self.select_folder(ctx) {
                    error!("Failed to start loading: {}", e);
                }
            }

            if let Some(folder) = self.gallery.folder() {
                ui.label(folder.display().to_string());
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(self.status_text());
            });
        });
    }

    fn show_grid(&mut self, ui: &mut egui::Ui) {
        let cell = egui::Vec2::splat(self.args.thumbnail_size as f32 + CELL_PADDING);
        let mut clicked = None;
        let mut activated = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for entry in self.gallery.entries() {
                        let selected = self.gallery.selected() == Some(entry.index);
                        let response = ui.add_sized(
                            cell,
                            egui::ImageButton::new(&entry.thumbnail).selected(selected),
                        );

                        if response.double_clicked() {
                            activated = Some(entry.index);
                        } else if response.clicked() {
                            clicked = Some(entry.index);
                        }

                        let name = entry.path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        response.on_hover_text(name);
                    }
                });
            });

        if let Some(index) = clicked {
            self.gallery.select(index);
        }
        if let Some(index) = activated {
            self.activate(index);
        }
    }
}

impl eframe::App for ImageBrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_loader_events(ctx);
        self.handle_keyboard(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.show_toolbar(ctx, ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.gallery.state() {
            GalleryState::Idle => {}
            GalleryState::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(LOADING_TOP_MARGIN);
                    ui.spinner();
                    ui.label("Loading...");
                });
            }
            GalleryState::Populated => self.show_grid(ui),
        });
    }
}

fn absolute_folder(folder: &Path) -> PathBuf {
    if folder.is_absolute() {
        return folder.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(folder))
        .unwrap_or_else(|_| folder.to_path_buf())
}
