use clap::Parser;
use std::path::{Path, PathBuf};

pub mod app;
pub mod gallery;
pub mod loader;
pub mod opener;
pub mod picker;
pub mod session;

pub use app::ImageBrowserApp;
pub use gallery::{Gallery, GalleryState, ImageEntry};
pub use loader::{
    list_image_files, make_thumbnail, run_loader, spawn_loader, ImageFileDecoder, LoadRequest,
    LoadSummary, LoaderEvent, ThumbnailDecoder,
};
pub use opener::{Opener, SystemOpener};
pub use picker::{FolderPicker, NativeFolderPicker};
pub use session::{SessionId, SessionToken, SessionTracker};

#[derive(Debug, thiserror::Error)]
pub enum ImageBrowserError {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid thumbnail produced for {0}")]
    InvalidThumbnail(PathBuf),

    #[error("Failed to spawn thumbnail loader: {0}")]
    WorkerSpawn(std::io::Error),

    #[error("Command execution failed: {0}")]
    CommandExecution(String),
}

pub type Result<T> = std::result::Result<T, ImageBrowserError>;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 100;
pub const MIN_THUMBNAIL_SIZE: u32 = 16;
pub const MAX_THUMBNAIL_SIZE: u32 = 512;

#[derive(Parser, Clone, Debug)]
#[command(name = "image-browser")]
#[command(about = "Browse a folder of images as thumbnails and open them in the default viewer")]
pub struct Args {
    #[arg(short, long, help = "Folder to load on startup")]
    pub directory: Option<PathBuf>,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_THUMBNAIL_SIZE,
        value_parser = clap::value_parser!(u32).range(MIN_THUMBNAIL_SIZE as i64..=MAX_THUMBNAIL_SIZE as i64)
    )]
    pub thumbnail_size: u32,

    #[arg(long, help = "Enable debug output")]
    pub debug: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            directory: None,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            debug: false,
        }
    }
}

/// Extension check against [`IMAGE_EXTENSIONS`], ignoring ASCII case.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext_str| IMAGE_EXTENSIONS.iter().any(|&valid_ext| valid_ext.eq_ignore_ascii_case(ext_str)))
        .unwrap_or(false)
}
