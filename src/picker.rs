use std::path::{Path, PathBuf};

pub trait FolderPicker {
    /// Returns the chosen folder, or `None` when the user cancelled.
    fn pick_folder(&self, start: Option<&Path>) -> Option<PathBuf>;
}

/// Modal native directory chooser.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFolderPicker;

impl FolderPicker for NativeFolderPicker {
    fn pick_folder(&self, start: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title("Choose a directory:");
        if let Some(start) = start {
            dialog = dialog.set_directory(start);
        }
        dialog.pick_folder()
    }
}
