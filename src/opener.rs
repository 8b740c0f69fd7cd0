use log::debug;
use std::io;
use std::path::Path;

use crate::{ImageBrowserError, Result};

/// Opens a file in the application the host associates with it.
pub trait Opener {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Hands a path to the host's default-application launcher.
pub type Launcher = fn(&Path) -> io::Result<()>;

/// Default handler of the host platform: ShellExecute on Windows, `open` on
/// macOS, the desktop's opener on other Unixes. The launch is detached, so
/// nothing waits on the viewer.
#[derive(Debug, Clone, Copy)]
pub struct SystemOpener {
    launcher: Launcher,
}

impl SystemOpener {
    pub fn for_host() -> Self {
        Self::with_launcher(launch_detached)
    }

    pub fn with_launcher(launcher: Launcher) -> Self {
        Self { launcher }
    }
}

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<()> {
        (self.launcher)(path)
            .map_err(|e| ImageBrowserError::CommandExecution(format!("{}: {}", path.display(), e)))?;
        debug!("Handed {} to the default viewer", path.display());
        Ok(())
    }
}

fn launch_detached(path: &Path) -> io::Result<()> {
    open::that_detached(path)
}
