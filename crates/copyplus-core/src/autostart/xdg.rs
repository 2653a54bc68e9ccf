// Copyplus Autostart - XDG
// Desktop entry under $XDG_CONFIG_HOME/autostart

use std::fs;
use std::path::{Path, PathBuf};

use super::{Autostart, AutostartError};

const ENTRY_FILE: &str = "copyplus.desktop";

/// Flag the login entry passes so the program starts silently
pub const AUTOSTART_FLAG: &str = "--autostart";

/// XDG autostart adapter.
///
/// Writes `copyplus.desktop` into the autostart directory; session managers
/// that implement XDG autostart launch it at login.
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    dir: PathBuf,
    executable: PathBuf,
}

impl XdgAutostart {
    /// Adapter for the user's autostart directory and the running executable
    pub fn new() -> Result<Self, AutostartError> {
        let dir = dirs::config_dir()
            .map(|d| d.join("autostart"))
            .ok_or(AutostartError::NoDirectory)?;
        let executable =
            std::env::current_exe().map_err(|e| AutostartError::Executable(e.to_string()))?;
        Ok(Self { dir, executable })
    }

    /// Adapter for an explicit directory and executable
    pub fn with_dir<P: Into<PathBuf>, E: Into<PathBuf>>(dir: P, executable: E) -> Self {
        Self {
            dir: dir.into(),
            executable: executable.into(),
        }
    }

    pub fn entry_path(&self) -> PathBuf {
        self.dir.join(ENTRY_FILE)
    }

    /// Contents of the desktop entry
    pub fn desktop_entry(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=Copyplus\n\
             Comment=Clean up copied text on a repeated Control+C\n\
             Exec={} {}\n\
             Terminal=false\n\
             X-GNOME-Autostart-enabled=true\n",
            quote_exec(&self.executable),
            AUTOSTART_FLAG
        )
    }
}

/// Quote a path for an Exec line
fn quote_exec(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for ch in raw.chars() {
        if matches!(ch, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

impl Autostart for XdgAutostart {
    fn enable(&self) -> Result<(), AutostartError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.entry_path(), self.desktop_entry())?;
        log::debug!("Wrote autostart entry {}", self.entry_path().display());
        Ok(())
    }

    fn disable(&self) -> Result<(), AutostartError> {
        match fs::remove_file(self.entry_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn is_enabled(&self) -> bool {
        self.entry_path().is_file()
    }
}
