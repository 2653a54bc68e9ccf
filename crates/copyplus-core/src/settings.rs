// Copyplus Settings Module
// User toggles: the live snapshot the core reads, and the persisted file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::timing::{Timing, TimingToml};
use crate::transform::TransformOptions;

/// The toggles consulted at decision points.
///
/// The core never mutates these; the shell owns them inside
/// [`SharedSettings`] and keeps them current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleSettings {
    pub merge_newlines: bool,
    pub remove_spaces: bool,
    pub shortcut_enabled: bool,
    pub global_enabled: bool,
}

impl Default for ToggleSettings {
    fn default() -> Self {
        Self {
            merge_newlines: SettingsFile::DEFAULT_MERGE_NEWLINES,
            remove_spaces: SettingsFile::DEFAULT_REMOVE_SPACES,
            shortcut_enabled: SettingsFile::DEFAULT_SHORTCUT_ENABLED,
            global_enabled: true,
        }
    }
}

impl ToggleSettings {
    /// Both switches that gate the gesture
    pub fn accepts_shortcut(&self) -> bool {
        self.global_enabled && self.shortcut_enabled
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions::new(self.merge_newlines, self.remove_spaces)
    }
}

/// Shared, shell-owned toggles; readers take copies.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<ToggleSettings>>,
}

impl SharedSettings {
    pub fn new(settings: ToggleSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current toggles
    pub fn snapshot(&self) -> ToggleSettings {
        *self.inner.read()
    }

    /// Replace everything except the runtime-only global switch
    pub fn replace_persisted(&self, from: ToggleSettings) {
        let mut guard = self.inner.write();
        guard.merge_newlines = from.merge_newlines;
        guard.remove_spaces = from.remove_spaces;
        guard.shortcut_enabled = from.shortcut_enabled;
    }

    pub fn update<F: FnOnce(&mut ToggleSettings)>(&self, f: F) {
        f(&mut self.inner.write());
    }

    pub fn set_global_enabled(&self, enabled: bool) {
        self.inner.write().global_enabled = enabled;
    }
}

/// Errors that can occur when loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML write error: {0}")]
    TomlWrite(String),

    #[error("No settings path available")]
    NoPath,
}

/// On-disk representation
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
struct SettingsToml {
    #[serde(default)]
    switches: Vec<toml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    timing: Option<TimingToml>,
}

/// Persisted settings.
///
/// Toggles are stored positionally as string-encoded booleans under
/// `switches`, e.g. `switches = ["true", "false", "true", "", "", "false"]`.
/// Entries that are missing, empty or unparsable read as the documented
/// default for their index.
#[derive(Debug, Clone, Default)]
pub struct SettingsFile {
    switches: Vec<String>,
    timing: Option<TimingToml>,
    source_path: Option<PathBuf>,
}

impl SettingsFile {
    pub const MERGE_NEWLINES: usize = 0;
    pub const REMOVE_SPACES: usize = 1;
    pub const SHORTCUT_ENABLED: usize = 2;
    pub const AUTOSTART: usize = 5;

    pub const DEFAULT_MERGE_NEWLINES: bool = true;
    pub const DEFAULT_REMOVE_SPACES: bool = false;
    pub const DEFAULT_SHORTCUT_ENABLED: bool = true;
    pub const DEFAULT_AUTOSTART: bool = false;

    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let doc: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let switches = doc.switches.iter().map(switch_text).collect();

        Ok(Self {
            switches,
            timing: doc.timing,
            source_path: None,
        })
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load from `path`, falling back to defaults.
    ///
    /// A missing file is the normal first-run case. An unreadable or
    /// malformed file is logged and otherwise treated the same way. The
    /// path is remembered either way so a later save creates it.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let mut settings = if path.exists() {
            match Self::from_file(path) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Ignoring settings file {}: {}", path.display(), e);
                    Self::new()
                }
            }
        } else {
            Self::new()
        };
        settings.source_path = Some(path.to_path_buf());
        settings
    }

    /// Get the default settings path (~/.config/copyplus/settings.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("copyplus").join("settings.toml"))
    }

    /// Load from the default location
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(path),
            None => {
                log::warn!("No config directory; using default settings");
                Self::new()
            }
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Read the boolean at `index`, or `default` when absent or unparsable
    pub fn read_bool(&self, index: usize, default: bool) -> bool {
        self.switches
            .get(index)
            .and_then(|s| parse_switch(s))
            .unwrap_or(default)
    }

    /// Store `value` at `index`, padding shorter lists with empty entries
    pub fn write_bool(&mut self, index: usize, value: bool) {
        if self.switches.len() <= index {
            self.switches.resize(index + 1, String::new());
        }
        self.switches[index] = value.to_string();
    }

    pub fn merge_newlines(&self) -> bool {
        self.read_bool(Self::MERGE_NEWLINES, Self::DEFAULT_MERGE_NEWLINES)
    }

    pub fn remove_spaces(&self) -> bool {
        self.read_bool(Self::REMOVE_SPACES, Self::DEFAULT_REMOVE_SPACES)
    }

    pub fn shortcut_enabled(&self) -> bool {
        self.read_bool(Self::SHORTCUT_ENABLED, Self::DEFAULT_SHORTCUT_ENABLED)
    }

    pub fn autostart(&self) -> bool {
        self.read_bool(Self::AUTOSTART, Self::DEFAULT_AUTOSTART)
    }

    pub fn set_autostart(&mut self, enabled: bool) {
        self.write_bool(Self::AUTOSTART, enabled);
    }

    /// Toggles as the core sees them; the global switch is runtime-only
    pub fn toggles(&self, global_enabled: bool) -> ToggleSettings {
        ToggleSettings {
            merge_newlines: self.merge_newlines(),
            remove_spaces: self.remove_spaces(),
            shortcut_enabled: self.shortcut_enabled(),
            global_enabled,
        }
    }

    /// Timing with any `[timing]` overrides applied
    pub fn timing(&self) -> Timing {
        self.timing.clone().unwrap_or_default().resolve()
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        let doc = SettingsToml {
            switches: self
                .switches
                .iter()
                .map(|s| toml::Value::String(s.clone()))
                .collect(),
            timing: self.timing.clone(),
        };
        toml::to_string_pretty(&doc).map_err(|e| SettingsError::TomlWrite(e.to_string()))
    }

    /// Write back to the path this was loaded from
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = self.source_path.as_ref().ok_or(SettingsError::NoPath)?;
        self.save_to(path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

/// Text of one `switches` entry; non-string scalars keep their literal form
fn switch_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Boolean(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Case-insensitive "true"/"false", surrounding whitespace ignored
fn parse_switch(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("copyplus-settings-{}-{}", std::process::id(), name))
            .join("settings.toml")
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = SettingsFile::new();
        assert!(settings.merge_newlines());
        assert!(!settings.remove_spaces());
        assert!(settings.shortcut_enabled());
        assert!(!settings.autostart());
        assert_eq!(settings.toggles(true), ToggleSettings::default());
    }

    #[test]
    fn test_positional_switches() {
        let settings =
            SettingsFile::from_toml(r#"switches = ["False", "TRUE", " false ", "", "", "True"]"#)
                .unwrap();
        assert!(!settings.merge_newlines());
        assert!(settings.remove_spaces());
        assert!(!settings.shortcut_enabled());
        assert!(settings.autostart());
    }

    #[test]
    fn test_short_and_garbage_switches_default() {
        let settings = SettingsFile::from_toml(r#"switches = ["maybe"]"#).unwrap();
        assert!(settings.merge_newlines());
        assert!(!settings.remove_spaces());
        assert!(settings.shortcut_enabled());
        assert!(!settings.autostart());
    }

    #[test]
    fn test_boolean_literals_accepted() {
        let settings = SettingsFile::from_toml("switches = [false, true, 3]").unwrap();
        assert!(!settings.merge_newlines());
        assert!(settings.remove_spaces());
        assert!(settings.shortcut_enabled());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(matches!(
            SettingsFile::from_toml("switches = [").unwrap_err(),
            SettingsError::TomlParse(_)
        ));
    }

    #[test]
    fn test_write_pads_to_index() {
        let mut settings = SettingsFile::new();
        settings.set_autostart(true);
        assert_eq!(settings.switches, vec!["", "", "", "", "", "true"]);
        assert!(settings.autostart());
        assert!(settings.merge_newlines());
    }

    #[test]
    fn test_timing_section() {
        let settings = SettingsFile::from_toml(
            r#"
switches = ["true"]

[timing]
throttle_ms = 400
max_attempts = 3
"#,
        )
        .unwrap();
        let timing = settings.timing();
        assert_eq!(timing.throttle, Duration::from_millis(400));
        assert_eq!(timing.max_attempts, 3);
        assert_eq!(timing.settle_delay, Duration::from_millis(220));
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("roundtrip");
        let mut settings = SettingsFile::load_or_default(&path);
        settings.write_bool(SettingsFile::REMOVE_SPACES, true);
        settings.save().unwrap();

        let reloaded = SettingsFile::from_file(&path).unwrap();
        assert!(reloaded.remove_spaces());
        assert!(reloaded.merge_newlines());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_malformed_file_falls_back() {
        let path = temp_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "switches = {").unwrap();

        let settings = SettingsFile::load_or_default(&path);
        assert!(settings.merge_newlines());
        assert_eq!(settings.source_path(), Some(path.as_path()));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_without_path() {
        assert!(matches!(SettingsFile::new().save(), Err(SettingsError::NoPath)));
    }

    #[test]
    fn test_shared_settings() {
        let shared = SharedSettings::default();
        assert!(shared.snapshot().accepts_shortcut());

        shared.set_global_enabled(false);
        assert!(!shared.snapshot().accepts_shortcut());

        shared.replace_persisted(ToggleSettings {
            remove_spaces: true,
            ..ToggleSettings::default()
        });
        let snap = shared.snapshot();
        assert!(snap.remove_spaces);
        assert!(!snap.global_enabled);

        shared.update(|s| s.global_enabled = true);
        assert!(shared.snapshot().global_enabled);
    }
}
