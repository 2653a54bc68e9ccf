// Copyplus Clipboard Port
// The narrow interface the processor drives, plus the arboard-backed adapter

#[cfg(feature = "pure-rust")]
mod system;

#[cfg(feature = "pure-rust")]
pub use system::SystemClipboard;

/// Transient clipboard failures.
///
/// Every variant is retried by the processor; none reaches the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    AccessDenied,

    #[error("clipboard is busy (held by another process)")]
    Busy,

    #[error("clipboard text format unavailable")]
    FormatUnavailable,

    #[error("clipboard backend error: {0}")]
    Backend(String),
}

/// Read/write access to the system clipboard's text.
///
/// Each call is one synchronous step; implementations must not hold the
/// clipboard between calls.
pub trait ClipboardPort: Send {
    /// Whether the clipboard currently holds text
    fn has_text(&mut self) -> Result<bool, ClipboardError>;

    fn read_text(&mut self) -> Result<String, ClipboardError>;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Write `text` so it stays on the clipboard after this port is gone.
    ///
    /// The one-shot manual trigger exits right after writing. Backends whose
    /// contents are owned by the writing process must keep serving them
    /// until another owner takes over; the rest just write.
    fn write_text_and_hand_off(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.write_text(text)
    }
}

impl<T: ClipboardPort + ?Sized> ClipboardPort for Box<T> {
    fn has_text(&mut self) -> Result<bool, ClipboardError> {
        (**self).has_text()
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        (**self).read_text()
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        (**self).write_text(text)
    }

    fn write_text_and_hand_off(&mut self, text: &str) -> Result<(), ClipboardError> {
        (**self).write_text_and_hand_off(text)
    }
}
