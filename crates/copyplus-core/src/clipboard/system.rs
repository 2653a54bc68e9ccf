// Copyplus System Clipboard
// arboard-backed clipboard port

use super::{ClipboardError, ClipboardPort};

/// Cross-platform clipboard.
///
/// The arboard context is created on first use and kept for the life of
/// the port: on X11 and Wayland the text we write is served by that
/// context, so dropping it after every write would empty the clipboard.
/// A backend failure drops the context so the next attempt reconnects.
#[derive(Default)]
pub struct SystemClipboard {
    ctx: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { ctx: None }
    }

    fn ctx(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.ctx.is_none() {
            let ctx = arboard::Clipboard::new().map_err(map_error)?;
            self.ctx = Some(ctx);
        }
        self.ctx
            .as_mut()
            .ok_or_else(|| ClipboardError::Backend("clipboard context unavailable".to_string()))
    }

    fn check<T>(&mut self, result: Result<T, arboard::Error>) -> Result<T, ClipboardError> {
        result.map_err(|e| {
            let err = map_error(e);
            if matches!(err, ClipboardError::Backend(_)) {
                self.ctx = None;
            }
            err
        })
    }
}

impl ClipboardPort for SystemClipboard {
    fn has_text(&mut self) -> Result<bool, ClipboardError> {
        let result = self.ctx()?.get_text();
        match result {
            Ok(text) => Ok(!text.is_empty()),
            Err(arboard::Error::ContentNotAvailable) => Ok(false),
            Err(e) => self.check(Err(e)),
        }
    }

    fn read_text(&mut self) -> Result<String, ClipboardError> {
        let result = self.ctx()?.get_text();
        self.check(result)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self.ctx()?.set_text(text);
        self.check(result)
    }

    /// X11 and Wayland have no clipboard storage of their own: the selection
    /// lives in this process. Block until a clipboard manager or another
    /// application takes ownership, so exiting afterwards loses nothing.
    #[cfg(target_os = "linux")]
    fn write_text_and_hand_off(&mut self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;

        log::info!("Serving the clipboard until another application takes it over");
        let result = self.ctx()?.set().wait().text(text);
        self.check(result)
    }
}

fn map_error(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ClipboardOccupied => ClipboardError::Busy,
        arboard::Error::ContentNotAvailable | arboard::Error::ConversionFailure => {
            ClipboardError::FormatUnavailable
        }
        arboard::Error::ClipboardNotSupported => ClipboardError::AccessDenied,
        other => ClipboardError::Backend(other.to_string()),
    }
}
