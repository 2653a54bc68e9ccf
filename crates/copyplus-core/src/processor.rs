// Copyplus Clipboard Processor
// Read, transform, write back, with bounded retries and cooperative cancellation

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::clipboard::{ClipboardError, ClipboardPort};
use crate::settings::SharedSettings;
use crate::timing::Timing;

/// How a processing run ended.
///
/// Only `Updated` touched the clipboard. None of these is an error
/// from the user's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Text was read, transformed and written back
    Updated { changed: bool },
    /// The clipboard held no text; nothing to do
    NoText,
    /// The cancellation signal fired before the run finished
    Cancelled,
    /// Every attempt failed
    GaveUp {
        attempts: u32,
        last_error: ClipboardError,
    },
}

impl ProcessOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcessOutcome::Cancelled)
    }
}

/// How the transformed text is written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// The port stays alive and keeps serving the text
    Write,
    /// The caller exits after this run
    HandOff,
}

/// Drives the text transformer against a clipboard port.
pub struct RetryingProcessor {
    clipboard: Mutex<Box<dyn ClipboardPort>>,
    settings: SharedSettings,
    timing: Timing,
}

impl RetryingProcessor {
    pub fn new<C>(clipboard: C, settings: SharedSettings, timing: Timing) -> Self
    where
        C: ClipboardPort + 'static,
    {
        Self {
            clipboard: Mutex::new(Box::new(clipboard)),
            settings,
            timing,
        }
    }

    /// Process the clipboard once, retrying transient failures.
    ///
    /// `cancel` is checked before every attempt and raced against every
    /// retry wait. The clipboard lock is never held across a wait.
    pub async fn process(&self, cancel: &CancellationToken) -> ProcessOutcome {
        self.run(cancel, Delivery::Write).await
    }

    /// Manual "process now": no cancellation, runs to completion or gives up.
    ///
    /// The written text is handed off, since the caller is a one-shot
    /// command that exits once this returns.
    pub async fn process_now(&self) -> ProcessOutcome {
        self.run(&CancellationToken::new(), Delivery::HandOff).await
    }

    async fn run(&self, cancel: &CancellationToken, delivery: Delivery) -> ProcessOutcome {
        let mut last_error = None;

        for attempt in 1..=self.timing.max_attempts {
            if cancel.is_cancelled() {
                log::trace!("Clipboard processing cancelled before attempt {}", attempt);
                return ProcessOutcome::Cancelled;
            }

            match self.attempt(delivery) {
                Ok(outcome) => {
                    log::debug!("Clipboard processed on attempt {}: {:?}", attempt, outcome);
                    return outcome;
                }
                Err(e) => {
                    log::debug!("Clipboard attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                }
            }

            if attempt == self.timing.max_attempts {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::trace!("Clipboard retry wait cancelled");
                    return ProcessOutcome::Cancelled;
                }
                _ = tokio::time::sleep(self.timing.retry_delay) => {}
            }
        }

        let attempts = self.timing.max_attempts;
        let last_error = last_error
            .unwrap_or_else(|| ClipboardError::Backend("no attempt was made".to_string()));
        log::warn!(
            "Giving up on clipboard after {} attempts: {}",
            attempts,
            last_error
        );
        ProcessOutcome::GaveUp {
            attempts,
            last_error,
        }
    }

    /// One synchronous acquire-use-release step
    fn attempt(&self, delivery: Delivery) -> Result<ProcessOutcome, ClipboardError> {
        let mut clipboard = self.clipboard.lock();

        if !clipboard.has_text()? {
            return Ok(ProcessOutcome::NoText);
        }

        let input = clipboard.read_text()?;
        let output = self.settings.snapshot().transform_options().apply(&input);
        let changed = output != input;
        match delivery {
            Delivery::Write => clipboard.write_text(&output)?,
            Delivery::HandOff => clipboard.write_text_and_hand_off(&output)?,
        }

        Ok(ProcessOutcome::Updated { changed })
    }
}
