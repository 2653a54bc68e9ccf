// Copyplus Burst Scheduler
// Turns repeated Control+C presses into one timed clipboard-processing run

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::input::{KeyEvent, ModifierSource};
use crate::processor::{ProcessOutcome, RetryingProcessor};
use crate::settings::SharedSettings;
use crate::timing::Timing;
use crate::trigger::TriggerSlot;
use crate::Key;

/// What the scheduler did with a key-down notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// The global switch or the shortcut switch is off
    Disabled,
    /// Not "C" with Control held
    Ignored,
    /// Too close to the previous press; treated as auto-repeat
    Debounced,
    /// Counted; a fresh trigger replaced any pending one
    Scheduled { count: u32 },
}

/// Burst bookkeeping. Only touched under the scheduler's mutex, and the
/// mutex is never held across a wait.
#[derive(Debug, Default)]
struct BurstState {
    /// Qualifying presses in the current burst
    count: u32,
    last_press: Option<Instant>,
    last_completion: Option<Instant>,
    slot: TriggerSlot,
}

struct Shared {
    state: Mutex<BurstState>,
    timing: Timing,
    settings: SharedSettings,
    modifiers: Arc<dyn ModifierSource>,
    processor: Arc<RetryingProcessor>,
}

/// Burst trigger scheduler.
///
/// The event source calls [`BurstScheduler::on_key_down`] for every
/// key-down it sees. Qualifying presses are counted into bursts; each one
/// replaces the pending trigger, so only the last press of a burst ends up
/// deciding whether the clipboard gets processed.
///
/// Count survives supersession: a canceled trigger never resets it, so a
/// third press cannot cancel out the first two.
#[derive(Clone)]
pub struct BurstScheduler {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl BurstScheduler {
    /// Create a scheduler whose triggers run on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like `tokio::spawn`.
    pub fn new(
        timing: Timing,
        settings: SharedSettings,
        modifiers: Arc<dyn ModifierSource>,
        processor: Arc<RetryingProcessor>,
    ) -> Self {
        Self::with_handle(timing, settings, modifiers, processor, Handle::current())
    }

    /// Create a scheduler whose triggers run on `runtime`.
    pub fn with_handle(
        timing: Timing,
        settings: SharedSettings,
        modifiers: Arc<dyn ModifierSource>,
        processor: Arc<RetryingProcessor>,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BurstState::default()),
                timing,
                settings,
                modifiers,
                processor,
            }),
            runtime,
        }
    }

    /// Feed one key-down notification (press or auto-repeat).
    pub fn on_key_down(&self, key: Key, modifier_held: bool, now: Instant) -> KeyDecision {
        self.on_key_event(&KeyEvent::new(key, modifier_held, now))
    }

    /// [`on_key_down`](Self::on_key_down) for a prepared event
    pub fn on_key_event(&self, event: &KeyEvent) -> KeyDecision {
        if !self.shared.settings.snapshot().accepts_shortcut() {
            return KeyDecision::Disabled;
        }

        if !event.is_copy_chord() {
            return KeyDecision::Ignored;
        }

        let now = event.timestamp;
        let timing = &self.shared.timing;
        let count = {
            let mut state = self.shared.state.lock();

            if let Some(last) = state.last_press {
                let gap = now.saturating_duration_since(last);
                if gap < timing.repeat_debounce {
                    return KeyDecision::Debounced;
                }
                if gap > timing.burst_timeout {
                    log::debug!("Burst timed out after {:?}; starting a new one", gap);
                    state.count = 0;
                }
            }

            state.last_press = Some(now);
            state.count += 1;
            state.count
        };

        log::debug!("Control+C press {} in current burst", count);
        self.schedule_processing(now);
        KeyDecision::Scheduled { count }
    }

    /// Replace the pending trigger with one that fires relative to `now`.
    ///
    /// The replaced trigger is canceled; the burst count is left alone.
    pub fn schedule_processing(&self, now: Instant) {
        let mut state = self.shared.state.lock();
        let (generation, token) = state.slot.replace();
        // Detached; the token is the only handle the slot keeps
        self.runtime
            .spawn(run_trigger(Arc::clone(&self.shared), generation, token, now));
    }

    /// Presses counted in the current burst
    pub fn count(&self) -> u32 {
        self.shared.state.lock().count
    }

    /// Whether a trigger is waiting or running
    pub fn has_pending(&self) -> bool {
        self.shared.state.lock().slot.is_pending()
    }

    /// When the processor last ran to a non-cancelled outcome
    pub fn last_completion(&self) -> Option<Instant> {
        self.shared.state.lock().last_completion
    }

    /// Cancel the pending trigger, if any
    pub fn shutdown(&self) {
        self.shared.state.lock().slot.cancel();
    }
}

/// Sleep until `deadline`; false if `token` fired first
async fn sleep_or_cancel(token: &CancellationToken, deadline: Instant) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep_until(deadline) => !token.is_cancelled(),
    }
}

/// Body of one pending trigger.
async fn run_trigger(shared: Arc<Shared>, generation: u64, token: CancellationToken, armed_at: Instant) {
    let timing = shared.timing;

    if !sleep_or_cancel(&token, armed_at + timing.settle_delay).await {
        log::trace!("Trigger {} superseded while settling", generation);
        return;
    }

    {
        let mut state = shared.state.lock();
        if token.is_cancelled() || !state.slot.is_current(generation) {
            return;
        }

        if state.count < 2 {
            log::debug!("Single press; not processing");
            state.slot.clear_if_current(generation);
            return;
        }

        if !shared.modifiers.control_held() {
            log::debug!("Control released before trigger; discarding burst");
            state.count = 0;
            state.slot.clear_if_current(generation);
            return;
        }

        if let Some(last) = state.last_completion {
            let since = Instant::now().saturating_duration_since(last);
            if since < timing.throttle {
                log::debug!("Throttled: last run finished {:?} ago", since);
                state.slot.clear_if_current(generation);
                return;
            }
        }
    }

    if !sleep_or_cancel(&token, Instant::now() + timing.clipboard_settle).await {
        log::trace!("Trigger {} superseded while clipboard settled", generation);
        return;
    }
    if token.is_cancelled() {
        return;
    }

    let outcome = shared.processor.process(&token).await;
    if outcome.is_cancelled() {
        log::trace!("Trigger {} superseded while processing", generation);
        return;
    }

    // A press can supersede this trigger after the write already landed;
    // that still counts as a completion.
    let mut state = shared.state.lock();
    state.count = 0;
    state.last_completion = Some(Instant::now());
    if !state.slot.clear_if_current(generation) {
        log::trace!("Trigger {} superseded after the clipboard was handled", generation);
    }

    match outcome {
        ProcessOutcome::Updated { changed } => {
            log::info!("Clipboard processed (changed: {})", changed);
        }
        ProcessOutcome::NoText => log::debug!("Clipboard holds no text"),
        ProcessOutcome::GaveUp { attempts, .. } => {
            log::debug!("Clipboard unavailable after {} attempts", attempts);
        }
        ProcessOutcome::Cancelled => {}
    }
}
