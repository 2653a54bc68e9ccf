// Copyplus Pending Trigger
// The single cancellable "process once the burst settles" slot

use tokio_util::sync::CancellationToken;

/// A scheduled, cancellable processing request.
///
/// Owned by the scheduler's slot. Replacing it cancels it; the task body
/// sees the token and exits without side effects. The task itself is
/// detached, so nothing here joins or aborts it.
#[derive(Debug)]
pub struct PendingTrigger {
    generation: u64,
    token: CancellationToken,
}

impl PendingTrigger {
    pub fn new(generation: u64, token: CancellationToken) -> Self {
        Self { generation, token }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal the body to stop. The task is left to observe the token and
    /// return on its own rather than being aborted mid-step.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Slot holding at most one [`PendingTrigger`].
#[derive(Debug, Default)]
pub struct TriggerSlot {
    current: Option<PendingTrigger>,
    next_generation: u64,
}

impl TriggerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is pending and install a fresh trigger.
    ///
    /// Returns the new trigger's generation and token for the task body.
    pub fn replace(&mut self) -> (u64, CancellationToken) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        self.next_generation += 1;
        let token = CancellationToken::new();
        self.current = Some(PendingTrigger::new(self.next_generation, token.clone()));
        (self.next_generation, token)
    }

    /// Whether `generation` is still the installed, live trigger
    pub fn is_current(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .map(|t| t.generation() == generation && !t.is_cancelled())
            .unwrap_or(false)
    }

    /// Clear the slot if `generation` still owns it
    pub fn clear_if_current(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Cancel and drop the pending trigger, if any
    pub fn cancel(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.current.as_ref().map(|t| !t.is_cancelled()).unwrap_or(false)
    }
}
