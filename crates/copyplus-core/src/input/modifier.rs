// Copyplus Input Layer - Modifier Tracking
// Which Control keys are physically down, as observed from the event stream

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::{Action, Key};

/// Answers "is Control physically held right now?" at trigger time.
///
/// The scheduler asks this after the burst settles, long after the key
/// event that armed the trigger, so it must reflect live state.
pub trait ModifierSource: Send + Sync {
    fn control_held(&self) -> bool;
}

/// Live modifier state fed by the event source.
///
/// The observer loop calls [`ModifierState::observe`] for every key event
/// it reads; the scheduler reads it through [`ModifierSource`]. Only
/// Control keys are tracked.
#[derive(Debug, Default)]
pub struct ModifierState {
    /// Held Control key codes, sorted for stable comparison
    held: Mutex<SmallVec<[u16; 4]>>,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw key event.
    pub fn observe(&self, key: Key, action: Action) {
        if !key.is_control() {
            return;
        }
        let mut held = self.held.lock();
        let code = key.code();
        match action {
            Action::Press | Action::Repeat => {
                if let Err(pos) = held.binary_search(&code) {
                    held.insert(pos, code);
                }
            }
            Action::Release => {
                held.retain(|c| *c != code);
            }
        }
    }

    /// Forget everything (e.g. after the observed devices were reopened)
    pub fn clear(&self) {
        self.held.lock().clear();
    }
}

impl ModifierSource for ModifierState {
    fn control_held(&self) -> bool {
        !self.held.lock().is_empty()
    }
}
