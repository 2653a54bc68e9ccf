// Copyplus Key Action
// Transition carried by an evdev EV_KEY event

/// Key transition.
///
/// Discriminants are the evdev event values, so `value as i32` and
/// `Action::try_from(value)` round-trip with the kernel's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    /// Kernel auto-repeat while the key stays down
    Repeat = 2,
}

impl Action {
    /// Key-down notification: a fresh press or an auto-repeat.
    ///
    /// Both are forwarded to the burst scheduler, which filters repeat
    /// noise by timing rather than by event kind.
    pub fn is_key_down(self) -> bool {
        !self.is_released()
    }

    pub fn is_released(self) -> bool {
        self == Action::Release
    }
}

/// Event value outside 0..=2
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown key event value {0}")]
pub struct UnknownAction(pub i32);

impl TryFrom<i32> for Action {
    type Error = UnknownAction;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Action::Release,
            1 => Action::Press,
            2 => Action::Repeat,
            other => return Err(UnknownAction(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down() {
        assert!(Action::Press.is_key_down());
        assert!(Action::Repeat.is_key_down());
        assert!(!Action::Release.is_key_down());
    }

    #[test]
    fn test_evdev_values() {
        assert_eq!(Action::try_from(0), Ok(Action::Release));
        assert_eq!(Action::try_from(2), Ok(Action::Repeat));
        assert_eq!(Action::try_from(7), Err(UnknownAction(7)));
        assert_eq!(Action::Press as i32, 1);
    }
}
