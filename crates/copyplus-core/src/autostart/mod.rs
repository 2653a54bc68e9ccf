// Copyplus Autostart
// Start-at-login registration, kept in line with the persisted flag

mod xdg;

pub use xdg::{XdgAutostart, AUTOSTART_FLAG};

/// Errors from registering or removing the login entry
#[derive(Debug, thiserror::Error)]
pub enum AutostartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine the autostart directory")]
    NoDirectory,

    #[error("Could not determine the current executable: {0}")]
    Executable(String),
}

/// Platform service that launches the program at login.
pub trait Autostart {
    fn enable(&self) -> Result<(), AutostartError>;

    /// Removing an entry that is not there is not an error
    fn disable(&self) -> Result<(), AutostartError>;

    fn is_enabled(&self) -> bool;
}

/// Make the registration match `enabled`.
///
/// Failures are logged and otherwise ignored: a missing login entry must
/// never keep the program from starting.
pub fn apply_autostart(port: &dyn Autostart, enabled: bool) {
    let result = if enabled {
        port.enable()
    } else if port.is_enabled() {
        port.disable()
    } else {
        Ok(())
    };

    match result {
        Ok(()) => log::debug!("Autostart {}", if enabled { "enabled" } else { "disabled" }),
        Err(e) => log::warn!("Could not update autostart: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        enabled: RefCell<bool>,
        calls: RefCell<Vec<&'static str>>,
        fail: bool,
    }

    impl Autostart for Recorder {
        fn enable(&self) -> Result<(), AutostartError> {
            self.calls.borrow_mut().push("enable");
            if self.fail {
                return Err(AutostartError::NoDirectory);
            }
            *self.enabled.borrow_mut() = true;
            Ok(())
        }

        fn disable(&self) -> Result<(), AutostartError> {
            self.calls.borrow_mut().push("disable");
            *self.enabled.borrow_mut() = false;
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            *self.enabled.borrow()
        }
    }

    #[test]
    fn test_apply_enables() {
        let port = Recorder::default();
        apply_autostart(&port, true);
        assert!(port.is_enabled());
    }

    #[test]
    fn test_apply_disable_skips_missing_entry() {
        let port = Recorder::default();
        apply_autostart(&port, false);
        assert!(port.calls.borrow().is_empty());

        *port.enabled.borrow_mut() = true;
        apply_autostart(&port, false);
        assert_eq!(*port.calls.borrow(), vec!["disable"]);
        assert!(!port.is_enabled());
    }

    #[test]
    fn test_apply_swallows_failure() {
        let port = Recorder {
            fail: true,
            ..Recorder::default()
        };
        apply_autostart(&port, true);
        assert!(!port.is_enabled());
    }
}
