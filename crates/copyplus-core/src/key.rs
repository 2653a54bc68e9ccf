// Copyplus Key Type
// Virtual key identity, numbered after Linux input-event-codes.h

/// Represents a single keyboard key code.
///
/// This is a newtype wrapper around u16 for type safety.
/// The numeric values match Linux input-event-codes.h definitions,
/// which is what the evdev observer delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    pub const LEFT_CTRL: Key = Key(29);
    pub const LEFT_SHIFT: Key = Key(42);
    pub const C: Key = Key(46);
    pub const V: Key = Key(47);
    pub const LEFT_ALT: Key = Key(56);
    pub const RIGHT_CTRL: Key = Key(97);

    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// True for either Control key
    pub fn is_control(self) -> bool {
        self == Key::LEFT_CTRL || self == Key::RIGHT_CTRL
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_control() {
        assert!(Key::LEFT_CTRL.is_control());
        assert!(Key::RIGHT_CTRL.is_control());
        assert!(!Key::LEFT_ALT.is_control());
        assert!(!Key::C.is_control());
    }

    #[test]
    fn test_code_roundtrip() {
        assert_eq!(u16::from(Key::C), 46);
        assert_eq!(Key::from(46), Key::C);
    }
}
