// Copyplus Input Layer - Device Selection
// Keyboard detection and --devices filtering for the observer loop

use std::collections::HashSet;

/// Name marker of virtual devices created by remappers and injectors.
///
/// Observing them as well would deliver every key twice.
pub const VIRTUAL_DEVICE_MARKER: &str = "(virtual)";

/// Device capabilities extracted from an evdev device
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// Supported key codes
    pub supported_keys: Vec<u16>,
}

impl DeviceCapabilities {
    pub fn new(has_ev_key: bool, supported_keys: Vec<u16>) -> Self {
        Self {
            has_ev_key,
            supported_keys,
        }
    }

    fn key_set(&self) -> HashSet<u16> {
        self.supported_keys.iter().copied().collect()
    }
}

// Letter row Q..Y
const QWERTY_CODES: &[u16] = &[16, 17, 18, 19, 20, 21];

// C and left Control: without them the gesture cannot come from this device
const GESTURE_CODES: &[u16] = &[46, 29];

/// A device is a keyboard worth observing when it reports EV_KEY, carries
/// the letter row, and can produce the Control+C chord.
pub fn is_keyboard(capabilities: &DeviceCapabilities) -> bool {
    if !capabilities.has_ev_key {
        return false;
    }

    let key_set = capabilities.key_set();
    let qwerty_present = QWERTY_CODES.iter().all(|code| key_set.contains(code));
    let gesture_present = GESTURE_CODES.iter().all(|code| key_set.contains(code));

    qwerty_present && gesture_present
}

/// Check if a device is a virtual device based on its name.
pub fn is_virtual_device(name: &str) -> bool {
    name.contains(VIRTUAL_DEVICE_MARKER)
}

/// Decide whether the observer should open a device.
///
/// With an explicit filter, a device is used when its path or name matches
/// an entry exactly, virtual or not. Without one, only non-virtual
/// keyboards are used.
pub fn matches_device_filter(
    device_name: &str,
    device_path: &str,
    filter_names: &[String],
    is_keyboard: bool,
) -> bool {
    if !filter_names.is_empty() {
        return filter_names
            .iter()
            .any(|wanted| device_path == wanted || device_name == wanted);
    }

    is_keyboard && !is_virtual_device(device_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_caps() -> DeviceCapabilities {
        let mut keys = vec![0, 1, 14, 15, 28, 42, 57, 97];
        keys.extend_from_slice(QWERTY_CODES);
        keys.extend_from_slice(GESTURE_CODES);
        DeviceCapabilities::new(true, keys)
    }

    #[test]
    fn test_full_keyboard() {
        assert!(is_keyboard(&keyboard_caps()));
    }

    #[test]
    fn test_mouse_is_not_keyboard() {
        let caps = DeviceCapabilities::new(true, vec![272, 273, 274]);
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_keypad_without_control() {
        let mut keys = QWERTY_CODES.to_vec();
        keys.push(46);
        assert!(!is_keyboard(&DeviceCapabilities::new(true, keys)));
    }

    #[test]
    fn test_no_ev_key() {
        let mut caps = keyboard_caps();
        caps.has_ev_key = false;
        assert!(!is_keyboard(&caps));
    }

    #[test]
    fn test_virtual_device_name() {
        assert!(is_virtual_device("Remapper (virtual) keyboard"));
        assert!(!is_virtual_device("AT Translated Set 2 keyboard"));
    }

    #[test]
    fn test_filter_by_path_or_name() {
        let filter = vec!["/dev/input/event3".to_string(), "My Board".to_string()];
        assert!(matches_device_filter("Other", "/dev/input/event3", &filter, false));
        assert!(matches_device_filter("My Board", "/dev/input/event9", &filter, true));
        assert!(!matches_device_filter("Other", "/dev/input/event4", &filter, true));
    }

    #[test]
    fn test_autodetect() {
        assert!(matches_device_filter("Board", "/dev/input/event0", &[], true));
        assert!(!matches_device_filter("Mouse", "/dev/input/event1", &[], false));
        assert!(!matches_device_filter(
            "uinput (virtual) keyboard",
            "/dev/input/event2",
            &[],
            true
        ));
    }

    #[test]
    fn test_explicit_filter_includes_virtual() {
        let filter = vec!["uinput (virtual) keyboard".to_string()];
        assert!(matches_device_filter(
            "uinput (virtual) keyboard",
            "/dev/input/event2",
            &filter,
            true
        ));
    }
}
