// Copyplus Input Layer
// Key events, modifier tracking, and device selection for the observer

mod device;
mod event;
mod modifier;

pub use device::{
    is_keyboard, is_virtual_device, matches_device_filter, DeviceCapabilities,
    VIRTUAL_DEVICE_MARKER,
};
pub use event::{instant_from_wall_clock, KeyEvent};
pub use modifier::{ModifierSource, ModifierState};
