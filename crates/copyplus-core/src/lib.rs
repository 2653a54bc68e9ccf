// Copyplus Core Library
// Gesture detection, burst scheduling, and clipboard text cleanup

pub mod action;
pub mod autostart;
pub mod clipboard;
pub mod input;
pub mod key;
pub mod processor;
pub mod scheduler;
pub mod settings;
pub mod timing;
pub mod transform;
pub mod trigger;

// The observer needs evdev, which only the pure-rust build pulls in
#[cfg(feature = "pure-rust")]
pub mod event;

pub use action::Action;
pub use autostart::{apply_autostart, Autostart, AutostartError, XdgAutostart, AUTOSTART_FLAG};
pub use clipboard::{ClipboardError, ClipboardPort};
pub use input::{
    is_keyboard, is_virtual_device, matches_device_filter, DeviceCapabilities, KeyEvent,
    ModifierSource, ModifierState,
};
pub use key::Key;
pub use processor::{ProcessOutcome, RetryingProcessor};
pub use scheduler::{BurstScheduler, KeyDecision};
pub use settings::{SettingsError, SettingsFile, SharedSettings, ToggleSettings};
pub use timing::Timing;
pub use transform::{transform, TransformOptions};
pub use trigger::{PendingTrigger, TriggerSlot};

#[cfg(feature = "pure-rust")]
pub use clipboard::SystemClipboard;

#[cfg(feature = "pure-rust")]
pub use event::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult, RawKeyEvent};
