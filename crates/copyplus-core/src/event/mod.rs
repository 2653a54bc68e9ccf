// Copyplus Event Handling
// Keyboard observer built on evdev

pub mod r#loop;

pub use r#loop::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult, RawKeyEvent};
