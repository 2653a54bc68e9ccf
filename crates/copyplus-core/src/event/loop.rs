// Copyplus Keyboard Observer
// Passive evdev reader: sees every key event, never grabs a device

use std::os::unix::io::AsRawFd;
use std::time::SystemTime;

use evdev::{Device, EventType};
use tokio::time::Instant;

use crate::input::{instant_from_wall_clock, is_keyboard, matches_device_filter, DeviceCapabilities};
use crate::{Action, Key};

/// Result type for event loop operations
pub type EventLoopResult<T> = Result<T, EventLoopError>;

/// Errors that can occur in event loop
#[derive(Debug, thiserror::Error)]
pub enum EventLoopError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event device error: {0}")]
    Evdev(String),
}

/// Device information for `--list-devices`
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub path: Option<String>,
}

/// One key transition read from a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key: Key,
    pub action: Action,
    /// Kernel event time, on the monotonic clock
    pub timestamp: Instant,
}

/// Event loop over the selected keyboards.
///
/// Devices are opened read-only and never grabbed, so the focused
/// application still receives Control+C and performs its own copy.
pub struct EventLoop {
    devices: Vec<Device>,
    poll_fds: Vec<libc::pollfd>,
}

impl EventLoop {
    /// Open the devices named in `filter_names` (path or exact name), or
    /// every auto-detected keyboard when the list is empty.
    pub fn new_filtered(filter_names: &[String]) -> EventLoopResult<Self> {
        let devices = Self::find_keyboards_filtered(filter_names)?;
        for device in &devices {
            log::info!("Observing {}", device.name().unwrap_or("Unknown"));
        }
        let poll_fds = Self::create_poll_fds(&devices);
        Ok(Self { devices, poll_fds })
    }

    fn create_poll_fds(devices: &[Device]) -> Vec<libc::pollfd> {
        devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect()
    }

    /// List all keyboards the observer would pick by default
    pub fn list_devices() -> EventLoopResult<Vec<DeviceInfo>> {
        let mut devices_info = Vec::new();

        for (path, device) in evdev::enumerate() {
            let name = device.name().unwrap_or("Unknown").to_string();
            let path = path.to_str().map(|s| s.to_string());
            let keyboard = Self::is_keyboard_device(&device);
            if matches_device_filter(&name, path.as_deref().unwrap_or_default(), &[], keyboard) {
                devices_info.push(DeviceInfo {
                    index: devices_info.len(),
                    name,
                    path,
                });
            }
        }

        if devices_info.is_empty() {
            return Err(EventLoopError::DeviceNotFound(
                "No keyboard devices found".to_string(),
            ));
        }

        Ok(devices_info)
    }

    fn find_keyboards_filtered(filter_names: &[String]) -> EventLoopResult<Vec<Device>> {
        let mut keyboards = Vec::new();

        for (path, device) in evdev::enumerate() {
            let device_name = device.name().unwrap_or("Unknown");
            let device_path = path.to_str().unwrap_or_default();
            let keyboard = Self::is_keyboard_device(&device);

            if matches_device_filter(device_name, device_path, filter_names, keyboard) {
                keyboards.push(device);
            }
        }

        if keyboards.is_empty() {
            let wanted = if filter_names.is_empty() {
                "No keyboard devices found".to_string()
            } else {
                format!("No device matches {}", filter_names.join(", "))
            };
            return Err(EventLoopError::DeviceNotFound(wanted));
        }

        Ok(keyboards)
    }

    fn is_keyboard_device(device: &Device) -> bool {
        let has_ev_key = device.supported_events().contains(EventType::KEY);
        let supported_keys = device
            .supported_keys()
            .map(|keys| keys.iter().map(|k| k.code()).collect())
            .unwrap_or_default();
        is_keyboard(&DeviceCapabilities::new(has_ev_key, supported_keys))
    }

    /// Wait up to `timeout_ms` for key events (0 = non-blocking, -1 = infinite).
    ///
    /// Returns an empty vector on timeout or EINTR so the caller can check
    /// its shutdown flag. Non-key events and unknown key values are dropped.
    pub fn poll_for_events(&mut self, timeout_ms: i32) -> EventLoopResult<Vec<RawKeyEvent>> {
        let mut events = Vec::new();

        // SAFETY: poll_fds is a live, correctly sized array of pollfd
        let poll_result = unsafe {
            libc::poll(
                self.poll_fds.as_mut_ptr(),
                self.poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(events);
            }
            return Err(EventLoopError::Io(err));
        }

        if poll_result == 0 {
            return Ok(events);
        }

        let (wall_now, now) = (SystemTime::now(), Instant::now());

        for (i, device) in self.devices.iter_mut().enumerate() {
            let revents = self.poll_fds[i].revents;
            if revents & (libc::POLLERR | libc::POLLHUP) != 0 {
                return Err(EventLoopError::Evdev(format!(
                    "{} disconnected",
                    device.name().unwrap_or("Unknown")
                )));
            }
            if revents & libc::POLLIN == 0 {
                continue;
            }

            match device.fetch_events() {
                Ok(device_events) => {
                    for event in device_events {
                        if event.event_type() != EventType::KEY {
                            continue;
                        }
                        if let Ok(action) = Action::try_from(event.value()) {
                            events.push(RawKeyEvent {
                                key: Key::from(event.code()),
                                action,
                                timestamp: instant_from_wall_clock(
                                    event.timestamp(),
                                    wall_now,
                                    now,
                                ),
                            });
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(EventLoopError::Io(e)),
            }
        }

        Ok(events)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
