// Copyplus Input Layer - Key Events
// The key-down notification handed from the event source to the scheduler

use std::time::SystemTime;

use tokio::time::Instant;

use crate::Key;

/// A single key-down notification.
///
/// Produced by the event source for every physical press and every OS
/// auto-repeat, consumed immediately by the burst scheduler. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Virtual key identity
    pub key: Key,
    /// Whether a Control key was held when the event was delivered
    pub modifier_held: bool,
    /// When the kernel recorded the event
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(key: Key, modifier_held: bool, timestamp: Instant) -> Self {
        Self {
            key,
            modifier_held,
            timestamp,
        }
    }

    /// "C" while Control is held: the only press the scheduler counts
    pub fn is_copy_chord(&self) -> bool {
        self.modifier_held && self.key == Key::C
    }
}

/// Map a wall-clock event time onto the monotonic clock.
///
/// Evdev stamps events with CLOCK_REALTIME when they enter the kernel
/// buffer. `wall_now` and `now` must be read together; the event's age
/// relative to them is carried over, so events drained in one batch keep
/// their real spacing. Times in the future map to `now`.
pub fn instant_from_wall_clock(
    event_time: SystemTime,
    wall_now: SystemTime,
    now: Instant,
) -> Instant {
    let age = wall_now.duration_since(event_time).unwrap_or_default();
    now.checked_sub(age).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_copy_chord() {
        let now = Instant::now();
        assert!(KeyEvent::new(Key::C, true, now).is_copy_chord());
        assert!(!KeyEvent::new(Key::C, false, now).is_copy_chord());
        assert!(!KeyEvent::new(Key::V, true, now).is_copy_chord());
    }

    #[test]
    fn test_batched_events_keep_their_spacing() {
        let wall_now = SystemTime::now();
        let now = Instant::now();
        let first = wall_now - Duration::from_millis(80);
        let second = wall_now - Duration::from_millis(30);

        let a = instant_from_wall_clock(first, wall_now, now);
        let b = instant_from_wall_clock(second, wall_now, now);
        assert_eq!(b - a, Duration::from_millis(50));
        assert_eq!(now - b, Duration::from_millis(30));
    }

    #[test]
    fn test_future_event_time_maps_to_now() {
        let wall_now = SystemTime::now();
        let now = Instant::now();
        let ahead = wall_now + Duration::from_secs(2);
        assert_eq!(instant_from_wall_clock(ahead, wall_now, now), now);
    }
}
