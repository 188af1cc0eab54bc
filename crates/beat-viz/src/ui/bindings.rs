//! Keyboard bindings and input handling.
//!
//! Centralizes all keyboard shortcuts and key mapping logic.

use nannou::prelude::*;

/// Seconds skipped by the arrow keys
pub const SEEK_STEP: f64 = 5.0;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    TogglePlayback,
    CycleSpeed,
    Seek(f64),
    Stop,
}

pub fn parse_key(key: Key) -> Option<Action> {
    match key {
        Key::Q => Some(Action::Quit),
        Key::Space => Some(Action::TogglePlayback),
        Key::S => Some(Action::CycleSpeed),
        Key::Left => Some(Action::Seek(-SEEK_STEP)),
        Key::Right => Some(Action::Seek(SEEK_STEP)),
        Key::Escape => Some(Action::Stop),
        _ => None,
    }
}

/// Speed notification text, e.g. `Speed: 1.5x`
pub fn speed_label(speed: f64) -> String {
    format!("Speed: {}x", speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_keys() {
        assert_eq!(parse_key(Key::Space), Some(Action::TogglePlayback));
        assert_eq!(parse_key(Key::S), Some(Action::CycleSpeed));
        assert_eq!(parse_key(Key::Left), Some(Action::Seek(-5.0)));
        assert_eq!(parse_key(Key::Right), Some(Action::Seek(5.0)));
        assert_eq!(parse_key(Key::Escape), Some(Action::Stop));
        assert_eq!(parse_key(Key::Q), Some(Action::Quit));
        assert_eq!(parse_key(Key::D), None);
    }

    #[test]
    fn speed_labels() {
        assert_eq!(speed_label(1.0), "Speed: 1x");
        assert_eq!(speed_label(1.5), "Speed: 1.5x");
        assert_eq!(speed_label(0.5), "Speed: 0.5x");
    }
}
