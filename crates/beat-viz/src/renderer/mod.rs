//! nannou side of rendering: replays display lists and draws overlays.

mod surface;

pub use surface::NannouSurface;

use nannou::prelude::*;

const NOTIFICATION_FRAMES: u32 = 180; // ~3 seconds at 60fps

/// Window settings
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Resolution {
    pub fn windowed() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }

    pub fn fullscreen() -> Self {
        Self {
            fullscreen: true,
            ..Self::windowed()
        }
    }

    /// Debug builds always open a window
    pub fn current(windowed: bool) -> Self {
        if windowed || cfg!(debug_assertions) {
            Self::windowed()
        } else {
            Self::fullscreen()
        }
    }
}

/// Short status message that fades out at the top of the window
#[derive(Default)]
pub struct Notification {
    text: Option<String>,
    frames: u32,
}

impl Notification {
    /// Shows a notification message for 3 seconds
    pub fn show(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.frames = NOTIFICATION_FRAMES;
    }

    /// Call once per frame
    pub fn tick(&mut self) {
        if self.frames > 0 {
            self.frames -= 1;
            if self.frames == 0 {
                self.text = None;
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn alpha(&self) -> f32 {
        (self.frames as f32 / NOTIFICATION_FRAMES as f32).min(1.0)
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect) {
        if let Some(text) = self.text() {
            draw.text(text)
                .x_y(0.0, bounds.top() - 30.0)
                .w_h(bounds.w(), 40.0)
                .color(rgba(1.0, 1.0, 1.0, self.alpha()))
                .font_size(24);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_fades_out() {
        let mut notification = Notification::default();
        assert_eq!(notification.text(), None);

        notification.show("Speed: 2x");
        assert_eq!(notification.alpha(), 1.0);
        for _ in 0..90 {
            notification.tick();
        }
        assert_eq!(notification.text(), Some("Speed: 2x"));
        assert_eq!(notification.alpha(), 0.5);

        for _ in 0..90 {
            notification.tick();
        }
        assert_eq!(notification.text(), None);
    }

    #[test]
    fn new_notification_restarts_timer() {
        let mut notification = Notification::default();
        notification.show("a");
        for _ in 0..100 {
            notification.tick();
        }
        notification.show("b");
        assert_eq!(notification.text(), Some("b"));
        assert_eq!(notification.alpha(), 1.0);
    }

    #[test]
    fn resolution_flags() {
        assert!(!Resolution::current(true).fullscreen);
        assert_eq!(Resolution::fullscreen().width, 1280);
    }
}
