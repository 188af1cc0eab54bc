//! Draw commands and the surface they are replayed on.
//!
//! Renderers record `DrawCommand`s into a `DisplayList`; the host replays the
//! list onto whatever 2D backend it has. Coordinates are canvas pixels with
//! the origin in the top-left corner.

use crate::rect::Rect;

/// RGBA color, 0.0-1.0 per channel
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB`, fully opaque
    pub fn hex(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise blend, `t = 0` is `self`
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
}

/// Color stops of a radial gradient between `inner` and `outer` radius.
///
/// Offsets are 0-1 along that span; inside `inner` the first stop applies.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    pub inner: f32,
    pub outer: f32,
    pub stops: Vec<(f32, Color)>,
}

impl RadialGradient {
    /// Color at distance `radius` from the center
    pub fn color_at(&self, radius: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::BLACK.with_alpha(0.0),
        };
        let span = self.outer - self.inner;
        let t = if span > 0.0 {
            ((radius - self.inner) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.0 {
                let width = b.0 - a.0;
                let local = if width > 0.0 { (t - a.0) / width } else { 1.0 };
                return a.1.lerp(b.1, local);
            }
        }
        last.1
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing operation
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Wipe the whole canvas
    Clear,
    /// Filled rectangle, `glow` is a blur radius in pixels (0 = none)
    FillRect { rect: Rect, color: Color, glow: f32 },
    /// Open path through `points`
    StrokePolyline {
        points: Vec<(f32, f32)>,
        color: Color,
        width: f32,
    },
    /// Disc filled with a radial gradient; `alpha` scales every stop
    FillCircle {
        center: (f32, f32),
        radius: f32,
        gradient: RadialGradient,
        alpha: f32,
    },
    StrokeCircle {
        center: (f32, f32),
        radius: f32,
        color: Color,
        width: f32,
    },
    /// Text anchored on its baseline at `position`
    Text {
        text: String,
        position: (f32, f32),
        size: f32,
        bold: bool,
        align: TextAlign,
        color: Color,
        shadow: Option<Color>,
    },
}

/// Anything the display list can be replayed on
pub trait Surface {
    fn execute(&mut self, command: &DrawCommand);
}

/// Ordered draw commands for one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Executes every command in recording order
    pub fn replay<S: Surface + ?Sized>(&self, surface: &mut S) {
        for command in &self.commands {
            surface.execute(command);
        }
    }
}
