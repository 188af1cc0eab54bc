//! Frame renderers.
//!
//! Each function turns already-computed values into draw commands. They hold
//! no state; the only animated value (the beat pulse) is computed by the
//! caller and passed in as a radius.

use crate::bands::BandAverages;
use crate::draw::{Color, DisplayList, DrawCommand, RadialGradient, TextAlign};
use crate::rect::Rect;

/// Contour sits this far above the bottom edge
const CONTOUR_BOTTOM_MARGIN: f32 = 30.0;
/// Headroom kept above a full-scale contour peak
const CONTOUR_HEADROOM: f32 = 40.0;
const CONTOUR_ALPHA: f32 = 0.25;
const CONTOUR_WIDTH: f32 = 3.0;

const BAR_WIDTH: f32 = 100.0;
const BAR_START_X: f32 = 80.0;
const BAR_GAP: f32 = 180.0;
const BAR_BASELINE_OFFSET: f32 = 60.0;
const BAR_MIN_HEIGHT: f32 = 10.0;
const BAR_SCALE: f32 = 1.5;
const BAR_GLOW: f32 = 15.0;
const BAR_LABEL_SIZE: f32 = 18.0;
const BAR_LABEL_OFFSET: f32 = 24.0;

const CIRCLE_OFFSET_X: f32 = 90.0;
const CIRCLE_BOTTOM_OFFSET: f32 = 110.0;
const CIRCLE_ALPHA: f32 = 0.7;
const CIRCLE_INNER_RATIO: f32 = 0.3;
const CIRCLE_OUTLINE_WIDTH: f32 = 5.0;
const CIRCLE_LABEL_SIZE: f32 = 22.0;

const FLASH_ALPHA: f32 = 0.3;

const TIME_LABEL_SIZE: f32 = 20.0;
const TIME_BOTTOM_OFFSET: f32 = 10.0;

/// One labelled bar per band, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Volume,
    Bass,
    Percussion,
    Instruments,
    Vocals,
}

impl BarKind {
    pub const ALL: [BarKind; 5] = [
        BarKind::Volume,
        BarKind::Bass,
        BarKind::Percussion,
        BarKind::Instruments,
        BarKind::Vocals,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BarKind::Volume => "Volume",
            BarKind::Bass => "Bass",
            BarKind::Percussion => "Percussion",
            BarKind::Instruments => "Instruments",
            BarKind::Vocals => "Vocals",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            BarKind::Volume => Color::hex(0x4caf50),
            BarKind::Bass => Color::hex(0x2196f3),
            BarKind::Percussion => Color::hex(0xff9800),
            BarKind::Instruments => Color::hex(0x9c27b0),
            BarKind::Vocals => Color::hex(0xe91e63),
        }
    }

    /// Percussion reads the HIGH band and Instruments the MID band.
    pub fn value(&self, averages: &BandAverages) -> f32 {
        match self {
            BarKind::Volume => averages.overall,
            BarKind::Bass => averages.bass,
            BarKind::Percussion => averages.high,
            BarKind::Instruments => averages.mid,
            BarKind::Vocals => averages.vocals,
        }
    }
}

/// Thresholds for the full-canvas white flash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashThresholds {
    pub bass: f32,
    pub overall: f32,
}

impl Default for FlashThresholds {
    fn default() -> Self {
        Self {
            bass: 170.0,
            overall: 180.0,
        }
    }
}

impl FlashThresholds {
    pub fn triggered(&self, averages: &BandAverages) -> bool {
        averages.bass > self.bass || averages.overall > self.overall
    }
}

/// Y coordinate of a magnitude on the contour
pub fn contour_y(value: u8, track_height: f32) -> f32 {
    track_height - (value as f32 / 255.0) * (track_height - CONTOUR_HEADROOM)
}

pub fn bar_height(value: f32) -> f32 {
    (value * BAR_SCALE).max(BAR_MIN_HEIGHT)
}

/// Center of the beat circle, right of the last bar
pub fn circle_center(canvas: Rect) -> (f32, f32) {
    (
        canvas.left() + BAR_START_X + 5.0 * BAR_GAP + CIRCLE_OFFSET_X,
        canvas.bottom() - CIRCLE_BOTTOM_OFFSET,
    )
}

/// Mirrored frequency contour behind everything else
pub fn draw_frequency_line(list: &mut DisplayList, canvas: Rect, magnitudes: &[u8]) {
    if magnitudes.is_empty() {
        return;
    }
    let color = Color::hex(0x00fff7).with_alpha(CONTOUR_ALPHA);
    let track_height = canvas.h - CONTOUR_BOTTOM_MARGIN;
    let x_step = canvas.w / magnitudes.len() as f32;

    let forward = magnitudes
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            (
                canvas.left() + i as f32 * x_step,
                canvas.top() + contour_y(v, track_height),
            )
        })
        .collect();
    list.push(DrawCommand::StrokePolyline {
        points: forward,
        color,
        width: CONTOUR_WIDTH,
    });

    let mirrored = magnitudes
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            (
                canvas.left() + canvas.w - 1.0 - i as f32 * x_step,
                canvas.top() + contour_y(v, track_height),
            )
        })
        .collect();
    list.push(DrawCommand::StrokePolyline {
        points: mirrored,
        color,
        width: CONTOUR_WIDTH,
    });
}

/// One glowing bar with its label under the baseline
pub fn draw_bar(list: &mut DisplayList, x: f32, baseline: f32, value: f32, kind: BarKind) {
    let height = bar_height(value);
    list.push(DrawCommand::FillRect {
        rect: Rect::new(x, baseline - height, BAR_WIDTH, height),
        color: kind.color(),
        glow: BAR_GLOW,
    });
    list.push(DrawCommand::Text {
        text: kind.label().to_string(),
        position: (x + BAR_WIDTH / 2.0, baseline + BAR_LABEL_OFFSET),
        size: BAR_LABEL_SIZE,
        bold: false,
        align: TextAlign::Center,
        color: Color::WHITE,
        shadow: None,
    });
}

pub fn draw_bars(list: &mut DisplayList, canvas: Rect, averages: &BandAverages) {
    let baseline = canvas.bottom() - BAR_BASELINE_OFFSET;
    for (i, kind) in BarKind::ALL.iter().enumerate() {
        let x = canvas.left() + BAR_START_X + i as f32 * BAR_GAP;
        draw_bar(list, x, baseline, kind.value(averages), *kind);
    }
}

/// Gradient disc with an outline and a "BEAT" label
pub fn draw_beat_circle(list: &mut DisplayList, center: (f32, f32), radius: f32) {
    let outline = Color::hex(0xff9800);
    list.push(DrawCommand::FillCircle {
        center,
        radius,
        gradient: RadialGradient {
            inner: radius * CIRCLE_INNER_RATIO,
            outer: radius,
            stops: vec![
                (0.0, Color::hex(0xffffbb)),
                (0.35, Color::hex(0xffe44e)),
                (1.0, outline),
            ],
        },
        alpha: CIRCLE_ALPHA,
    });
    list.push(DrawCommand::StrokeCircle {
        center,
        radius,
        color: outline,
        width: CIRCLE_OUTLINE_WIDTH,
    });
    list.push(DrawCommand::Text {
        text: "BEAT".to_string(),
        position: (center.0, center.1 + 10.0),
        size: CIRCLE_LABEL_SIZE,
        bold: true,
        align: TextAlign::Center,
        color: Color::WHITE,
        shadow: None,
    });
}

pub fn draw_flash(list: &mut DisplayList, canvas: Rect) {
    list.push(DrawCommand::FillRect {
        rect: canvas,
        color: Color::WHITE.with_alpha(FLASH_ALPHA),
        glow: 0.0,
    });
}

/// Remaining time readout along the bottom edge
pub fn draw_time_left(list: &mut DisplayList, canvas: Rect, duration: f64, position: f64) {
    let (center_x, _) = canvas.center();
    list.push(DrawCommand::Text {
        text: format!("Time left: {}", format_time(time_left(duration, position))),
        position: (center_x, canvas.bottom() - TIME_BOTTOM_OFFSET),
        size: TIME_LABEL_SIZE,
        bold: false,
        align: TextAlign::Center,
        color: Color::WHITE,
        shadow: Some(Color::BLACK.with_alpha(0.7)),
    });
}

/// `max(0, duration - position)`, with non-finite inputs counting as 0
pub fn time_left(duration: f64, position: f64) -> f64 {
    let duration = if duration.is_finite() { duration } else { 0.0 };
    let position = if position.is_finite() { position } else { 0.0 };
    (duration - position).max(0.0)
}

/// `M:SS`; negative and non-finite input shows as `0:00`
pub fn format_time(seconds: f64) -> String {
    let t = if seconds.is_finite() && seconds >= 0.0 {
        seconds
    } else {
        0.0
    };
    let minutes = (t / 60.0).floor() as u64;
    let secs = (t % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Rect {
        Rect::from_w_h(1280.0, 720.0)
    }

    #[test]
    fn format_time_examples() {
        assert_eq!(format_time(125.0), "2:05");
        assert_eq!(format_time(-5.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.999), "0:59");
        assert_eq!(format_time(3725.0), "62:05");
    }

    #[test]
    fn time_left_clamps() {
        assert_eq!(time_left(100.0, 40.0), 60.0);
        assert_eq!(time_left(10.0, 40.0), 0.0);
        assert_eq!(time_left(f64::NAN, 3.0), 0.0);
        assert_eq!(time_left(30.0, f64::NAN), 30.0);
    }

    #[test]
    fn bar_height_has_floor() {
        assert_eq!(bar_height(0.0), 10.0);
        assert_eq!(bar_height(6.0), 10.0);
        assert_eq!(bar_height(100.0), 150.0);
    }

    #[test]
    fn bars_use_their_band() {
        let averages = BandAverages {
            overall: 10.0,
            bass: 20.0,
            mid: 30.0,
            high: 40.0,
            vocals: 50.0,
        };
        let mut list = DisplayList::new();
        draw_bars(&mut list, canvas(), &averages);

        let bars: Vec<(f32, f32, Color)> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, color, .. } => Some((rect.x, rect.h, *color)),
                _ => None,
            })
            .collect();
        let labels: Vec<&str> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(labels, ["Volume", "Bass", "Percussion", "Instruments", "Vocals"]);
        assert_eq!(bars[0], (80.0, 15.0, Color::hex(0x4caf50)));
        assert_eq!(bars[1], (260.0, 30.0, Color::hex(0x2196f3)));
        // Percussion shows HIGH, Instruments shows MID
        assert_eq!(bars[2].1, 60.0);
        assert_eq!(bars[3].1, 45.0);
        assert_eq!(bars[4], (800.0, 75.0, Color::hex(0xe91e63)));
    }

    #[test]
    fn bars_stand_on_baseline() {
        let mut list = DisplayList::new();
        draw_bar(&mut list, 80.0, 660.0, 100.0, BarKind::Bass);
        match &list.commands()[0] {
            DrawCommand::FillRect { rect, .. } => {
                assert_eq!(rect.bottom(), 660.0);
                assert_eq!(rect.w, 100.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn contour_is_mirrored() {
        let magnitudes = [0u8, 255, 0, 255];
        let mut list = DisplayList::new();
        draw_frequency_line(&mut list, canvas(), &magnitudes);
        assert_eq!(list.len(), 2);

        let (forward, mirrored) = match list.commands() {
            [
                DrawCommand::StrokePolyline { points: a, .. },
                DrawCommand::StrokePolyline { points: b, color, .. },
            ] => {
                assert_eq!(color.a, 0.25);
                (a.clone(), b.clone())
            }
            other => panic!("unexpected commands {:?}", other),
        };

        // track height 690: silence sits on it, full scale 40px below the top
        assert_eq!(forward[0], (0.0, 690.0));
        assert_eq!(forward[1], (320.0, 40.0));
        assert_eq!(mirrored[0], (1279.0, 690.0));
        assert_eq!(mirrored[1], (959.0, 40.0));
    }

    #[test]
    fn empty_contour_draws_nothing() {
        let mut list = DisplayList::new();
        draw_frequency_line(&mut list, canvas(), &[]);
        assert!(list.is_empty());
    }

    #[test]
    fn flash_thresholds() {
        let flash = FlashThresholds::default();
        let mut averages = BandAverages::default();
        assert!(!flash.triggered(&averages));
        averages.bass = 171.0;
        assert!(flash.triggered(&averages));
        averages.bass = 170.0;
        averages.overall = 180.5;
        assert!(flash.triggered(&averages));
        averages.overall = 180.0;
        assert!(!flash.triggered(&averages));
    }

    #[test]
    fn circle_layout() {
        assert_eq!(circle_center(canvas()), (1070.0, 610.0));
        let mut list = DisplayList::new();
        draw_beat_circle(&mut list, (1070.0, 610.0), 70.0);
        match &list.commands()[0] {
            DrawCommand::FillCircle { gradient, alpha, .. } => {
                assert_eq!(*alpha, 0.7);
                assert!((gradient.inner - 21.0).abs() < 1e-4);
                assert_eq!(gradient.outer, 70.0);
                assert_eq!(gradient.stops.len(), 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(matches!(
            &list.commands()[2],
            DrawCommand::Text { text, bold: true, .. } if text == "BEAT"
        ));
    }

    #[test]
    fn time_readout_text() {
        let mut list = DisplayList::new();
        draw_time_left(&mut list, canvas(), 200.0, 75.0);
        match &list.commands()[0] {
            DrawCommand::Text { text, position, .. } => {
                assert_eq!(text, "Time left: 2:05");
                assert_eq!(*position, (640.0, 710.0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
