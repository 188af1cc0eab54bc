//! Display list replay onto `nannou::Draw`.
//!
//! Display lists use canvas pixels (origin top-left, y down); nannou draws
//! around the window center with y up.

use beat_viz_core::{Color, DrawCommand, RadialGradient, Surface, TextAlign};
use nannou::prelude::*;

const GLOW_LAYERS: u32 = 4;
const GRADIENT_RINGS: u32 = 24;
const SHADOW_OFFSET: f32 = 2.0;

pub struct NannouSurface<'a> {
    draw: &'a Draw,
    bounds: Rect,
}

impl<'a> NannouSurface<'a> {
    pub fn new(draw: &'a Draw, bounds: Rect) -> Self {
        Self { draw, bounds }
    }

    fn point(&self, (x, y): (f32, f32)) -> Point2 {
        pt2(self.bounds.left() + x, self.bounds.top() - y)
    }

    fn fill_rect(&self, rect: &beat_viz_core::Rect, color: Color, glow: f32) {
        let center = self.point(rect.center());

        // halo of widening, fading rectangles behind the fill
        if glow > 0.0 {
            for layer in (1..=GLOW_LAYERS).rev() {
                let spread = glow * layer as f32 / GLOW_LAYERS as f32;
                let alpha = color.a * 0.12 * (GLOW_LAYERS + 1 - layer) as f32 / GLOW_LAYERS as f32;
                self.draw
                    .rect()
                    .xy(center)
                    .w_h(rect.w + spread * 2.0, rect.h + spread * 2.0)
                    .color(to_rgba(color.with_alpha(alpha)));
            }
        }

        self.draw
            .rect()
            .xy(center)
            .w_h(rect.w, rect.h)
            .color(to_rgba(color));
    }

    /// Concentric discs from the outside in, each tinted by the gradient
    fn fill_circle(&self, center: (f32, f32), radius: f32, gradient: &RadialGradient, alpha: f32) {
        if radius <= 0.0 {
            return;
        }
        let center = self.point(center);
        for ring in (1..=GRADIENT_RINGS).rev() {
            let r = radius * ring as f32 / GRADIENT_RINGS as f32;
            let color = gradient.color_at(r);
            self.draw
                .ellipse()
                .xy(center)
                .radius(r)
                .color(to_rgba(color.with_alpha(color.a * alpha)));
        }
    }

    fn text(&self, text: &str, position: (f32, f32), size: f32, align: TextAlign, color: Color) {
        let width = self.bounds.w();
        let anchor = self.point(position);
        // nannou lays text out inside a box; line the box edge up with the anchor
        let x = match align {
            TextAlign::Left => anchor.x + width / 2.0,
            TextAlign::Center => anchor.x,
            TextAlign::Right => anchor.x - width / 2.0,
        };
        let y = anchor.y + size * 0.35;

        let drawing = self
            .draw
            .text(text)
            .x_y(x, y)
            .w_h(width, size * 2.0)
            .no_line_wrap()
            .font_size(size.round().max(1.0) as u32)
            .color(to_rgba(color));
        match align {
            TextAlign::Left => drawing.left_justify(),
            TextAlign::Center => drawing.center_justify(),
            TextAlign::Right => drawing.right_justify(),
        };
    }
}

impl Surface for NannouSurface<'_> {
    fn execute(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear => {
                self.draw.background().color(BLACK);
            }
            DrawCommand::FillRect { rect, color, glow } => self.fill_rect(rect, *color, *glow),
            DrawCommand::StrokePolyline { points, color, width } => {
                if points.len() < 2 {
                    return;
                }
                let points: Vec<Point2> = points.iter().map(|&p| self.point(p)).collect();
                self.draw
                    .polyline()
                    .weight(*width)
                    .points(points)
                    .color(to_rgba(*color));
            }
            DrawCommand::FillCircle {
                center,
                radius,
                gradient,
                alpha,
            } => self.fill_circle(*center, *radius, gradient, *alpha),
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                self.draw
                    .ellipse()
                    .xy(self.point(*center))
                    .radius(*radius)
                    .no_fill()
                    .stroke_weight(*width)
                    .stroke(to_rgba(*color));
            }
            // no bold face in the default font
            DrawCommand::Text {
                text,
                position,
                size,
                align,
                color,
                shadow,
                ..
            } => {
                if let Some(shadow) = shadow {
                    let offset = (position.0 + SHADOW_OFFSET, position.1 + SHADOW_OFFSET);
                    self.text(text, offset, *size, *align, *shadow);
                }
                self.text(text, *position, *size, *align, *color);
            }
        }
    }
}

fn to_rgba(color: Color) -> nannou::color::Rgba {
    rgba(color.r, color.g, color.b, color.a)
}
