//! Drawing primitives the model renders through, plus the egui canvas backend.

use eframe::egui;

use crate::model::{Diagram, Selectable};

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// Text extent without a font system at hand.
pub fn approx_text_size(text: &str, size: f32) -> egui::Vec2 {
    egui::vec2(text.chars().count() as f32 * size * CHAR_WIDTH_FACTOR, size)
}

/// A target the diagram can draw itself onto, in world coordinates.
pub trait Surface {
    fn line(&mut self, a: egui::Pos2, b: egui::Pos2, stroke: egui::Stroke);

    fn disc(&mut self, center: egui::Pos2, radius: f32, color: egui::Color32);

    fn rect(&mut self, rect: egui::Rect, fill: Option<egui::Color32>, stroke: egui::Stroke);

    /// Draws `text` with its top-left corner at `pos`.
    fn text(&mut self, pos: egui::Pos2, text: &str, size: f32, color: egui::Color32);

    fn measure_text(&self, text: &str, size: f32) -> egui::Vec2 {
        approx_text_size(text, size)
    }
}

/// Pan and zoom of a canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub pan_screen: egui::Vec2,
    pub zoom: f32,
}

impl Default for View {
    fn default() -> Self {
        Self {
            pan_screen: egui::Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl View {
    pub fn world_to_screen(&self, origin: egui::Pos2, world: egui::Pos2) -> egui::Pos2 {
        origin + self.pan_screen + world.to_vec2() * self.zoom
    }

    pub fn screen_to_world(&self, origin: egui::Pos2, screen: egui::Pos2) -> egui::Pos2 {
        ((screen - origin - self.pan_screen) / self.zoom).to_pos2()
    }

    pub fn zoom_about_screen_point(
        &mut self,
        origin: egui::Pos2,
        screen_point: egui::Pos2,
        zoom_delta: f32,
    ) {
        let before = self.screen_to_world(origin, screen_point);
        self.zoom = (self.zoom * zoom_delta).clamp(0.1, 8.0);
        let after_screen = self.world_to_screen(origin, before);
        self.pan_screen += screen_point - after_screen;
    }
}

/// [`Surface`] over an egui painter, mapping world to screen through a [`View`].
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    view: View,
    origin: egui::Pos2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, view: View, origin: egui::Pos2) -> Self {
        Self {
            painter,
            view,
            origin,
        }
    }

    fn to_screen(&self, p: egui::Pos2) -> egui::Pos2 {
        self.view.world_to_screen(self.origin, p)
    }

    fn scaled(&self, stroke: egui::Stroke) -> egui::Stroke {
        egui::Stroke::new((stroke.width * self.view.zoom).max(1.0), stroke.color)
    }
}

impl Surface for PainterSurface<'_> {
    fn line(&mut self, a: egui::Pos2, b: egui::Pos2, stroke: egui::Stroke) {
        self.painter
            .line_segment([self.to_screen(a), self.to_screen(b)], self.scaled(stroke));
    }

    fn disc(&mut self, center: egui::Pos2, radius: f32, color: egui::Color32) {
        self.painter
            .circle_filled(self.to_screen(center), radius * self.view.zoom, color);
    }

    fn rect(&mut self, rect: egui::Rect, fill: Option<egui::Color32>, stroke: egui::Stroke) {
        let r = egui::Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max));
        if let Some(fill) = fill {
            self.painter.rect_filled(r, 0.0, fill);
        }
        if stroke != egui::Stroke::NONE {
            self.painter
                .rect_stroke(r, 0.0, self.scaled(stroke), egui::StrokeKind::Middle);
        }
    }

    fn text(&mut self, pos: egui::Pos2, text: &str, size: f32, color: egui::Color32) {
        let font_id = egui::FontId::proportional(size * self.view.zoom);
        self.painter.text(
            self.to_screen(pos),
            egui::Align2::LEFT_TOP,
            text,
            font_id,
            color,
        );
    }

    fn measure_text(&self, text: &str, size: f32) -> egui::Vec2 {
        let font_id = egui::FontId::proportional(size);
        self.painter
            .layout_no_wrap(text.to_string(), font_id, egui::Color32::WHITE)
            .size()
    }
}

pub fn draw_diagram(
    surface: &mut dyn Surface,
    diagram: &Diagram,
    is_selected: &dyn Fn(Selectable) -> bool,
    show_touch_bounds: bool,
) {
    diagram.draw(surface, is_selected, show_touch_bounds);
}

pub fn draw_background(painter: &egui::Painter, rect: egui::Rect, view: &View, grid_size: f32) {
    let bg = painter.ctx().style().visuals.extreme_bg_color;
    painter.rect_filled(rect, 0.0, bg);
    let grid_color = egui::Color32::from_gray(60);
    let spacing_screen = grid_size * view.zoom;
    if spacing_screen < 24.0 {
        return;
    }
    let start = rect.min + view.pan_screen;
    let x0 = ((rect.min.x - start.x) / spacing_screen).floor() * spacing_screen + start.x;
    let y0 = ((rect.min.y - start.y) / spacing_screen).floor() * spacing_screen + start.y;
    let stroke = egui::Stroke::new(1.0, grid_color);
    let mut x = x0;
    while x < rect.max.x {
        painter.line_segment([egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)], stroke);
        x += spacing_screen;
    }
    let mut y = y0;
    while y < rect.max.y {
        painter.line_segment([egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)], stroke);
        y += spacing_screen;
    }
}

/// Dashed grey outline of a rubber band given in world coordinates.
pub fn draw_rubber_band(surface: &mut dyn Surface, band: egui::Rect) {
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(150));
    let corners = [
        band.left_top(),
        band.right_top(),
        band.right_bottom(),
        band.left_bottom(),
    ];
    for i in 0..corners.len() {
        draw_dashed_line(surface, corners[i], corners[(i + 1) % corners.len()], stroke, 6.0, 4.0);
    }
}

fn draw_dashed_line(
    surface: &mut dyn Surface,
    a: egui::Pos2,
    b: egui::Pos2,
    stroke: egui::Stroke,
    dash_len: f32,
    gap_len: f32,
) {
    let v = b - a;
    let len = v.length();
    if len <= f32::EPSILON {
        return;
    }
    let dir = v / len;
    let mut pos = 0.0;
    let mut drawing = true;
    while pos < len {
        let next_pos = (pos + if drawing { dash_len } else { gap_len }).min(len);
        if drawing {
            surface.line(a + dir * pos, a + dir * next_pos, stroke);
        }
        pos = next_pos;
        drawing = !drawing;
    }
}
