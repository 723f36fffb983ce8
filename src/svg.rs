use eframe::egui;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::DocumentError;
use crate::model::Diagram;
use crate::render::{Surface, draw_diagram};

const PADDING: f32 = 24.0;

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn rgb(color: egui::Color32) -> (String, f32) {
    let opacity = color.a() as f32 / 255.0;
    (format!("rgb({},{},{})", color.r(), color.g(), color.b()), opacity)
}

/// [`Surface`] that collects SVG elements.
#[derive(Default)]
pub struct SvgSurface {
    body: String,
}

impl SvgSurface {
    /// Wraps the collected elements in an `<svg>` document with the given view box.
    pub fn finish(self, view_box: egui::Rect) -> String {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        out.push('\n');
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.3} {:.3} {:.3} {:.3}" width="{:.3}" height="{:.3}">"#,
            view_box.min.x,
            view_box.min.y,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        );
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

impl Surface for SvgSurface {
    fn line(&mut self, a: egui::Pos2, b: egui::Pos2, stroke: egui::Stroke) {
        let (color, opacity) = rgb(stroke.color);
        let _ = writeln!(
            self.body,
            r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.3}" />"#,
            a.x, a.y, b.x, b.y, color, opacity, stroke.width
        );
    }

    fn disc(&mut self, center: egui::Pos2, radius: f32, color: egui::Color32) {
        let (fill, opacity) = rgb(color);
        let _ = writeln!(
            self.body,
            r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="{}" fill-opacity="{:.3}" />"#,
            center.x, center.y, radius, fill, opacity
        );
    }

    fn rect(&mut self, rect: egui::Rect, fill: Option<egui::Color32>, stroke: egui::Stroke) {
        let fill_attrs = match fill {
            Some(c) if c.a() > 0 => {
                let (rgb, opacity) = rgb(c);
                format!(r#"fill="{}" fill-opacity="{:.3}""#, rgb, opacity)
            }
            _ => r#"fill="none""#.to_string(),
        };
        let stroke_attrs = if stroke == egui::Stroke::NONE {
            String::new()
        } else {
            let (rgb, opacity) = rgb(stroke.color);
            format!(
                r#" stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.3}""#,
                rgb, opacity, stroke.width
            )
        };
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" {}{} />"#,
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height(),
            fill_attrs,
            stroke_attrs
        );
    }

    fn text(&mut self, pos: egui::Pos2, text: &str, size: f32, color: egui::Color32) {
        let (fill, opacity) = rgb(color);
        let _ = writeln!(
            self.body,
            r#"<text x="{:.3}" y="{:.3}" font-size="{:.3}" font-family="sans-serif" fill="{}" fill-opacity="{:.3}" dominant-baseline="hanging">{}</text>"#,
            pos.x,
            pos.y,
            size,
            fill,
            opacity,
            escape_xml(text)
        );
    }
}

/// The whole diagram as a standalone SVG document, unselected.
pub fn diagram_to_svg(diagram: &Diagram) -> String {
    let bounds = diagram
        .bounds()
        .unwrap_or_else(|| egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)));
    let mut surface = SvgSurface::default();
    draw_diagram(&mut surface, diagram, &|_| false, false);
    surface.finish(bounds.expand(PADDING))
}

pub fn export_svg(diagram: &Diagram, path: impl AsRef<Path>) -> Result<(), DocumentError> {
    let path = path.as_ref();
    std::fs::write(path, diagram_to_svg(diagram))?;
    tracing::info!(path = %path.display(), "diagram exported as SVG");
    Ok(())
}
