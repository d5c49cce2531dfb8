use std::fs;
use std::path::Path;

use cityposter_application::error::{AppError, AppResult};
use domain::color::RgbColor;

use super::projection::Px;
use super::{Fade, Frame, Stroke, Surface, TextStyle, TextWeight};

const FONT_FAMILY: &str = "Roboto, 'Helvetica Neue', Arial, sans-serif";

/// Vector surface: every primitive becomes one SVG element in paint order.
/// The view box is in canvas pixels, the page size in centimetres.
pub struct SvgSurface {
    width: u32,
    height: u32,
    width_cm: f64,
    height_cm: f64,
    defs: String,
    body: String,
    gradients: usize,
}

impl SvgSurface {
    pub fn new(frame: &Frame, width_cm: f64, height_cm: f64) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            width_cm,
            height_cm,
            defs: String::new(),
            body: String::new(),
            gradients: 0,
        }
    }

    pub fn document(&self) -> String {
        let defs = if self.defs.is_empty() {
            String::new()
        } else {
            format!("<defs>\n{}</defs>\n", self.defs)
        };
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" ",
                "width=\"{:.2}cm\" height=\"{:.2}cm\" viewBox=\"0 0 {} {}\">\n",
                "{}{}</svg>\n"
            ),
            self.width_cm, self.height_cm, self.width, self.height, defs, self.body
        )
    }
}

fn coord(value: f64) -> String {
    format!("{value:.2}")
}

fn path_data(lines: &[Vec<Px>], close: bool) -> String {
    let mut data = String::new();
    for line in lines {
        let mut points = line.iter();
        let Some(first) = points.next() else {
            continue;
        };
        data.push_str(&format!("M{} {}", coord(first.x), coord(first.y)));
        for point in points {
            data.push_str(&format!("L{} {}", coord(point.x), coord(point.y)));
        }
        if close {
            data.push('Z');
        }
    }
    data
}

fn opacity_attr(name: &str, alpha: f64) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(" {name}=\"{:.3}\"", alpha.clamp(0.0, 1.0))
    }
}

fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl Surface for SvgSurface {
    fn fill_background(&mut self, color: RgbColor) {
        self.body.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{color}\"/>\n",
            self.width, self.height
        ));
    }

    fn fill_polygon(&mut self, rings: &[Vec<Px>], color: RgbColor) {
        let usable: Vec<Vec<Px>> = rings.iter().filter(|ring| ring.len() >= 3).cloned().collect();
        if usable.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"{color}\" fill-rule=\"evenodd\" stroke=\"none\"/>\n",
            path_data(&usable, true)
        ));
    }

    fn stroke_polylines(&mut self, lines: &[Vec<Px>], stroke: Stroke) {
        let data = path_data(lines, false);
        if data.is_empty() {
            return;
        }
        self.body.push_str(&format!(
            "<path d=\"{data}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{}/>\n",
            stroke.color,
            stroke.width,
            opacity_attr("stroke-opacity", stroke.alpha)
        ));
    }

    fn vertical_fade(&mut self, fade: Fade) {
        if fade.bottom <= fade.top {
            return;
        }
        let id = format!("fade{}", self.gradients);
        self.gradients += 1;
        self.defs.push_str(&format!(
            concat!(
                "<linearGradient id=\"{id}\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\">",
                "<stop offset=\"0\" stop-color=\"{color}\" stop-opacity=\"{top:.3}\"/>",
                "<stop offset=\"1\" stop-color=\"{color}\" stop-opacity=\"{bottom:.3}\"/>",
                "</linearGradient>\n"
            ),
            id = id,
            color = fade.color,
            top = fade.top_alpha,
            bottom = fade.bottom_alpha
        ));
        self.body.push_str(&format!(
            "<rect x=\"0\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"url(#{id})\"/>\n",
            coord(fade.top),
            self.width,
            coord(fade.bottom - fade.top)
        ));
    }

    fn draw_text(&mut self, text: &str, anchor: Px, style: TextStyle) {
        let weight = match style.weight {
            TextWeight::Bold => "bold",
            TextWeight::Regular => "normal",
            TextWeight::Light => "300",
        };
        self.body.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"{FONT_FAMILY}\" font-size=\"{:.2}\" font-weight=\"{weight}\" fill=\"{}\"{} text-anchor=\"middle\" xml:space=\"preserve\">{}</text>\n",
            coord(anchor.x),
            coord(anchor.y),
            style.size,
            style.color,
            opacity_attr("fill-opacity", style.alpha),
            escape_text(text)
        ));
    }

    fn save(self, path: &Path) -> AppResult<()> {
        fs::write(path, self.document()).map_err(|e| AppError::RenderError {
            message: format!("Failed to write SVG {}: {e}", path.display()),
        })
    }
}
