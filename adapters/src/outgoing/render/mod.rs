//! Poster renderer. Projects the dataset bundle onto the canvas and paints
//! the layers in a fixed order onto a PNG or SVG surface.

mod font;
mod projection;
mod raster;
mod svg;

use std::path::Path;
use tracing::{debug, instrument, warn};

use cityposter_application::error::{AppError, AppResult};
use cityposter_application::ports::outgoing::progress::ProgressSink;
use cityposter_application::ports::outgoing::renderer::{PosterRendererPort, RenderRequest};
use domain::color::RgbColor;
use domain::coords::BoundingBox;
use domain::dataset::{FeatureCollection, RoadClass};
use domain::geometry::Boundary;
use domain::job::{Phase, StatusUpdate};
use domain::poster::{CanvasSpec, OutputFormat, PosterLabels};

use projection::{Projection, Px};
use raster::RasterSurface;
use svg::SvgSurface;

const POINTS_PER_INCH: f64 = 72.0;
const BOUNDARY_WIDTH_PT: f64 = 2.0;
const FALLBACK_EXTENT_M: f64 = 1_000.0;
/// Poster width the typography sizes are designed for.
const TYPE_REFERENCE_WIDTH_IN: f64 = 16.0;

const ROAD_LAYERS: [RoadClass; 6] = [
    RoadClass::Other,
    RoadClass::Residential,
    RoadClass::Tertiary,
    RoadClass::Secondary,
    RoadClass::Primary,
    RoadClass::Motorway,
];

#[derive(Debug, Clone, Copy)]
pub(crate) struct Stroke {
    pub width: f64,
    pub color: RgbColor,
    pub alpha: f64,
}

/// Vertical band whose opacity moves linearly from `top_alpha` to `bottom_alpha`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fade {
    pub top: f64,
    pub bottom: f64,
    pub color: RgbColor,
    pub top_alpha: f64,
    pub bottom_alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextWeight {
    Bold,
    Regular,
    Light,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle {
    pub size: f64,
    pub color: RgbColor,
    pub alpha: f64,
    pub weight: TextWeight,
}

/// Drawing primitives shared by the output formats. Coordinates are canvas
/// pixels; text is anchored at its horizontal centre and baseline.
pub(crate) trait Surface {
    fn fill_background(&mut self, color: RgbColor);

    /// Even-odd fill of all `rings` together, so inner rings become holes.
    fn fill_polygon(&mut self, rings: &[Vec<Px>], color: RgbColor);

    fn stroke_polylines(&mut self, lines: &[Vec<Px>], stroke: Stroke);

    fn vertical_fade(&mut self, fade: Fade);

    fn draw_text(&mut self, text: &str, anchor: Px, style: TextStyle);

    fn save(self, path: &Path) -> AppResult<()>;
}

/// Pixel geometry of one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub width: u32,
    pub height: u32,
    pub px_per_pt: f64,
    pub width_inches: f64,
}

impl Frame {
    fn width_f(&self) -> f64 {
        f64::from(self.width)
    }

    fn height_f(&self) -> f64 {
        f64::from(self.height)
    }

    /// Canvas `y` of a height fraction measured from the bottom edge.
    fn from_bottom(&self, fraction: f64) -> f64 {
        self.height_f() * (1.0 - fraction)
    }
}

pub struct PosterRenderer {
    max_raster_pixels: u64,
}

impl PosterRenderer {
    pub fn new(max_raster_megapixels: u32) -> Self {
        Self {
            max_raster_pixels: u64::from(max_raster_megapixels.max(1)) * 1_000_000,
        }
    }

    /// PNG output larger than the pixel cap is scaled down uniformly,
    /// keeping the physical page size and line weights proportional.
    fn frame(&self, canvas: &CanvasSpec) -> Frame {
        let (width, height) = canvas.pixel_size();
        let pixels = u64::from(width) * u64::from(height);
        let scale = if canvas.format == OutputFormat::Png && pixels > self.max_raster_pixels {
            let scale = (self.max_raster_pixels as f64 / pixels as f64).sqrt();
            warn!(
                width,
                height,
                max_pixels = self.max_raster_pixels,
                "Raster exceeds pixel cap, scaling down"
            );
            scale
        } else {
            1.0
        };

        Frame {
            width: (f64::from(width) * scale).floor().max(1.0) as u32,
            height: (f64::from(height) * scale).floor().max(1.0) as u32,
            px_per_pt: f64::from(canvas.dpi) * scale / POINTS_PER_INCH,
            width_inches: canvas.width_inches(),
        }
    }
}

impl PosterRendererPort for PosterRenderer {
    #[instrument(
        skip(self, request, progress),
        fields(theme = %request.theme_id, format = %request.canvas.format)
    )]
    fn render(&self, request: &RenderRequest, progress: &dyn ProgressSink) -> AppResult<()> {
        enter(progress, Phase::RenderSetup, "Preparing render canvas...")?;
        let frame = self.frame(&request.canvas);
        let projection = Projection::fit(&extent(request)?, frame.width_f(), frame.height_f());
        debug!(width = frame.width, height = frame.height, "Canvas ready");

        match request.canvas.format {
            OutputFormat::Png => paint_and_save(
                RasterSurface::new(frame.width, frame.height),
                request,
                &frame,
                &projection,
                progress,
            ),
            OutputFormat::Svg => paint_and_save(
                SvgSurface::new(&frame, request.canvas.width_cm, request.canvas.height_cm),
                request,
                &frame,
                &projection,
                progress,
            ),
        }
    }
}

/// Cancellation checkpoint followed by the phase report.
fn enter(progress: &dyn ProgressSink, phase: Phase, message: &str) -> AppResult<()> {
    if progress.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    progress.report(StatusUpdate::phase(phase, message));
    Ok(())
}

/// Boundary outline, then street extent, then a small box around the label point.
fn extent(request: &RenderRequest) -> AppResult<BoundingBox> {
    request
        .boundary
        .as_ref()
        .and_then(|boundary| boundary.bbox())
        .or_else(|| request.bundle.bbox())
        .or_else(|| {
            request
                .labels
                .point
                .map(|point| BoundingBox::around(point, FALLBACK_EXTENT_M))
        })
        .ok_or_else(|| AppError::RenderError {
            message: "Nothing to render: no street network, boundary or location".to_string(),
        })
}

fn paint_and_save<S: Surface>(
    mut surface: S,
    request: &RenderRequest,
    frame: &Frame,
    projection: &Projection,
    progress: &dyn ProgressSink,
) -> AppResult<()> {
    let theme = &request.theme;
    if !request.canvas.transparent_bg {
        surface.fill_background(theme.bg);
    }

    enter(progress, Phase::RenderLayersWater, "Drawing water layer...")?;
    fill_features(&mut surface, projection, request.bundle.water.as_deref(), theme.water);

    enter(progress, Phase::RenderLayersParks, "Drawing green space layer...")?;
    fill_features(&mut surface, projection, request.bundle.parks.as_deref(), theme.parks);

    enter(progress, Phase::RenderBoundary, "Drawing boundary outline...")?;
    if let Some(boundary) = request.boundary.as_deref().filter(|_| request.canvas.show_boundary_edge) {
        stroke_boundary(&mut surface, projection, frame, boundary, theme.boundary_color());
    }

    enter(progress, Phase::RenderRoads, "Drawing street network...")?;
    draw_roads(&mut surface, projection, frame, request);

    if !request.canvas.clean {
        enter(progress, Phase::RenderGradients, "Adding gradient fades...")?;
        draw_fades(&mut surface, frame, theme.gradient_color);

        enter(progress, Phase::RenderText, "Adding typography...")?;
        draw_typography(&mut surface, frame, &request.labels, theme.text);
    }

    enter(progress, Phase::RenderSave, "Saving poster...")?;
    surface.save(&request.output_path)
}

fn fill_features<S: Surface>(
    surface: &mut S,
    projection: &Projection,
    features: Option<&FeatureCollection>,
    color: RgbColor,
) {
    let Some(features) = features else {
        return;
    };
    for polygon in features.polygons() {
        let rings: Vec<Vec<Px>> = polygon
            .rings()
            .map(|ring| projection.project_ring(ring))
            .collect();
        surface.fill_polygon(&rings, color);
    }
}

fn stroke_boundary<S: Surface>(
    surface: &mut S,
    projection: &Projection,
    frame: &Frame,
    boundary: &Boundary,
    color: RgbColor,
) {
    let outlines: Vec<Vec<Px>> = boundary
        .polygons
        .iter()
        .flat_map(|polygon| polygon.rings())
        .map(|ring| {
            let mut line = projection.project_ring(ring);
            if let Some(first) = line.first().copied() {
                line.push(first);
            }
            line
        })
        .collect();
    surface.stroke_polylines(
        &outlines,
        Stroke {
            width: BOUNDARY_WIDTH_PT * frame.px_per_pt,
            color,
            alpha: 1.0,
        },
    );
}

/// Minor roads first so major roads end up on top.
fn draw_roads<S: Surface>(
    surface: &mut S,
    projection: &Projection,
    frame: &Frame,
    request: &RenderRequest,
) {
    let mut layers: Vec<Vec<Vec<Px>>> = vec![Vec::new(); ROAD_LAYERS.len()];
    for (from, to, class) in request.bundle.streets.segments() {
        if let Some(layer) = layers.get_mut(usize::from(class.draw_order())) {
            layer.push(vec![projection.project(from), projection.project(to)]);
        }
    }

    for (class, lines) in ROAD_LAYERS.iter().zip(&layers) {
        if lines.is_empty() {
            continue;
        }
        surface.stroke_polylines(
            lines,
            Stroke {
                width: class.line_width() * frame.px_per_pt,
                color: request.theme.road_color(*class),
                alpha: 1.0,
            },
        );
    }
}

/// Quarter-height fades at both edges, opaque at the edge itself.
fn draw_fades<S: Surface>(surface: &mut S, frame: &Frame, color: RgbColor) {
    let height = frame.height_f();
    surface.vertical_fade(Fade {
        top: 0.0,
        bottom: height * 0.25,
        color,
        top_alpha: 1.0,
        bottom_alpha: 0.0,
    });
    surface.vertical_fade(Fade {
        top: height * 0.75,
        bottom: height,
        color,
        top_alpha: 0.0,
        bottom_alpha: 1.0,
    });
}

fn city_font_pt(city: &str) -> f64 {
    let base = 60.0;
    let chars = city.chars().count();
    if chars > 10 {
        (base * 10.0 / chars as f64).max(base * 0.4)
    } else {
        base
    }
}

fn draw_typography<S: Surface>(
    surface: &mut S,
    frame: &Frame,
    labels: &PosterLabels,
    color: RgbColor,
) {
    let type_scale = frame.width_inches / TYPE_REFERENCE_WIDTH_IN;
    let size = |pt: f64| pt * type_scale * frame.px_per_pt;
    let centre = frame.width_f() / 2.0;
    let at = |fraction: f64| Px {
        x: centre,
        y: frame.from_bottom(fraction),
    };

    surface.draw_text(
        &labels.spaced_city(),
        at(0.14),
        TextStyle {
            size: size(city_font_pt(&labels.city)),
            color,
            alpha: 1.0,
            weight: TextWeight::Bold,
        },
    );

    let has_country = !labels.country.trim().is_empty();
    if has_country {
        surface.draw_text(
            &labels.country.to_uppercase(),
            at(0.10),
            TextStyle {
                size: size(22.0),
                color,
                alpha: 1.0,
                weight: TextWeight::Light,
            },
        );
    }

    let Some(point) = labels.point else {
        return;
    };
    surface.draw_text(
        &point.display_label(),
        at(if has_country { 0.07 } else { 0.10 }),
        TextStyle {
            size: size(14.0),
            color,
            alpha: 0.7,
            weight: TextWeight::Regular,
        },
    );

    let line_y = frame.from_bottom(if has_country { 0.125 } else { 0.105 });
    let half = (0.1 * type_scale).clamp(0.07, 0.2) * frame.width_f();
    surface.stroke_polylines(
        &[vec![
            Px {
                x: centre - half,
                y: line_y,
            },
            Px {
                x: centre + half,
                y: line_y,
            },
        ]],
        Stroke {
            width: frame.px_per_pt,
            color,
            alpha: 1.0,
        },
    );
}
