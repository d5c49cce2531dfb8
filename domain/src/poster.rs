use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use crate::coords::GeoPoint;
use crate::error::{DomainError, DomainResult};

pub const CM_PER_INCH: f64 = 2.54;
pub const PX_CONVERSION_DPI: f64 = 300.0;
pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 1200;
pub const DEFAULT_DPI: u32 = 150;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(DomainError::InvalidCanvas(format!(
                "Unsupported output format '{other}', expected png or svg"
            ))),
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    #[default]
    Cm,
    Mm,
    Px,
}

impl SizeUnit {
    #[must_use]
    pub fn to_cm(self, value: f64) -> f64 {
        match self {
            Self::Cm => value,
            Self::Mm => value / 10.0,
            Self::Px => value / PX_CONVERSION_DPI * CM_PER_INCH,
        }
    }
}

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
    Lossless,
}

impl Quality {
    #[must_use]
    pub fn dpi(self) -> u32 {
        match self {
            Self::Low => 100,
            Self::Medium => 150,
            Self::High => 300,
            Self::Ultra | Self::Lossless => 600,
        }
    }
}

/// An explicit dpi wins over the quality preset; the result is clamped.
#[must_use]
pub fn resolve_dpi(explicit: Option<u32>, quality: Option<Quality>) -> u32 {
    let dpi = match (explicit, quality) {
        (Some(dpi), _) if dpi > 0 => dpi,
        (_, Some(quality)) => quality.dpi(),
        _ => DEFAULT_DPI,
    };
    dpi.clamp(MIN_DPI, MAX_DPI)
}

/// Physical page and output settings handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: u32,
    pub format: OutputFormat,
    pub clean: bool,
    pub show_boundary_edge: bool,
    pub transparent_bg: bool,
}

impl CanvasSpec {
    pub fn new(
        width_cm: f64,
        height_cm: f64,
        dpi: u32,
        format: OutputFormat,
    ) -> DomainResult<Self> {
        if !(width_cm.is_finite() && height_cm.is_finite()) || width_cm <= 0.0 || height_cm <= 0.0 {
            return Err(DomainError::InvalidCanvas(format!(
                "Poster size must be positive, got {width_cm} x {height_cm} cm"
            )));
        }
        if width_cm > 500.0 || height_cm > 500.0 {
            return Err(DomainError::InvalidCanvas(format!(
                "Poster size {width_cm} x {height_cm} cm exceeds 500 cm"
            )));
        }
        Ok(Self {
            width_cm,
            height_cm,
            dpi: dpi.clamp(MIN_DPI, MAX_DPI),
            format,
            clean: false,
            show_boundary_edge: true,
            transparent_bg: false,
        })
    }

    #[must_use]
    pub fn width_inches(&self) -> f64 {
        self.width_cm / CM_PER_INCH
    }

    #[must_use]
    pub fn height_inches(&self) -> f64 {
        self.height_cm / CM_PER_INCH
    }

    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_inches() * dpi).round().max(1.0) as u32,
            (self.height_inches() * dpi).round().max(1.0) as u32,
        )
    }
}

/// Text printed on the poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterLabels {
    pub city: String,
    pub country: String,
    pub point: Option<GeoPoint>,
}

impl PosterLabels {
    /// `A, B, C` becomes city `A` and country `B, C`.
    #[must_use]
    pub fn from_place_name(name: &str, point: Option<GeoPoint>) -> Self {
        let mut parts = name.split(',').map(str::trim).filter(|part| !part.is_empty());
        let city = parts.next().unwrap_or(name).to_string();
        let country = parts.collect::<Vec<_>>().join(", ");
        Self {
            city,
            country,
            point,
        }
    }

    /// Letter-spaced upper case city name used as the poster title.
    #[must_use]
    pub fn spaced_city(&self) -> String {
        self.city
            .to_uppercase()
            .chars()
            .map(String::from)
            .collect::<Vec<_>>()
            .join("  ")
    }

    #[must_use]
    pub fn slug(&self) -> String {
        let slug: String = self
            .city
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        let trimmed = slug.trim_matches('_');
        if trimmed.is_empty() {
            "poster".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Public descriptor of one rendered file. The path never leaves the server.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub index: usize,
    pub theme: String,
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SizeUnit::Cm, 30.48, 30.48)]
    #[case(SizeUnit::Mm, 304.8, 30.48)]
    #[case(SizeUnit::Px, 3600.0, 30.48)]
    fn converts_units_to_cm(#[case] unit: SizeUnit, #[case] value: f64, #[case] expected: f64) {
        assert!((unit.to_cm(value) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(None, Some(Quality::Low), 100)]
    #[case(None, Some(Quality::Lossless), 600)]
    #[case(None, None, 150)]
    #[case(Some(300), Some(Quality::Low), 300)]
    #[case(Some(10), None, 72)]
    #[case(Some(5000), None, 1200)]
    #[case(Some(0), Some(Quality::High), 300)]
    fn resolves_dpi(
        #[case] explicit: Option<u32>,
        #[case] quality: Option<Quality>,
        #[case] expected: u32,
    ) {
        assert_eq!(resolve_dpi(explicit, quality), expected);
    }

    #[test]
    fn canvas_pixel_size_follows_dpi() {
        let canvas = CanvasSpec::new(30.48, 40.64, 100, OutputFormat::Png).expect("canvas");
        assert_eq!(canvas.pixel_size(), (1200, 1600));
        assert!(CanvasSpec::new(0.0, 10.0, 100, OutputFormat::Png).is_err());
    }

    #[test]
    fn splits_place_names_into_labels() {
        let labels = PosterLabels::from_place_name("Kebayoran Baru, Jakarta, Indonesia", None);
        assert_eq!(labels.city, "Kebayoran Baru");
        assert_eq!(labels.country, "Jakarta, Indonesia");
        assert_eq!(labels.slug(), "kebayoran_baru");
        assert_eq!(labels.spaced_city(), "K  E  B  A  Y  O  R  A  N     B  A  R  U");
    }

    #[test]
    fn rejects_pdf_output() {
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!("SVG".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
    }
}
