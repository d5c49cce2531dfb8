use serde::{Deserialize, Serialize};
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use crate::color::RgbColor;
use crate::dataset::RoadClass;
use crate::error::{DomainError, DomainResult};

pub const DEFAULT_THEME_ID: &str = "feature_based";
pub const CUSTOM_THEME_ID: &str = "custom";

/// Immutable poster palette. Passed by value into every render call.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bg: RgbColor,
    pub text: RgbColor,
    pub gradient_color: RgbColor,
    pub water: RgbColor,
    pub parks: RgbColor,
    pub road_motorway: RgbColor,
    pub road_primary: RgbColor,
    pub road_secondary: RgbColor,
    pub road_tertiary: RgbColor,
    pub road_residential: RgbColor,
    pub road_default: RgbColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<RgbColor>,
}

impl ThemeSpec {
    #[must_use]
    pub fn feature_based() -> Self {
        Self {
            name: "Feature-Based Shading".to_string(),
            description: None,
            bg: RgbColor::new(0xFF, 0xFF, 0xFF),
            text: RgbColor::new(0x00, 0x00, 0x00),
            gradient_color: RgbColor::new(0xFF, 0xFF, 0xFF),
            water: RgbColor::new(0xC0, 0xC0, 0xC0),
            parks: RgbColor::new(0xF0, 0xF0, 0xF0),
            road_motorway: RgbColor::new(0x0A, 0x0A, 0x0A),
            road_primary: RgbColor::new(0x1A, 0x1A, 0x1A),
            road_secondary: RgbColor::new(0x2A, 0x2A, 0x2A),
            road_tertiary: RgbColor::new(0x3A, 0x3A, 0x3A),
            road_residential: RgbColor::new(0x4A, 0x4A, 0x4A),
            road_default: RgbColor::new(0x3A, 0x3A, 0x3A),
            boundary: None,
        }
    }

    #[must_use]
    pub fn road_color(&self, class: RoadClass) -> RgbColor {
        match class {
            RoadClass::Motorway => self.road_motorway,
            RoadClass::Primary => self.road_primary,
            RoadClass::Secondary => self.road_secondary,
            RoadClass::Tertiary => self.road_tertiary,
            RoadClass::Residential => self.road_residential,
            RoadClass::Other => self.road_default,
        }
    }

    /// Boundary stroke colour, falling back to the text colour.
    #[must_use]
    pub fn boundary_color(&self) -> RgbColor {
        self.boundary.unwrap_or(self.text)
    }
}

/// Theme identifiers are file stems; keep them to a safe character set.
pub fn validate_theme_id(id: &str) -> DomainResult<()> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidTheme(format!(
            "Theme name '{id}' must be 1-64 characters of [A-Za-z0-9_-]"
        )))
    }
}
