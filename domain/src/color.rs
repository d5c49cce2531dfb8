use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, str::FromStr};
#[cfg(feature = "docs")]
use utoipa::ToSchema;

use crate::error::DomainError;

#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(value_type = String, example = "#1A1A1A"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| {
                DomainError::InvalidColorFormat(format!("Expected '#RRGGBB', got '{s}'"))
            })?;

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => {
                return Err(DomainError::InvalidColorFormat(format!(
                    "Expected 3 or 6 hex digits, got '{s}'"
                )));
            }
        };

        let rgb = u32::from_str_radix(&expanded, 16).map_err(|e| {
            DomainError::InvalidColorFormat(format!("Invalid hex color '{s}': {e}"))
        })?;

        Ok(Self::new(
            u8::try_from((rgb >> 16) & 0xFF).unwrap_or(0),
            u8::try_from((rgb >> 8) & 0xFF).unwrap_or(0),
            u8::try_from(rgb & 0xFF).unwrap_or(0),
        ))
    }
}

impl Serialize for RgbColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
