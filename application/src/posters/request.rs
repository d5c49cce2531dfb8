use domain::coords::GeoPoint;
use domain::poster::{CanvasSpec, OutputFormat, Quality, SizeUnit, resolve_dpi};
use domain::theme::ThemeSpec;

use crate::config::PosterDefaults;
use crate::error::{AppError, AppResult};

pub const CUSTOM_LOCATION_LABEL: &str = "Custom Location";

/// Raw poster parameters as submitted by a client.
#[derive(Debug, Clone, Default)]
pub struct PosterRequest {
    pub city: Option<String>,
    pub country: Option<String>,
    pub subdistrict: Option<String>,
    pub use_coordinates: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub custom_city: Option<String>,
    pub custom_country: Option<String>,
    pub use_delineation: bool,
    pub theme: Option<String>,
    pub custom_theme: Option<ThemeSpec>,
    pub all_themes: bool,
    pub distance_m: Option<u32>,
    pub format: Option<String>,
    pub quality: Option<Quality>,
    pub dpi: Option<u32>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: SizeUnit,
    pub clean: bool,
    pub show_boundary_edge: Option<bool>,
    pub transparent_bg: bool,
}

/// Where the map comes from. Exactly one source is chosen per request.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates {
        point: GeoPoint,
        city_label: String,
        country_label: String,
    },
    Subdistrict {
        name: String,
    },
    CityBoundary {
        city: String,
        country: String,
    },
    CountryBoundary {
        country: String,
    },
    Geocode {
        city: String,
        country: String,
    },
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// First matching rule wins: explicit coordinates, subdistrict, city boundary
/// (delineation), country only, then city and country geocoding.
pub fn resolve_location(request: &PosterRequest) -> AppResult<LocationQuery> {
    if request.use_coordinates {
        let (Some(lat), Some(lon)) = (request.latitude, request.longitude) else {
            return Err(AppError::InvalidInput {
                message: "Latitude and longitude are required".to_string(),
            });
        };
        let point = GeoPoint::new(lat, lon)?;
        return Ok(LocationQuery::Coordinates {
            point,
            city_label: non_empty(request.custom_city.as_ref())
                .unwrap_or(CUSTOM_LOCATION_LABEL)
                .to_string(),
            country_label: non_empty(request.custom_country.as_ref())
                .unwrap_or_default()
                .to_string(),
        });
    }

    if let Some(name) = non_empty(request.subdistrict.as_ref()) {
        return Ok(LocationQuery::Subdistrict {
            name: name.to_string(),
        });
    }

    let city = non_empty(request.city.as_ref());
    let country = non_empty(request.country.as_ref());
    match (city, country) {
        (Some(city), Some(country)) if request.use_delineation => Ok(LocationQuery::CityBoundary {
            city: city.to_string(),
            country: country.to_string(),
        }),
        (None, Some(country)) => Ok(LocationQuery::CountryBoundary {
            country: country.to_string(),
        }),
        (Some(city), Some(country)) => Ok(LocationQuery::Geocode {
            city: city.to_string(),
            country: country.to_string(),
        }),
        (_, None) => Err(AppError::InvalidInput {
            message: "Provide a subdistrict, a city and country, or a country".to_string(),
        }),
    }
}

/// Name used in download file names, e.g. `Jakarta_Indonesia`.
#[must_use]
pub fn download_location(request: &PosterRequest) -> String {
    let location = if let Some(name) = non_empty(request.subdistrict.as_ref()) {
        name.to_string()
    } else if let Some(name) = non_empty(request.custom_city.as_ref()) {
        name.to_string()
    } else {
        match (
            non_empty(request.city.as_ref()),
            non_empty(request.country.as_ref()),
        ) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (_, Some(country)) => country.to_string(),
            _ => "poster".to_string(),
        }
    };
    location.replace(' ', "_").replace(',', "")
}

#[must_use]
pub fn download_name(location: &str, theme_id: &str, format: OutputFormat) -> String {
    format!("poster_{location}_{theme_id}.{format}")
}

/// Attachment name of the archive bundling every theme of one job.
#[must_use]
pub fn archive_name(location: &str) -> String {
    format!("poster_{location}_all_themes.zip")
}

/// Validated, defaulted form of a [`PosterRequest`].
#[derive(Debug, Clone)]
pub struct PosterPlan {
    pub location: LocationQuery,
    pub canvas: CanvasSpec,
    pub distance_m: u32,
    pub download_location: String,
}

impl PosterPlan {
    pub fn from_request(request: &PosterRequest, defaults: &PosterDefaults) -> AppResult<Self> {
        let format = request
            .format
            .as_deref()
            .map(str::parse::<OutputFormat>)
            .transpose()
            .map_err(|e| AppError::InvalidInput {
                message: e.to_string(),
            })?
            .unwrap_or_default();

        let width_cm = request.unit.to_cm(request.width.unwrap_or(defaults.width_cm));
        let height_cm = request
            .unit
            .to_cm(request.height.unwrap_or(defaults.height_cm));
        let dpi = resolve_dpi(request.dpi, request.quality).clamp(defaults.min_dpi, defaults.max_dpi);

        let mut canvas = CanvasSpec::new(width_cm, height_cm, dpi, format)?;
        canvas.dpi = dpi;
        canvas.clean = request.clean;
        canvas.show_boundary_edge = request.show_boundary_edge.unwrap_or(true);
        canvas.transparent_bg = request.transparent_bg;

        let distance_m = request.distance_m.unwrap_or(defaults.distance_m);
        if distance_m == 0 {
            return Err(AppError::InvalidInput {
                message: "Map distance must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            location: resolve_location(request)?,
            canvas,
            distance_m,
            download_location: download_location(request),
        })
    }
}
