use cityposter_application::posters::request::PosterRequest;
use domain::poster::{Quality, SizeUnit};
use domain::theme::ThemeSpec;
use serde::Deserialize;
#[cfg(feature = "docs")]
use utoipa::ToSchema;
use validator::Validate;

/// Poster submission body. The short Indonesian keys used by the legacy web
/// form (`kota`, `negara`, `kecamatan`, `tema`, `skala`) are accepted as aliases.
#[cfg_attr(feature = "docs", derive(ToSchema))]
#[cfg_attr(feature = "docs", schema(
    description = "Poster generation request. Location precedence: coordinates, subdistrict, city boundary (use_delineation), country only, then city and country geocoding.",
    example = json!({
        "city": "Paris",
        "country": "France",
        "theme": "noir",
        "distance": 12000,
        "format": "png",
        "quality": "high",
        "width": 30,
        "height": 40,
        "unit": "cm"
    })
))]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreatePosterRequest {
    #[serde(alias = "kota")]
    #[validate(length(max = 200))]
    pub city: Option<String>,
    #[serde(alias = "negara")]
    #[validate(length(max = 200))]
    pub country: Option<String>,
    #[serde(alias = "kecamatan")]
    #[validate(length(max = 200))]
    pub subdistrict: Option<String>,
    pub use_coordinates: bool,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 200))]
    pub custom_city: Option<String>,
    #[validate(length(max = 200))]
    pub custom_country: Option<String>,
    pub use_delineation: bool,
    #[serde(alias = "tema")]
    #[validate(length(min = 1, max = 64))]
    pub theme: Option<String>,
    pub custom_theme: Option<ThemeSpec>,
    pub all_themes: bool,
    /// Map radius in metres.
    #[serde(alias = "skala")]
    #[cfg_attr(feature = "docs", schema(example = 29000))]
    #[validate(range(min = 100, max = 200_000))]
    pub distance: Option<u32>,
    #[cfg_attr(feature = "docs", schema(example = "png"))]
    pub format: Option<String>,
    pub quality: Option<Quality>,
    #[validate(range(min = 1, max = 10_000))]
    pub dpi: Option<u32>,
    #[validate(range(exclusive_min = 0.0, max = 10_000.0))]
    pub width: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 10_000.0))]
    pub height: Option<f64>,
    pub unit: SizeUnit,
    pub clean: bool,
    pub show_boundary_edge: Option<bool>,
    pub transparent_bg: bool,
}

/// Query of the file routes. `index` stays a string so that a non-integer
/// value selects the first file instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactQuery {
    pub index: Option<String>,
}

impl ArtifactQuery {
    #[must_use]
    pub fn index(&self) -> i64 {
        self.index
            .as_deref()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }
}

impl From<CreatePosterRequest> for PosterRequest {
    fn from(body: CreatePosterRequest) -> Self {
        Self {
            city: body.city,
            country: body.country,
            subdistrict: body.subdistrict,
            use_coordinates: body.use_coordinates,
            latitude: body.latitude,
            longitude: body.longitude,
            custom_city: body.custom_city,
            custom_country: body.custom_country,
            use_delineation: body.use_delineation,
            theme: body.theme,
            custom_theme: body.custom_theme,
            all_themes: body.all_themes,
            distance_m: body.distance,
            format: body.format,
            quality: body.quality,
            dpi: body.dpi,
            width: body.width,
            height: body.height,
            unit: body.unit,
            clean: body.clean,
            show_boundary_edge: body.show_boundary_edge,
            transparent_bg: body.transparent_bg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("/api/download/x", 0)]
    #[case("/api/download/x?index=2", 2)]
    #[case("/api/download/x?foo=bar&index=-1", -1)]
    #[case("/api/download/x?index=%31", 1)]
    #[case("/api/download/x?index=+3", 3)]
    #[case("/api/download/x?index=abc", 0)]
    #[case("/api/download/x?index=", 0)]
    fn artifact_index_is_decoded_and_lenient(#[case] uri: &str, #[case] expected: i64) {
        let uri: Uri = uri.parse().expect("valid uri");
        let Query(query) = Query::<ArtifactQuery>::try_from_uri(&uri).expect("query parses");

        assert_eq!(query.index(), expected);
    }

    #[test]
    fn legacy_form_keys_are_accepted() {
        let body: CreatePosterRequest = serde_json::from_value(json!({
            "kota": "Bandung",
            "negara": "Indonesia",
            "tema": "noir",
            "skala": 15000,
            "unit": "mm"
        }))
        .expect("legacy body parses");

        let request = PosterRequest::from(body);

        assert_eq!(request.city.as_deref(), Some("Bandung"));
        assert_eq!(request.country.as_deref(), Some("Indonesia"));
        assert_eq!(request.theme.as_deref(), Some("noir"));
        assert_eq!(request.distance_m, Some(15000));
        assert_eq!(request.unit, SizeUnit::Mm);
        assert!(!request.use_coordinates);
    }

    #[test]
    fn out_of_range_coordinates_fail_validation() {
        let body = CreatePosterRequest {
            use_coordinates: true,
            latitude: Some(91.0),
            longitude: Some(10.0),
            ..CreatePosterRequest::default()
        };

        let errors = body.validate().expect_err("latitude out of range");
        assert!(errors.field_errors().contains_key("latitude"));
    }

    #[test]
    fn zero_width_fails_validation() {
        let body = CreatePosterRequest {
            width: Some(0.0),
            ..CreatePosterRequest::default()
        };

        assert!(body.validate().is_err());
    }
}
