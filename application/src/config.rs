use std::time::Duration;

use crate::infrastructure_config::Config;
use domain::fetch_spec::NetworkType;

/// Knobs of the fetch layer, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub max_concurrent_fetches: usize,
    pub network_type: NetworkType,
    pub streets_delay: Duration,
    pub features_delay: Duration,
    pub geocode_delay: Duration,
    pub boundary_delay: Duration,
}

impl FetchSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_fetches: config.fetch.max_concurrent_fetches,
            network_type: config.provider.network_type,
            streets_delay: Duration::from_millis(config.fetch.streets_delay_ms),
            features_delay: Duration::from_millis(config.fetch.features_delay_ms),
            geocode_delay: Duration::from_millis(config.fetch.geocode_delay_ms),
            boundary_delay: Duration::from_millis(config.fetch.boundary_delay_ms),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Values applied when a poster request leaves a field out.
#[derive(Debug, Clone)]
pub struct PosterDefaults {
    pub theme: String,
    pub distance_m: u32,
    pub width_cm: f64,
    pub height_cm: f64,
    pub min_dpi: u32,
    pub max_dpi: u32,
}

impl PosterDefaults {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: config.posters.default_theme.clone(),
            distance_m: config.posters.default_distance_m,
            width_cm: config.posters.default_width_cm,
            height_cm: config.posters.default_height_cm,
            min_dpi: config.posters.min_dpi,
            max_dpi: config.posters.max_dpi,
        }
    }
}

impl Default for PosterDefaults {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
