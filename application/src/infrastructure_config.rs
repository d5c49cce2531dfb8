use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use domain::fetch_spec::NetworkType;
use domain::poster::{MAX_DPI, MIN_DPI};
use domain::theme::validate_theme_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub provider: ProviderConfig,
    pub fetch: FetchConfig,
    pub posters: PosterConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub network_type: NetworkType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub max_concurrent_fetches: usize,
    pub streets_delay_ms: u64,
    pub features_delay_ms: u64,
    pub geocode_delay_ms: u64,
    pub boundary_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterConfig {
    pub themes_dir: String,
    pub output_dir: String,
    pub default_theme: String,
    pub default_distance_m: u32,
    pub default_width_cm: f64,
    pub default_height_cm: f64,
    pub min_dpi: u32,
    pub max_dpi: u32,
    pub max_raster_megapixels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                cors_origin: None,
            },
            cache: CacheConfig {
                dir: "cache".to_string(),
            },
            provider: ProviderConfig {
                nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
                overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
                user_agent: "city_map_poster".to_string(),
                request_timeout_secs: 180,
                network_type: NetworkType::Drive,
            },
            fetch: FetchConfig {
                max_concurrent_fetches: 3,
                streets_delay_ms: 300,
                features_delay_ms: 200,
                geocode_delay_ms: 500,
                boundary_delay_ms: 200,
            },
            posters: PosterConfig {
                themes_dir: "themes".to_string(),
                output_dir: "temp_outputs".to_string(),
                default_theme: "feature_based".to_string(),
                default_distance_m: 29_000,
                default_width_cm: 30.48,
                default_height_cm: 40.64,
                min_dpi: MIN_DPI,
                max_dpi: MAX_DPI,
                max_raster_megapixels: 64,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
            environment: EnvironmentConfig {
                env: "development".to_string(),
            },
        }
    }
}

fn validate_http_url(name: &str, value: &str) -> AppResult<()> {
    let parsed = url::Url::parse(value).map_err(|e| AppError::ConfigError {
        message: format!("{name} is not a valid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::ConfigError {
            message: format!("{name} must use http or https"),
        });
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "server host cannot be empty".to_string(),
            });
        }

        if self.cache.dir.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "cache dir cannot be empty".to_string(),
            });
        }

        validate_http_url("nominatim_url", &self.provider.nominatim_url)?;
        validate_http_url("overpass_url", &self.provider.overpass_url)?;

        if self.provider.user_agent.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "user_agent cannot be empty".to_string(),
            });
        }

        if self.provider.request_timeout_secs == 0 {
            return Err(AppError::ConfigError {
                message: "request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if !(1..=3).contains(&self.fetch.max_concurrent_fetches) {
            return Err(AppError::ConfigError {
                message: "max_concurrent_fetches must be between 1 and 3".to_string(),
            });
        }

        if self.posters.themes_dir.trim().is_empty() || self.posters.output_dir.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "themes_dir and output_dir cannot be empty".to_string(),
            });
        }

        validate_theme_id(&self.posters.default_theme).map_err(|e| AppError::ConfigError {
            message: format!("default_theme is invalid: {e}"),
        })?;

        if self.posters.default_distance_m == 0 {
            return Err(AppError::ConfigError {
                message: "default_distance_m must be greater than 0".to_string(),
            });
        }

        if self.posters.default_width_cm <= 0.0 || self.posters.default_height_cm <= 0.0 {
            return Err(AppError::ConfigError {
                message: "default poster size must be positive".to_string(),
            });
        }

        if self.posters.min_dpi == 0 || self.posters.min_dpi > self.posters.max_dpi {
            return Err(AppError::ConfigError {
                message: "min_dpi must be > 0 and <= max_dpi".to_string(),
            });
        }

        if self.posters.max_raster_megapixels == 0 {
            return Err(AppError::ConfigError {
                message: "max_raster_megapixels must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
