use cityposter_application::infrastructure_config::{Config, FetchConfig, PosterConfig};
use tracing::info;

pub fn print_api_info(config: &Config) {
    print_api_documentation_info(config);
    print_configuration_info(config);
}

fn print_api_documentation_info(config: &Config) {
    let base_url = format!("http://{}", config.server_address());
    info!("📋 API Documentation:");
    info!("  📖 Swagger UI: {}/docs", base_url);
    info!("  📄 OpenAPI JSON: {}/api-docs/openapi.json", base_url);
}

fn print_configuration_info(config: &Config) {
    info!("⚙️  Configuration:");
    info!("  📦 Cache directory: {}", config.cache.dir);
    info!(
        "  🌍 Providers: {} (geocoding), {} (features)",
        config.provider.nominatim_url, config.provider.overpass_url
    );
    print_fetch_configuration(&config.fetch);
    print_poster_configuration(&config.posters);
}

fn print_fetch_configuration(fetch: &FetchConfig) {
    info!(
        "  🚦 Fetch: {} concurrent, delays streets {}ms / features {}ms / geocode {}ms / boundary {}ms",
        fetch.max_concurrent_fetches,
        fetch.streets_delay_ms,
        fetch.features_delay_ms,
        fetch.geocode_delay_ms,
        fetch.boundary_delay_ms
    );
}

fn print_poster_configuration(posters: &PosterConfig) {
    info!(
        "  🎨 Themes: {} (default {}), output: {}",
        posters.themes_dir, posters.default_theme, posters.output_dir
    );
    info!(
        "  📐 Canvas: {}x{} cm, dpi {}..={}, raster cap {} MP",
        posters.default_width_cm,
        posters.default_height_cm,
        posters.min_dpi,
        posters.max_dpi,
        posters.max_raster_megapixels
    );
}
