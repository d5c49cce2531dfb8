use cityposter_application::error::{AppError, AppResult};
use cityposter_application::infrastructure_config::Config;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use std::fs;
use std::path::Path;
use tracing::info;

const ENV_PREFIX: &str = "CITYPOSTER_";

/// Loads configuration from the working directory.
pub fn load_config() -> AppResult<Config> {
    let base_dir = Path::new(".");
    generate_env_template_if_missing(base_dir)?;
    load_config_from(base_dir)
}

/// Defaults, then `config.toml`, then `config.json`, then `CITYPOSTER_*`
/// variables (`__` separates nested keys).
pub fn load_config_from(base_dir: &Path) -> AppResult<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    let toml_file = base_dir.join("config.toml");
    if toml_file.exists() {
        figment = figment.merge(Toml::file(toml_file));
    }

    let json_file = base_dir.join("config.json");
    if json_file.exists() {
        figment = figment.merge(Json::file(json_file));
    }

    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

fn generate_env_template_if_missing(base_dir: &Path) -> AppResult<()> {
    let env_file = base_dir.join(".env");
    let template_file = base_dir.join(".env.example");

    if env_file.exists() || !template_file.exists() {
        return Ok(());
    }

    fs::copy(&template_file, &env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    info!("Generated .env from template. Adjust it to your environment.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let config = load_config_from(dir.path()).expect("defaults load");

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.fetch.max_concurrent_fetches, 3);
        assert_eq!(config.posters.default_theme, "feature_based");
    }

    #[test]
    fn toml_then_json_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("config.toml"),
            "[server]\nport = 8080\n\n[posters]\ndefault_theme = \"noir\"\n",
        )
        .expect("write toml");
        fs::write(
            dir.path().join("config.json"),
            r#"{ "server": { "port": 9090 }, "fetch": { "max_concurrent_fetches": 2 } }"#,
        )
        .expect("write json");

        let config = load_config_from(dir.path()).expect("layered load");

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.fetch.max_concurrent_fetches, 2);
        assert_eq!(config.posters.default_theme, "noir");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("config.toml"),
            "[fetch]\nmax_concurrent_fetches = 9\n",
        )
        .expect("write toml");

        let error = load_config_from(dir.path()).expect_err("concurrency above 3");
        assert!(matches!(error, AppError::ConfigError { .. }));
    }

    #[test]
    fn env_template_is_copied_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(".env.example"), "CITYPOSTER_SERVER__PORT=5000\n")
            .expect("write template");

        generate_env_template_if_missing(dir.path()).expect("copy template");
        assert_eq!(
            fs::read_to_string(dir.path().join(".env")).expect("env file"),
            "CITYPOSTER_SERVER__PORT=5000\n"
        );

        fs::write(dir.path().join(".env"), "CITYPOSTER_SERVER__PORT=7000\n").expect("edit env");
        generate_env_template_if_missing(dir.path()).expect("keeps existing env");
        assert_eq!(
            fs::read_to_string(dir.path().join(".env")).expect("env file"),
            "CITYPOSTER_SERVER__PORT=7000\n"
        );
    }
}
