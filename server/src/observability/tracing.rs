use std::{error::Error, io::stdout};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cityposter_application::infrastructure_config::{Config, LogFormat};

const NOISY_DEPENDENCIES: [&str; 4] = ["hyper_util", "reqwest", "rustls", "h2"];

/// Directive used when `RUST_LOG` is unset: the configured level for our
/// crates, `warn` for HTTP client internals.
pub fn default_directive(level: &str) -> String {
    NOISY_DEPENDENCIES
        .iter()
        .fold(level.to_string(), |directive, target| {
            format!("{directive},{target}=warn")
        })
}

pub fn setup_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.logging.level)));

    match config.logging.format {
        LogFormat::Json => {
            let formatting_layer = BunyanFormattingLayer::new("cityposter".to_string(), stdout);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .init();
        }
        LogFormat::Pretty => {
            let format = fmt::format().with_target(true).compact();

            let mut subscriber = tracing_subscriber::fmt()
                .event_format(format)
                .with_env_filter(env_filter);

            if config.logging.include_location {
                subscriber = subscriber.with_file(true).with_line_number(true);
            }

            subscriber.init();
        }
    }

    Ok(())
}
