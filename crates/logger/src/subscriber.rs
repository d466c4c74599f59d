use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Deployment profile the subscriber is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// INFO and above, one JSON object per line.
    Production,
    /// DEBUG and above, compact human-readable lines.
    Development,
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Compact,
    Pretty,
}

impl Profile {
    pub fn default_level(self) -> LevelFilter {
        match self {
            Profile::Production => LevelFilter::INFO,
            Profile::Development => LevelFilter::DEBUG,
        }
    }

    pub fn default_format(self) -> Format {
        match self {
            Profile::Production => Format::Json,
            Profile::Development => Format::Compact,
        }
    }
}

impl Format {
    /// Parse the value of `RUST_LOG_FORMAT`. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "compact" => Some(Format::Compact),
            "pretty" => Some(Format::Pretty),
            _ => None,
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the profile's default level and `RUST_LOG_FORMAT`
/// overrides its format. Must be called once, before anything logs.
pub fn init_tracing(profile: Profile) {
    let env_filter =
        EnvFilter::builder().with_default_directive(profile.default_level().into()).from_env_lossy();

    let format = var("RUST_LOG_FORMAT")
        .ok()
        .and_then(|value| Format::parse(&value))
        .unwrap_or_else(|| profile.default_format());

    let log_layer = match format {
        Format::Json => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        Format::Compact => tracing_subscriber::fmt::layer().compact().with_filter(env_filter).boxed(),
        Format::Pretty => tracing_subscriber::fmt::layer().pretty().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
