#![warn(clippy::all, clippy::pedantic)]

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use logger::{Profile, init_tracing};
use netpinger_service::config::{Config, Origin};
use netpinger_service::database::{self, RecordStore};
use netpinger_service::monitoring::{HttpProber, MonitorLoop, initial_detector};

mod error;
mod routes;

use error::AppError;

/// Records when connectivity to a probe endpoint changes and serves the history.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/netpinger/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tolerate_missing(dotenvy::dotenv())?;
    let cli = Cli::parse();

    let (mut config, origin) = Config::load(cli.config.as_deref())?;
    config.apply_env();
    config.validate()?;

    if cli.print_config {
        print!("{config}");
        return Ok(());
    }

    init_tracing(if config.app.env.is_production() {
        Profile::Production
    } else {
        Profile::Development
    });

    match &origin {
        Origin::File(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        Origin::BuiltIn(reason) => {
            tracing::warn!(reason = %reason, "Config file unusable, running on built-in defaults");
        }
    }

    let addr: SocketAddr = config.app.addr.parse()?;
    let store: Arc<dyn RecordStore> = Arc::new(database::connect(&config.database.path).await?);
    let prober = HttpProber::from_config(&config.probe)?;

    tracing::info!(
        endpoint = %prober.endpoint(),
        expected_status = config.probe.expected_status,
        interval_secs = config.probe.interval_seconds,
        timeout_secs = config.probe.timeout_seconds,
        "Probe configured"
    );

    let detector = initial_detector(store.as_ref(), config.probe.seed_from_store).await;
    let monitor = MonitorLoop::new(Arc::new(prober), Arc::clone(&store), config.probe.interval())
        .with_detector(detector);

    run_server(addr, &config, store, monitor).await
}

/// A missing `.env` is normal; an unreadable or malformed one is not.
fn tolerate_missing<T>(loaded: dotenvy::Result<T>) -> Result<(), dotenvy::Error> {
    match loaded {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Bind the listener, then start probing and serve until the process exits.
///
/// Nothing is probed or recorded if the address cannot be bound.
async fn run_server(
    addr: SocketAddr,
    config: &Config,
    store: Arc<dyn RecordStore>,
    monitor: MonitorLoop,
) -> Result<(), AppError> {
    let data = web::Data::from(store);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::default())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run();

    // Never joined: the loop ends with the process.
    let _monitor = monitor.spawn();

    tracing::info!(addr = %addr, env = %config.app.env, "NetPinger listening");
    server.await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn read_env_file(path: &std::path::Path) -> dotenvy::Result<Vec<(String, String)>> {
        dotenvy::from_path_iter(path)?.collect()
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(tolerate_missing(read_env_file(&dir.path().join(".env"))).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "this is not a dotenv line\n").unwrap();

        let err = tolerate_missing(read_env_file(&path)).unwrap_err();
        assert!(matches!(err, dotenvy::Error::LineParse(..)), "{err:?}");
        assert!(AppError::from(err).to_string().starts_with("Environment file error"));
    }

    #[test]
    fn test_valid_env_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "APP_ADDR=:8080\n").unwrap();

        let vars = read_env_file(&path).unwrap();
        assert_eq!(vars, vec![("APP_ADDR".to_string(), ":8080".to_string())]);
    }
}
