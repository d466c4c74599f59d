use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};

use crate::monitoring::validation;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file {0}")]
    ReadFailed(path::PathBuf),
    #[error("failed to write config file {0}")]
    WriteFailed(path::PathBuf),
    #[error("failed to parse config: {0}")]
    ParseFailed(String),
    #[error("no config directory could be determined")]
    ConfigPathUnavailable,
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where a loaded [`Config`] came from
#[derive(Debug)]
pub enum Origin {
    /// Read from, or freshly written to, this file
    File(path::PathBuf),
    /// The default location was unusable; built-in defaults are in effect
    BuiltIn(Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    Production,
    #[default]
    Development,
}

impl AppEnv {
    /// Anything other than `production` is treated as development.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            AppEnv::Production
        } else {
            AppEnv::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppEnv::Production)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Production => write!(f, "production"),
            AppEnv::Development => write!(f, "development"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: App,
    pub database: Database,
    pub probe: Probe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub env: AppEnv,
    /// Listen address of the HTTP front end.
    pub addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    pub endpoint: String,
    pub expected_status: u16,
    pub timeout_seconds: u64,
    pub interval_seconds: u64,
    /// Start from the state of the newest stored record instead of healthy.
    pub seed_from_store: bool,
}

impl Default for App {
    fn default() -> Self {
        Self { env: AppEnv::Development, addr: "0.0.0.0:3000".into() }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "netpinger.db".into() }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            endpoint: "https://google.com/generate_204".into(),
            expected_status: 204,
            timeout_seconds: 5,
            interval_seconds: 1,
            seed_from_store: false,
        }
    }
}

impl Probe {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_seconds)
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/netpinger/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    default_config_path_in(env::var_os("XDG_CONFIG_HOME").map(path::PathBuf::from), env::home_dir())
}

fn default_config_path_in(
    config_home: Option<path::PathBuf>,
    home_dir: Option<path::PathBuf>,
) -> Result<path::PathBuf, Error> {
    let path = match (config_home, home_dir) {
        (Some(config_home), _) => config_home,
        (None, Some(home_dir)) => home_dir.join(".config"),
        (None, None) => return Err(Error::ConfigPathUnavailable),
    };

    Ok(path.join("netpinger/config.toml"))
}

/// Go-style `:3000` listen addresses bind every interface.
fn normalize_addr(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Configuration:")?;
        write_title_1(f, "App")?;
        write_1(f, "Environment", &self.app.env)?;
        write_1(f, "Listen Address", &self.app.addr)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_title_1(f, "Probe")?;
        write_1(f, "Endpoint", &self.probe.endpoint)?;
        write_1(f, "Expected Status", &self.probe.expected_status)?;
        write_1(f, "Timeout (s)", &self.probe.timeout_seconds)?;
        write_1(f, "Interval (s)", &self.probe.interval_seconds)?;
        write_1(f, "Seed From Store", &self.probe.seed_from_store)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/netpinger/config.toml
    /// or the specified path if one does not exist. An explicit path must be
    /// usable; when the default location cannot be written, the built-in
    /// defaults are returned so the environment alone can configure the
    /// service.
    ///
    /// ```rust,no_run
    /// # use std::path;
    /// let cfg = netpinger_service::config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), netpinger_service::config::Error>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        Self::load(optional_path).map(|(config, _origin)| config)
    }

    /// Like [`Config::from_config`], also reporting where the values came from
    pub fn load(optional_path: Option<impl AsRef<path::Path>>) -> Result<(Self, Origin), Error> {
        match optional_path {
            Some(path) => {
                let config_path = normalize_toml_path(path.as_ref());
                let config = Self::load_or_create(&config_path)?;
                Ok((config, Origin::File(config_path)))
            }
            None => Self::load_default(default_config_path()),
        }
    }

    fn load_default(default_path: Result<path::PathBuf, Error>) -> Result<(Self, Origin), Error> {
        let loaded = default_path
            .and_then(|config_path| Ok((Self::load_or_create(&config_path)?, config_path)));
        match loaded {
            Ok((config, config_path)) => Ok((config, Origin::File(config_path))),
            Err(err @ (Error::WriteFailed(_) | Error::ConfigPathUnavailable)) => {
                Ok((Self::default(), Origin::BuiltIn(err)))
            }
            Err(err) => Err(err),
        }
    }

    fn load_or_create(config_path: &path::Path) -> Result<Self, Error> {
        if config_path.exists() {
            let raw_string = fs::read_to_string(config_path)
                .map_err(|_err| Error::ReadFailed(config_path.to_path_buf()))?;
            Self::from_toml(&raw_string)
        } else {
            let config = Self::default();
            config.write_config(config_path)?;
            Ok(config)
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self, Error> {
        toml::from_str(raw).map_err(|err| Error::ParseFailed(err.to_string()))
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|err| Error::ParseFailed(err.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_err| Error::WriteFailed(path.to_path_buf()))?;
        }

        std::fs::write(path, config_str).map_err(|_err| Error::WriteFailed(path.to_path_buf()))
    }

    /// Apply `APP_ENV`, `APP_ADDR` and `APP_DB` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup, keyed like the environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_env) = lookup("APP_ENV") {
            self.app.env = AppEnv::from_name(&app_env);
        }
        if let Some(addr) = lookup("APP_ADDR").filter(|v| !v.trim().is_empty()) {
            self.app.addr = addr;
        }
        if let Some(db) = lookup("APP_DB").filter(|v| !v.trim().is_empty()) {
            self.database.path = db;
        }
        self.app.addr = normalize_addr(&self.app.addr);
    }

    /// Reject values the service cannot start with.
    pub fn validate(&self) -> Result<(), Error> {
        validation::validate_endpoint(&self.probe.endpoint)
            .map_err(|err| Error::Invalid { field: "probe.endpoint", reason: format!("{err:#}") })?;
        validation::validate_expected_status(self.probe.expected_status).map_err(|err| {
            Error::Invalid { field: "probe.expected_status", reason: format!("{err:#}") }
        })?;
        validation::validate_timeout(self.probe.timeout_seconds).map_err(|err| {
            Error::Invalid { field: "probe.timeout_seconds", reason: format!("{err:#}") }
        })?;
        validation::validate_check_interval(self.probe.interval_seconds).map_err(|err| {
            Error::Invalid { field: "probe.interval_seconds", reason: format!("{err:#}") }
        })?;
        if self.database.path.trim().is_empty() {
            return Err(Error::Invalid {
                field: "database.path",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
