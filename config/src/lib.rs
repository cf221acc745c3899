//! # Configuration
//!
//! Layered configuration of the gatherer, lowest precedence first:
//!
//! 1. the embedded `default-config.yaml`
//! 2. `config.yaml` in the config directory, or the file passed with `--config`
//! 3. `GRAYLOG_GATHERER_*` environment variables (`servers` and `metrics` are comma separated)
//! 4. command line arguments

#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod output;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use eyre::{
    ensure,
    Result,
};
use graylog_gatherer_core::{
    GraylogSettings,
    HttpTimeouts,
    ServerSpec,
    TlsOptions,
};
pub use output::OutputFormat;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

pub(crate) const ENV_PREFIX: &str = "GRAYLOG_GATHERER";

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

/// Documented example configuration, printed by `--sample-config`.
pub const SAMPLE_CONFIG: &str = include_str!("sample-config.yaml");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    #[serde(default)]
    pub servers: Vec<ServerSpec>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_ca: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_cert: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_key: Option<PathBuf>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    #[serde(with = "humantime_serde")]
    pub response_header_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default)]
    pub output: OutputFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub once: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Load the configuration for `args`, reading `--config` or the default config file.
    pub fn new(args: &Args) -> Result<Self, config::ConfigError> {
        let config_dir = get_config_dir();
        let file = match &args.config {
            Some(path) => ConfigFile::Required(path.clone()),
            None => ConfigFile::Optional(config_dir.join("config.yaml")),
        };
        Self::load(args, file, &config_dir)
    }

    fn load(args: &Args, file: ConfigFile, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let (path, required) = match file {
            ConfigFile::Required(path) => (path, true),
            ConfigFile::Optional(path) => (path, false),
        };
        debug!(path = %path.display(), required, "Loading config file");
        builder = builder.add_source(
            config::File::from(path)
                .format(config::FileFormat::Yaml)
                .required(required),
        );

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("servers")
                .with_list_parse_key("metrics"),
        );

        builder = builder.add_source(args.clone());

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// Reject configurations that cannot run a single gather cycle.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.servers.is_empty(), "No servers configured, add at least one to `servers`");
        ensure!(!self.interval.is_zero(), "`interval` must be greater than zero");
        ensure!(!self.timeout.is_zero(), "`timeout` must be greater than zero");
        if self.ssl_cert.is_some() != self.ssl_key.is_some() {
            warn!("`ssl_cert` and `ssl_key` must be set together, the client certificate is ignored");
        }
        Ok(())
    }

    /// The part of the configuration a gather cycle works with.
    pub fn graylog_settings(&self) -> GraylogSettings {
        GraylogSettings {
            servers: self.servers.clone(),
            metrics: self.metrics.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            tls: TlsOptions {
                ssl_ca: self.ssl_ca.clone(),
                ssl_cert: self.ssl_cert.clone(),
                ssl_key: self.ssl_key.clone(),
                insecure_skip_verify: self.insecure_skip_verify,
            },
            timeouts: HttpTimeouts {
                response_header: self.response_header_timeout,
                request: self.timeout,
            },
        }
    }
}

enum ConfigFile {
    Required(PathBuf),
    Optional(PathBuf),
}
