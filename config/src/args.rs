use crate::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Poll Graylog metrics endpoints and print the flattened metrics
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Configuration file (YAML). Defaults to `config.yaml` in the config directory.
    #[clap(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Graylog metrics endpoint to poll. Repeat for several servers.
    #[clap(long = "server", value_name = "URL")]
    pub servers: Vec<String>,

    /// Metric to request from `multiple` endpoints. Repeat for several metrics.
    #[clap(long = "metric", value_name = "NAME")]
    pub metrics: Vec<String>,

    /// User name for basic authentication.
    #[clap(long, value_name = "USER")]
    pub username: Option<String>,

    /// Password for basic authentication.
    #[clap(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Use TLS but skip chain and host verification.
    #[clap(long = "insecure-skip-verify", action)]
    pub insecure_skip_verify: bool,

    /// Time between two gather cycles (e.g. "10s", "1m").
    #[clap(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Run a single gather cycle and exit.
    #[clap(long, action)]
    pub once: bool,

    /// How gathered metrics are printed.
    #[clap(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Also write the records of the last cycle as JSON to this file.
    #[clap(long = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Enables debug logging.
    #[clap(long, short, action)]
    pub verbose: bool,

    /// Print a documented sample configuration and exit.
    #[clap(long = "sample-config", action)]
    pub sample_config: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if !self.servers.is_empty() {
                cache.insert("servers".to_string(), self.servers.clone().into());
            }
            if !self.metrics.is_empty() {
                cache.insert("metrics".to_string(), self.metrics.clone().into());
            }
            if let Some(username) = &self.username {
                cache.insert("username".to_string(), username.clone().into());
            }
            if let Some(password) = &self.password {
                cache.insert("password".to_string(), password.clone().into());
            }
            if self.insecure_skip_verify {
                cache.insert("insecure_skip_verify".to_string(), true.into());
            }
            if let Some(interval) = &self.interval {
                cache.insert("interval".to_string(), interval.clone().into());
            }
            if self.once {
                cache.insert("once".to_string(), true.into());
            }
            if let Some(output) = &self.output {
                cache.insert("output".to_string(), output.to_string().into());
            }
            if let Some(output_file) = &self.output_file {
                cache.insert("output_file".to_string(), output_file.display().to_string().into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let version = clap::crate_version!();
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
{version}
Authors: {author}

Config directory: {config_dir_path}"
    )
}
