//! # Graylog Gatherer
//!
//! Polls the metrics REST API of Graylog servers on a fixed interval, flattens
//! the nested metric documents and prints them as a table, JSON or InfluxDB
//! line protocol.
//!
//! ## Usage
//!
//! ```bash
//! # Poll two servers every 30 seconds
//! graylog-gatherer --server=http://graylog-1:12900/system/metrics/multiple \
//!                  --server=http://graylog-2:12900/system/metrics/namespace/jvm \
//!                  --metric=jvm.cl.loaded \
//!                  --username=admin --password=secret \
//!                  --interval=30s
//!
//! # Gather once and export the records as JSON
//! graylog-gatherer --config=graylog.yaml --once --output-file=metrics.json
//! ```

#[macro_use]
extern crate tracing;

mod app;
mod logging;
mod render;

pub use app::App;
use eyre::Result;
pub use graylog_gatherer_config::{
    Args,
    Config,
    SAMPLE_CONFIG,
};

pub fn init_errors() -> Result<()> {
    color_eyre::install()
}

pub fn init_logging(verbose: bool) -> Result<()> {
    logging::log_init(verbose)
}
