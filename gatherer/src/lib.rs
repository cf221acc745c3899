//! # Graylog Gatherer Core
//!
//! Polls the `/system/metrics` REST API of one or more Graylog servers and turns
//! the nested metric documents into flat `(measurement, fields, tags)` records.
//!
//! ## Architecture
//!
//! - **`http_client`**: `HttpClient` trait and the lazily configured `reqwest` adapter
//! - **`settings`**: Servers, credentials, TLS options and timeouts of a gather cycle
//! - **`metrics`**: Wire types, the flattening algorithm and the `Accumulator` boundary
//! - **`collectors`**: Per-endpoint gatherer and the fan-out `Orchestrator`
//!
//! ## Gather cycle
//!
//! The orchestrator spawns one task per server. Each task sends one request
//! (`POST` with the metric list for `multiple` endpoints, `GET` otherwise),
//! checks for `200 OK`, parses the JSON body, flattens every metric and hands it
//! to the accumulator. Failures are collected per server and returned together
//! once every task has finished.

#[macro_use]
extern crate tracing;

pub mod collectors;
mod error;
pub mod http_client;
pub mod metrics;
pub mod settings;

pub use collectors::*;
pub use error::{
    GatherError,
    GatherErrors,
};
pub use http_client::{
    HttpClient,
    HttpResponse,
    HttpTimeouts,
    ReqwestHttpClient,
    TlsOptions,
};
pub use metrics::*;
pub use settings::{
    GraylogSettings,
    ServerSpec,
};
