use reqwest::StatusCode;
use std::fmt;

/// Failure of a single endpoint during a gather cycle.
#[derive(thiserror::Error, Debug)]
pub enum GatherError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Unable to set up the HTTP transport: {0}")]
    TransportSetup(String),

    #[error("Invalid server URL \"{url}\"")]
    InvalidServerUrl { url: String },

    #[error("Invalid list of Metrics {metrics:?}")]
    InvalidMetrics { metrics: Vec<String> },

    #[error(
        "Response from url \"{url}\" has status code {} ({}), expected {} ({})",
        .status.as_u16(),
        .status.canonical_reason().unwrap_or_default(),
        StatusCode::OK.as_u16(),
        StatusCode::OK.canonical_reason().unwrap_or_default()
    )]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error("Gather task did not complete: {0}")]
    TaskFailed(String),
}

/// All endpoint failures of one gather cycle, in the order they were reported.
///
/// Only ever returned as an `Err` when at least one endpoint failed.
#[derive(Debug, Default)]
pub struct GatherErrors(Vec<GatherError>);

impl GatherErrors {
    pub fn push(&mut self, error: GatherError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GatherError> {
        self.0.iter()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for GatherErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        f.write_str(&messages.join("\n"))
    }
}

impl std::error::Error for GatherErrors {}

impl From<GatherError> for GatherErrors {
    fn from(error: GatherError) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<GatherError> for GatherErrors {
    fn from_iter<T: IntoIterator<Item = GatherError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
