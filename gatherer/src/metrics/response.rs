//! Wire types of the Graylog `/system/metrics` REST API.

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

/// Body of a `multiple` request, naming the metrics to return.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRequest<'a> {
    pub metrics: &'a [String],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseMetrics {
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub metric_type: String,
    /// Nested mapping of field name to a number or a further mapping.
    #[serde(default, rename = "metric")]
    pub fields: Map<String, Value>,
}
