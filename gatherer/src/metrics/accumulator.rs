//! # Accumulator
//!
//! Boundary to the metrics pipeline. Collectors hand every record they produce
//! to an [`Accumulator`]; what happens to it afterwards is up to the
//! implementation.
//!
//! [`RecordingAccumulator`] keeps the records of one gather cycle in memory so
//! they can be rendered, exported or asserted on.

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    fmt::Write as _,
    sync::{
        Mutex,
        PoisonError,
    },
};

pub type Fields = BTreeMap<String, f64>;
pub type Tags = BTreeMap<String, String>;

/// Receives `(measurement, fields, tags)` records from collectors.
///
/// Called concurrently from every gather task of a cycle.
pub trait Accumulator: Send + Sync {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub measurement: String,
    pub fields: Fields,
    pub tags: Tags,
    pub timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Render the record in InfluxDB line protocol with a nanosecond timestamp.
    ///
    /// Empty tag values are omitted since line protocol has no representation for them.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);
        for (key, value) in self.tags.iter().filter(|(_, value)| !value.is_empty()) {
            let _ = write!(
                line,
                ",{}={}",
                escape(key, &[',', '=', ' ']),
                escape(value, &[',', '=', ' '])
            );
        }

        let fields = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={value}", escape(key, &[',', '=', ' '])))
            .collect::<Vec<_>>()
            .join(",");
        let _ = write!(line, " {fields}");

        if let Some(nanos) = self.timestamp.timestamp_nanos_opt() {
            let _ = write!(line, " {nanos}");
        }
        line
    }
}

fn escape(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Accumulator that stores every record it receives.
#[derive(Debug, Default)]
pub struct RecordingAccumulator {
    records: Mutex<Vec<MetricRecord>>,
}

impl RecordingAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far, in arrival order.
    pub fn records(&self) -> Vec<MetricRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Remove and return all records received so far.
    pub fn take(&self) -> Vec<MetricRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records whose measurement name equals `measurement`.
    pub fn find(&self, measurement: &str) -> Vec<MetricRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.measurement == measurement)
            .collect()
    }
}

impl Accumulator for RecordingAccumulator {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags) {
        trace!(measurement, fields = fields.len(), "accumulator: record added");
        let record = MetricRecord {
            measurement: measurement.to_string(),
            fields,
            tags,
            timestamp: Utc::now(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
