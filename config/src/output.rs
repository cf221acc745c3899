use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// How the records of a gather cycle are printed.
#[derive(
    Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// A table per measurement
    #[default]
    Table,
    /// Pretty printed JSON array of records
    Json,
    /// InfluxDB line protocol
    Line,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;
    use strum::IntoEnumIterator as _;

    #[test]
    fn string_forms_round_trip() {
        for format in OutputFormat::iter() {
            assert_eq!(OutputFormat::from_str(&format.to_string()).unwrap(), format);
        }
        assert_eq!(OutputFormat::Line.to_string(), "line");
    }
}
