//! Rendering of the records of one gather cycle.

use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use graylog_gatherer_config::OutputFormat;
use graylog_gatherer_core::MetricRecord;

pub fn render(records: &[MetricRecord], format: OutputFormat) -> eyre::Result<String> {
    let output = match format {
        OutputFormat::Table => render_table(records),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Line => records
            .iter()
            .map(MetricRecord::to_line_protocol)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(output)
}

fn render_table(records: &[MetricRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if records.is_empty() {
        table.set_header(vec![Cell::new("No metrics gathered").add_attribute(Attribute::Bold)]);
        return table.to_string();
    }

    table.set_header(vec![
        Cell::new("Measurement").add_attribute(Attribute::Bold),
        Cell::new("Tags").add_attribute(Attribute::Bold),
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    for record in records {
        let tags = record
            .tags
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");

        if record.fields.is_empty() {
            table.add_row(vec![
                Cell::new(&record.measurement).fg(Color::Cyan),
                Cell::new(&tags),
                Cell::new("-"),
                Cell::new("-"),
            ]);
            continue;
        }

        for (index, (field, value)) in record.fields.iter().enumerate() {
            let (measurement, tags) = if index == 0 {
                (record.measurement.as_str(), tags.as_str())
            } else {
                ("", "")
            };
            table.add_row(vec![
                Cell::new(measurement).fg(Color::Cyan),
                Cell::new(tags),
                Cell::new(field),
                Cell::new(value),
            ]);
        }
    }

    table.to_string()
}
