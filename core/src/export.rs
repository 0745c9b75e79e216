use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::Entry;

pub const CSV_HEADERS: [&str; 10] = [
    "Date",
    "Time",
    "User",
    "State",
    "Glucose",
    "Ketones",
    "Ratio",
    "Weight",
    "Body Fat %",
    "Blood Pressure",
];

pub const CSV_MIME: &str = "text/csv";

/// A rendered export ready to be written out.
#[derive(Debug, Clone, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub mime: &'static str,
    pub content: String,
}

impl CsvExport {
    /// Write the export into `dir` under its own filename, returning the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write export: {}", path.display()))?;
        Ok(path)
    }
}

/// `metabolic_data_YYYY-MM-DD.csv`
#[must_use]
pub fn export_filename(date: NaiveDate) -> String {
    format!("metabolic_data_{}.csv", date.format("%Y-%m-%d"))
}

/// Render entries in the local timezone, named after today's UTC date.
pub fn export_csv(entries: &[Entry]) -> Result<CsvExport> {
    Ok(CsvExport {
        filename: export_filename(Utc::now().date_naive()),
        mime: CSV_MIME,
        content: render_csv(entries, &Local)?,
    })
}

/// Render entries as CSV text in input order.
///
/// Fields are written verbatim: a comma or newline inside a free-form field
/// such as blood pressure ends up unescaped in the output.
pub fn render_csv<Tz>(entries: &[Entry], tz: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;

    for e in entries {
        let local = e.timestamp.with_timezone(tz);
        wtr.write_record([
            local.format("%-m/%-d/%Y").to_string(),
            local.format("%-I:%M:%S %p").to_string(),
            e.user_id.clone(),
            e.state_label().to_string(),
            e.glucose.to_string(),
            e.ketones.to_string(),
            format!("{:.1}", e.ratio),
            e.weight.to_string(),
            e.body_fat_percentage
                .map(|v| v.to_string())
                .unwrap_or_default(),
            e.blood_pressure.clone().unwrap_or_default(),
        ])
        .with_context(|| format!("Failed to write CSV row for entry {}", e.id))?;
    }

    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    let mut text = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
