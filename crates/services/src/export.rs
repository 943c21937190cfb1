//! Spreadsheet export of progress entries.

use std::io;

use chrono::SecondsFormat;
use progress_core::model::LearningProgress;

pub const EXPORT_HEADER: [&str; 4] = ["Title", "Description", "Category", "Date"];

/// Write `entries` as RFC 4180 CSV with a header row, returning the number of
/// data rows. Dates are RFC 3339 UTC with millisecond precision.
///
/// # Errors
///
/// Returns `csv::Error` if the underlying writer fails.
pub fn write_csv<W: io::Write>(
    entries: &[LearningProgress],
    writer: W,
) -> Result<usize, csv::Error> {
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    out.write_record(EXPORT_HEADER)?;
    for entry in entries {
        let date = entry.date().to_rfc3339_opts(SecondsFormat::Millis, true);
        out.write_record([
            entry.title(),
            entry.description(),
            entry.category(),
            date.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(entries.len())
}
