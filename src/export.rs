use std::io::Write;

use anyhow::Context;

use crate::models::AttendanceRecord;

/// Writes records as CSV with a header row. Returns the number of rows written.
pub fn write_records_csv<'a, W, I>(writer: W, records: I) -> anyhow::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0usize;

    for record in records {
        csv_writer
            .serialize(record)
            .with_context(|| format!("failed to write record for {}", record.student_id))?;
        written += 1;
    }

    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(written)
}

pub fn export_to_path<'a, I>(path: &std::path::Path, records: I) -> anyhow::Result<usize>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_records_csv(file, records)
}
