use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::domain::interaction::InteractionRecord;

pub const CSV_COLUMNS: [&str; 12] = [
    "timestamp",
    "session_id",
    "user_question",
    "tool_selected",
    "expected_tool",
    "tool_match",
    "tool_args",
    "tool_result",
    "response_time_seconds",
    "success",
    "response_length",
    "error",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write export file `{path}`: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("could not encode tool payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Writes one row per record under a header row; returns the row count.
pub fn write_csv(records: &[InteractionRecord], path: &Path) -> Result<usize, ExportError> {
    let io_error = |source| ExportError::Io { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    write_rows(records, &mut writer, path)?;
    writer.flush().map_err(io_error)?;

    Ok(records.len())
}

/// Writes the header and rows to `writer`; `path` names the destination in
/// I/O errors.
pub fn write_rows<W: Write>(
    records: &[InteractionRecord],
    writer: &mut W,
    path: &Path,
) -> Result<(), ExportError> {
    let to_io = |source| ExportError::Io { path: path.to_path_buf(), source };

    writeln!(writer, "{}", CSV_COLUMNS.join(",")).map_err(to_io)?;
    for record in records {
        let row = flatten(record)?;
        let cells = row.iter().map(|cell| escape_cell(cell)).collect::<Vec<_>>();
        writeln!(writer, "{}", cells.join(",")).map_err(to_io)?;
    }
    Ok(())
}

fn flatten(record: &InteractionRecord) -> Result<[String; 12], serde_json::Error> {
    let tool_result = record.tool_result.as_ref().map(serde_json::to_value).transpose()?;

    Ok([
        record.timestamp.to_rfc3339(),
        record.session_id.to_string(),
        record.user_question.clone(),
        record.tool_selected.clone().unwrap_or_default(),
        record.expected_tool.clone().unwrap_or_default(),
        record.tool_match.map(|matched| matched.to_string()).unwrap_or_default(),
        json_cell(record.tool_args.as_ref()),
        json_cell(tool_result.as_ref()),
        format!("{:.3}", record.response_time_seconds),
        record.success.to_string(),
        record.response_length.to_string(),
        record.error.clone().unwrap_or_default(),
    ])
}

fn json_cell(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
