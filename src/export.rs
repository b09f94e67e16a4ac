// src/export.rs
//! CSV export of the whole journal. The header row is a fixed contract and
//! stays unquoted; data rows are always quoted. Embedded quotes are doubled
//! per RFC 4180, which the csv writer handles.

use crate::db::Workout;
use csv::QuoteStyle;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const EXPORT_FILE_NAME: &str = "gym_data.csv";
pub const CSV_HEADER: &str = "Date,Note,Activity,Mood,Music,Weights,Machines";

const APP_DATA_DIR: &str = "gym-log";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error writing export file: {0}")]
    Io(#[from] io::Error),
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Default destination: `gym_data.csv` in the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn default_export_path() -> Result<PathBuf, ExportError> {
    let data_dir = dirs::data_dir().ok_or(ExportError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(EXPORT_FILE_NAME))
}

/// Writes the journal as CSV: the fixed header line, then one always-quoted
/// row per workout with the seven fields in header order.
pub fn write_csv<W: Write>(mut out: W, workouts: &[Workout]) -> Result<(), ExportError> {
    writeln!(out, "{CSV_HEADER}")?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);
    for workout in workouts {
        writer.write_record([
            workout.date.as_str(),
            workout.note.as_str(),
            workout.activity.as_str(),
            workout.mood.as_str(),
            workout.music.as_str(),
            workout.weights.as_str(),
            workout.machines.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the journal to a file, creating or truncating it.
pub fn export_to_file(path: &Path, workouts: &[Workout]) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), workouts)
}
