// src/db.rs
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canonical storage format for workout dates. The same string is used as
/// the calendar join key, so it must stay zero-padded.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DB_FILE_NAME: &str = "gym_log.sqlite";
const APP_DATA_DIR: &str = "gym-log";

/// One logged workout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub id: i64,
    pub date: String,
    pub note: String,
    pub activity: String,
    pub mood: String,
    pub music: String,
    pub weights: String,
    pub machines: String,
}

/// Field values for a workout that has not been stored yet. The store
/// assigns the id and canonicalizes the date on insert.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewWorkout<'a> {
    pub date: &'a str,
    pub note: &'a str,
    pub activity: &'a str,
    pub mood: &'a str,
    pub music: &'a str,
    pub weights: &'a str,
    pub machines: &'a str,
}

// Custom Error type for DB operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Invalid workout date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    Connection::open(path).map_err(Error::Connection)
}

/// Initializes the database tables if they don't exist.
pub fn init_db(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,                -- canonical YYYY-MM-DD
            note TEXT NOT NULL DEFAULT '',
            activity TEXT NOT NULL DEFAULT '',
            mood TEXT NOT NULL DEFAULT '',
            music TEXT NOT NULL DEFAULT '',
            weights TEXT NOT NULL DEFAULT '',
            machines TEXT NOT NULL DEFAULT ''
        )",
        [],
    )
    .map_err(Error::Connection)?;

    Ok(())
}

/// Validates a raw date string and re-renders it in canonical form.
/// Lenient inputs like "2024-2-1" come back zero-padded so the stored
/// value always matches the calendar join key format.
pub fn canonical_date(raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidDate(raw.to_string()));
    }
    let parsed = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(raw.to_string()))?;
    Ok(parsed.format(DATE_FORMAT).to_string())
}

/// Inserts a new workout row. The date is stored verbatim; callers are
/// expected to pass it through `canonical_date` first.
pub fn insert_workout(conn: &Connection, new: &NewWorkout) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO workouts (date, note, activity, mood, music, weights, machines)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new.date,
            new.note,
            new.activity,
            new.mood,
            new.music,
            new.weights,
            new.machines
        ],
    )
    .map_err(Error::InsertFailed)?;

    Ok(conn.last_insert_rowid())
}

/// Deletes a workout row by its ID. Returns the number of rows removed;
/// zero is not an error (deletion is idempotent).
pub fn delete_workout(conn: &Connection, id: i64) -> Result<usize, Error> {
    conn.execute("DELETE FROM workouts WHERE id = ?1", params![id])
        .map_err(Error::DeleteFailed)
}

// Helper function to map a database row to a Workout struct
fn map_row_to_workout(row: &Row) -> Result<Workout, rusqlite::Error> {
    Ok(Workout {
        id: row.get(0)?,
        date: row.get(1)?,
        note: row.get(2)?,
        activity: row.get(3)?,
        mood: row.get(4)?,
        music: row.get(5)?,
        weights: row.get(6)?,
        machines: row.get(7)?,
    })
}

/// Lists the distinct dates with at least one workout recorded, as
/// canonical date strings.
pub fn list_workout_dates(conn: &Connection) -> Result<Vec<String>, Error> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT date FROM workouts ORDER BY date ASC")
        .map_err(Error::QueryFailed)?;
    let date_iter = stmt
        .query_map([], |row| row.get(0))
        .map_err(Error::QueryFailed)?;

    let mut dates = Vec::new();
    for date_result in date_iter {
        dates.push(date_result?);
    }
    Ok(dates)
}

/// Lists all workout rows in insertion order (ids are monotonic, so
/// ordering by id preserves append order).
pub fn list_workouts(conn: &Connection) -> Result<Vec<Workout>, Error> {
    let mut stmt = conn
        .prepare(
            "SELECT id, date, note, activity, mood, music, weights, machines
             FROM workouts ORDER BY id ASC",
        )
        .map_err(Error::QueryFailed)?;
    let workout_iter = stmt
        .query_map([], map_row_to_workout)
        .map_err(Error::QueryFailed)?;

    let mut workouts = Vec::new();
    for workout_result in workout_iter {
        workouts.push(workout_result?);
    }
    Ok(workouts)
}
