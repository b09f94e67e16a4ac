use anyhow::{bail, Context, Result};
// Use anyhow::Result as standard Result for service layer
use std::path::{Path, PathBuf};

// --- Declare modules ---
pub mod calendar;
mod config;
pub mod db;
pub mod export;
pub mod scheduler;
pub mod store;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util,
    load_config as load_config_util,
    parse_color,
    save_config as save_config_util,
    Config,
    ConfigError,
    ReminderConfig,
    StandardColor,
    ThemeConfig,
};

pub use calendar::{build_month, GridCell, MonthGrid, ParseYearMonthError, YearMonth};
pub use db::{
    get_db_path as get_db_path_util,
    Error as DbError,
    NewWorkout,
    Workout,
    DATE_FORMAT,
};
pub use export::{ExportError, CSV_HEADER, EXPORT_FILE_NAME};
pub use scheduler::{
    FileJobScheduler, JobScheduler, ScheduledJob, SchedulerError, DAILY_REMINDER_JOB,
};
pub use store::{Observer, SubscriptionId, WorkoutStore};

/// Service layer tying the durable store and the configuration together.
/// Front-ends (the CLI binary here, a GUI elsewhere) talk to this and to
/// nothing below it.
pub struct AppService {
    pub config: Config,
    pub store: WorkoutStore,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Initializes the application service.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or
    /// initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load_config(&config_path)
            .context(format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;
        let store = WorkoutStore::new(conn).context("Failed to initialize database schema")?;

        Ok(Self {
            config,
            store,
            db_path,
            config_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save_config(&self.config_path, &self.config)
    }

    // --- Workout operations ---

    /// Adds a workout entry and returns the stored record with its fresh id.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError::InvalidDate` for a bad
    /// date, or storage variants if the insert fails.
    pub fn add_workout(&mut self, fields: &NewWorkout) -> Result<Workout> {
        self.store
            .add(fields)
            .context("Failed to add workout")
            .map_err(Into::into)
    }

    /// Deletes a workout entry by id, returning how many rows were removed
    /// (0 when the id was absent; that is not an error).
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants on storage failure.
    pub fn delete_workout(&mut self, id: i64) -> Result<usize> {
        self.store
            .delete(id)
            .with_context(|| format!("Failed to delete workout ID {id}"))
            .map_err(Into::into)
    }

    /// Lists all workout entries in insertion order.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants.
    pub fn list_workouts(&self) -> Result<Vec<Workout>> {
        self.store
            .list_all()
            .context("Failed to list workouts")
            .map_err(Into::into)
    }

    /// Registers an observer on the workout collection (initial replay plus
    /// one snapshot per mutation).
    /// # Errors
    /// Returns `anyhow::Error` if the initial snapshot cannot be read.
    pub fn subscribe(&mut self, observer: Observer) -> Result<SubscriptionId> {
        self.store
            .subscribe(observer)
            .context("Failed to subscribe to workout updates")
            .map_err(Into::into)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }

    // --- Calendar ---

    /// Builds the display grid for a month from the current date-set
    /// snapshot.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants if the snapshot
    /// cannot be read.
    pub fn build_month(&self, month: YearMonth) -> Result<MonthGrid> {
        let dates = self
            .store
            .date_set()
            .context("Failed to read workout dates")?;
        Ok(calendar::build_month(month, &dates))
    }

    // --- Export ---

    /// Exports the whole journal as CSV, returning the destination path.
    /// Takes a snapshot first, so the write never holds up the store.
    /// # Errors
    /// Returns `anyhow::Error` wrapping `DbError` variants (snapshot) or
    /// `ExportError` (file write).
    pub fn export_csv(&self, dest: Option<PathBuf>) -> Result<PathBuf> {
        let workouts = self.list_workouts()?;
        let path = match dest {
            Some(p) => p,
            None => export::default_export_path()
                .context("Failed to determine export destination")?,
        };
        export::export_to_file(&path, &workouts)
            .with_context(|| format!("Failed to write CSV export to {path:?}"))?;
        Ok(path)
    }

    // --- Reminder ---

    /// Enables the daily reminder: persists the setting, then schedules the
    /// keyed job (replacing any pending one).
    /// # Errors
    /// - `ConfigError::InvalidReminderTime` for an out-of-range time,
    ///   rejected before any state change.
    /// - `ConfigError` / `SchedulerError` variants if saving or scheduling
    ///   fails.
    pub fn enable_reminder(
        &mut self,
        scheduler: &dyn JobScheduler,
        hour: u32,
        minute: u32,
    ) -> Result<()> {
        if hour > 23 || minute > 59 {
            bail!(ConfigError::InvalidReminderTime { hour, minute });
        }
        self.config.reminder = ReminderConfig {
            enabled: true,
            hour,
            minute,
        };
        self.save_config()
            .context("Failed to save reminder settings")?;
        scheduler
            .schedule_daily(hour, minute, DAILY_REMINDER_JOB)
            .context("Failed to schedule daily reminder")?;
        Ok(())
    }

    /// Disables the daily reminder: persists the setting, then cancels the
    /// keyed job. Cancelling when nothing is pending is fine.
    /// # Errors
    /// Returns `ConfigError` / `SchedulerError` variants if saving or
    /// cancelling fails.
    pub fn disable_reminder(&mut self, scheduler: &dyn JobScheduler) -> Result<()> {
        self.config.reminder.enabled = false;
        self.save_config()
            .context("Failed to save reminder settings")?;
        scheduler
            .cancel(DAILY_REMINDER_JOB)
            .context("Failed to cancel daily reminder")?;
        Ok(())
    }
}
