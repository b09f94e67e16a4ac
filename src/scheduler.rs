// src/scheduler.rs
//! Deferred-task capability for the daily reminder. The core only needs a
//! narrow keyed-job contract: scheduling under an existing key replaces the
//! pending job, cancelling an absent key succeeds. A GUI host would back
//! this trait with the platform's own scheduler; the CLI uses the
//! file-backed implementation below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Key of the single reminder job. Re-enabling replaces the pending job
/// under this key rather than stacking a second one.
pub const DAILY_REMINDER_JOB: &str = "daily_reminder";

const JOB_FILE_NAME: &str = "jobs.toml";
const APP_CONFIG_DIR: &str = "gym-log";

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("Invalid reminder time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
    #[error("I/O error accessing job file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse job file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize job data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Host-platform deferred-task facility, reduced to what the reminder
/// feature needs. Both operations are idempotent.
pub trait JobScheduler {
    /// Schedules (or replaces) a daily job under `job_key`.
    /// # Errors
    /// `SchedulerError::InvalidTime` for an out-of-range time; backend
    /// errors otherwise.
    fn schedule_daily(&self, hour: u32, minute: u32, job_key: &str) -> Result<(), SchedulerError>;

    /// Cancels the job under `job_key`. Succeeds when no such job exists.
    /// # Errors
    /// Backend errors only.
    fn cancel(&self, job_key: &str) -> Result<(), SchedulerError>;
}

/// A pending daily job.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledJob {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct JobFile {
    #[serde(default)]
    jobs: BTreeMap<String, ScheduledJob>,
}

/// `JobScheduler` backed by a TOML file of `job_key -> job` entries, the
/// CLI's stand-in for an OS job scheduler.
pub struct FileJobScheduler {
    path: PathBuf,
}

impl FileJobScheduler {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses `jobs.toml` next to the application config file.
    /// # Errors
    /// `SchedulerError::CannotDetermineConfigDir` / `Io` if the directory
    /// cannot be resolved or created.
    pub fn open_default() -> Result<Self, SchedulerError> {
        let base_config_dir =
            dirs::config_dir().ok_or(SchedulerError::CannotDetermineConfigDir)?;
        let app_dir = base_config_dir.join(APP_CONFIG_DIR);
        if !app_dir.exists() {
            fs::create_dir_all(&app_dir)?;
        }
        Ok(Self::new(app_dir.join(JOB_FILE_NAME)))
    }

    /// Returns the pending job under `job_key`, if any.
    /// # Errors
    /// `SchedulerError::Io` / `TomlParse` if the job file is unreadable.
    pub fn pending(&self, job_key: &str) -> Result<Option<ScheduledJob>, SchedulerError> {
        Ok(self.load()?.jobs.get(job_key).copied())
    }

    fn load(&self) -> Result<JobFile, SchedulerError> {
        if !self.path.exists() {
            return Ok(JobFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(SchedulerError::TomlParse)
    }

    fn save(&self, file: &JobFile) -> Result<(), SchedulerError> {
        if let Some(parent_dir) = self.path.parent() {
            if !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let content = toml::to_string_pretty(file).map_err(SchedulerError::TomlSerialize)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl JobScheduler for FileJobScheduler {
    fn schedule_daily(&self, hour: u32, minute: u32, job_key: &str) -> Result<(), SchedulerError> {
        if hour > 23 || minute > 59 {
            return Err(SchedulerError::InvalidTime { hour, minute });
        }
        let mut file = self.load()?;
        file.jobs
            .insert(job_key.to_string(), ScheduledJob { hour, minute });
        self.save(&file)
    }

    fn cancel(&self, job_key: &str) -> Result<(), SchedulerError> {
        let mut file = self.load()?;
        if file.jobs.remove(job_key).is_some() {
            self.save(&file)?;
        }
        Ok(())
    }
}
