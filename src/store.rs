// src/store.rs
use crate::db::{self, Error, NewWorkout, Workout};
use rusqlite::Connection;
use std::collections::HashSet;

/// Callback invoked with the full current collection: once on registration
/// and again after every mutation that changed state.
pub type Observer = Box<dyn FnMut(&[Workout]) + Send>;

/// Handle returned by `subscribe`, used to unregister on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Durable, observable collection of workout records.
///
/// Mutations require `&mut self`, so concurrent add/delete against the same
/// store serialize through exclusive ownership before they reach SQLite.
/// Every mutation persists first and publishes to observers second; a crash
/// in between loses at most the notification, never data.
pub struct WorkoutStore {
    conn: Connection,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl WorkoutStore {
    /// Wraps an open connection, initializing the schema if needed.
    /// # Errors
    /// Returns `Error::Connection` if schema creation fails.
    pub fn new(conn: Connection) -> Result<Self, Error> {
        db::init_db(&conn)?;
        Ok(Self {
            conn,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Opens the store at the default database path.
    /// # Errors
    /// Returns `Error` variants if the path cannot be determined or opened.
    pub fn open_default() -> Result<Self, Error> {
        let path = db::get_db_path()?;
        Self::new(db::open_db(path)?)
    }

    /// Adds a workout, assigning it a fresh id. The date is validated and
    /// canonicalized before anything is written; other fields are stored
    /// verbatim.
    /// # Errors
    /// - `Error::InvalidDate` if the date is empty or not a calendar date.
    /// - `Error::InsertFailed` / `Error::QueryFailed` on storage failure.
    pub fn add(&mut self, fields: &NewWorkout) -> Result<Workout, Error> {
        let date = db::canonical_date(fields.date)?;
        let canonical = NewWorkout {
            date: &date,
            note: fields.note,
            activity: fields.activity,
            mood: fields.mood,
            music: fields.music,
            weights: fields.weights,
            machines: fields.machines,
        };
        let id = db::insert_workout(&self.conn, &canonical)?;
        self.notify_observers()?;
        Ok(Workout {
            id,
            date,
            note: fields.note.to_string(),
            activity: fields.activity.to_string(),
            mood: fields.mood.to_string(),
            music: fields.music.to_string(),
            weights: fields.weights.to_string(),
            machines: fields.machines.to_string(),
        })
    }

    /// Deletes the workout with the given id, returning how many rows were
    /// removed (0 or 1). Absent ids are a successful no-op so a duplicate
    /// delete request cannot fail; observers are only notified when a row
    /// was actually removed.
    /// # Errors
    /// Returns `Error::DeleteFailed` / `Error::QueryFailed` on storage failure.
    pub fn delete(&mut self, id: i64) -> Result<usize, Error> {
        let removed = db::delete_workout(&self.conn, id)?;
        if removed > 0 {
            self.notify_observers()?;
        }
        Ok(removed)
    }

    /// Returns a snapshot of all workouts in insertion order.
    /// # Errors
    /// Returns `Error::QueryFailed` on storage failure.
    pub fn list_all(&self) -> Result<Vec<Workout>, Error> {
        db::list_workouts(&self.conn)
    }

    /// Returns the set of canonical date strings with at least one workout,
    /// the shape the calendar aggregation consumes.
    /// # Errors
    /// Returns `Error::QueryFailed` on storage failure.
    pub fn date_set(&self) -> Result<HashSet<String>, Error> {
        Ok(db::list_workout_dates(&self.conn)?.into_iter().collect())
    }

    /// Registers an observer and immediately replays the current collection
    /// to it.
    /// # Errors
    /// Returns `Error::QueryFailed` if the initial snapshot cannot be read.
    pub fn subscribe(&mut self, mut observer: Observer) -> Result<SubscriptionId, Error> {
        let snapshot = self.list_all()?;
        observer(&snapshot);
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        Ok(id)
    }

    /// Unregisters an observer. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(sub, _)| *sub != id);
    }

    fn notify_observers(&mut self) -> Result<(), Error> {
        if self.observers.is_empty() {
            return Ok(());
        }
        let snapshot = db::list_workouts(&self.conn)?;
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
        Ok(())
    }
}
