use anyhow::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use gym_log_lib::{
    build_month, export, AppService, Config, DbError, FileJobScheduler, GridCell, JobScheduler,
    NewWorkout, ScheduledJob, SchedulerError, Workout, WorkoutStore, YearMonth,
    DAILY_REMINDER_JOB,
};

// Helper function to create a test service with in-memory database
fn create_test_service() -> Result<AppService> {
    // Create an in-memory database for testing
    let conn = rusqlite::Connection::open_in_memory()?;
    let store = WorkoutStore::new(conn)?;

    Ok(AppService {
        config: Config::default(),
        store,
        db_path: ":memory:".into(),
        config_path: "test_config.toml".into(),
    })
}

fn sample_fields<'a>() -> NewWorkout<'a> {
    NewWorkout {
        date: "2024-02-01",
        note: "Leg day",
        activity: "Squat",
        mood: "Good",
        music: "Rock",
        weights: "100",
        machines: "Rack",
    }
}

#[test]
fn test_add_and_list_workouts() -> Result<()> {
    let mut service = create_test_service()?;

    let first = service.add_workout(&sample_fields())?;
    let second = service.add_workout(&NewWorkout {
        date: "2024-02-03",
        note: "Light session",
        ..Default::default()
    })?;

    assert_ne!(first.id, second.id);

    let workouts = service.list_workouts()?;
    assert_eq!(workouts.len(), 2);

    // Insertion order, fields preserved verbatim
    assert_eq!(workouts[0].id, first.id);
    assert_eq!(workouts[0].date, "2024-02-01");
    assert_eq!(workouts[0].note, "Leg day");
    assert_eq!(workouts[0].activity, "Squat");
    assert_eq!(workouts[0].mood, "Good");
    assert_eq!(workouts[0].music, "Rock");
    assert_eq!(workouts[0].weights, "100");
    assert_eq!(workouts[0].machines, "Rack");

    assert_eq!(workouts[1].id, second.id);
    assert_eq!(workouts[1].note, "Light session");
    assert_eq!(workouts[1].activity, "");

    Ok(())
}

#[test]
fn test_add_canonicalizes_date() -> Result<()> {
    let mut service = create_test_service()?;

    // Lenient input is accepted but stored zero-padded
    let workout = service.add_workout(&NewWorkout {
        date: "2024-2-1",
        ..Default::default()
    })?;
    assert_eq!(workout.date, "2024-02-01");

    let workouts = service.list_workouts()?;
    assert_eq!(workouts[0].date, "2024-02-01");

    Ok(())
}

#[test]
fn test_add_rejects_invalid_date() -> Result<()> {
    let mut service = create_test_service()?;

    for bad_date in ["", "   ", "not-a-date", "2024-02-30", "2024-13-01"] {
        let result = service.add_workout(&NewWorkout {
            date: bad_date,
            note: "should not be stored",
            ..Default::default()
        });
        assert!(result.is_err(), "date '{bad_date}' should be rejected");
        match result.unwrap_err().downcast_ref::<DbError>() {
            Some(DbError::InvalidDate(_)) => (),
            other => panic!("Expected InvalidDate error for '{bad_date}', got {other:?}"),
        }
    }

    // Nothing was persisted by the failed adds
    assert!(service.list_workouts()?.is_empty());

    Ok(())
}

#[test]
fn test_delete_workout_is_idempotent() -> Result<()> {
    let mut service = create_test_service()?;

    let first = service.add_workout(&sample_fields())?;
    let second = service.add_workout(&NewWorkout {
        date: "2024-02-02",
        ..Default::default()
    })?;

    // Present id removes exactly that record
    assert_eq!(service.delete_workout(first.id)?, 1);
    let workouts = service.list_workouts()?;
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].id, second.id);

    // Absent id is a non-failing no-op
    assert_eq!(service.delete_workout(first.id)?, 0);
    assert_eq!(service.delete_workout(9999)?, 0);
    assert_eq!(service.list_workouts()?.len(), 1);

    Ok(())
}

#[test]
fn test_subscribe_replay_and_notifications() -> Result<()> {
    let mut service = create_test_service()?;
    service.add_workout(&sample_fields())?;

    let snapshots: Arc<Mutex<Vec<Vec<i64>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&snapshots);
    let subscription = service.subscribe(Box::new(move |workouts| {
        sink.lock()
            .unwrap()
            .push(workouts.iter().map(|w| w.id).collect());
    }))?;

    // Initial replay carries the current collection
    assert_eq!(snapshots.lock().unwrap().len(), 1);
    assert_eq!(snapshots.lock().unwrap()[0].len(), 1);

    let added = service.add_workout(&NewWorkout {
        date: "2024-02-02",
        ..Default::default()
    })?;
    service.delete_workout(9999)?; // no-op, must not notify
    service.delete_workout(added.id)?;

    {
        let log = snapshots.lock().unwrap();
        assert_eq!(log.len(), 3); // replay + add + effective delete
        assert_eq!(log[1].len(), 2);
        assert_eq!(log[2].len(), 1);
    }

    // No notifications after unsubscribe
    service.unsubscribe(subscription);
    service.add_workout(&NewWorkout {
        date: "2024-02-05",
        ..Default::default()
    })?;
    assert_eq!(snapshots.lock().unwrap().len(), 3);

    Ok(())
}

#[test]
fn test_build_month_leap_february() {
    let month = YearMonth::new(2024, 2).unwrap();
    assert_eq!(month.days_in_month(), 29);
    // 2024-02-01 was a Thursday
    assert_eq!(month.first_weekday_offset(), 4);

    let mut dates = HashSet::new();
    dates.insert("2024-02-15".to_string());
    let grid = build_month(month, &dates);

    let leading_blanks = grid
        .cells
        .iter()
        .take_while(|cell| **cell == GridCell::Blank)
        .count();
    assert_eq!(leading_blanks, 4);
    assert_eq!(grid.cells.len(), 4 + 29);

    assert_eq!(
        grid.cells[4],
        GridCell::Day {
            day: 1,
            workout: false
        }
    );
    assert_eq!(
        grid.cells[4 + 14],
        GridCell::Day {
            day: 15,
            workout: true
        }
    );

    // Without the date in the set, day 15 is unmarked
    let empty_grid = build_month(month, &HashSet::new());
    assert_eq!(
        empty_grid.cells[4 + 14],
        GridCell::Day {
            day: 15,
            workout: false
        }
    );
}

#[test]
fn test_monthly_count_uses_prefix_match() {
    let month = YearMonth::new(2024, 2).unwrap();

    let mut dates: HashSet<String> = ["2024-02-01", "2024-02-29", "2024-03-01"]
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(build_month(month, &dates).workout_count, 2);

    // The count is a string-prefix match, so a malformed entry sharing the
    // YYYY-MM prefix is still counted (while no day cell is marked by it)
    dates.insert("2024-02-99".to_string());
    let grid = build_month(month, &dates);
    assert_eq!(grid.workout_count, 3);
    assert!(grid
        .cells
        .iter()
        .filter(|cell| matches!(cell, GridCell::Day { workout: true, .. }))
        .count()
        == 2);
}

#[test]
fn test_month_navigation() {
    let january = YearMonth::new(2024, 1).unwrap();
    let december = YearMonth::new(2023, 12).unwrap();

    assert_eq!(january.previous(), december);
    assert_eq!(december.next(), january);

    // Round trip is the identity
    assert_eq!(january.previous().next(), january);

    let june = YearMonth::new(2024, 6).unwrap();
    assert_eq!(june.previous(), YearMonth::new(2024, 5).unwrap());
    assert_eq!(june.next(), YearMonth::new(2024, 7).unwrap());
}

#[test]
fn test_year_month_parsing() {
    let parsed: YearMonth = "2024-02".parse().unwrap();
    assert_eq!(parsed, YearMonth::new(2024, 2).unwrap());
    assert_eq!(parsed.prefix(), "2024-02");

    assert!("2024-13".parse::<YearMonth>().is_err());
    assert!("february".parse::<YearMonth>().is_err());
    assert!(YearMonth::new(2024, 0).is_none());
}

#[test]
fn test_csv_export_format() -> Result<()> {
    let workouts = vec![Workout {
        id: 1,
        date: "2024-02-01".to_string(),
        note: "Leg day".to_string(),
        activity: "Squat".to_string(),
        mood: "Good".to_string(),
        music: "Rock".to_string(),
        weights: "100".to_string(),
        machines: "Rack".to_string(),
    }];

    let mut buf = Vec::new();
    export::write_csv(&mut buf, &workouts)?;
    let text = String::from_utf8(buf)?;

    assert_eq!(
        text,
        "Date,Note,Activity,Mood,Music,Weights,Machines\n\
         \"2024-02-01\",\"Leg day\",\"Squat\",\"Good\",\"Rock\",\"100\",\"Rack\"\n"
    );

    Ok(())
}

#[test]
fn test_csv_export_escapes_embedded_quotes() -> Result<()> {
    let workouts = vec![Workout {
        id: 1,
        date: "2024-02-01".to_string(),
        note: "felt \"strong\" today".to_string(),
        activity: String::new(),
        mood: String::new(),
        music: String::new(),
        weights: String::new(),
        machines: String::new(),
    }];

    let mut buf = Vec::new();
    export::write_csv(&mut buf, &workouts)?;
    let text = String::from_utf8(buf)?;

    // Embedded quotes are doubled so the row stays parseable
    assert!(text.contains("\"felt \"\"strong\"\" today\""));

    Ok(())
}

#[test]
fn test_export_csv_writes_file() -> Result<()> {
    let mut service = create_test_service()?;
    service.add_workout(&sample_fields())?;

    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("gym_data.csv");
    let written = service.export_csv(Some(dest.clone()))?;
    assert_eq!(written, dest);

    let content = std::fs::read_to_string(&dest)?;
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Note,Activity,Mood,Music,Weights,Machines")
    );
    assert_eq!(
        lines.next(),
        Some("\"2024-02-01\",\"Leg day\",\"Squat\",\"Good\",\"Rock\",\"100\",\"Rack\"")
    );
    assert_eq!(lines.next(), None);

    Ok(())
}

#[test]
fn test_file_scheduler_replaces_and_cancels() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let scheduler = FileJobScheduler::new(dir.path().join("jobs.toml"));

    scheduler.schedule_daily(9, 0, DAILY_REMINDER_JOB)?;
    assert_eq!(
        scheduler.pending(DAILY_REMINDER_JOB)?,
        Some(ScheduledJob { hour: 9, minute: 0 })
    );

    // Re-scheduling the same key replaces the pending job
    scheduler.schedule_daily(18, 30, DAILY_REMINDER_JOB)?;
    assert_eq!(
        scheduler.pending(DAILY_REMINDER_JOB)?,
        Some(ScheduledJob {
            hour: 18,
            minute: 30
        })
    );

    scheduler.cancel(DAILY_REMINDER_JOB)?;
    assert_eq!(scheduler.pending(DAILY_REMINDER_JOB)?, None);

    // Cancelling an absent job succeeds
    scheduler.cancel(DAILY_REMINDER_JOB)?;

    // Out-of-range times are rejected
    let result = scheduler.schedule_daily(24, 0, DAILY_REMINDER_JOB);
    match result {
        Err(SchedulerError::InvalidTime { .. }) => (),
        other => panic!("Expected InvalidTime error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_reminder_enable_and_disable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let conn = rusqlite::Connection::open_in_memory()?;
    let mut service = AppService {
        config: Config::default(),
        store: WorkoutStore::new(conn)?,
        db_path: ":memory:".into(),
        config_path: dir.path().join("config.toml"),
    };
    let scheduler = FileJobScheduler::new(dir.path().join("jobs.toml"));

    service.enable_reminder(&scheduler, 7, 45)?;
    assert!(service.config.reminder.enabled);
    assert_eq!(service.config.reminder.hour, 7);
    assert_eq!(service.config.reminder.minute, 45);
    assert_eq!(
        scheduler.pending(DAILY_REMINDER_JOB)?,
        Some(ScheduledJob {
            hour: 7,
            minute: 45
        })
    );

    // Re-enabling replaces the pending job rather than duplicating it
    service.enable_reminder(&scheduler, 6, 15)?;
    assert_eq!(
        scheduler.pending(DAILY_REMINDER_JOB)?,
        Some(ScheduledJob {
            hour: 6,
            minute: 15
        })
    );

    service.disable_reminder(&scheduler)?;
    assert!(!service.config.reminder.enabled);
    assert_eq!(scheduler.pending(DAILY_REMINDER_JOB)?, None);

    // An out-of-range time is rejected before any state change
    let result = service.enable_reminder(&scheduler, 25, 0);
    assert!(result.is_err());
    assert!(!service.config.reminder.enabled);

    Ok(())
}
