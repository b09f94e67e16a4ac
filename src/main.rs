//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{NaiveTime, Timelike, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::stdout;

use gym_log_lib::{
    AppService, FileJobScheduler, GridCell, MonthGrid, NewWorkout, Workout, YearMonth,
    DAILY_REMINDER_JOB,
};

fn main() -> Result<()> {
    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args(); // Parse arguments once

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command(); // Get the command structure
        let bin_name = cmd.get_name().to_string(); // Get the binary name

        eprintln!("Generating completion script for {shell}..."); // Print to stderr
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout()); // Print script to stdout
        return Ok(()); // Exit after generating script
    }

    // Initialize the application service (loads config, connects to DB)
    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;

    // --- Execute Commands using AppService ---
    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            // This case is handled above, but keep it exhaustive
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Add {
            date,
            note,
            activity,
            mood,
            music,
            weights,
            machines,
        } => {
            if date.trim().is_empty() {
                bail!("Please pick a date first (--date YYYY-MM-DD).");
            }
            let fields = NewWorkout {
                date: &date,
                note: &note,
                activity: &activity,
                mood: &mood,
                music: &music,
                weights: &weights,
                machines: &machines,
            };
            match service.add_workout(&fields) {
                Ok(workout) => println!(
                    "Successfully added workout on {} ID: {}",
                    workout.date, workout.id
                ),
                Err(e) => bail!("Error adding workout: {e}"),
            }
        }
        cli::Commands::List => match service.list_workouts() {
            Ok(workouts) if workouts.is_empty() => {
                println!("No workouts logged yet.");
            }
            Ok(workouts) => {
                print_workout_table(workouts, header_color(&service));
            }
            Err(e) => bail!("Error listing workouts: {e}"),
        },
        cli::Commands::Delete { id } => match service.delete_workout(id) {
            Ok(0) => println!("No workout with ID {id}; nothing to delete."),
            Ok(_) => println!("Successfully deleted workout ID {id}."),
            Err(e) => bail!("Error deleting workout ID {id}: {e}"),
        },
        cli::Commands::Calendar {
            month,
            with_previous,
        } => {
            let target = month.unwrap_or_else(|| YearMonth::from_date(Utc::now().date_naive()));
            let header = header_color(&service);
            let workout_color = gym_log_lib::parse_color(&service.config.theme.workout_day_color)
                .map(Color::from)
                .unwrap_or(Color::Cyan); // Fallback

            if with_previous {
                let grid = service.build_month(target.previous())?;
                print_month_grid(&grid, header, workout_color);
                println!();
            }
            let grid = service.build_month(target)?;
            print_month_grid(&grid, header, workout_color);
        }
        cli::Commands::Export { output } => match service.export_csv(output) {
            Ok(path) => println!("CSV exported: {}", path.display()),
            Err(e) => bail!("CSV export failed: {e}"),
        },
        cli::Commands::Reminder { action } => {
            let scheduler =
                FileJobScheduler::open_default().context("Failed to open job scheduler")?;
            match action {
                cli::ReminderAction::On { time } => {
                    let (hour, minute) = match time {
                        Some(t) => parse_reminder_time(&t)?,
                        None => (service.config.reminder.hour, service.config.reminder.minute),
                    };
                    service.enable_reminder(&scheduler, hour, minute)?;
                    println!("Daily reminder enabled at {hour:02}:{minute:02}.");
                }
                cli::ReminderAction::Off => {
                    service.disable_reminder(&scheduler)?;
                    println!("Daily reminder disabled.");
                }
                cli::ReminderAction::Status => {
                    let reminder = service.config.reminder;
                    if reminder.enabled {
                        println!(
                            "Reminder enabled at {:02}:{:02}.",
                            reminder.hour, reminder.minute
                        );
                    } else {
                        println!("Reminder disabled.");
                    }
                    match scheduler.pending(DAILY_REMINDER_JOB)? {
                        Some(job) => {
                            println!("Pending job: daily at {:02}:{:02}.", job.hour, job.minute);
                        }
                        None => println!("No pending job."),
                    }
                }
            }
        }
        cli::Commands::DbPath => println!("{}", service.get_db_path().display()),
        cli::Commands::ConfigPath => println!("{}", service.get_config_path().display()),
    }

    Ok(())
}

fn header_color(service: &AppService) -> Color {
    gym_log_lib::parse_color(&service.config.theme.header_color)
        .map(Color::from)
        .unwrap_or(Color::Green) // Fallback
}

fn parse_reminder_time(raw: &str) -> Result<(u32, u32)> {
    let parsed = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .with_context(|| format!("Invalid reminder time '{raw}' (expected HH:MM)"))?;
    Ok((parsed.hour(), parsed.minute()))
}

// --- Table Printing Functions (Remain in CLI) ---

/// Prints workout entries in a formatted table.
fn print_workout_table(workouts: Vec<Workout>, header_color: Color) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date").fg(header_color),
            Cell::new("Note").fg(header_color),
            Cell::new("Activity").fg(header_color),
            Cell::new("Mood").fg(header_color),
            Cell::new("Music").fg(header_color),
            Cell::new("Weights").fg(header_color),
            Cell::new("Machines").fg(header_color),
        ]);

    for workout in workouts {
        table.add_row(vec![
            Cell::new(workout.id.to_string()),
            Cell::new(workout.date),
            Cell::new(workout.note),
            Cell::new(workout.activity),
            Cell::new(workout.mood),
            Cell::new(workout.music),
            Cell::new(workout.weights),
            Cell::new(workout.machines),
        ]);
    }
    println!("{table}");
}

/// Prints one month: title, monthly count, then the 7-column grid with
/// workout days highlighted.
fn print_month_grid(grid: &MonthGrid, header_color: Color, workout_color: Color) {
    println!("{}", grid.month.title());
    println!("You worked out {} day(s) this month.", grid.workout_count);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        Cell::new("Sun").fg(header_color),
        Cell::new("Mon").fg(header_color),
        Cell::new("Tue").fg(header_color),
        Cell::new("Wed").fg(header_color),
        Cell::new("Thu").fg(header_color),
        Cell::new("Fri").fg(header_color),
        Cell::new("Sat").fg(header_color),
    ]);

    for week in grid.cells.chunks(7) {
        let mut row: Vec<Cell> = week
            .iter()
            .map(|cell| match *cell {
                GridCell::Blank => Cell::new(""),
                GridCell::Day { day, workout: true } => Cell::new(day.to_string())
                    .fg(workout_color)
                    .add_attribute(Attribute::Bold),
                GridCell::Day {
                    day,
                    workout: false,
                } => Cell::new(day.to_string()),
            })
            .collect();
        // Pad the trailing week so the grid stays 7 columns wide
        while row.len() < 7 {
            row.push(Cell::new(""));
        }
        table.add_row(row);
    }
    println!("{table}");
}
