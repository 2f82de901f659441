use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod clock;
mod commands;
mod config;
mod dataset;
mod export;
mod marking;
mod models;
mod report;
mod session;
mod stats;

use clock::{Clock, FixedClock, SystemClock};
use commands::{ensure_admin, ensure_staff, ensure_student_visible, scoped_class};
use config::Config;
use dataset::AttendanceStore;
use models::{AttendanceFilter, AttendanceStatus};
use session::{Actor, Role};
use stats::Aggregator;

#[derive(Parser)]
#[command(name = "attendance-dashboard")]
#[command(about = "Role-based attendance dashboard over a generated attendance log", long_about = None)]
struct Cli {
    /// Seed for the generated log (overrides ATTENDANCE_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Treat this date as today (overrides ATTENDANCE_TODAY)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    /// Demo account the views are scoped to
    #[arg(long, global = true, default_value = "admin")]
    role: Role,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overall attendance counts and percentages
    Stats {
        #[arg(long = "class")]
        class_id: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// One student's attendance summary
    Student { id: String },
    /// One student's attendance history, newest first
    History {
        id: String,
        #[arg(long)]
        status: Option<AttendanceStatus>,
    },
    /// Monday to Friday breakdown for the current week
    Weekly {
        #[arg(long = "class")]
        class_id: Option<String>,
    },
    /// Present share over the last four weeks
    Trend,
    /// Today's status per student
    Today {
        #[arg(long = "class")]
        class_id: Option<String>,
    },
    /// Students below the attendance threshold
    Low {
        #[arg(long)]
        threshold: Option<u32>,
        #[arg(long = "class")]
        class_id: Option<String>,
    },
    /// Per-department statistics
    Departments,
    /// Classes visible to the current role
    Classes,
    /// Teaching staff and their assigned classes
    Teachers,
    /// Fill in today's attendance for a class (not saved)
    Mark {
        #[arg(long = "class")]
        class_id: Option<String>,
        #[arg(long)]
        absent: Vec<String>,
        #[arg(long)]
        late: Vec<String>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long = "class")]
        class_id: Option<String>,
        #[arg(long)]
        threshold: Option<u32>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the attendance log as CSV
    Export {
        #[arg(long = "class")]
        class_id: Option<String>,
        #[arg(long, default_value = "attendance.csv")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.seed, cli.today);

    let clock: Box<dyn Clock> = match config.today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    };
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    tracing::info!(seed, "seeding attendance log");

    let store = AttendanceStore::seeded(seed, clock.today());
    let aggregator = Aggregator::new(&store, clock.as_ref());
    let actor = Actor::demo(cli.role, &store);
    tracing::debug!(role = %actor.role, actor = %actor.id, "session ready");

    match cli.command {
        Commands::Stats {
            class_id,
            department,
            date,
        } => {
            let class_id = scoped_class(&actor, class_id)?;
            commands::ensure_department_visible(&actor, department.as_deref())?;
            let filter = AttendanceFilter {
                class_id,
                department,
                date,
            };
            let stats = aggregator.attendance_stats(&filter);
            if cli.json {
                return print_json(&stats);
            }
            println!(
                "{} records: {} present ({}%), {} absent ({}%), {} late ({}%)",
                stats.total,
                stats.present,
                stats.present_percent,
                stats.absent,
                stats.absent_percent,
                stats.late,
                stats.late_percent
            );
        }
        Commands::Student { id } => {
            ensure_student_visible(&actor, &store, &id)?;
            let Some(summary) = aggregator.student_summary(&id) else {
                println!("No student with id {id}.");
                return Ok(());
            };
            if cli.json {
                return print_json(&summary);
            }
            let student = &summary.student;
            println!(
                "{} ({}, {}) semester {}, enrolled {}",
                student.name,
                student.roll_number,
                student.class_id(),
                student.semester,
                student.enrolled_on
            );
            println!("Contact: {} / {}", student.email, student.phone);
            println!(
                "Attendance {}% across {} days: {} present, {} absent, {} late",
                summary.percent,
                summary.stats.total,
                summary.stats.present,
                summary.stats.absent,
                summary.stats.late
            );
            if summary.percent < config.threshold {
                println!(
                    "Warning: attendance is below {}%, {} risk.",
                    config.threshold,
                    models::RiskLevel::for_percent(summary.percent)
                );
            }
        }
        Commands::History { id, status } => {
            ensure_student_visible(&actor, &store, &id)?;
            let history = aggregator.student_history(&id, status);
            if cli.json {
                return print_json(&history);
            }
            println!("{} records found.", history.len());
            for record in history {
                println!(
                    "- {} {}: {} (class {}, marked by {})",
                    record.date.format("%a"),
                    record.date,
                    record.status,
                    record.class_id,
                    record.marked_by
                );
            }
        }
        Commands::Weekly { class_id } => {
            let class_id = scoped_class(&actor, class_id)?;
            let weekly = aggregator.weekly_data(class_id.as_deref());
            if cli.json {
                return print_json(&weekly);
            }
            for bucket in weekly {
                println!(
                    "{} {}: {} present, {} absent, {} late",
                    bucket.day, bucket.date, bucket.present, bucket.absent, bucket.late
                );
            }
        }
        Commands::Trend => {
            let trend = aggregator.monthly_trend();
            if cli.json {
                return print_json(&trend);
            }
            for point in trend {
                println!(
                    "{} ({} to {}): {}%",
                    point.week, point.start, point.end, point.attendance
                );
            }
        }
        Commands::Today { class_id } => {
            let class_id = scoped_class(&actor, class_id)?;
            let entries = aggregator.today_attendance(class_id.as_deref());
            if cli.json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No students found for this class.");
                return Ok(());
            }
            println!("Attendance for {}:", aggregator.today());
            for entry in entries {
                println!(
                    "- [{}] {} ({}) {}",
                    entry.student.initials(),
                    entry.student.name,
                    entry.student.roll_number,
                    entry.status
                );
            }
        }
        Commands::Low {
            threshold,
            class_id,
        } => {
            let class_id = scoped_class(&actor, class_id)?;
            let threshold = config.threshold_or(threshold)?;
            let low = match class_id.as_deref() {
                Some(class_id) => aggregator.low_attendance_in(Some(class_id), threshold),
                None => aggregator.low_attendance_students(threshold),
            };
            if cli.json {
                return print_json(&low);
            }
            if low.is_empty() {
                println!("No students below {threshold}%.");
                return Ok(());
            }
            println!("Students below {threshold}% attendance:");
            for entry in low {
                println!(
                    "- {} ({}, {}) {}% [{}]",
                    entry.student.name,
                    entry.student.roll_number,
                    entry.student.department,
                    entry.percent,
                    entry.risk
                );
            }
        }
        Commands::Departments => {
            ensure_admin(&actor)?;
            let departments = aggregator.department_stats();
            if cli.json {
                return print_json(&departments);
            }
            for department in departments {
                println!(
                    "- {}: {} students, {}% present, {}% absent, {}% late",
                    department.department,
                    department.students,
                    department.stats.present_percent,
                    department.stats.absent_percent,
                    department.stats.late_percent
                );
            }
        }
        Commands::Classes => {
            let visible = commands::visible_class_stats(&aggregator, &actor);
            if cli.json {
                return print_json(&visible);
            }
            for entry in visible {
                let teacher = store
                    .teacher(&entry.class_info.teacher_id)
                    .map_or("unassigned", |teacher| teacher.name.as_str());
                println!(
                    "- {} {} (semester {}, {} students, {}): {}% present",
                    entry.class_info.id,
                    entry.class_info.name,
                    entry.class_info.semester,
                    entry.class_info.student_count,
                    teacher,
                    entry.stats.present_percent
                );
            }
        }
        Commands::Teachers => {
            ensure_admin(&actor)?;
            if cli.json {
                return print_json(store.teachers());
            }
            for teacher in store.teachers() {
                println!(
                    "- {} {} ({}, {}): {} [{}]",
                    teacher.id,
                    teacher.name,
                    teacher.department,
                    teacher.subject,
                    teacher.email,
                    teacher.assigned_classes.join(", ")
                );
            }
        }
        Commands::Mark {
            class_id,
            absent,
            late,
        } => {
            let sheet = commands::build_mark_sheet(&aggregator, &actor, class_id, &absent, &late)?;
            if cli.json {
                return print_json(&sheet);
            }
            for entry in sheet.entries() {
                println!("- {} ({}) {}", entry.name, entry.roll_number, entry.status);
            }
            let summary = sheet.summary();
            println!(
                "{} present, {} absent, {} late (not saved)",
                summary.present, summary.absent, summary.late
            );
        }
        Commands::Report {
            class_id,
            threshold,
            out,
        } => {
            ensure_staff(&actor)?;
            let class_id = scoped_class(&actor, class_id)?;
            let threshold = config.threshold_or(threshold)?;
            let report = report::build_report(&aggregator, class_id.as_deref(), threshold);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { class_id, out } => {
            ensure_staff(&actor)?;
            let class_id = scoped_class(&actor, class_id)?;
            let filter = AttendanceFilter {
                class_id,
                ..AttendanceFilter::default()
            };
            let records = store.records().iter().filter(|record| filter.matches(record));
            let written = export::export_to_path(&out, records)?;
            println!("Exported {written} records to {}.", out.display());
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode JSON output")?;
    println!("{text}");
    Ok(())
}
