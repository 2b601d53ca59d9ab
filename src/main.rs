use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod attendance;
mod models;
mod predict;
mod report;
mod risk;
mod store;

#[derive(Parser)]
#[command(name = "centerapp-analytics")]
#[command(about = "Attendance and performance analytics for CenterApp", long_about = None)]
struct Cli {
    /// Path to the collections snapshot (JSON export of the document store)
    #[arg(long, default_value = "snapshot.json")]
    snapshot: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a small demo snapshot
    Seed,
    /// Merge attendance facts from a CSV file into the snapshot
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show per-date attendance for a group
    Attendance {
        #[arg(long)]
        group: String,
    },
    /// Flag at-risk students in a group
    Risk {
        #[arg(long)]
        group: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Predict scores for an exam
    Predict {
        #[arg(long)]
        exam: String,
    },
    /// Generate a markdown report for a group
    Report {
        #[arg(long)]
        group: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed => {
            let snapshot = store::seed();
            snapshot.save(&cli.snapshot)?;
            println!("Demo snapshot written to {}.", cli.snapshot.display());
        }
        Commands::Import { csv } => {
            let mut snapshot = store::Snapshot::load(&cli.snapshot)?;
            let file = std::fs::File::open(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let inserted = store::import_attendance(&mut snapshot, file)?;
            snapshot.save(&cli.snapshot)?;
            println!("Inserted {inserted} attendance facts from {}.", csv.display());
        }
        Commands::Attendance { group } => {
            let snapshot = store::Snapshot::load(&cli.snapshot)?;
            let members = attendance::member_ids(&snapshot.student_groups, &group);
            let grouped = attendance::grouped_attendance(&snapshot.attendance, &group);

            if grouped.by_date.is_empty() {
                println!("No sessions recorded for group {group}.");
                return Ok(());
            }

            println!("Sessions for group {group} ({} members):", members.len());
            for date in grouped.by_date.keys() {
                println!(
                    "- {}: attended {}, unattended {}",
                    date,
                    grouped.attended_ids(date).len(),
                    grouped.unattended_count(date, &members)
                );
            }
        }
        Commands::Risk { group, limit } => {
            let snapshot = store::Snapshot::load(&cli.snapshot)?;
            let members = attendance::member_ids(&snapshot.student_groups, &group);
            let mut assessments = risk::assess_group(&members, &snapshot.attendance, &group);

            if assessments.is_empty() {
                println!("No students flagged in group {group}.");
                return Ok(());
            }

            report::sort_by_rate(&mut assessments);
            println!("At-risk students in group {group}:");
            for assessment in assessments.iter().take(limit) {
                println!(
                    "- {} ({}) attendance {:.0}%: {}",
                    report::student_name(&snapshot.students, &assessment.student_id),
                    assessment.student_id,
                    assessment.attendance_rate * 100.0,
                    assessment.reason.label()
                );
            }
        }
        Commands::Predict { exam } => {
            let snapshot = store::Snapshot::load(&cli.snapshot)?;
            let predictions = predict::predict_exam(&exam, &snapshot.exams, &snapshot.attendance);

            if predictions.is_empty() {
                println!("No predictions for exam {exam} (unknown exam or no attendees).");
                return Ok(());
            }

            let mut rows: Vec<_> = predictions.into_iter().collect();
            rows.sort_by(|a, b| {
                report::student_name(&snapshot.students, &a.0)
                    .cmp(report::student_name(&snapshot.students, &b.0))
            });

            println!("Predictions for exam {exam}:");
            for (student_id, prediction) in rows {
                println!(
                    "- {} ({}) predicted {:.2}{}",
                    report::student_name(&snapshot.students, &student_id),
                    student_id,
                    prediction.predicted,
                    if prediction.at_risk { " (At Risk)" } else { "" }
                );
            }
        }
        Commands::Report { group, out } => {
            let snapshot = store::Snapshot::load(&cli.snapshot)?;
            let report = report::build_report(&snapshot, &group);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
