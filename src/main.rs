use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod classify;
mod gateway;
mod models;
mod ranking;
mod report;
mod timeline;

use classify::{ImplementationKeywords, PhaseKeywords};
use gateway::ApiClient;
use models::{Idea, User};
use report::CreationTargets;

#[derive(Parser)]
#[command(name = "aevo-funnel-analytics")]
#[command(about = "Departmental innovation analytics over the Aevo platform API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combined execution + creation report for a department
    Department {
        #[arg(long)]
        department_id: i64,
        #[arg(long)]
        year: i32,
        /// Start of the idea fetch window
        #[arg(long, default_value = "2024-01-01")]
        from: NaiveDate,
        #[arg(long, default_value_t = 10)]
        window_weeks: i64,
        /// Individual PLR quota (ideas per user per year)
        #[arg(long, default_value_t = 4)]
        plr_target: usize,
        /// Department per-head quota (ideas per user per year)
        #[arg(long, default_value_t = 14)]
        dept_target: usize,
        /// Aggregate department quota per month
        #[arg(long, default_value_t = 67)]
        monthly_target: usize,
        /// Aggregate department quota per week
        #[arg(long, default_value_t = 15)]
        weekly_target: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Execution funnel report only
    Execution {
        #[arg(long)]
        department_id: i64,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value = "2024-01-01")]
        from: NaiveDate,
        #[arg(long, default_value_t = 10)]
        window_weeks: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Creation ranking report only
    Creation {
        #[arg(long)]
        department_id: i64,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value = "2024-01-01")]
        from: NaiveDate,
        #[arg(long, default_value_t = 10)]
        window_weeks: i64,
        #[arg(long, default_value_t = 4)]
        plr_target: usize,
        #[arg(long, default_value_t = 14)]
        dept_target: usize,
        #[arg(long, default_value_t = 67)]
        monthly_target: usize,
        #[arg(long, default_value_t = 15)]
        weekly_target: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Individual performance report for one matricula
    Individual {
        #[arg(long)]
        department_id: i64,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        matricula: String,
        #[arg(long, default_value = "2024-01-01")]
        from: NaiveDate,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let base_url = std::env::var("AEVO_BASE_URL")
        .context("AEVO_BASE_URL must be set to the platform API root")?;
    let token =
        std::env::var("AEVO_API_TOKEN").context("AEVO_API_TOKEN must be set")?;
    let client = ApiClient::new(&base_url, &token);

    match cli.command {
        Commands::Department {
            department_id,
            year,
            from,
            window_weeks,
            plr_target,
            dept_target,
            monthly_target,
            weekly_target,
            out,
        } => {
            let (roster, ideas, now) = fetch_snapshot(&client, department_id, from).await?;
            let targets = CreationTargets {
                plr_per_user: plr_target,
                dept_individual: dept_target,
                monthly_aggregate: monthly_target,
                weekly_aggregate: weekly_target,
            };
            let combined = report::combined_report(
                &roster,
                &ideas,
                year,
                window_weeks,
                now,
                &PhaseKeywords::default(),
                &targets,
            );
            emit(&combined, out.as_deref())?;
        }
        Commands::Execution {
            department_id,
            year,
            from,
            window_weeks,
            out,
        } => {
            let (roster, ideas, now) = fetch_snapshot(&client, department_id, from).await?;
            let execution = report::execution_report(
                &roster,
                &ideas,
                year,
                window_weeks,
                now,
                &PhaseKeywords::default(),
            );
            emit(&execution, out.as_deref())?;
        }
        Commands::Creation {
            department_id,
            year,
            from,
            window_weeks,
            plr_target,
            dept_target,
            monthly_target,
            weekly_target,
            out,
        } => {
            let (roster, ideas, now) = fetch_snapshot(&client, department_id, from).await?;
            let targets = CreationTargets {
                plr_per_user: plr_target,
                dept_individual: dept_target,
                monthly_aggregate: monthly_target,
                weekly_aggregate: weekly_target,
            };
            let creation =
                report::creation_report(&roster, &ideas, year, window_weeks, now, &targets);
            emit(&creation, out.as_deref())?;
        }
        Commands::Individual {
            department_id,
            year,
            matricula,
            from,
            out,
        } => {
            let (roster, ideas, _now) = fetch_snapshot(&client, department_id, from).await?;
            let Some(individual) = report::individual_report(
                &roster,
                &ideas,
                year,
                &matricula,
                &ImplementationKeywords::default(),
            ) else {
                bail!("user with matricula '{matricula}' not found in department {department_id}");
            };
            emit(&individual, out.as_deref())?;
        }
    }

    Ok(())
}

/// Fetches the roster and idea snapshot one report runs over. "Now" is
/// captured once here and reused as both the fetch window end and the
/// rolling-week anchor so the two axes cannot drift.
async fn fetch_snapshot(
    client: &ApiClient,
    department_id: i64,
    from: NaiveDate,
) -> anyhow::Result<(Vec<User>, Vec<Idea>, DateTime<Utc>)> {
    let roster = client.fetch_department_users(department_id).await?;
    if roster.is_empty() {
        bail!("no active users found for department {department_id}");
    }

    let now = Utc::now();
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let ideas = client.fetch_ideas_by_period(start, now).await?;
    Ok((roster, ideas, now))
}

fn emit<T: Serialize>(report: &T, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Report written to {}.", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
