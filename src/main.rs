use std::io::Write as _;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use citas_core::{
    AppointmentService, Config, DateScope, FetchScope, FilterContext, Id, LogNotifier, Notice,
    NoticeLevel, NotificationPort,
};

#[derive(Debug, Parser)]
#[command(name = "citas", about = "Manage a practitioner's medical appointments")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List appointment states
    States,
    /// List consultation types
    Types,
    /// List appointments with their summary
    List {
        /// Every appointment visible to the caller instead of only mine
        #[arg(long)]
        all: bool,
        /// Only this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<NaiveDate>,
        /// Only this state id
        #[arg(long)]
        status: Option<Id>,
        /// Patient name, email or reason
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Move an appointment to another state
    Transition { id: Id, state_id: Id },
    /// Delete an appointment
    Delete {
        id: Id,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

/// Prints notices and asks for confirmation on the terminal.
struct ConsoleNotifier;

#[async_trait]
impl NotificationPort for ConsoleNotifier {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            print!("{prompt} [y/N] ");
            let _ = std::io::stdout().flush();
            let mut answer = String::new();
            std::io::stdin().read_line(&mut answer).is_ok()
                && matches!(answer.trim(), "y" | "Y" | "yes" | "s" | "si" | "sí")
        })
        .await
        .unwrap_or(false)
    }

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✔ {}", notice.message),
            NoticeLevel::Error => eprintln!("✘ {}", notice.message),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env()?;

    let notifier: Arc<dyn NotificationPort> = match cli.command {
        Command::Delete { yes: true, .. } => Arc::new(LogNotifier { assume_yes: true }),
        _ => Arc::new(ConsoleNotifier),
    };
    let scope = match cli.command {
        Command::List { all: true, .. } => FetchScope::All,
        _ => FetchScope::Mine,
    };
    let svc = AppointmentService::connect(&cfg, notifier)?.with_scope(scope);

    // The notifier has already shown whatever went wrong.
    match run(&svc, cli.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(svc: &AppointmentService, command: Command) -> citas_core::Result<()> {
    match command {
        Command::States => {
            svc.load_catalogs().await?;
            for s in svc.states().list() {
                let tag = if s.is_final { " (final)" } else { "" };
                println!("{:>4}  {}{tag}", s.id, s.name);
            }
        }
        Command::Types => {
            svc.load_catalogs().await?;
            for t in svc.consultation_types().list() {
                println!("{:>4}  {} ({} min)", t.id, t.name, t.duration_minutes);
            }
        }
        Command::List {
            day,
            status,
            search,
            ..
        } => {
            svc.load_catalogs().await?;

            let ctx = FilterContext::default()
                .with_search(search)
                .with_state(status)
                .with_scope(day.map_or(DateScope::All, DateScope::Day));
            svc.refresh(&ctx).await?;
            let board = svc.board(&ctx)?;

            for row in &board.rows {
                let who = row
                    .patient
                    .as_ref()
                    .map(|p| p.display_name())
                    .unwrap_or_else(|| format!("patient #{}", row.appointment.patient_id));
                let next: Vec<&str> = row.transitions.iter().map(|s| s.name.as_str()).collect();
                println!(
                    "{:>5}  {}  {:<24} {:<14} {:<16} -> [{}]",
                    row.appointment.id,
                    row.appointment
                        .scheduled_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M"),
                    who,
                    row.state.name,
                    row.consultation_type.name,
                    next.join(", ")
                );
            }

            println!();
            println!("total: {}   today: {}", board.stats.total, board.stats.today);
            for (name, count) in &board.stats.by_state {
                println!("  {name}: {count}");
            }
        }
        Command::Transition { id, state_id } => {
            svc.load_catalogs().await?;
            svc.change_state(&id, &state_id).await?;
        }
        Command::Delete { id, .. } => {
            if !svc.delete(&id).await? {
                println!("Nothing deleted");
            }
        }
    }

    Ok(())
}
