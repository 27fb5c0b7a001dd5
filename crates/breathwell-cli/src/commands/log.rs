use breathwell_core::{Config, Database, LogSummary, SessionLogRecorder};
use chrono::Utc;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum LogAction {
    /// List recorded sessions, oldest first
    List {
        /// Only show the most recent N sessions
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Summary statistics over the session log
    Stats {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let recorder = SessionLogRecorder::new(Database::open()?, &config.user.id);
    let items = recorder.history()?;

    match action {
        LogAction::List { limit, json } => {
            let skip = limit.map_or(0, |n| items.len().saturating_sub(n));
            let shown = &items[skip..];
            if json {
                println!("{}", serde_json::to_string_pretty(shown)?);
            } else if shown.is_empty() {
                println!("no sessions recorded");
            } else {
                for item in shown {
                    println!(
                        "{}  {:<10} {:<12} {:>3} min ({} s)  {:?}",
                        item.date.format("%Y-%m-%d %H:%M"),
                        item.exercise_id,
                        item.exercise_type.to_string(),
                        item.duration_minutes,
                        item.duration_seconds,
                        item.reason,
                    );
                }
            }
        }
        LogAction::Stats { json } => {
            let summary = LogSummary::from_items(&items, Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("sessions:   {}", summary.total_sessions);
                println!("minutes:    {}", summary.total_minutes);
                println!("today:      {} ({} min)", summary.sessions_today, summary.minutes_today);
                println!("streak:     {} day(s)", summary.current_streak_days);
                for (kind, count) in &summary.by_type {
                    println!("  {kind:<12} {count}");
                }
            }
        }
    }
    Ok(())
}
