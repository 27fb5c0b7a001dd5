use std::io::Write;
use std::time::Duration;

use breathwell_core::exercise::{self, Exercise};
use breathwell_core::storage::CuesConfig;
use breathwell_core::{
    BreathingSession, Config, Database, Event, SessionConfig, SessionContext, SessionRunner,
};
use clap::{Args, Subcommand};

use super::clock;

#[derive(Args)]
pub struct SessionArgs {
    /// Exercise id (defaults to `session.default_exercise`)
    #[arg(long, short)]
    exercise: Option<String>,
    /// Session length in seconds (defaults to the exercise's own length)
    #[arg(long, short)]
    duration: Option<u32>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a live session; Ctrl-C ends it early and records it
    Run {
        #[command(flatten)]
        args: SessionArgs,
    },
    /// Step a session one second per tick without waiting and record it
    Simulate {
        #[command(flatten)]
        args: SessionArgs,
        /// End the session early after this many seconds
        #[arg(long)]
        stop_after: Option<u32>,
    },
}

struct Printer {
    json: bool,
    cues: CuesConfig,
    exercise: Exercise,
}

impl Printer {
    fn print(&self, event: &Event) -> Result<(), Box<dyn std::error::Error>> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }
        match event {
            Event::SessionStarted {
                pattern,
                total_secs,
                ..
            } => {
                println!(
                    "{} ({pattern}) for {}",
                    self.exercise.name,
                    clock(*total_secs)
                );
            }
            Event::PhaseChanged {
                to, time_remaining, ..
            } => {
                println!("[{}] {}", clock(*time_remaining), to.label());
            }
            Event::BreathCue { breath_count, .. } => {
                if self.cues.enabled {
                    if self.cues.bell {
                        print!("\x07");
                    }
                    println!("  breath {breath_count}");
                }
            }
            Event::SessionPaused { time_remaining, .. } => {
                println!("paused at {}", clock(*time_remaining));
            }
            Event::SessionResumed { time_remaining, .. } => {
                println!("resumed at {}", clock(*time_remaining));
            }
            Event::SessionCompleted {
                elapsed_secs,
                breath_count,
                log_item,
                reason,
                ..
            } => {
                println!(
                    "session {reason:?}: {} elapsed, {breath_count} breath(s)",
                    clock(*elapsed_secs)
                );
                if let Some(item) = log_item {
                    println!("logged {} ({} min)", item.id, item.duration_minutes);
                }
            }
            Event::LogWriteFailed { message, .. } => {
                eprintln!("warning: session not saved: {message}");
            }
            Event::SessionReset { .. } | Event::StateSnapshot { .. } => {}
        }
        std::io::stdout().flush()?;
        Ok(())
    }
}

type Prepared = (BreathingSession<Database>, SessionConfig, Printer, Config);

fn prepare(args: &SessionArgs) -> Result<Prepared, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let id = args
        .exercise
        .clone()
        .unwrap_or_else(|| config.session.default_exercise.clone());
    let exercise = exercise::find(&id)?;
    let session_config =
        exercise.session_config(args.duration.or(config.session.default_duration_secs))?;

    let ctx = SessionContext::new(Database::open()?, config.user.id.clone());
    let printer = Printer {
        json: args.json,
        cues: config.cues.clone(),
        exercise,
    };
    Ok((BreathingSession::new(ctx), session_config, printer, config))
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run { args } => run_live(&args),
        SessionAction::Simulate { args, stop_after } => simulate(&args, stop_after),
    }
}

fn simulate(args: &SessionArgs, stop_after: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, session_config, printer, _) = prepare(args)?;
    printer.print(&session.start(session_config)?)?;

    let mut elapsed = 0u32;
    while !session.is_completed() {
        if stop_after.is_some_and(|limit| elapsed >= limit) {
            for event in session.stop() {
                printer.print(&event)?;
            }
            break;
        }
        for event in session.tick() {
            printer.print(&event)?;
        }
        elapsed += 1;
    }
    Ok(())
}

fn run_live(args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, session_config, printer, config) = prepare(args)?;
    printer.print(&session.start(session_config)?)?;

    let period = Duration::from_millis(config.runner.tick_millis.max(10));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (mut runner, mut events) = SessionRunner::spawn(session, period);
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    printer.print(&event)?;
                    if event.is_completion() {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("interrupt received; stopping session");
                    runner.stop().await;
                }
            }
        }
        runner.shutdown().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
