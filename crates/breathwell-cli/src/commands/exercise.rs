use breathwell_core::exercise;
use clap::Subcommand;

use super::clock;

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// List built-in exercises
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one exercise
    Show {
        /// Exercise id (e.g. "box")
        id: String,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ExerciseAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ExerciseAction::List { json } => {
            let exercises = exercise::catalog();
            if json {
                println!("{}", serde_json::to_string_pretty(&exercises)?);
            } else {
                for ex in exercises {
                    println!(
                        "{:<10} {:<20} {:<12} {:<9} {}",
                        ex.id,
                        ex.name,
                        ex.kind.to_string(),
                        ex.pattern.to_string(),
                        clock(ex.default_secs)
                    );
                }
            }
        }
        ExerciseAction::Show { id, json } => {
            let ex = exercise::find(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ex)?);
            } else {
                println!("{} ({})", ex.name, ex.id);
                println!("  type:     {}", ex.kind);
                println!("  pattern:  {} (in-hold-out-hold)", ex.pattern);
                println!("  duration: {}", clock(ex.default_secs));
                if !ex.description.is_empty() {
                    println!("  {}", ex.description);
                }
            }
        }
    }
    Ok(())
}
