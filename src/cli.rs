//! CLI surface for inspecting submissions offline
//!
//! The CLI reads the same submission JSON the backend serves and answers
//! the questions the workflow screens answer: where is this submission,
//! what blocks it, and may this role advance it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use greenseal::{ActorRole, Submission, blockers, can_advance, phases, view_for};

#[derive(Parser)]
#[command(
    name = "greenseal",
    version,
    about = "Inspect submissions in the greenseal approval workflow"
)]
pub struct Cli {
    /// Enable debug-level logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the workflow phases in order with progress and metadata
    Phases,
    /// Summarize a submission: current phase, progress, blockers, content view
    Inspect {
        /// Path to a submission JSON document
        path: PathBuf,
        /// Session role used for the view-mode column
        #[arg(long, default_value = "none")]
        role: String,
    },
    /// Check whether a role may advance a submission right now
    Check {
        /// Path to a submission JSON document
        path: PathBuf,
        /// Session role attempting the advancement
        #[arg(long)]
        role: String,
    },
}

fn load_submission(path: &Path) -> Result<Submission> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse submission JSON: {}", path.display()))
}

fn print_phase_table() {
    for phase in phases::ORDERED {
        println!(
            "{:>3}%  {:<24} [{}]  {}",
            phases::progress_percent(phase),
            phases::display_name(phase),
            phases::icon(phase),
            phases::description(phase),
        );
    }
}

fn inspect(path: &Path, role: ActorRole) -> Result<()> {
    let submission = load_submission(path)?;

    let case = submission.case_number.as_deref().unwrap_or("unnumbered");
    println!(
        "Submission {} (case {case}): {} ({}%)",
        submission.id,
        phases::display_name(submission.phase),
        phases::progress_percent(submission.phase),
    );

    let reasons = blockers(&submission, submission.phase);
    if reasons.is_empty() {
        println!("No advancement blockers");
    } else {
        println!("Advancement blockers:");
        for reason in &reasons {
            println!("  - {reason}");
        }
    }

    let (content, mode) = view_for(&submission, submission.phase, role);
    println!(
        "Current view for role '{}': {} ({mode:?})",
        role.as_str(),
        content.module_name()
    );
    print!("{}", content.render_summary(&submission));

    Ok(())
}

/// Returns whether the advancement would be permitted, for the exit code.
fn check(path: &Path, role: ActorRole) -> Result<bool> {
    let submission = load_submission(path)?;

    let Some(target) = phases::next_phase(submission.phase) else {
        println!("Submission {} is already complete", submission.id);
        return Ok(false);
    };

    if !can_advance(submission.phase, role) {
        println!(
            "Role '{}' may not advance out of {}",
            role.as_str(),
            phases::display_name(submission.phase)
        );
        return Ok(false);
    }

    let reasons = blockers(&submission, submission.phase);
    if !reasons.is_empty() {
        println!("Advancement to {} is blocked:", phases::display_name(target));
        for reason in &reasons {
            println!("  - {reason}");
        }
        return Ok(false);
    }

    println!(
        "Role '{}' may advance submission {} to {}",
        role.as_str(),
        submission.id,
        phases::display_name(target)
    );
    Ok(true)
}

/// Runs the parsed command. `Ok(false)` means "ran fine, answer is no" and
/// maps to a nonzero exit code in main.
pub fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Phases => {
            print_phase_table();
            Ok(true)
        }
        Command::Inspect { path, role } => {
            inspect(&path, ActorRole::from_session_str(&role))?;
            Ok(true)
        }
        Command::Check { path, role } => check(&path, ActorRole::from_session_str(&role)),
    }
}
