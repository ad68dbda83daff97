// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod guard;
pub mod logging;
pub mod process_table;
pub mod safety;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::load_or_default;
use crate::exec::{ExecutionRequest, ExecutionResult, Executor};
use crate::guard::{GuardedOutcome, guarded_execute};
use crate::safety::{SafetyDecision, SafetyValidator};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, defaults, environment overrides)
/// - the safety validator and the executor, sharing one `Settings`
/// - the confirmation prompt on stdin
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let settings = Arc::new(load_or_default(args.config.as_deref())?);
    debug!(?settings, "settings loaded");

    let validator = SafetyValidator::new(Arc::clone(&settings))?;

    match args.command {
        CliCommand::Run {
            timeout,
            cwd,
            dry_run,
            yes,
            command,
        } => {
            let executor = Executor::new(Arc::clone(&settings));

            let mut request = ExecutionRequest::new(command.join(" ")).dry_run(dry_run);
            if let Some(secs) = timeout {
                request = request.timeout_secs(secs);
            }
            if let Some(dir) = cwd {
                request = request.working_directory(dir);
            }

            let outcome = guarded_execute(&validator, &executor, request, |decision| {
                yes || tokio::task::block_in_place(|| prompt_confirmation(decision))
            })
            .await;

            match outcome {
                GuardedOutcome::Blocked(decision) => {
                    eprintln!(
                        "cmdguard: refusing to run '{}': {}",
                        decision.command,
                        decision.reason.as_deref().unwrap_or("protected target")
                    );
                    Ok(1)
                }
                GuardedOutcome::Declined(decision) => {
                    eprintln!("cmdguard: not running '{}'", decision.command);
                    Ok(1)
                }
                GuardedOutcome::Executed(result) => {
                    print_result(&result)?;
                    Ok(result.exit_code())
                }
            }
        }
        CliCommand::Check { command } => {
            let decision = validator.assess(&command.join(" "));
            print_decision(&decision);
            Ok(if decision.is_blocked() { 1 } else { 0 })
        }
        CliCommand::Protected { identifier } => {
            let check = validator.is_protected(&identifier);
            if check.is_protected {
                println!(
                    "protected: {}",
                    check.reason.as_deref().unwrap_or("protected system process")
                );
            } else {
                println!("not protected");
            }
            Ok(0)
        }
    }
}

/// Ask on the terminal. Anything but `y`/`yes` is a no.
fn prompt_confirmation(decision: &SafetyDecision) -> bool {
    let reason = decision.reason.as_deref().unwrap_or("confirmation required");
    eprint!("{reason}\nRun '{}'? [y/N] ", decision.command);
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if let Err(e) = std::io::stdin().lock().read_line(&mut answer) {
        info!(error = %e, "could not read confirmation; treating as no");
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_result(result: &ExecutionResult) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(result.stdout().as_bytes())
        .context("writing command stdout")?;
    stdout.flush().context("flushing stdout")?;

    let mut stderr = std::io::stderr().lock();
    stderr
        .write_all(result.stderr().as_bytes())
        .context("writing command stderr")?;
    if result.timed_out() {
        writeln!(
            stderr,
            "\ncmdguard: command timed out after {:.1}s",
            result.elapsed().as_secs_f64()
        )?;
    }
    if result.truncated() {
        writeln!(stderr, "cmdguard: output was truncated")?;
    }
    Ok(())
}

fn print_decision(decision: &SafetyDecision) {
    println!("command:               {}", decision.command);
    println!("dangerous:             {}", decision.is_dangerous);
    println!("requires confirmation: {}", decision.requires_confirmation);
    println!("blocked:               {}", decision.is_blocked());
    if let Some(reason) = &decision.reason {
        println!("reason:                {reason}");
    }
    if let Some(target) = &decision.protected_target {
        println!("protected target:      {}", target.identifier);
    }
}
