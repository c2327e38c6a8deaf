mod args;
mod clone;
mod dedup;
mod filesize;
mod grouper;
mod hasher;
mod identity;
mod output;
mod scanner;
mod utils;

use anyhow::{Context, bail};
use args::{Cli, Command};
use clap::Parser;
use clone::CloneOutcome;
use colored::Colorize;
use grouper::DuplicateIndex;
use identity::SameFileOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::Path;
use std::sync::atomic::Ordering;
use utils::{INTERRUPTED, validate_target_dir};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::Relaxed);
        eprintln!("\nInterrupted by user, finishing up...");
    })
    .context("Failed to set signal handler")?;

    env_logger::builder()
        .filter_level(cli.log_level)
        .format_timestamp_secs()
        .init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Command::Find {
            target_dir,
            min_size,
            output_json,
        } => run_find(&target_dir, &min_size, output_json.as_deref()),
        Command::CloneDuplicates {
            target_dir,
            min_size,
            real,
        } => run_clone_duplicates(&target_dir, &min_size, real),
        Command::CloneFile { source, dest } => run_clone_file(&source, &dest),
        Command::SameFile { source, dest } => run_same_file(&source, &dest),
    }
}

/// Walk, fingerprint, and group the candidate files under `target_dir`.
/// Returns the index together with the number of candidates hashed.
fn build_index(target_dir: &Path, min_size_text: &str) -> anyhow::Result<(DuplicateIndex, usize)> {
    validate_target_dir(target_dir)?;
    let min_size = filesize::parse(min_size_text)
        .with_context(|| format!("invalid minimum size {min_size_text:?}"))?;
    println!("Using min size: {} ({} bytes)", min_size_text, min_size);
    info!("Starting duplicate scan in {}", target_dir.display());

    let scan_progress = ProgressBar::new_spinner();
    scan_progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("bad progress template")?,
    );
    scan_progress.set_message("Scanning files...");

    let records = scanner::collect_candidates(target_dir, min_size, &scan_progress)?;
    let candidates = records.len();
    scan_progress.finish_with_message(format!("Found {} candidate files", candidates));

    let hash_progress = ProgressBar::new(candidates as u64);
    hash_progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green/yellow} {pos:>7}/{len:7} {percent:>3}% {msg}")
            .context("bad progress template")?,
    );
    hash_progress.set_message("Computing fingerprints...");

    let fingerprints = hasher::fingerprint_all(records, &hash_progress)?;
    hash_progress.finish_with_message("Fingerprinting completed");

    Ok((DuplicateIndex::from_fingerprints(fingerprints), candidates))
}

fn run_find(target_dir: &Path, min_size: &str, output_json: Option<&Path>) -> anyhow::Result<()> {
    let (index, candidates) = build_index(target_dir, min_size)?;
    let summary = dedup::report_duplicates(&index);
    output::print_savings(&summary);

    if let Some(json_path) = output_json {
        output::save_report_json(json_path, candidates, &summary, &index)?;
        info!("Report saved to {}", json_path.display());
    }

    info!(
        "Found {} duplicate groups, {} clone targets",
        summary.duplicate_groups, summary.targets
    );
    Ok(())
}

fn run_clone_duplicates(target_dir: &Path, min_size: &str, real: bool) -> anyhow::Result<()> {
    let (index, _) = build_index(target_dir, min_size)?;
    let summary = dedup::clone_duplicates(&index, real)?;
    output::print_savings(&summary);

    if real {
        info!(
            "Cloned {} files, skipped {} (no clone support)",
            summary.cloned, summary.skipped
        );
    }
    Ok(())
}

fn run_clone_file(source: &Path, dest: &Path) -> anyhow::Result<()> {
    println!("Cloning {} to {}", source.display(), dest.display());
    match clone::clone_file(source, dest)? {
        CloneOutcome::Cloned => {
            println!("Cloning {} to {} done!", source.display(), dest.display());
        }
        CloneOutcome::Skipped => {
            println!(
                "No clone support for this pair; {} left unchanged",
                dest.display()
            );
        }
    }
    Ok(())
}

fn run_same_file(source: &Path, dest: &Path) -> anyhow::Result<()> {
    match identity::same_file_outcome(source, dest) {
        SameFileOutcome::SourceMissing => println!("Source file is missing"),
        SameFileOutcome::TargetMissing => println!("Destination file is missing"),
        SameFileOutcome::Same => println!("{}", "Files are the same!".green()),
        SameFileOutcome::Different => bail!("Files are not the same!"),
    }
    Ok(())
}
