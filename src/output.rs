use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use supports_hyperlinks::Stream;

use crate::dedup::DedupSummary;
use crate::filesize;
use crate::grouper::DuplicateIndex;
use crate::scanner::FileRecord;

fn format_path(path: &Path) -> String {
    if supports_hyperlinks::on(Stream::Stdout) {
        let display = path.display();
        let uri = format!("file://{}", path.display());
        format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", uri, display)
    } else {
        path.display().to_string()
    }
}

pub fn print_duplicate_pair(source: &FileRecord, target: &FileRecord) {
    println!(
        "{} is a duplicate of {} ({})",
        format_path(&target.path),
        format_path(&source.path),
        filesize::format(target.size).yellow()
    );
}

pub fn print_would_clone(source: &FileRecord, target: &FileRecord) {
    println!(
        "{} Would clone {} to {}",
        "[DRY-RUN]".cyan().bold(),
        format_path(&source.path),
        format_path(&target.path)
    );
}

pub fn print_cloned(source: &FileRecord, target: &FileRecord) {
    println!(
        "Cloned {} to {}",
        format_path(&source.path),
        format_path(&target.path)
    );
}

pub fn print_clone_skipped(target: &FileRecord) {
    println!(
        "{} No clone support for {}; left unchanged",
        "[SKIPPED]".yellow(),
        format_path(&target.path)
    );
}

pub fn print_savings(summary: &DedupSummary) {
    println!(
        "Total savings: {}",
        filesize::format_fraction(summary.savings_bytes).green().bold()
    );
}

#[derive(Debug, Serialize)]
struct JsonGroup {
    fingerprint: String,
    size: u64,
    files: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    files_scanned: usize,
    duplicate_groups: usize,
    duplicate_files: usize,
    possible_savings_bytes: u64,
    groups: Vec<JsonGroup>,
}

pub fn save_report_json(
    path: &Path,
    files_scanned: usize,
    summary: &DedupSummary,
    index: &DuplicateIndex,
) -> Result<()> {
    let groups: Vec<JsonGroup> = index
        .sorted_duplicate_groups()
        .into_iter()
        .map(|(hash, members)| JsonGroup {
            fingerprint: hash.to_hex().to_string(),
            size: members[0].size,
            files: members
                .iter()
                .map(|m| m.path.display().to_string())
                .collect(),
        })
        .collect();

    let report = JsonReport {
        files_scanned,
        duplicate_groups: summary.duplicate_groups,
        duplicate_files: summary.duplicate_files(),
        possible_savings_bytes: summary.savings_bytes,
        groups,
    };

    let json =
        serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open output file: {}", path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON report")?;

    Ok(())
}
