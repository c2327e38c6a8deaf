use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::identity::FileIdentity;
use crate::utils::INTERRUPTED;

/// A regular file that survived the minimum-size filter. Immutable once
/// created; ownership passes to the duplicate index.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    pub identity: FileIdentity,
}

/// Walk `root` and collect every regular file of at least `min_size`
/// bytes. Directories are descended into, symlinks and special files are
/// skipped silently. Any traversal or metadata failure aborts the whole
/// walk: savings must never be reported against a partial file set.
pub fn collect_candidates(
    root: &Path,
    min_size: u64,
    progress: &ProgressBar,
) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    let mut scanned = 0u64;

    for entry in WalkDir::new(root).follow_links(false) {
        if INTERRUPTED.load(Ordering::Relaxed) {
            bail!("Scan interrupted by user");
        }

        let entry =
            entry.with_context(|| format!("problem walking directory {}", root.display()))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry
            .metadata()
            .with_context(|| format!("unable to read metadata for {}", entry.path().display()))?;

        let size = metadata.len();
        if size < min_size {
            continue;
        }

        let modified = metadata.modified().with_context(|| {
            format!(
                "unable to read modification time for {}",
                entry.path().display()
            )
        })?;
        let identity = FileIdentity::of(entry.path(), &metadata)
            .with_context(|| format!("unable to identify {}", entry.path().display()))?;

        records.push(FileRecord {
            path: entry.path().to_path_buf(),
            size,
            modified,
            identity,
        });

        scanned += 1;
        if scanned.is_multiple_of(1000) {
            progress.set_message(format!("Scanned {} candidate files...", scanned));
        }
    }

    Ok(records)
}
