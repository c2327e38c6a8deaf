use anyhow::{Context, Result, bail};
use blake3::Hasher;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::atomic::Ordering;

use crate::scanner::FileRecord;
use crate::utils::INTERRUPTED;

const HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Stream a file's full contents through blake3 and return the digest.
pub fn fingerprint(path: &Path) -> Result<blake3::Hash> {
    let file =
        File::open(path).with_context(|| format!("unable to open for hashing: {}", path.display()))?;
    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut hasher = Hasher::new();
    io::copy(&mut reader, &mut hasher)
        .with_context(|| format!("unable to read for hashing: {}", path.display()))?;
    Ok(hasher.finalize())
}

/// Fingerprint every candidate across the rayon pool. A read failure on
/// any file fails the whole batch: a partial fingerprint set would make
/// the savings accounting inconsistent. Completion order is arbitrary;
/// ordering is restored when records are inserted into the index.
pub fn fingerprint_all(
    records: Vec<FileRecord>,
    progress: &ProgressBar,
) -> Result<Vec<(blake3::Hash, FileRecord)>> {
    records
        .into_par_iter()
        .map(|record| {
            if INTERRUPTED.load(Ordering::Relaxed) {
                bail!("Hashing interrupted by user");
            }
            let hash = fingerprint(&record.path)?;
            progress.inc(1);
            Ok((hash, record))
        })
        .collect()
}
