use anyhow::Result;

use crate::clone::{CloneOutcome, clone_file};
use crate::grouper::DuplicateIndex;
use crate::output;

/// Accumulated results of one planning or cloning pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupSummary {
    pub duplicate_groups: usize,
    pub targets: usize,
    pub cloned: usize,
    pub skipped: usize,
    pub savings_bytes: u64,
}

impl DedupSummary {
    pub fn duplicate_files(&self) -> usize {
        self.duplicate_groups + self.targets
    }
}

/// Report mode: one line per duplicate pair, no filesystem mutation.
///
/// The canonical source of each group is its earliest-modified member;
/// every other member counts its full size toward the possible savings.
pub fn report_duplicates(index: &DuplicateIndex) -> DedupSummary {
    let mut summary = DedupSummary::default();
    for (_hash, members) in index.sorted_duplicate_groups() {
        summary.duplicate_groups += 1;
        let source = &members[0];
        for target in &members[1..] {
            summary.targets += 1;
            summary.savings_bytes += target.size;
            output::print_duplicate_pair(source, target);
        }
    }
    summary
}

/// Execute the dedup plan: clone each group's canonical source over its
/// targets. Without `real` this is a dry run that only prints the plan.
/// A skipped clone (no platform support) is counted but not fatal; any
/// other clone failure aborts the run before later groups are touched.
pub fn clone_duplicates(index: &DuplicateIndex, real: bool) -> Result<DedupSummary> {
    let mut summary = DedupSummary::default();
    for (_hash, members) in index.sorted_duplicate_groups() {
        summary.duplicate_groups += 1;
        let source = &members[0];
        for target in &members[1..] {
            summary.targets += 1;
            summary.savings_bytes += target.size;
            if !real {
                output::print_would_clone(source, target);
                continue;
            }
            match clone_file(&source.path, &target.path)? {
                CloneOutcome::Cloned => {
                    summary.cloned += 1;
                    output::print_cloned(source, target);
                }
                CloneOutcome::Skipped => {
                    summary.skipped += 1;
                    output::print_clone_skipped(target);
                }
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::fingerprint_all;
    use crate::scanner::collect_candidates;
    use filetime::FileTime;
    use indicatif::ProgressBar;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn build_index(root: &Path) -> DuplicateIndex {
        let records = collect_candidates(root, 0, &ProgressBar::hidden()).unwrap();
        let pairs = fingerprint_all(records, &ProgressBar::hidden()).unwrap();
        DuplicateIndex::from_fingerprints(pairs)
    }

    fn write_with_mtime(path: &Path, content: &[u8], mtime_secs: i64) {
        fs::write(path, content).unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(mtime_secs, 0)).unwrap();
    }

    #[test]
    fn test_n_files_yield_n_minus_one_targets() {
        let dir = tempdir().unwrap();
        let content = b"duplicated content, thirty-odd bytes";
        write_with_mtime(&dir.path().join("oldest.bin"), content, 1_000);
        write_with_mtime(&dir.path().join("middle.bin"), content, 2_000);
        write_with_mtime(&dir.path().join("newest.bin"), content, 3_000);
        write_with_mtime(&dir.path().join("unique.bin"), b"different", 1_500);

        let index = build_index(dir.path());
        let summary = report_duplicates(&index);

        assert_eq!(summary.duplicate_groups, 1);
        assert_eq!(summary.targets, 2);
        assert_eq!(summary.duplicate_files(), 3);
        assert_eq!(summary.savings_bytes, 2 * content.len() as u64);
    }

    #[test]
    fn test_canonical_source_is_earliest_modified() {
        let dir = tempdir().unwrap();
        let content = b"same bytes";
        write_with_mtime(&dir.path().join("newer.bin"), content, 5_000);
        write_with_mtime(&dir.path().join("older.bin"), content, 1_000);

        let index = build_index(dir.path());
        let groups = index.sorted_duplicate_groups();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].1[0].path.ends_with("older.bin"));
        assert!(groups[0].1[1].path.ends_with("newer.bin"));
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let dir = tempdir().unwrap();
        let content = b"do not touch";
        write_with_mtime(&dir.path().join("a.bin"), content, 1_000);
        write_with_mtime(&dir.path().join("b.bin"), content, 2_000);

        let index = build_index(dir.path());
        let summary = clone_duplicates(&index, false).unwrap();

        assert_eq!(summary.targets, 1);
        assert_eq!(summary.cloned, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(fs::read(dir.path().join("a.bin")).unwrap(), content);
        assert_eq!(fs::read(dir.path().join("b.bin")).unwrap(), content);
        let mtime = FileTime::from_last_modification_time(
            &fs::metadata(dir.path().join("b.bin")).unwrap(),
        );
        assert_eq!(mtime.unix_seconds(), 2_000);
    }

    #[test]
    fn test_real_run_accounts_for_every_target() {
        let dir = tempdir().unwrap();
        let content = b"clone target content";
        write_with_mtime(&dir.path().join("a.bin"), content, 1_000);
        write_with_mtime(&dir.path().join("b.bin"), content, 2_000);
        write_with_mtime(&dir.path().join("c.bin"), content, 3_000);

        let index = build_index(dir.path());
        let summary = clone_duplicates(&index, true).unwrap();

        assert_eq!(summary.targets, 2);
        assert_eq!(summary.cloned + summary.skipped, 2);
        // Whether or not the filesystem supports cloning, no target may
        // be lost or altered in content.
        for name in ["a.bin", "b.bin", "c.bin"] {
            assert_eq!(fs::read(dir.path().join(name)).unwrap(), content);
        }
    }

    #[test]
    fn test_hard_links_are_not_clone_targets() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("original.bin");
        write_with_mtime(&original, b"linked content", 1_000);
        fs::hard_link(&original, dir.path().join("link.bin")).unwrap();

        let index = build_index(dir.path());
        let summary = report_duplicates(&index);
        assert_eq!(summary.duplicate_groups, 0);
        assert_eq!(summary.targets, 0);
    }
}
