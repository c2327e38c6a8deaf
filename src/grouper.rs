use std::collections::HashMap;

use crate::scanner::FileRecord;

/// Owned mapping from content fingerprint to the files sharing it.
/// Built once per invocation and handed to the planner; nothing here
/// survives the run.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    groups: HashMap<blake3::Hash, Vec<FileRecord>>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fingerprints(pairs: Vec<(blake3::Hash, FileRecord)>) -> Self {
        let mut index = Self::new();
        for (hash, record) in pairs {
            index.insert(hash, record);
        }
        index
    }

    /// Insert a record under its content fingerprint.
    ///
    /// A record whose identity already appears in the group is dropped:
    /// the same underlying file reached through a second path is not a
    /// duplicate of itself. Members stay sorted by modification time
    /// ascending; equal timestamps keep their insertion order.
    pub fn insert(&mut self, hash: blake3::Hash, record: FileRecord) {
        let members = self.groups.entry(hash).or_default();
        if members.iter().any(|m| m.identity == record.identity) {
            return;
        }
        let at = members.partition_point(|m| m.modified <= record.modified);
        members.insert(at, record);
    }

    /// Groups with at least two members, in unspecified order.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = (&blake3::Hash, &[FileRecord])> {
        self.groups
            .iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(hash, members)| (hash, members.as_slice()))
    }

    /// Duplicate groups ordered by digest, for deterministic output.
    pub fn sorted_duplicate_groups(&self) -> Vec<(&blake3::Hash, &[FileRecord])> {
        let mut groups: Vec<_> = self.duplicate_groups().collect();
        groups.sort_by_key(|(hash, _)| *hash.as_bytes());
        groups
    }
}
