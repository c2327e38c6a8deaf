use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

/// Identifies the underlying storage object behind a path, independent of
/// the path used to reach it. Hard links share an identity; independent
/// copies (and copy-on-write clones) do not.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

#[cfg(not(unix))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    canonical: std::path::PathBuf,
}

impl FileIdentity {
    pub fn of(path: &Path, metadata: &Metadata) -> io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let _ = path;
            Ok(FileIdentity {
                dev: metadata.dev(),
                ino: metadata.ino(),
            })
        }
        #[cfg(not(unix))]
        {
            let _ = metadata;
            Ok(FileIdentity {
                canonical: path.canonicalize()?,
            })
        }
    }

    #[cfg(test)]
    pub(crate) fn fake(n: u64) -> Self {
        #[cfg(unix)]
        {
            FileIdentity { dev: 0, ino: n }
        }
        #[cfg(not(unix))]
        {
            FileIdentity {
                canonical: std::path::PathBuf::from(format!("fake-identity-{n}")),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameFileOutcome {
    SourceMissing,
    TargetMissing,
    Same,
    Different,
}

/// Compare two paths by storage identity rather than path string or
/// content. Missing paths are reported as outcomes, not errors.
pub fn same_file_outcome(source: &Path, target: &Path) -> SameFileOutcome {
    let Ok(source_meta) = fs::metadata(source) else {
        return SameFileOutcome::SourceMissing;
    };
    let Ok(target_meta) = fs::metadata(target) else {
        return SameFileOutcome::TargetMissing;
    };
    let Ok(source_id) = FileIdentity::of(source, &source_meta) else {
        return SameFileOutcome::SourceMissing;
    };
    let Ok(target_id) = FileIdentity::of(target, &target_meta) else {
        return SameFileOutcome::TargetMissing;
    };
    if source_id == target_id {
        SameFileOutcome::Same
    } else {
        SameFileOutcome::Different
    }
}
