use anyhow::{Result, bail};
use std::path::Path;
use std::sync::atomic::AtomicBool;

pub static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn validate_target_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Target directory does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("Target is not a directory: {}", path.display());
    }
    Ok(())
}
