use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    /// The destination now shares storage blocks with the source.
    Cloned,
    /// The platform or filesystem cannot clone this pair; the destination
    /// was left untouched.
    Skipped,
}

/// Replace `dest` with a copy-on-write clone of `source`.
///
/// The clone lands on a temporary name next to `dest` and is renamed into
/// place only once it exists, so an existing destination is never removed
/// before its replacement is ready. Filesystems without clone support
/// (and cross-device pairs) report `Skipped` instead of failing.
pub fn clone_file(source: &Path, dest: &Path) -> Result<CloneOutcome> {
    let source = std::path::absolute(source)
        .with_context(|| format!("unable to make source path absolute: {}", source.display()))?;
    let dest = std::path::absolute(dest)
        .with_context(|| format!("unable to make destination path absolute: {}", dest.display()))?;
    if !source.exists() {
        bail!("clone failed: source not found: {}", source.display());
    }

    let staging = staging_path(&dest)?;
    match platform_clone(&source, &staging) {
        Ok(true) => {
            if let Err(err) = fs::rename(&staging, &dest) {
                let _ = fs::remove_file(&staging);
                return Err(err).with_context(|| {
                    format!("unable to move clone into place at {}", dest.display())
                });
            }
            Ok(CloneOutcome::Cloned)
        }
        Ok(false) => {
            let _ = fs::remove_file(&staging);
            Ok(CloneOutcome::Skipped)
        }
        Err(err) => {
            let _ = fs::remove_file(&staging);
            Err(err).with_context(|| {
                format!(
                    "clone failed: {} -> {}",
                    source.display(),
                    dest.display()
                )
            })
        }
    }
}

fn staging_path(dest: &Path) -> Result<PathBuf> {
    let parent = dest
        .parent()
        .with_context(|| format!("destination has no parent directory: {}", dest.display()))?;
    let name = dest
        .file_name()
        .with_context(|| format!("destination has no file name: {}", dest.display()))?;
    Ok(parent.join(format!(
        ".{}.space-saver-{}.tmp",
        name.to_string_lossy(),
        std::process::id()
    )))
}

/// Returns Ok(true) when the clone was made, Ok(false) when the platform
/// or filesystem does not support cloning this pair.
#[cfg(target_os = "macos")]
fn platform_clone(source: &Path, dest: &Path) -> Result<bool> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let src = CString::new(source.as_os_str().as_bytes())
        .context("source path contains an interior NUL byte")?;
    let dst = CString::new(dest.as_os_str().as_bytes())
        .context("destination path contains an interior NUL byte")?;
    let rc = unsafe { libc::clonefile(src.as_ptr(), dst.as_ptr(), libc::CLONE_NOFOLLOW) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    let errno = err.raw_os_error();
    if errno == Some(libc::ENOTSUP) || errno == Some(libc::EXDEV) {
        Ok(false)
    } else {
        Err(err).context("clonefile failed")
    }
}

#[cfg(target_os = "linux")]
fn platform_clone(source: &Path, dest: &Path) -> Result<bool> {
    use std::fs::File;
    use std::os::fd::AsRawFd;

    let src = File::open(source)
        .with_context(|| format!("unable to open clone source: {}", source.display()))?;
    let dst = File::create(dest)
        .with_context(|| format!("unable to create clone destination: {}", dest.display()))?;
    let rc = unsafe { libc::ioctl(dst.as_raw_fd(), libc::FICLONE, src.as_raw_fd()) };
    if rc == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    let errno = err.raw_os_error();
    if errno == Some(libc::EOPNOTSUPP) || errno == Some(libc::EXDEV) || errno == Some(libc::ENOSYS)
    {
        Ok(false)
    } else {
        Err(err).context("FICLONE ioctl failed")
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn platform_clone(_source: &Path, _dest: &Path) -> Result<bool> {
    Ok(false)
}
