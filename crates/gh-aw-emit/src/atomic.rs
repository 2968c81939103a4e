//! Atomic output writes (spec.md §5): a partially-written lock file must
//! never be observable, so every emit goes through a temp file in the same
//! directory (to guarantee the final rename is same-filesystem) followed by
//! a rename. Grounded on `csa_lock`'s own single-writer lock-and-swap file
//! discipline, minus the advisory lock itself since the emitter has no
//! concurrent-writer scenario to guard against (spec.md §5: one `compile()`
//! call owns one output path).

use std::io;
use std::path::Path;

pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    use std::io::Write;
    temp.write_all(contents.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
