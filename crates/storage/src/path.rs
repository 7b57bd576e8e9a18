//! Path validation.
//!
//! Rendered names get joined onto the parent directory of the entry being
//! renamed. A name that isn't exactly one normal path component would move
//! the entry somewhere else entirely (`..`), or nowhere (`.`).

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates that `name` can be used as a single file or directory name.
///
/// > **Note:** This does **not** replace illegal characters, it only rejects
/// >           names that would change *where* a path points. Null bytes are
/// >           explicitly rejected.
///
/// # Examples
///
/// ```
/// use dlren_storage::validate_name;
/// assert!(validate_name("[RJ123456] Title").is_ok());
/// assert!(validate_name("archive.zip").is_ok());
/// assert!(validate_name("..").is_err());
/// assert!(validate_name("a/b").is_err());
/// assert!(validate_name("").is_err());
/// ```
pub fn validate_name(name: impl AsRef<OsStr>) -> Result<PathBuf> {
    let name = name.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidName(PathBuf::from(name)));
    // Null bytes pass through Path::components() on Unix but cause
    // truncation in C-based syscalls, reject them explicitly.
    if name.as_encoded_bytes().contains(&0) {
        return Err(invalid());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        // Trailing separators are swallowed by components(), so compare
        // against the original to catch "name/".
        (Some(Component::Normal(component)), None) if component == name => Ok(PathBuf::from(component)),
        _ => Err(invalid()),
    }
}
