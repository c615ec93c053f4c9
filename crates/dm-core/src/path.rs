//! Path canonicalization.
//!
//! Paths reach dotmeta from three places: the command line, solution files
//! (which embed Windows separators regardless of the host), and project hint
//! paths. [`canonicalize`] turns any of them into one absolute textual form so
//! later comparisons can be plain string equality.
//!
//! Canonicalization is purely lexical. It never touches the filesystem beyond
//! reading the current directory, so it does not check existence and does not
//! resolve symbolic links.

use std::borrow::Cow;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::error::MetadataError;

/// The separator that is *not* native on this host.
#[cfg(windows)]
const FOREIGN_SEPARATOR: char = '/';
#[cfg(not(windows))]
const FOREIGN_SEPARATOR: char = '\\';

/// Rewrites foreign path separators to the host's native separator.
///
/// # Examples
///
/// ```
/// use dm_core::normalize_separators;
///
/// # #[cfg(not(windows))]
/// assert_eq!(normalize_separators(r"..\libs\Foo.dll"), "../libs/Foo.dll");
/// ```
#[must_use]
pub fn normalize_separators(path: &str) -> Cow<'_, str> {
    if path.contains(FOREIGN_SEPARATOR) {
        Cow::Owned(path.replace(FOREIGN_SEPARATOR, std::path::MAIN_SEPARATOR_STR))
    } else {
        Cow::Borrowed(path)
    }
}

/// Converts `path` into its canonical form.
///
/// The result is absolute (relative input is resolved against the current
/// directory), uses only native separators, and contains no `.` or `..`
/// segments. The function is idempotent.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidPath`] if the path is empty, contains a NUL
/// byte, or cannot be made absolute as UTF-8.
///
/// # Examples
///
/// ```
/// use dm_core::canonicalize;
///
/// # #[cfg(not(windows))]
/// # {
/// let path = canonicalize("/srv/app/./src/../lib/Foo.dll")?;
/// assert_eq!(path, "/srv/app/lib/Foo.dll");
/// assert_eq!(canonicalize(path.as_str())?, path);
/// # }
/// # Ok::<(), dm_core::MetadataError>(())
/// ```
pub fn canonicalize(path: &str) -> Result<Utf8PathBuf, MetadataError> {
    if path.trim().is_empty() {
        return Err(MetadataError::invalid_path(path, "path is empty"));
    }
    if path.contains('\0') {
        return Err(MetadataError::invalid_path(path, "path contains a NUL byte"));
    }

    let native = normalize_separators(path);
    let absolute = std::path::absolute(native.as_ref())
        .map_err(|e| MetadataError::invalid_path(path, e.to_string()))?;
    let absolute = Utf8PathBuf::try_from(absolute)
        .map_err(|_| MetadataError::invalid_path(path, "path is not valid UTF-8"))?;

    Ok(normalize_lexically(&absolute))
}

/// Joins a document-relative path onto `base_dir` and canonicalizes the result.
///
/// `relative` may use either separator style. If it is already absolute it
/// replaces `base_dir` entirely.
///
/// # Errors
///
/// Returns [`MetadataError::InvalidPath`] under the same conditions as
/// [`canonicalize`].
pub fn join_relative(base_dir: &Utf8Path, relative: &str) -> Result<Utf8PathBuf, MetadataError> {
    if relative.trim().is_empty() {
        return Err(MetadataError::invalid_path(relative, "path is empty"));
    }
    let joined = base_dir.join(normalize_separators(relative).as_ref());
    canonicalize(joined.as_str())
}

/// Resolves `.` and `..` segments without consulting the filesystem.
///
/// `..` at the root stays at the root.
fn normalize_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => out.push(component.as_str()),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                }
            }
            Utf8Component::Normal(segment) => out.push(segment),
        }
    }
    out
}
