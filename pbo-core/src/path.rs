//! Translation between archive paths and host paths.
//!
//! Archive paths always use a backslash as separator. Translation is a
//! plain byte substitution in either direction; a path that legitimately
//! contains the other convention's separator byte cannot be told apart
//! after translation, and no escaping is attempted.

use crate::error::{PboError, Result};
use std::path::{Component, Path, PathBuf};

/// Separator used inside archives.
pub const ARCHIVE_SEPARATOR: u8 = b'\\';

/// Native separator of the host.
pub const HOST_SEPARATOR: u8 = std::path::MAIN_SEPARATOR as u8;

fn substitute(path: &[u8], from: u8, to: u8) -> Vec<u8> {
    if from == to {
        return path.to_vec();
    }
    path.iter()
        .map(|&b| if b == from { to } else { b })
        .collect()
}

/// Translate an archive path to host separators.
pub fn to_host(path: &[u8]) -> Vec<u8> {
    substitute(path, ARCHIVE_SEPARATOR, HOST_SEPARATOR)
}

/// Translate a host path to archive separators.
pub fn to_archive(path: &[u8]) -> Vec<u8> {
    substitute(path, HOST_SEPARATOR, ARCHIVE_SEPARATOR)
}

#[cfg(unix)]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

/// Convert archive path bytes into a host [`PathBuf`].
pub fn archive_to_host_path(path: &[u8]) -> PathBuf {
    bytes_to_path(to_host(path))
}

/// Convert a host path into archive path bytes.
///
/// Root, drive prefix and `.` components are dropped so the result never
/// starts with a separator. A `..` component is rejected.
pub fn host_to_archive_path(path: &Path) -> Result<Vec<u8>> {
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(PboError::invalid_argument(format!(
                    "parent directory component in input path {}",
                    path.display()
                )));
            }
        }
    }
    Ok(to_archive(&path_to_bytes(&relative)))
}

/// Remove a single trailing separator, keeping a bare root intact.
pub fn strip_trailing_separator(path: &Path) -> PathBuf {
    let mut bytes = path_to_bytes(path);
    if bytes.len() > 1 && bytes.last() == Some(&HOST_SEPARATOR) {
        bytes.pop();
    }
    bytes_to_path(bytes)
}
