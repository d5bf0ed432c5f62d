//! Size measurement for matched items.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

pub struct Measured {
    pub size_bytes: u64,
    pub last_modified: Option<i64>,
    pub warnings: Vec<String>,
}

/// Measures one matched path without following symlinks.
///
/// Fails only when the path itself can't be read. Unreadable entries below a
/// directory are skipped and reported as warnings.
pub fn measure(path: &Path) -> io::Result<Measured> {
    let metadata = fs::symlink_metadata(path)?;
    let last_modified = metadata.modified().ok().and_then(unix_secs);

    if !metadata.is_dir() {
        return Ok(Measured {
            size_bytes: metadata.len(),
            last_modified,
            warnings: Vec::new(),
        });
    }

    // a directory we cannot list is not an item
    fs::read_dir(path)?;

    let (size_bytes, warnings) = calculate_dir_size(path);
    Ok(Measured {
        size_bytes,
        last_modified,
        warnings,
    })
}

pub fn calculate_dir_size(path: &Path) -> (u64, Vec<String>) {
    let mut total = 0u64;
    let mut warnings = Vec::new();
    let mut overflowed = false;

    for entry in WalkDir::new(path).follow_links(false) {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                match entry.metadata() {
                    Ok(metadata) => match total.checked_add(metadata.len()) {
                        Some(new_total) => total = new_total,
                        None => {
                            if !overflowed {
                                warnings.push(format!(
                                    "{}: size exceeds u64::MAX, capped",
                                    path.display()
                                ));
                                overflowed = true;
                            }
                            total = u64::MAX;
                        }
                    },
                    Err(e) => warnings.push(format!("{}: {e}", entry.path().display())),
                }
            }
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "unknown path".to_string());
                let denied = e
                    .io_error()
                    .map(|io_err| io_err.kind() == io::ErrorKind::PermissionDenied)
                    .unwrap_or(false);

                if denied {
                    warnings.push(format!("permission denied: {location}"));
                } else {
                    warnings.push(format!("unreadable: {location}: {e}"));
                }
            }
        }
    }

    (total, warnings)
}

fn unix_secs(time: SystemTime) -> Option<i64> {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs() as i64)
}
