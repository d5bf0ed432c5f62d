//! Capacity and free space of the volume holding a path.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub used_bytes: u64,
    /// Space available to unprivileged users, not counting reserved blocks.
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn from_blocks(mount_point: PathBuf, block_size: u64, blocks: u64, available: u64) -> Self {
        let total_bytes = blocks.saturating_mul(block_size);
        let free_bytes = available.saturating_mul(block_size).min(total_bytes);

        DiskUsage {
            mount_point,
            total_bytes,
            used_bytes: total_bytes - free_bytes,
            free_bytes,
        }
    }

    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    /// "critical" from 90% used, "warning" from 75%, otherwise "ok".
    pub fn level(&self) -> &'static str {
        match self.usage_percent() {
            p if p >= 90.0 => "critical",
            p if p >= 75.0 => "warning",
            _ => "ok",
        }
    }
}

#[cfg(unix)]
pub fn disk_usage(path: &Path) -> Result<DiskUsage> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a nul byte"))?;

    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: c_path is nul-terminated and stat points to writable memory
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return Err(io::Error::last_os_error().into());
    }
    // SAFETY: statvfs returned 0, so the struct is initialized
    let stat = unsafe { stat.assume_init() };

    // field widths differ between platforms
    #[allow(clippy::unnecessary_cast)]
    let (block_size, blocks, available) =
        (stat.f_frsize as u64, stat.f_blocks as u64, stat.f_bavail as u64);

    Ok(DiskUsage::from_blocks(path.to_path_buf(), block_size, blocks, available))
}

#[cfg(not(unix))]
pub fn disk_usage(_path: &Path) -> Result<DiskUsage> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "disk usage is only available on unix").into())
}
