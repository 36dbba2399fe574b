//! Disk usage through `statvfs`. Implementation based on
//! [heim's](https://github.com/heim-rs/heim) Unix disk usage.

use std::{ffi::CString, io, mem, os::unix::ffi::OsStrExt, path::Path};

use super::{DiskUsage, usage_from};
use crate::collection::{CollectionError, CollectionResult, SysinfoSource};

/// Returns the usage of the filesystem that `path` is on.
pub(crate) fn get_disk_usage(_source: &mut SysinfoSource, path: &Path) -> CollectionResult<DiskUsage> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid path {path:?}: {e}"))?;

    let mut vfs = mem::MaybeUninit::<libc::statvfs>::uninit();

    // SAFETY: libc call, `c_path` is a valid C string and buf is a valid pointer to
    // write to.
    let result = unsafe { libc::statvfs(c_path.as_ptr(), vfs.as_mut_ptr()) };

    if result != 0 {
        let err = io::Error::last_os_error();
        return Err(if err.kind() == io::ErrorKind::NotFound {
            CollectionError::NotFound(path.display().to_string())
        } else {
            CollectionError::General(
                anyhow::Error::new(err).context(format!("statvfs failed for {path:?}")),
            )
        });
    }

    // SAFETY: If result is 0, it succeeded, and vfs should be non-null.
    let vfs = unsafe { vfs.assume_init() };

    #[allow(clippy::unnecessary_cast)]
    let (total, free, avail, fragment_size) = (
        vfs.f_blocks as u64,
        vfs.f_bfree as u64,
        vfs.f_bavail as u64,
        vfs.f_frsize as u64,
    );

    let used = total.saturating_sub(free) * fragment_size;
    Ok(usage_from(used, avail * fragment_size))
}
