//! Physical filesystem detection. Original list from
//! [heim](https://github.com/heim-rs/heim/blob/master/heim-disk/src/filesystem.rs).

/// Filesystems that live on a real device. Everything else (`tmpfs`, `proc`,
/// `cgroup2`, network mounts and so on) is considered virtual.
const PHYSICAL_FILE_SYSTEMS: &[&str] = &[
    "ext2", "ext3", "ext4", "msdos", "vfat", "exfat", "f2fs", "ntfs", "ntfs3", "zfs", "hfs",
    "hfsplus", "jfs", "reiserfs", "reiser4", "btrfs", "bcachefs", "minix", "nilfs", "nilfs2",
    "xfs", "apfs", "fuseblk",
];

/// Checks if the filesystem type is used for a physical device.
#[inline]
pub(crate) fn is_physical(fs_type: &str) -> bool {
    // `eq_ignore_ascii_case` avoids a string allocation.
    PHYSICAL_FILE_SYSTEMS
        .iter()
        .any(|physical| fs_type.eq_ignore_ascii_case(physical))
}
