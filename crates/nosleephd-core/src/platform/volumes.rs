/// Fixed-disk volume enumeration.
///
/// Reports every mount point of every fixed volume, including volumes
/// mounted as folders without a drive letter. A volume with several mount
/// points yields one entry per mount point.
use crate::model::VolumeList;

/// Anything that can list the currently mounted fixed-disk volumes.
pub trait VolumeSource: Send + Sync {
    /// Enumerate volumes. Never fails; an unavailable listing is empty.
    fn enumerate(&self) -> VolumeList;
}

/// The operating system's own volume table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVolumes;

impl VolumeSource for SystemVolumes {
    fn enumerate(&self) -> VolumeList {
        enumerate_volumes()
    }
}

/// A fixed list of mount paths, for callers that already know them.
#[derive(Debug, Clone, Default)]
pub struct StaticVolumes {
    paths: Vec<String>,
}

impl StaticVolumes {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl VolumeSource for StaticVolumes {
    fn enumerate(&self) -> VolumeList {
        VolumeList::from_paths(&self.paths)
    }
}

/// Enumerate all fixed-disk mount points on this machine.
pub fn enumerate_volumes() -> VolumeList {
    let paths = imp::fixed_mount_points();
    tracing::debug!("Enumerated {} fixed mount points", paths.len());
    VolumeList::from_paths(paths)
}

#[cfg(windows)]
mod imp {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::Storage::FileSystem::{
        FindFirstVolumeW, FindNextVolumeW, FindVolumeClose, GetDriveTypeW,
        GetVolumePathNamesForVolumeNameW,
    };

    // Drive type constant from the Windows API.
    const DRIVE_FIXED_VAL: u32 = 3;

    const VOLUME_NAME_LEN: usize = 260;

    /// Closes the volume search handle on every exit path.
    struct FindVolumeGuard(HANDLE);

    impl Drop for FindVolumeGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = FindVolumeClose(self.0);
            }
        }
    }

    pub(super) fn fixed_mount_points() -> Vec<String> {
        let mut mount_points = Vec::new();
        let mut name_buf = [0u16; VOLUME_NAME_LEN];

        let guard = match unsafe { FindFirstVolumeW(&mut name_buf) } {
            Ok(handle) => FindVolumeGuard(handle),
            Err(e) => {
                tracing::warn!("FindFirstVolumeW failed: {e}");
                return mount_points;
            }
        };

        loop {
            let name_len = name_buf.iter().position(|&c| c == 0).unwrap_or(name_buf.len());
            let volume_name: Vec<u16> = name_buf[..name_len]
                .iter()
                .copied()
                .chain(std::iter::once(0))
                .collect();

            match volume_path_names(&volume_name) {
                Some(paths) => {
                    for path in paths {
                        if is_fixed(&path) {
                            mount_points.push(path);
                        }
                    }
                }
                None => tracing::debug!(
                    "Skipping volume {}: mount point query failed",
                    String::from_utf16_lossy(&volume_name[..name_len])
                ),
            }

            name_buf.fill(0);
            if unsafe { FindNextVolumeW(guard.0, &mut name_buf) }.is_err() {
                break;
            }
        }

        mount_points
    }

    /// All mount paths of one volume GUID path. `None` if the query fails.
    fn volume_path_names(volume_name: &[u16]) -> Option<Vec<String>> {
        let name = PCWSTR(volume_name.as_ptr());

        // First call only sizes the buffer; it reports ERROR_MORE_DATA.
        let mut needed = 0u32;
        let _ = unsafe { GetVolumePathNamesForVolumeNameW(name, None, &mut needed) };
        if needed == 0 {
            return None;
        }

        let mut buf = vec![0u16; needed as usize];
        unsafe { GetVolumePathNamesForVolumeNameW(name, Some(&mut buf), &mut needed) }.ok()?;

        // Multi-string: NUL-separated entries ending in a double NUL.
        Some(
            buf.split(|&c| c == 0)
                .filter(|s| !s.is_empty())
                .map(String::from_utf16_lossy)
                .collect(),
        )
    }

    fn is_fixed(root: &str) -> bool {
        let wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe { GetDriveTypeW(PCWSTR(wide.as_ptr())) == DRIVE_FIXED_VAL }
    }
}

#[cfg(not(windows))]
mod imp {
    use crate::model::volume::with_trailing_separator;
    use sysinfo::Disks;

    pub(super) fn fixed_mount_points() -> Vec<String> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .filter(|disk| !disk.is_removable())
            .map(|disk| with_trailing_separator(&disk.mount_point().to_string_lossy()))
            .collect()
    }
}
