/// Volume model -- one entry per mount point of a fixed disk.
///
/// The kind of a volume is never stored; it is derived from the shape
/// of its path every time it is asked for.
use std::path::MAIN_SEPARATOR;

/// How a volume is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKind {
    /// Drive-letter style root, e.g. `C:\`.
    RootVolume,
    /// Volume mounted as a folder under another volume.
    MountedFolder,
}

impl VolumeKind {
    /// Human-readable group label.
    pub fn label(self) -> &'static str {
        match self {
            Self::RootVolume => "Drives",
            Self::MountedFolder => "Mounted folders",
        }
    }
}

/// Classify a mount path.
///
/// A path is a [`VolumeKind::RootVolume`] if and only if it is exactly
/// three characters long and ends with the platform separator.
pub fn classify(path: &str) -> VolumeKind {
    if path.chars().count() == 3 && path.ends_with(MAIN_SEPARATOR) {
        VolumeKind::RootVolume
    } else {
        VolumeKind::MountedFolder
    }
}

/// Append the platform separator to `path` unless it already ends with one.
pub fn with_trailing_separator(path: &str) -> String {
    if path.ends_with(MAIN_SEPARATOR) {
        path.to_owned()
    } else {
        format!("{path}{MAIN_SEPARATOR}")
    }
}

/// A single discoverable fixed-disk mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    /// Absolute mount path, always separator-terminated.
    pub path: String,
    /// Whether the user chose this volume for keep-awake treatment.
    pub selected: bool,
}

impl Volume {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: with_trailing_separator(&path.into()),
            selected: false,
        }
    }

    pub fn kind(&self) -> VolumeKind {
        classify(&self.path)
    }
}

/// Result of one enumeration pass, split by kind.
///
/// Both groups are sorted lexicographically by path and never share an
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeList {
    pub roots: Vec<Volume>,
    pub mounted_folders: Vec<Volume>,
}

impl VolumeList {
    /// Build a list from raw mount paths. Duplicate paths collapse to one
    /// entry.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for path in paths {
            let volume = Volume::new(path.as_ref());
            let group = match volume.kind() {
                VolumeKind::RootVolume => &mut list.roots,
                VolumeKind::MountedFolder => &mut list.mounted_folders,
            };
            if !group.iter().any(|v| v.path == volume.path) {
                group.push(volume);
            }
        }
        list.roots.sort_by(|a, b| a.path.cmp(&b.path));
        list.mounted_folders.sort_by(|a, b| a.path.cmp(&b.path));
        list
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.mounted_folders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len() + self.mounted_folders.len()
    }

    /// Iterate roots first, then mounted folders.
    pub fn iter(&self) -> impl Iterator<Item = &Volume> {
        self.roots.iter().chain(self.mounted_folders.iter())
    }

    /// Set each volume's `selected` flag from membership in `is_selected`.
    pub fn mark_selected(&mut self, is_selected: impl Fn(&str) -> bool) {
        for volume in self.roots.iter_mut().chain(self.mounted_folders.iter_mut()) {
            volume.selected = is_selected(&volume.path);
        }
    }
}
