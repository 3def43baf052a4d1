use std::path::{Path, PathBuf};

/// One playable audio file. Display metadata is derived when the track loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub file_name: String,
}

impl Track {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }

    /// File name without its extension, used when no title tag is available.
    pub fn stem(&self) -> Option<&str> {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Where the scanner looks for audio files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanSource {
    /// Walk a directory tree.
    Directory(PathBuf),
    /// Read a text index listing one audio path per line.
    MediaIndex(PathBuf),
}

impl ScanSource {
    /// A regular file is treated as a media index, anything else as a directory.
    pub fn from_path(path: &Path) -> Self {
        if path.is_file() {
            Self::MediaIndex(path.to_path_buf())
        } else {
            Self::Directory(path.to_path_buf())
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(p) | Self::MediaIndex(p) => p,
        }
    }
}

/// The ordered, immutable set of tracks available for one session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}
