use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{ScanSource, Track};

fn is_audio_file(path: &Path, allowed: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| allowed.contains(&ext.to_ascii_lowercase()))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Enumerate the audio files reachable from `source`, sorted by file name.
///
/// An unreadable or missing source produces an empty list; an empty library is
/// a valid state for the session, not an error.
pub fn scan(source: &ScanSource, settings: &LibrarySettings) -> Vec<Track> {
    let allowed = settings.allowed_extensions();

    let candidates = match source {
        ScanSource::Directory(root) => walk_directory(root, settings),
        ScanSource::MediaIndex(index) => read_index(index),
    };

    let mut tracks: Vec<Track> = candidates
        .into_iter()
        .filter(|p| p.is_file() && is_audio_file(p, &allowed))
        .map(Track::new)
        .collect();

    tracks.sort_by(|a, b| {
        a.file_name
            .cmp(&b.file_name)
            .then_with(|| a.path.cmp(&b.path))
    });
    tracks.dedup_by(|a, b| a.path == b.path);

    debug!(source = %source.path().display(), count = tracks.len(), "library scanned");
    tracks
}

fn walk_directory(root: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!(root = %root.display(), "music directory is missing or not a directory");
        return Vec::new();
    }

    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e.into_path()),
            Err(err) => {
                debug!(%err, "skipping unreadable entry");
                None
            }
        })
        .collect()
}

fn read_index(index: &Path) -> Vec<PathBuf> {
    let contents = match fs::read_to_string(index) {
        Ok(c) => c,
        Err(err) => {
            warn!(index = %index.display(), %err, "media index is unreadable");
            return Vec::new();
        }
    };
    let base = index.parent().unwrap_or_else(|| Path::new("."));

    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let p = PathBuf::from(line);
            if p.is_relative() { base.join(p) } else { p }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionPreset;
    use std::fs;
    use tempfile::tempdir;

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.file_name.as_str()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let allowed = LibrarySettings::default().allowed_extensions();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &allowed));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &allowed));
        assert!(is_audio_file(Path::new("/tmp/a.m4a"), &allowed));
        assert!(is_audio_file(Path::new("/tmp/a.Aac"), &allowed));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &allowed));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &allowed));
        assert!(!is_audio_file(Path::new("/tmp/a"), &allowed));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_by_file_name() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("a.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();
        fs::create_dir(dir.path().join("d.mp3")).unwrap();

        let tracks = scan(
            &ScanSource::Directory(dir.path().to_path_buf()),
            &LibrarySettings::default(),
        );
        assert_eq!(names(&tracks), vec!["a.ogg", "b.MP3"]);
    }

    #[test]
    fn mp3_only_preset_drops_other_formats() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one.mp3"), b"x").unwrap();
        fs::write(dir.path().join("two.flac"), b"x").unwrap();

        let settings = LibrarySettings {
            preset: ExtensionPreset::Mp3Only,
            ..LibrarySettings::default()
        };
        let tracks = scan(&ScanSource::Directory(dir.path().to_path_buf()), &settings);
        assert_eq!(names(&tracks), vec!["one.mp3"]);
    }

    #[test]
    fn scan_of_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let tracks = scan(
            &ScanSource::Directory(dir.path().join("does-not-exist")),
            &LibrarySettings::default(),
        );
        assert!(tracks.is_empty());
    }

    #[test]
    fn scan_skips_hidden_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"x").unwrap();
        let sub = dir.path().join(".cache");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("inner.mp3"), b"x").unwrap();

        let tracks = scan(
            &ScanSource::Directory(dir.path().to_path_buf()),
            &LibrarySettings::default(),
        );
        assert_eq!(names(&tracks), vec!["visible.mp3"]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"x").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(&ScanSource::Directory(dir.path().to_path_buf()), &settings);
        assert_eq!(names(&tracks), vec!["root.mp3"]);
    }

    #[test]
    fn scan_sorts_across_directories_by_file_name_only() {
        let dir = tempdir().unwrap();
        let z = dir.path().join("z");
        let a = dir.path().join("a");
        fs::create_dir_all(&z).unwrap();
        fs::create_dir_all(&a).unwrap();
        fs::write(z.join("01 intro.mp3"), b"x").unwrap();
        fs::write(a.join("02 outro.mp3"), b"x").unwrap();

        let tracks = scan(
            &ScanSource::Directory(dir.path().to_path_buf()),
            &LibrarySettings::default(),
        );
        assert_eq!(names(&tracks), vec!["01 intro.mp3", "02 outro.mp3"]);
    }

    #[test]
    fn media_index_resolves_relative_paths_and_skips_comments_and_missing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.wav"), b"x").unwrap();
        let absolute = dir.path().join("a.wav");

        let index = dir.path().join("library.m3u");
        fs::write(
            &index,
            format!(
                "#EXTM3U\n\nb.mp3\n{}\ngone.mp3\nnotes.txt\nb.mp3\n",
                absolute.display()
            ),
        )
        .unwrap();

        let tracks = scan(&ScanSource::MediaIndex(index), &LibrarySettings::default());
        assert_eq!(names(&tracks), vec!["a.wav", "b.mp3"]);
    }

    #[test]
    fn unreadable_media_index_is_empty() {
        let dir = tempdir().unwrap();
        let tracks = scan(
            &ScanSource::MediaIndex(dir.path().join("missing.m3u")),
            &LibrarySettings::default(),
        );
        assert!(tracks.is_empty());
    }
}
