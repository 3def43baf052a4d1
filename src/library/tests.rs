use super::*;
use std::path::{Path, PathBuf};

#[test]
fn display_title_prefers_trimmed_tag() {
    let p = Path::new("/music/01 Song.mp3");
    assert_eq!(display_title(Some("  Real Title "), p), "Real Title");
}

#[test]
fn display_title_falls_back_to_file_stem() {
    let p = Path::new("/music/01 Song.mp3");
    assert_eq!(display_title(None, p), "01 Song");
    assert_eq!(display_title(Some("   "), p), "01 Song");
}

#[test]
fn display_title_uses_untitled_when_nothing_is_usable() {
    assert_eq!(display_title(None, Path::new("/")), UNTITLED);
}

#[test]
fn cover_art_defaults_when_no_artwork() {
    assert!(CoverArt::from_artwork(None).is_default());

    let art = Artwork {
        image: image::RgbaImage::new(2, 3),
    };
    match CoverArt::from_artwork(Some(art)) {
        CoverArt::Embedded(a) => assert_eq!((a.width(), a.height()), (2, 3)),
        CoverArt::Default => panic!("expected embedded artwork"),
    }
}

#[test]
fn lofty_metadata_on_untagged_file_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.mp3");
    std::fs::write(&path, b"definitely not an mpeg stream").unwrap();

    let meta = LoftyMetadata::new(1024).extract(&path);
    assert_eq!(meta, TrackMetadata::default());
}

#[test]
fn lofty_metadata_on_missing_file_yields_nothing() {
    let meta = LoftyMetadata::new(1024).extract(Path::new("/definitely/not/here.flac"));
    assert!(meta.title.is_none());
    assert!(meta.artwork.is_none());
}

#[test]
fn track_exposes_file_name_and_stem() {
    let t = Track::new(PathBuf::from("/music/Album/Track One.FLAC"));
    assert_eq!(t.file_name, "Track One.FLAC");
    assert_eq!(t.stem(), Some("Track One"));
}

#[test]
fn scan_source_treats_files_as_media_index() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("all.m3u");
    std::fs::write(&index, "").unwrap();

    assert_eq!(ScanSource::from_path(&index), ScanSource::MediaIndex(index.clone()));
    assert_eq!(
        ScanSource::from_path(dir.path()),
        ScanSource::Directory(dir.path().to_path_buf())
    );
}
