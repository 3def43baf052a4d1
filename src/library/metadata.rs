//! Best-effort tag and cover-art extraction.
//!
//! Every field is optional: a file without tags, a broken tag, or an
//! undecodable picture simply yields `None` for that field.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::*;
use tracing::debug;

/// Shown when neither a title tag nor a usable file name exists.
pub const UNTITLED: &str = "Untitled";

/// Decoded covers are shrunk to fit this many pixels per side.
const THUMBNAIL_EDGE: u32 = 256;

/// A decoded embedded picture.
#[derive(Clone, PartialEq)]
pub struct Artwork {
    pub image: RgbaImage,
}

impl Artwork {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Cover art as published to the UI: the track's picture or the built-in default.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CoverArt {
    Embedded(Arc<Artwork>),
    #[default]
    Default,
}

impl CoverArt {
    pub fn from_artwork(artwork: Option<Artwork>) -> Self {
        artwork.map_or(Self::Default, |a| Self::Embedded(Arc::new(a)))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artwork: Option<Artwork>,
}

/// Source of per-track display metadata.
pub trait MetadataProvider: Send + Sync {
    fn extract(&self, path: &Path) -> TrackMetadata;
}

/// Title to show for a track: the tag if present, else the file stem.
pub fn display_title(title: Option<&str>, path: &Path) -> String {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or(UNTITLED)
        .to_string()
}

/// Metadata reader backed by `lofty` tags and `image` decoding.
pub struct LoftyMetadata {
    max_artwork_bytes: usize,
}

impl LoftyMetadata {
    pub fn new(max_artwork_bytes: usize) -> Self {
        Self { max_artwork_bytes }
    }

    fn pick_picture(pictures: &[Picture]) -> Option<&Picture> {
        pictures
            .iter()
            .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
            .or_else(|| pictures.first())
    }

    fn decode_picture(&self, path: &Path, picture: &Picture) -> Option<Artwork> {
        let data = picture.data();
        if data.len() > self.max_artwork_bytes {
            debug!(
                path = %path.display(),
                size = data.len(),
                max = self.max_artwork_bytes,
                "embedded picture too large, skipping"
            );
            return None;
        }

        match image::load_from_memory(data) {
            Ok(img) => Some(Artwork {
                image: img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE).to_rgba8(),
            }),
            Err(err) => {
                debug!(path = %path.display(), %err, "embedded picture did not decode");
                None
            }
        }
    }
}

impl MetadataProvider for LoftyMetadata {
    fn extract(&self, path: &Path) -> TrackMetadata {
        let tagged = match lofty::read_from_path(path) {
            Ok(t) => t,
            Err(err) => {
                debug!(path = %path.display(), %err, "no readable tags");
                return TrackMetadata::default();
            }
        };

        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return TrackMetadata::default();
        };

        let title = tag
            .title()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let artwork = Self::pick_picture(tag.pictures()).and_then(|p| self.decode_picture(path, p));

        TrackMetadata { title, artwork }
    }
}
