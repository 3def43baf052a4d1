//! Library module: scanning storage for audio files and reading their
//! display metadata.

mod metadata;
mod model;
mod scan;

pub use metadata::{
    Artwork, CoverArt, LoftyMetadata, MetadataProvider, TrackMetadata, UNTITLED, display_title,
};
pub use model::{Catalog, ScanSource, Track};
pub use scan::scan;

#[cfg(test)]
mod tests;
