//! Application module: exposes the presentation model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the list cursor and the
//! scrub preview.

mod model;

pub use model::*;
