//! Settings: a TOML file layered under `PLAYDECK__*` environment variables.

mod load;
mod schema;

pub use load::default_log_path;
pub use schema::*;

#[cfg(test)]
mod tests;
