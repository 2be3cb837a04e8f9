//! HTTP Handlers

mod download;
mod ping;
mod settings;

pub use download::*;
pub use ping::*;
pub use settings::*;
