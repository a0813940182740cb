mod config;
mod photo_store;

pub use config::*;
pub use photo_store::*;
