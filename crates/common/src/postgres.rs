mod client;
mod config;
mod tracking_event_repository;

pub use client::*;
pub use config::*;
pub use tracking_event_repository::*;
