mod click_handler;
mod error;
mod server;
mod tracking_event_handler;
mod visitor;

pub use click_handler::*;
pub use error::*;
pub use server::*;
pub use tracking_event_handler::*;
pub use visitor::*;
