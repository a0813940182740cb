mod in_memory_tracking_event_repository;
mod notification;
mod photo;
mod result;
mod tracking_event;

pub use in_memory_tracking_event_repository::*;
pub use notification::*;
pub use photo::*;
pub use result::*;
pub use tracking_event::*;
