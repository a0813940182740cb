mod notification_dispatcher;
mod tracking_event_service;

pub use notification_dispatcher::*;
pub use tracking_event_service::*;
