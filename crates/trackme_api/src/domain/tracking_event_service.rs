use crate::domain::{
    click_message, location_message, photo_message, NotificationDispatcher, VisitorContext,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use common::domain::{
    photo_object_key, validate_tracking_event_id, CreateTrackingEventRepoInput, DeviceInfo,
    DomainError, DomainResult, Location, Photo, PhotoContentStore, TrackingEvent,
    TrackingEventRepository, UpdateTrackingEventPhotoRepoInput,
};
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Request to record a new tracking event
#[derive(Debug, Clone, Validate)]
pub struct SaveEventRequest {
    #[garde(required, dive)]
    pub location: Option<Location>,
    #[garde(required)]
    pub device: Option<DeviceInfo>,
    /// Photo supplied at creation; accepted and discarded
    #[garde(skip)]
    pub photo: Option<serde_json::Value>,
    /// Capture time; defaults to the time the request is handled
    #[garde(skip)]
    pub timestamp: Option<DateTime<Utc>>,
    #[garde(skip)]
    pub visitor: VisitorContext,
}

/// Uploaded file content
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub filename: String,
    pub content: Bytes,
}

/// Request to attach a photo to an existing tracking event
#[derive(Debug, Clone)]
pub struct UploadPhotoRequest {
    pub record_id: String,
    pub file: Option<PhotoFile>,
}

/// Result of a successful photo upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub filename: String,
    /// Public URL of the stored object
    pub path: String,
    pub key: String,
}

/// Request to record a click on a tracked link
#[derive(Debug, Clone)]
pub struct TrackClickRequest {
    pub target_url: Option<String>,
    pub visitor: VisitorContext,
}

/// Ingestion workflow for visitor tracking events
pub struct TrackingEventService {
    repository: Arc<dyn TrackingEventRepository>,
    photo_store: Arc<dyn PhotoContentStore>,
    dispatcher: NotificationDispatcher,
}

impl TrackingEventService {
    pub fn new(
        repository: Arc<dyn TrackingEventRepository>,
        photo_store: Arc<dyn PhotoContentStore>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            repository,
            photo_store,
            dispatcher,
        }
    }

    /// Validate and persist a submission, notifying the operator in the background
    #[instrument(skip(self, request), fields(ip = %request.visitor.ip))]
    pub async fn save_event(&self, request: SaveEventRequest) -> DomainResult<TrackingEvent> {
        common::garde::validate_struct(&request)?;

        let (Some(location), Some(device)) = (request.location, request.device) else {
            return Err(DomainError::ValidationError(
                "location and device are required".to_string(),
            ));
        };

        if request.photo.is_some() {
            debug!("discarding photo supplied at creation");
        }

        let now = Utc::now();
        self.dispatcher
            .dispatch(location_message(&request.visitor, now, &location));

        let event = self
            .repository
            .create_tracking_event(CreateTrackingEventRepoInput {
                location,
                device,
                timestamp: request.timestamp.unwrap_or(now),
            })
            .await?;

        info!(tracking_event_id = %event.id, "tracking event saved");
        Ok(event)
    }

    /// Store an uploaded photo and attach it to its tracking event
    #[instrument(skip(self, request), fields(tracking_event_id = %request.record_id))]
    pub async fn upload_photo(&self, request: UploadPhotoRequest) -> DomainResult<UploadedPhoto> {
        let file = request
            .file
            .ok_or_else(|| DomainError::ValidationError("no file uploaded".to_string()))?;

        validate_tracking_event_id(&request.record_id)?;

        let key = photo_object_key(&file.filename);
        debug!(key = %key, size = file.content.len(), "uploading photo");

        self.photo_store
            .upload(&key, file.content)
            .await
            .map_err(DomainError::RepositoryError)?;

        let url = self.photo_store.public_url(&key);

        // The object stays in place if the record update fails
        self.repository
            .update_photo(UpdateTrackingEventPhotoRepoInput {
                id: request.record_id.clone(),
                photo: Photo {
                    name: file.filename.clone(),
                    path: url.clone(),
                },
            })
            .await?;

        self.dispatcher
            .dispatch(photo_message(&request.record_id, &url, Utc::now()));

        info!(key = %key, "photo attached to tracking event");
        Ok(UploadedPhoto {
            filename: file.filename,
            path: url,
            key,
        })
    }

    /// All tracking events in store order
    #[instrument(skip(self))]
    pub async fn list_events(&self) -> DomainResult<Vec<TrackingEvent>> {
        let events = self.repository.list_tracking_events().await?;
        debug!(count = events.len(), "listed tracking events");
        Ok(events)
    }

    /// Notify about a link click and return the URL to redirect to
    #[instrument(skip(self, request), fields(ip = %request.visitor.ip))]
    pub async fn track_click(&self, request: TrackClickRequest) -> DomainResult<String> {
        let target_url = request
            .target_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DomainError::ValidationError("URL parameter is required".to_string()))?;

        self.dispatcher
            .dispatch(click_message(&request.visitor, Utc::now(), &target_url));

        debug!(target_url = %target_url, "link click tracked");
        Ok(target_url)
    }
}
