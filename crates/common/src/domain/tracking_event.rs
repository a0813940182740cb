use crate::domain::result::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// GPS coordinates reported by the visitor's browser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[garde(custom(crate::garde::finite))]
    pub latitude: f64,
    #[garde(custom(crate::garde::finite))]
    pub longitude: f64,
}

/// Free-form device description; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
}

/// Photo attached to a tracking event after upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub name: String,
    /// Public URL of the stored object
    pub path: String,
}

/// Tracking event entity
///
/// Only `photo` changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingEvent {
    pub id: String,
    pub location: Location,
    pub device: DeviceInfo,
    pub photo: Option<Photo>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Repository input for creating a tracking event (ID and created_at are store-assigned)
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTrackingEventRepoInput {
    pub location: Location,
    pub device: DeviceInfo,
    pub timestamp: DateTime<Utc>,
}

/// Repository input for attaching a photo to an existing tracking event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTrackingEventPhotoRepoInput {
    pub id: String,
    pub photo: Photo,
}

/// Generate a new tracking event ID
pub fn new_tracking_event_id() -> String {
    xid::new().to_string()
}

/// Check that an ID is a structurally valid tracking event ID
pub fn validate_tracking_event_id(id: &str) -> DomainResult<()> {
    xid::Id::from_str(id)
        .map(|_| ())
        .map_err(|_| DomainError::InvalidTrackingEventId("invalid id format".to_string()))
}

/// Repository trait for tracking event persistence operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TrackingEventRepository: Send + Sync {
    /// Persist a new tracking event, assigning its ID and created_at
    async fn create_tracking_event(
        &self,
        input: CreateTrackingEventRepoInput,
    ) -> DomainResult<TrackingEvent>;

    /// List all tracking events in store order
    async fn list_tracking_events(&self) -> DomainResult<Vec<TrackingEvent>>;

    /// Set the photo of an existing tracking event, leaving every other field untouched
    async fn update_photo(&self, input: UpdateTrackingEventPhotoRepoInput) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_valid() {
        let id = new_tracking_event_id();
        assert_eq!(id.len(), 20);
        assert!(validate_tracking_event_id(&id).is_ok());
    }

    #[test]
    fn test_invalid_id_format() {
        for id in ["", "not-an-id", "507f1f77bcf86cd799439011"] {
            let result = validate_tracking_event_id(id);
            assert!(matches!(
                result,
                Err(DomainError::InvalidTrackingEventId(ref msg)) if msg == "invalid id format"
            ));
        }
    }

    #[test]
    fn test_location_rejects_non_finite() {
        let location = Location {
            latitude: f64::INFINITY,
            longitude: 0.0,
        };
        assert!(matches!(
            crate::garde::validate_struct(&location),
            Err(DomainError::ValidationError(ref msg)) if msg.contains("latitude")
        ));
    }

    #[test]
    fn test_device_info_omits_missing_fields() {
        let device = DeviceInfo {
            model: Some("x".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(value, serde_json::json!({"model": "x"}));
    }
}
