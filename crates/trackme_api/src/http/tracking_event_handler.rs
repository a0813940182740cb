use crate::domain::{PhotoFile, SaveEventRequest, UploadPhotoRequest};
use crate::http::{visitor_context, ApiError, AppState};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use common::domain::{DeviceInfo, DomainError, Location, Photo, TrackingEvent};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
pub struct SaveLocationBody {
    pub location: Option<Location>,
    pub device: Option<DeviceInfo>,
    #[serde(default)]
    pub photo: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveLocationResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackingEventResponse {
    pub id: String,
    pub location: Location,
    pub device: DeviceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<TrackingEvent> for TrackingEventResponse {
    fn from(event: TrackingEvent) -> Self {
        Self {
            id: event.id,
            location: event.location,
            device: event.device,
            photo: event.photo,
            timestamp: event.timestamp,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListLocationsResponse {
    pub events: Vec<TrackingEventResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadPhotoResponse {
    pub filename: String,
    pub path: String,
}

/// POST /locations
#[instrument(skip_all)]
pub async fn save_location(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<SaveLocationBody>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveLocationResponse>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        debug!(error = %rejection, "rejected location body");
        ApiError::bad_request("Invalid request body")
    })?;

    let request = SaveEventRequest {
        location: body.location,
        device: body.device,
        photo: body.photo,
        timestamp: body.timestamp,
        visitor: visitor_context(&headers, peer.map(|ConnectInfo(addr)| addr)),
    };

    let event = state.tracking_event_service.save_event(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveLocationResponse { id: event.id }),
    ))
}

/// GET /locations
#[instrument(skip_all)]
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListLocationsResponse>, ApiError> {
    let events = state.tracking_event_service.list_events().await?;

    Ok(Json(ListLocationsResponse {
        events: events.into_iter().map(TrackingEventResponse::from).collect(),
    }))
}

fn multipart_read_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "file too large");
    }
    DomainError::PhotoReadError(e.body_text()).into()
}

/// POST /locations/photos
///
/// Multipart fields: `photo` (file) and `recordId` or `id` (text).
#[instrument(skip_all)]
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadPhotoResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "rejected photo upload body");
        ApiError::bad_request("no file uploaded")
    })?;

    let mut record_id = String::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_read_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("photo") => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    debug!("ignoring photo field without a file name");
                    continue;
                };
                let content = field.bytes().await.map_err(multipart_read_error)?;
                file = Some(PhotoFile { filename, content });
            }
            Some("recordId") | Some("id") => {
                record_id = field.text().await.map_err(multipart_read_error)?;
            }
            other => {
                debug!(field = ?other, "ignoring multipart field");
            }
        }
    }

    let uploaded = state
        .tracking_event_service
        .upload_photo(UploadPhotoRequest {
            record_id: record_id.trim().to_string(),
            file,
        })
        .await?;

    Ok(Json(UploadPhotoResponse {
        filename: uploaded.filename,
        path: uploaded.path,
    }))
}
