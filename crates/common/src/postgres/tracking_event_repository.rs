use crate::domain::{
    new_tracking_event_id, validate_tracking_event_id, CreateTrackingEventRepoInput, DeviceInfo,
    DomainError, DomainResult, Location, Photo, TrackingEvent, TrackingEventRepository,
    UpdateTrackingEventPhotoRepoInput,
};
use crate::postgres::PostgresClient;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use std::future::Future;
use tokio_postgres::types::Json;
use tracing::{debug, instrument};

const SELECT_COLUMNS: &str = "id, location, device, photo, captured_at, created_at";

/// TIMESTAMPTZ keeps microseconds; truncate so returned events match stored rows
fn to_column_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

fn event_from_row(row: &tokio_postgres::Row) -> DomainResult<TrackingEvent> {
    let decode = |e: tokio_postgres::Error| DomainError::RepositoryError(e.into());

    let Json(location): Json<Location> = row.try_get("location").map_err(decode)?;
    let Json(device): Json<DeviceInfo> = row.try_get("device").map_err(decode)?;
    let photo: Option<Json<Photo>> = row.try_get("photo").map_err(decode)?;
    let timestamp: DateTime<Utc> = row.try_get("captured_at").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;

    Ok(TrackingEvent {
        id: row.try_get("id").map_err(decode)?,
        location,
        device,
        photo: photo.map(|Json(photo)| photo),
        timestamp,
        created_at,
    })
}

/// PostgreSQL implementation of TrackingEventRepository
///
/// Events live in the `locations` table with location, device and photo as JSONB.
#[derive(Clone)]
pub struct PostgresTrackingEventRepository {
    client: PostgresClient,
}

impl PostgresTrackingEventRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        let timeout = self.client.operation_timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::RepositoryError(anyhow!(
                "{} timed out after {:?}",
                operation,
                timeout
            ))),
        }
    }
}

#[async_trait]
impl TrackingEventRepository for PostgresTrackingEventRepository {
    #[instrument(skip(self, input))]
    async fn create_tracking_event(
        &self,
        input: CreateTrackingEventRepoInput,
    ) -> DomainResult<TrackingEvent> {
        self.with_timeout("create tracking event", async {
            let conn = self
                .client
                .get_connection()
                .await
                .map_err(DomainError::RepositoryError)?;

            let id = new_tracking_event_id();
            let now = to_column_precision(Utc::now());
            let timestamp = to_column_precision(input.timestamp);

            conn.execute(
                "INSERT INTO locations (id, location, device, photo, captured_at, created_at)
                 VALUES ($1, $2, $3, NULL, $4, $5)",
                &[
                    &id,
                    &Json(&input.location),
                    &Json(&input.device),
                    &timestamp,
                    &now,
                ],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

            debug!(tracking_event_id = %id, "tracking event inserted");

            Ok(TrackingEvent {
                id,
                location: input.location,
                device: input.device,
                photo: None,
                timestamp,
                created_at: now,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_tracking_events(&self) -> DomainResult<Vec<TrackingEvent>> {
        self.with_timeout("list tracking events", async {
            let conn = self
                .client
                .get_connection()
                .await
                .map_err(DomainError::RepositoryError)?;

            let rows = conn
                .query(&format!("SELECT {} FROM locations", SELECT_COLUMNS), &[])
                .await
                .map_err(|e| DomainError::RepositoryError(e.into()))?;

            debug!(count = rows.len(), "listed tracking events");

            rows.iter().map(event_from_row).collect()
        })
        .await
    }

    #[instrument(skip(self, input), fields(tracking_event_id = %input.id))]
    async fn update_photo(&self, input: UpdateTrackingEventPhotoRepoInput) -> DomainResult<()> {
        validate_tracking_event_id(&input.id)?;

        self.with_timeout("update tracking event photo", async {
            let conn = self
                .client
                .get_connection()
                .await
                .map_err(DomainError::RepositoryError)?;

            // Only the photo column is written; concurrent uploads resolve last-write-wins
            let rows_affected = conn
                .execute(
                    "UPDATE locations SET photo = $1 WHERE id = $2",
                    &[&Json(&input.photo), &input.id],
                )
                .await
                .map_err(|e| DomainError::RepositoryError(e.into()))?;

            if rows_affected == 0 {
                return Err(DomainError::TrackingEventNotFound(input.id.clone()));
            }

            debug!("tracking event photo updated");
            Ok(())
        })
        .await
    }
}
