use crate::domain::{
    new_tracking_event_id, validate_tracking_event_id, CreateTrackingEventRepoInput, DomainError,
    DomainResult, TrackingEvent, TrackingEventRepository, UpdateTrackingEventPhotoRepoInput,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of TrackingEventRepository, kept in insertion order
#[derive(Clone, Default)]
pub struct InMemoryTrackingEventRepository {
    events: Arc<RwLock<Vec<TrackingEvent>>>,
}

impl InMemoryTrackingEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl TrackingEventRepository for InMemoryTrackingEventRepository {
    async fn create_tracking_event(
        &self,
        input: CreateTrackingEventRepoInput,
    ) -> DomainResult<TrackingEvent> {
        let event = TrackingEvent {
            id: new_tracking_event_id(),
            location: input.location,
            device: input.device,
            photo: None,
            timestamp: input.timestamp,
            created_at: Utc::now(),
        };

        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn list_tracking_events(&self) -> DomainResult<Vec<TrackingEvent>> {
        Ok(self.events.read().await.clone())
    }

    async fn update_photo(&self, input: UpdateTrackingEventPhotoRepoInput) -> DomainResult<()> {
        validate_tracking_event_id(&input.id)?;

        let mut events = self.events.write().await;
        let event = events
            .iter_mut()
            .find(|event| event.id == input.id)
            .ok_or_else(|| DomainError::TrackingEventNotFound(input.id.clone()))?;

        event.photo = Some(input.photo);
        Ok(())
    }
}
