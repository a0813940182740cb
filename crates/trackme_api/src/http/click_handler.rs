use crate::domain::TrackClickRequest;
use crate::http::{visitor_context, ApiError, AppState};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    pub url: Option<String>,
}

/// GET /click?url=
///
/// Notifies about the click and answers 302 to the target.
#[instrument(skip_all)]
pub async fn track_click(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<ClickQuery>,
) -> Result<Response, ApiError> {
    let target_url = state
        .tracking_event_service
        .track_click(TrackClickRequest {
            target_url: query.url,
            visitor: visitor_context(&headers, peer.map(|ConnectInfo(addr)| addr)),
        })
        .await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, target_url)]).into_response())
}
