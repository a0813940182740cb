use crate::domain::VisitorContext;
use axum::http::{header, HeaderMap};
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Caller address: first `X-Forwarded-For` entry, else the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn visitor_context(headers: &HeaderMap, peer: Option<SocketAddr>) -> VisitorContext {
    VisitorContext {
        ip: client_ip(headers, peer),
        user_agent: header_str(headers, header::USER_AGENT),
        referer: header_str(headers, header::REFERER),
    }
}
