//! Request-filter middleware.
//!
//! Every inbound request passes through here before routing: blocklist,
//! client-identifier heuristics, payload signature scan, and the login
//! throttle for sensitive endpoints. Flags are recorded and the request
//! continues; blocks get a fixed 403 body with no internal detail.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::AppState;
use crate::security::filter::{FilterPolicy, Verdict};
use crate::security::{RequestDescriptor, ThrottlePolicy};
use crate::services::ClientContext;

/// Upper bound on how much body is buffered for the signature scan.
const MAX_SCAN_BYTES: usize = 64 * 1024;

const BLOCKED_BODY: &str = "Request blocked for security reasons";

pub async fn security_filter(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.ip().to_string());

    let ip_address = resolve_client_ip(
        request.headers(),
        peer.as_deref(),
        &state.config.security.trusted_proxy_ips,
    );

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let endpoint = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let header_text = collect_header_text(request.headers());

    // Buffer the body so it can be scanned and then replayed to the handler.
    let (parts, body) = request.into_parts();
    let Ok(body_bytes) = axum::body::to_bytes(body, MAX_SCAN_BYTES).await else {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(serde_json::json!({ "error": "Request body too large" })),
        )
            .into_response();
    };

    let payload = format!(
        "{query}\n{header_text}\n{}",
        String::from_utf8_lossy(&body_bytes)
    );

    let client = ClientContext::new(ip_address.clone(), user_agent.clone());

    let descriptor = RequestDescriptor {
        ip_address,
        user_agent,
        endpoint: endpoint.clone(),
        payload,
    };

    match state.filter_policy.inspect(&descriptor) {
        Verdict::Block { reason } => {
            state
                .audit
                .security_event(
                    &client,
                    None,
                    "request_blocked",
                    reason.to_string(),
                    "warning",
                )
                .await;

            return blocked_response();
        }
        Verdict::Pass(flags) => {
            for flag in flags {
                state
                    .audit
                    .security_event(&client, None, flag.event_type, flag.details, "warning")
                    .await;
            }
        }
    }

    if FilterPolicy::is_sensitive_endpoint(&endpoint)
        && is_rate_limited(&state, &state.throttle, &client.ip_address).await
    {
        state
            .audit
            .security_event(
                &client,
                None,
                "request_blocked",
                "Rate limit exceeded".to_string(),
                "warning",
            )
            .await;

        return blocked_response();
    }

    let mut request = Request::from_parts(parts, Body::from(body_bytes));
    request.extensions_mut().insert(client);

    next.run(request).await
}

/// Windowed count from the attempt ledger compared against the threshold.
/// A failed count degrades open: filtering must not take the service down.
async fn is_rate_limited(state: &AppState, policy: &ThrottlePolicy, ip_address: &str) -> bool {
    let window_start = policy.window_start(chrono::Utc::now());

    match state
        .store
        .count_login_attempts_since(ip_address, window_start)
        .await
    {
        Ok(count) => policy.is_limited(count),
        Err(e) => {
            tracing::error!("Failed to check rate limit: {e:#}");
            false
        }
    }
}

fn blocked_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "error": BLOCKED_BODY })),
    )
        .into_response()
}

/// Resolve the address the filter should judge. Forwarded headers are only
/// honored when the socket peer is a configured trusted proxy; otherwise
/// the peer address wins. Without a peer (e.g. in-process test calls) the
/// forwarded header is the only signal available.
fn resolve_client_ip(headers: &HeaderMap, peer: Option<&str>, trusted_proxies: &[String]) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    match peer {
        Some(peer) => {
            if trusted_proxies.iter().any(|proxy| proxy == peer)
                && let Some(forwarded) = forwarded
            {
                forwarded
            } else {
                peer.to_string()
            }
        }
        None => forwarded.unwrap_or_else(|| "unknown".to_string()),
    }
}

fn collect_header_text(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| format!("{name}: {value}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_peer_wins_when_proxy_not_trusted() {
        let headers = headers_with_forwarded("203.0.113.9");
        let ip = resolve_client_ip(&headers, Some("10.0.0.1"), &[]);
        assert_eq!(ip, "10.0.0.1");
    }

    #[test]
    fn test_forwarded_honored_for_trusted_proxy() {
        let headers = headers_with_forwarded("203.0.113.9, 10.0.0.1");
        let ip = resolve_client_ip(&headers, Some("10.0.0.1"), &["10.0.0.1".to_string()]);
        assert_eq!(ip, "203.0.113.9");
    }

    #[test]
    fn test_forwarded_used_without_peer() {
        let headers = headers_with_forwarded("203.0.113.9");
        let ip = resolve_client_ip(&headers, None, &[]);
        assert_eq!(ip, "203.0.113.9");
    }

    #[test]
    fn test_unknown_without_any_signal() {
        let headers = HeaderMap::new();
        let ip = resolve_client_ip(&headers, None, &[]);
        assert_eq!(ip, "unknown");
    }
}
