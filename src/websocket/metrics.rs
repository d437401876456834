use crate::server::SessionCoordinator;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use std::sync::Arc;

fn enforce_metrics_auth(headers: &HeaderMap, server: &SessionCoordinator) -> Result<(), StatusCode> {
    let config = server.config();
    let Some(raw_header) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Unauthorized metrics access attempt: missing Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let Some(token) = raw_header.strip_prefix("Bearer ") else {
        tracing::warn!("Unauthorized metrics access attempt: invalid Authorization scheme");
        return Err(StatusCode::UNAUTHORIZED);
    };

    if let Some(expected) = config.metrics_auth_token.as_deref() {
        if token == expected {
            tracing::debug!("Metrics access authorized via bearer token");
            return Ok(());
        }
    }

    tracing::warn!("Unauthorized metrics access attempt: token rejected");
    Err(StatusCode::UNAUTHORIZED)
}

/// Counters, room totals and per-event latency percentiles.
pub async fn metrics_handler(
    headers: HeaderMap,
    State(server): State<Arc<SessionCoordinator>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if server.config().require_metrics_auth {
        enforce_metrics_auth(&headers, server.as_ref())?;
    }

    let snapshot = server.metrics().snapshot(server.room_count()).await;
    Ok(Json(serde_json::json!({
        "instanceId": server.instance_id(),
        "connectedClients": server.connection_count(),
        "players": server.player_count(),
        "serverMetrics": snapshot,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerConfig;
    use axum::http::HeaderValue;

    fn server_with_token(token: Option<&str>) -> Arc<SessionCoordinator> {
        let config = ServerConfig {
            require_metrics_auth: true,
            metrics_auth_token: token.map(str::to_string),
            ..ServerConfig::default()
        };
        SessionCoordinator::new(config)
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_matching_bearer_token() {
        let server = server_with_token(Some("secret"));
        assert!(enforce_metrics_auth(&bearer("Bearer secret"), &server).is_ok());
    }

    #[test]
    fn rejects_missing_wrong_or_malformed_credentials() {
        let server = server_with_token(Some("secret"));
        assert_eq!(
            enforce_metrics_auth(&HeaderMap::new(), &server),
            Err(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            enforce_metrics_auth(&bearer("Bearer nope"), &server),
            Err(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            enforce_metrics_auth(&bearer("Basic secret"), &server),
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[test]
    fn rejects_everything_when_no_token_is_configured() {
        let server = server_with_token(None);
        assert_eq!(
            enforce_metrics_auth(&bearer("Bearer "), &server),
            Err(StatusCode::UNAUTHORIZED)
        );
    }
}
