use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::TypedHeader;
use headers::UserAgent;
use std::time::Instant;

use crate::auth::{AuthUser, extractors::ClientOrigin};

/// Request access log: one line per request once the response is ready.
///
/// The caller's origin, as the engine sees it, goes out at `debug` only.
/// Preflight `OPTIONS` is not logged.
pub async fn log_request(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let caller = AuthUser::from_request_parts(&mut parts, &()).await.ok().map(|u| u.id());
    let agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|TypedHeader(ua)| ua.to_string());
    let ClientOrigin(origin) = ClientOrigin::from_parts(&parts);
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    tracing::debug!(%method, %path, origin = origin.as_deref().unwrap_or("unknown"), "Request origin");

    let started = Instant::now();
    let response = next.run(Request::from_parts(parts, body)).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::warn!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            user = ?caller,
            user_agent = agent.as_deref().unwrap_or("unknown"),
            "Request failed"
        );
    } else {
        tracing::info!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            user = ?caller,
            user_agent = agent.as_deref().unwrap_or("unknown"),
            "Request handled"
        );
    }

    response
}
