use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Access-log middleware: one line per request with method, path, status,
/// payload size and latency.
pub async fn access_log(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let remote_addr = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        target: "access_log",
        "{} \"{} {}\" {} {} {}ms \"{}\"",
        remote_addr,
        method,
        uri,
        status.as_u16(),
        response
            .headers()
            .get("content-length")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("-"),
        duration.as_millis(),
        user_agent
    );

    response
}
