//! Per-client rate limiting
//!
//! Fixed-window counters keyed by client address. Requests over the limit
//! are rejected immediately with 429, never queued.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;

use crate::error::AppError;
use crate::AppState;

const WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    max_per_window: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn per_minute(max: u32) -> Self {
        Self {
            max_per_window: max,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `client`; false when the client is over its limit.
    pub fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        // Drop expired windows so the map doesn't grow with one-off clients
        if windows.len() > 1024 {
            windows.retain(|_, w| now.duration_since(w.started) < WINDOW);
        }

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.max_per_window
    }
}

/// Client key: first X-Forwarded-For hop, falling back to the socket peer.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn limit_with(
    limiter: &Arc<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&req);
    if !limiter.allow(&client) {
        tracing::warn!("Rate limit exceeded for {}", client);
        return Err(AppError::RateLimited);
    }
    Ok(next.run(req).await)
}

/// Middleware: inference requests, 100/minute per client
pub async fn limit_predict(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit_with(&state.predict_limiter, req, next).await
}

/// Middleware: model downloads, 50/minute per client
pub async fn limit_download(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit_with(&state.download_limiter, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = RateLimiter::per_minute(3);
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
    }

    #[test]
    fn clients_are_tracked_independently() {
        let limiter = RateLimiter::per_minute(1);
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.2"));
        assert!(!limiter.allow("10.0.0.1"));
    }
}
