use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{config::RateLimitConfig, error::AppError, state::AppState};

/// Fixed-window request counter keyed by client address.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<Windows>>,
    max_requests: usize,
    window: Duration,
    trust_proxy: bool,
}

struct Windows {
    by_client: HashMap<String, Window>,
    last_sweep: Instant,
}

struct Window {
    started: Instant,
    count: usize,
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Windows {
                by_client: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_requests: cfg.max_requests,
            window: Duration::from_secs(cfg.window_secs),
            trust_proxy: cfg.trust_proxy,
        }
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        // A poisoned lock only means another request panicked mid-update;
        // the counters are still usable.
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());

        let window = self.window;
        if now.saturating_duration_since(inner.last_sweep) >= window {
            inner
                .by_client
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            inner.last_sweep = now;
        }

        let entry = inner.by_client.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Peer address, or the first `X-Forwarded-For` hop when running behind
    /// a trusted proxy. Clients choose that header, so it is ignored otherwise.
    fn client_key(&self, req: &Request) -> String {
        if self.trust_proxy {
            if let Some(forwarded) = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return forwarded.to_string();
            }
        }
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".into())
    }
}

pub async fn limit_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = state.auth_limiter.client_key(&req);
    if !state.auth_limiter.check(&key) {
        warn!(client = %key, path = %req.uri().path(), "auth rate limit exceeded");
        return AppError::TooManyRequests.into_response();
    }
    next.run(req).await
}
