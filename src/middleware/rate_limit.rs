use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed-window limiter keyed by client IP (first X-Forwarded-For hop when
/// present, else the socket address), so one noisy client cannot exhaust the
/// budget for everyone behind the same endpoint.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit: limit_per_minute.max(1),
            window: Duration::from_secs(60),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        let mut guard = self.windows.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();

        // Opportunistic sweep keeps the map bounded between requests.
        if guard.len() > 4096 {
            let window = self.window;
            guard.retain(|_, w| now.duration_since(w.start) < window);
        }

        let entry = guard.entry(key.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(entry.start) >= self.window {
            entry.start = now;
            entry.count = 0;
        }
        if entry.count < self.limit {
            entry.count += 1;
            true
        } else {
            false
        }
    }
}

fn client_key(req: &Request<Body>) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());
    match forwarded {
        Some(ip) if !ip.is_empty() => format!("ip:{}", ip),
        _ => req
            .extensions()
            .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
            .map(|ci| format!("ip:{}", ci.0.ip()))
            .unwrap_or_else(|| "ip:unknown".to_string()),
    }
}

pub async fn rpm_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if !state.allow(&key) {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

pub fn new_rpm_state(limit_per_minute: u32) -> RateLimiter {
    RateLimiter::new(limit_per_minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enforces_limit_per_key() {
        let limiter = RateLimiter::new(3);
        assert!(limiter.allow("ip:1.2.3.4"));
        assert!(limiter.allow("ip:1.2.3.4"));
        assert!(limiter.allow("ip:1.2.3.4"));
        assert!(!limiter.allow("ip:1.2.3.4"));
        // a different key has its own window
        assert!(limiter.allow("ip:5.6.7.8"));
    }

    #[test]
    fn key_uses_first_forwarded_hop_then_falls_back() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "ip:203.0.113.9");

        let bare = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&bare), "ip:unknown");
    }

    #[test]
    fn window_resets() {
        let limiter = RateLimiter::with_window(1, Duration::from_millis(10));
        assert!(limiter.allow("k"));
        assert!(!limiter.allow("k"));
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.allow("k"));
    }
}
