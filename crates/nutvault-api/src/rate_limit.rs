//! Hand-rolled per-IP rate limiting (spec §4.6). Nothing in this workspace's
//! dependency corpus ships a ready-made axum 0.8 limiter, so this follows
//! the project's own habit of hand-rolling small concurrency primitives
//! (`nutvault-store`'s pool, `nutvault-engine`'s `RateCache`): a
//! `Mutex`-guarded map, no external crate.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use nutvault_common::AppError;

use crate::error_response::AppErrorResponse;
use crate::state::AppState;

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window per-IP counter: at most `max` requests every `window`,
/// reset once the window has elapsed since the first request in it.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self { max, window, windows: Mutex::new(HashMap::new()) }
    }

    fn check(&self, ip: IpAddr) -> Result<(), AppError> {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        let window = windows.entry(ip).or_insert_with(|| Window { started_at: now, count: 0 });

        if now.duration_since(window.started_at) >= self.window {
            window.started_at = now;
            window.count = 0;
        }

        window.count += 1;
        if window.count > self.max {
            return Err(AppError::limit("rate limit exceeded; try again later"));
        }
        Ok(())
    }
}

/// Guards `POST /wallet` (`RATE_LIMIT_CREATE_WALLET_MAX`).
pub async fn create_wallet_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    apply(&state.create_wallet_limiter, addr.ip(), request, next).await
}

/// Guards every other mutating route (`RATE_LIMIT_MAX`).
pub async fn mutating_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    apply(&state.mutating_limiter, addr.ip(), request, next).await
}

async fn apply(limiter: &RateLimiter, ip: IpAddr, request: Request<Body>, next: Next) -> Response {
    match limiter.check(ip) {
        Ok(()) => next.run(request).await,
        Err(err) => AppErrorResponse(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn allows_up_to_max_then_rejects() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        assert!(limiter.check(ip).is_ok());
        assert!(limiter.check(ip).is_ok());
        let err = limiter.check(ip).unwrap_err();
        assert_eq!(err.kind, nutvault_common::ErrorKind::Limit);
    }

    #[test]
    fn separate_ips_have_separate_budgets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(b).is_ok());
        assert!(limiter.check(a).is_err());
    }

    #[test]
    fn window_resets_after_elapsed_time() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1));
        assert!(limiter.check(ip).is_ok());
        assert!(limiter.check(ip).is_err());
        std::thread::sleep(Duration::from_millis(25));
        assert!(limiter.check(ip).is_ok());
    }
}
