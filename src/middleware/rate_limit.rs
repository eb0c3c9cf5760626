use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::rate_limiter::RateLimiter;

pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    // Preflight and bare OPTIONS requests are answered before the ledger is
    // consulted; only generation attempts count against the limit.
    if request.method() == axum::http::Method::OPTIONS {
        return next.run(request).await;
    }

    let identifier = extract_identifier(&request);

    if rate_limiter.allow(&identifier) {
        debug!("Rate limit check passed for identifier: {}", identifier);

        let mut response = next.run(request).await;
        add_rate_limit_headers(
            &mut response,
            rate_limiter.current_usage(&identifier),
            &rate_limiter,
        );
        response
    } else {
        warn!("Rate limit exceeded for identifier: {}", identifier);

        let mut response = ApiError::RateLimited.into_response();
        add_rate_limit_headers(
            &mut response,
            rate_limiter.current_usage(&identifier),
            &rate_limiter,
        );
        response
    }
}

fn extract_identifier(request: &Request) -> String {
    // Sources in order of preference:
    // 1. X-Forwarded-For header (for proxied requests)
    // 2. X-Real-IP header
    // 3. Connection remote address
    // 4. Fallback to "unknown"

    if let Some(forwarded_for) = request.headers().get("x-forwarded-for")
        && let Ok(forwarded_str) = forwarded_for.to_str()
    {
        // Take the first IP from the comma-separated list
        if let Some(first_ip) = forwarded_str.split(',').next() {
            let first_ip = first_ip.trim();
            if !first_ip.is_empty() {
                return first_ip.to_string();
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(ip_str) = real_ip.to_str()
    {
        return ip_str.to_string();
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn add_rate_limit_headers(response: &mut Response, current_usage: usize, rate_limiter: &RateLimiter) {
    let headers = response.headers_mut();

    if let Ok(usage_header) = HeaderValue::from_str(&current_usage.to_string()) {
        headers.insert("X-RateLimit-Used", usage_header);
    }

    if let Ok(limit_header) = HeaderValue::from_str(&rate_limiter.max_requests().to_string()) {
        headers.insert("X-RateLimit-Limit", limit_header);
    }

    let remaining = rate_limiter.max_requests().saturating_sub(current_usage);
    if let Ok(remaining_header) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", remaining_header);
    }

    if let Ok(window_header) = HeaderValue::from_str(&rate_limiter.window_seconds().to_string()) {
        headers.insert("X-RateLimit-Window", window_header);
    }
}
