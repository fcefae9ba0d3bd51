//! Random slowdown middleware for frontend development
#![allow(dead_code)] // Feature-gated middleware

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use rand_distr::{Distribution, Normal};

/// Middleware that delays each request by a random amount of time, so that
/// overlapping analysis requests can be reproduced from a browser.
/// Delays follow a gaussian distribution with a mean of 1 second and a standard deviation of 2 seconds.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let millis = match Normal::new(1000.0, 2000.0) {
        Ok(normal) => 0.0f64.max(normal.sample(&mut rand::rng())),
        Err(_) => 0.0,
    };

    tokio::time::sleep(std::time::Duration::from_millis(millis as u64)).await;
    next.run(request).await
}
