//! HTTP implementations of the catalogue and nightly prober

pub mod julialang;
pub mod nightlies;

pub use julialang::JuliaLangCatalogue;
pub use nightlies::HttpNightlyProber;

use std::time::Duration;

/// Shared client settings for julialang.org requests
fn http_client(timeout_ms: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("julia-version/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .expect("Failed to create HTTP client")
}
