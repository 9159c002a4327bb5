//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with optional
//! proxy support.

use std::time::Duration;

use crate::error::{ProviderError, ProviderResult};

/// Connection establishment budget, separate from the per-attempt timeout
/// enforced by the fallback chain.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a `reqwest::Client`.
///
/// - `Some(url)` -> route all traffic through the proxy (http, https or socks5)
/// - `None` -> explicitly disable proxy (`no_proxy`), ignoring env vars
pub fn build_http_client(proxy_url: Option<&str>) -> ProviderResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT);
    match proxy_url {
        Some(url) => {
            let proxy = reqwest::Proxy::all(url).map_err(|e| {
                ProviderError::not_configured(format!("invalid proxy URL '{}': {}", url, e))
            })?;
            builder = builder.proxy(proxy);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder
        .build()
        .map_err(|e| ProviderError::Other {
            message: format!("failed to build HTTP client: {}", e),
        })
}
