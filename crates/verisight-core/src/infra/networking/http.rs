// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use reqwest::header;
use std::sync::{Arc, LazyLock};

pub type HTTPClient = reqwest::Client;

/// Shared client without automatic retries; every call is bounded by its caller's timeout
pub static HTTP_CLIENT: LazyLock<Arc<HTTPClient>> = LazyLock::new(|| {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&user_agent).expect("valid user agent"),
    );

    let client = HTTPClient::builder()
        .default_headers(headers)
        .build()
        .expect("cannot build HTTP client");
    Arc::new(client)
});
