// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("both detectors failed to score this media; please retry later")]
    BothDetectorsFailed,
    #[error("invalid verdict thresholds (hi = {hi}, lo = {lo}); expecting 0 <= lo < hi <= 1")]
    InvalidThresholdConfiguration { hi: f64, lo: f64 },
    #[error("missing credentials for external provider {provider}")]
    MissingProviderCredentials { provider: String },
    #[error("invalid configuration : {0}")]
    InvalidConfiguration(String),
    #[error("scan {0} not found")]
    ScanNotFound(String),
    #[error("scan {0} belongs to someone else")]
    AccessDenied(String),
    #[error("this operation requires an authenticated user")]
    AuthenticationRequired,
}

impl ScanError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::BothDetectorsFailed)
    }
}
