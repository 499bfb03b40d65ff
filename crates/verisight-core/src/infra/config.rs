// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::ScanError;
use crate::domain::verdict::{DEFAULT_VERDICT_HI, DEFAULT_VERDICT_LO, VerdictThresholds};
use crate::infra::caching::default_home_dir;
use crate::infra::networking::inference::URL_LOCAL_INFERENCE_SERVICE;
use crate::infra::networking::sightengine::{SIGHTENGINE_PROVIDER_NAME, URL_SIGHTENGINE_API};
use chrono::TimeDelta;
use clap::{ArgAction, Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalProviderKind {
    Mock,
    Sightengine,
}

#[derive(Args, Clone, Debug)]
pub struct SettingsArguments {
    /// Third-party deepfake detection provider
    #[arg(
        long,
        global = true,
        value_enum,
        env = "VERISIGHT_EXTERNAL_PROVIDER",
        default_value_t = ExternalProviderKind::Mock
    )]
    pub external_provider: ExternalProviderKind,

    /// Whether the third-party provider should be called at all
    #[arg(
        long,
        global = true,
        env = "VERISIGHT_EXTERNAL_ENABLED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub external_enabled: bool,

    #[arg(long, global = true, env = "VERISIGHT_EXTERNAL_API_URL", default_value = URL_SIGHTENGINE_API)]
    pub external_api_url: String,

    #[arg(long, global = true, env = "VERISIGHT_EXTERNAL_API_USER")]
    pub external_api_user: Option<String>,

    #[arg(long, global = true, env = "VERISIGHT_EXTERNAL_API_SECRET", hide_env_values = true)]
    pub external_api_secret: Option<String>,

    /// Upper bound for every call to the third-party provider
    #[arg(long, global = true, env = "VERISIGHT_EXTERNAL_TIMEOUT_MS", default_value_t = 60_000)]
    pub external_timeout_ms: u64,

    /// Base URL of the inference service hosting our own model
    #[arg(long, global = true, env = "VERISIGHT_INTERNAL_URL", default_value = URL_LOCAL_INFERENCE_SERVICE)]
    pub internal_url: String,

    #[arg(long, global = true, env = "VERISIGHT_INTERNAL_TIMEOUT_MS", default_value_t = 30_000)]
    pub internal_timeout_ms: u64,

    /// How long provider scores are served from cache
    #[arg(long, global = true, env = "VERISIGHT_CACHE_TTL_HOURS", default_value_t = 24)]
    pub cache_ttl_hours: u64,

    /// Scores at or above this value point to a fake
    #[arg(long, global = true, env = "VERISIGHT_VERDICT_HI", default_value_t = DEFAULT_VERDICT_HI)]
    pub verdict_hi: f64,

    /// Scores at or below this value point to a real media
    #[arg(long, global = true, env = "VERISIGHT_VERDICT_LO", default_value_t = DEFAULT_VERDICT_LO)]
    pub verdict_lo: f64,

    /// Where scans, users and cached provider scores are kept
    #[arg(long, global = true, env = "VERISIGHT_HOME")]
    pub home: Option<PathBuf>,

    /// Secret for signing guest cookies (generated once when missing)
    #[arg(long, global = true, env = "VERISIGHT_COOKIE_SECRET", hide_env_values = true)]
    pub cookie_secret: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub api_user: String,
    pub api_secret: String,
}

/// Settings checked once at startup; nothing gets wired before this succeeds
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionSettings {
    pub external_provider: ExternalProviderKind,
    pub external_enabled: bool,
    pub external_api_url: String,
    pub external_credentials: Option<ProviderCredentials>,
    pub external_timeout: Duration,
    pub internal_url: String,
    pub internal_timeout: Duration,
    pub cache_ttl: TimeDelta,
    pub thresholds: VerdictThresholds,
    pub home_dir: PathBuf,
    pub cookie_secret: Option<String>,
}

fn http_url(name: &str, raw: &str) -> Result<String, ScanError> {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(raw.to_string()),
        _ => Err(ScanError::InvalidConfiguration(format!(
            "{} must be an http(s) URL (got '{}')",
            name, raw
        ))),
    }
}

fn timeout(name: &str, millis: u64) -> Result<Duration, ScanError> {
    match millis {
        0 => Err(ScanError::InvalidConfiguration(format!("{} must be greater than zero", name))),
        _ => Ok(Duration::from_millis(millis)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|candidate| !candidate.trim().is_empty())
}

impl DetectionSettings {
    pub fn validate(arguments: SettingsArguments) -> Result<Self, ScanError> {
        let thresholds = VerdictThresholds::new(arguments.verdict_hi, arguments.verdict_lo)?;

        let cache_ttl = i64::try_from(arguments.cache_ttl_hours)
            .ok()
            .filter(|hours| *hours > 0)
            .and_then(TimeDelta::try_hours)
            .ok_or_else(|| {
                ScanError::InvalidConfiguration(format!(
                    "cache TTL must be a positive number of hours (got {})",
                    arguments.cache_ttl_hours
                ))
            })?;

        let external_credentials = match (
            non_blank(arguments.external_api_user),
            non_blank(arguments.external_api_secret),
        ) {
            (Some(api_user), Some(api_secret)) => Some(ProviderCredentials { api_user, api_secret }),
            _ => None,
        };

        let needs_credentials =
            arguments.external_enabled && arguments.external_provider == ExternalProviderKind::Sightengine;

        if needs_credentials && external_credentials.is_none() {
            return Err(ScanError::MissingProviderCredentials {
                provider: SIGHTENGINE_PROVIDER_NAME.to_string(),
            });
        }

        if arguments
            .cookie_secret
            .as_ref()
            .is_some_and(|secret| secret.trim().is_empty())
        {
            return Err(ScanError::InvalidConfiguration("cookie secret cannot be blank".to_string()));
        }

        Ok(Self {
            external_provider: arguments.external_provider,
            external_enabled: arguments.external_enabled,
            external_api_url: http_url("external API URL", &arguments.external_api_url)?,
            external_credentials,
            external_timeout: timeout("external timeout", arguments.external_timeout_ms)?,
            internal_url: http_url("internal URL", &arguments.internal_url)?,
            internal_timeout: timeout("internal timeout", arguments.internal_timeout_ms)?,
            cache_ttl,
            thresholds,
            home_dir: arguments.home.unwrap_or_else(default_home_dir),
            cookie_secret: arguments.cookie_secret,
        })
    }
}
