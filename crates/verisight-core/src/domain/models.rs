// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use anyhow::bail;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use url::Url;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A publicly reachable media file, as handed over by the upload collaborator
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: Url,
    pub kind: MediaKind,
}

impl MediaRef {
    pub fn new(url: Url, kind: MediaKind) -> Self {
        Self { url, kind }
    }

    pub fn parse(raw_url: &str, kind: MediaKind) -> anyhow::Result<Self> {
        let url = Url::parse(raw_url.trim())?;

        if url.scheme() != "http" && url.scheme() != "https" {
            bail!("verisight.media : unsupported scheme for {} (expecting http or https)", url)
        }

        Ok(Self::new(url, kind))
    }
}

impl Display for MediaRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} ({})", self.url, self.kind))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeutralMode {
    Mock,
    Disabled,
}

/// Where a detector score came from, or why there is none
#[derive(Clone, Debug, PartialEq)]
pub enum ScoreOrigin {
    Inference {
        model_version: String,
        runtime_ms: Option<u64>,
    },
    Provider(String),
    ProviderCache(String),
    Neutral(NeutralMode),
    Unavailable(String),
}

impl Display for ScoreOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreOrigin::Inference { model_version, .. } => f.write_fmt(format_args!("inference:{}", model_version)),
            ScoreOrigin::Provider(name) => f.write_str(name),
            ScoreOrigin::ProviderCache(name) => f.write_fmt(format_args!("{}:CACHE", name)),
            ScoreOrigin::Neutral(NeutralMode::Mock) => f.write_str("MOCK"),
            ScoreOrigin::Neutral(NeutralMode::Disabled) => f.write_str("DISABLED"),
            ScoreOrigin::Unavailable(reason) => f.write_fmt(format_args!("unavailable:{}", reason)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreResult {
    pub value: Option<f64>,
    pub origin: ScoreOrigin,
    pub latency: Duration,
}

impl ScoreResult {
    pub fn present(value: f64, origin: ScoreOrigin, latency: Duration) -> Self {
        Self {
            value: Some(value),
            origin,
            latency,
        }
    }

    pub fn absent(reason: impl Into<String>, latency: Duration) -> Self {
        Self {
            value: None,
            origin: ScoreOrigin::Unavailable(reason.into()),
            latency,
        }
    }

    pub fn source_label(&self) -> String {
        self.origin.to_string()
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self.origin, ScoreOrigin::Neutral(_))
    }
}

/// Accepts only finite values inside [0, 1]
pub fn valid_score(candidate: f64) -> Option<f64> {
    (candidate.is_finite() && (0.0..=1.0).contains(&candidate)).then_some(candidate)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
    Inconclusive,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Real => f.write_str("Real"),
            Verdict::Fake => f.write_str("Fake"),
            Verdict::Inconclusive => f.write_str("Inconclusive"),
        }
    }
}

/// What both detectors said about a single media file
#[derive(Clone, Debug, PartialEq)]
pub struct ScanOutcome {
    pub internal: ScoreResult,
    pub external: ScoreResult,
    pub verdict: Verdict,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordOwner {
    User { user_id: String },
    Guest { owner_hash: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    AuthenticatedUser { id: String },
    Guest { hash: String },
}

impl Identity {
    pub fn owner(&self) -> RecordOwner {
        match self {
            Identity::AuthenticatedUser { id } => RecordOwner::User { user_id: id.clone() },
            Identity::Guest { hash } => RecordOwner::Guest {
                owner_hash: hash.clone(),
            },
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::AuthenticatedUser { id } => f.write_fmt(format_args!("user {}", id)),
            Identity::Guest { hash } => f.write_fmt(format_args!("guest {}", &hash[..hash.len().min(12)])),
        }
    }
}

/// A principal already verified by the authentication layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedPrincipal {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_version: String,
    pub runtime_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub name: String,
    pub latency_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub owner: RecordOwner,
    pub media: MediaRef,
    pub internal_score: Option<f64>,
    pub external_score: Option<f64>,
    pub verdict: Verdict,
    pub created_at: DateTime<Utc>,
    pub model: Option<ModelMetadata>,
    pub provider: Option<ProviderMetadata>,
}

impl ScanRecord {
    pub fn new(id: String, owner: RecordOwner, media: MediaRef, outcome: &ScanOutcome) -> Self {
        let model = match (&outcome.internal.value, &outcome.internal.origin) {
            (
                Some(_),
                ScoreOrigin::Inference {
                    model_version,
                    runtime_ms,
                },
            ) => Some(ModelMetadata {
                model_version: model_version.clone(),
                runtime_ms: runtime_ms.unwrap_or(outcome.internal.latency.as_millis() as u64),
            }),
            _ => None,
        };

        let provider = outcome.external.value.map(|_| ProviderMetadata {
            name: outcome.external.source_label(),
            latency_ms: outcome.external.latency.as_millis() as u64,
        });

        Self {
            id,
            owner,
            media,
            internal_score: outcome.internal.value,
            external_score: outcome.external.value,
            verdict: outcome.verdict,
            created_at: Utc::now(),
            model,
            provider,
        }
    }
}

/// A persisted scan along with the per-detector details behind its verdict
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedScan {
    pub record: ScanRecord,
    pub outcome: ScanOutcome,
}

pub static DEFAULT_PAGE_SIZE: usize = 10;
pub static MAX_PAGE_SIZE: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerdictStatistics {
    pub total: usize,
    pub real: usize,
    pub fake: usize,
    pub inconclusive: usize,
}

impl VerdictStatistics {
    pub fn account(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Real => self.real += 1,
            Verdict::Fake => self.fake += 1,
            Verdict::Inconclusive => self.inconclusive += 1,
        }
    }
}

pub struct UserProfile {
    pub account: UserAccount,
    pub statistics: VerdictStatistics,
    pub recent: Vec<ScanRecord>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupScope {
    Everything,
    ProviderScores,
    ExpiredScores,
}

pub type BatchOutcome = (MediaRef, Option<ScanRecord>);

pub struct StatisticsForBatch {
    pub verdicts: VerdictStatistics,
    pub failed: usize,
}

pub struct BatchResults {
    pub statistics: StatisticsForBatch,
    pub outcomes: Vec<BatchOutcome>,
}
