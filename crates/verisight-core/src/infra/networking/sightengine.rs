// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{MediaKind, MediaRef, valid_score};
use crate::infra::networking::http::HTTPClient;
use anyhow::{Context, anyhow};
use serde::Deserialize;
use std::sync::Arc;

pub static URL_SIGHTENGINE_API: &str = "https://api.sightengine.com/1.0";
pub static SIGHTENGINE_PROVIDER_NAME: &str = "SIGHTENGINE";

#[derive(Debug, Deserialize)]
struct DeepfakeScores {
    deepfake: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FrameScores {
    #[serde(rename = "type")]
    scores: Option<DeepfakeScores>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    deepfake: Option<f64>,
    frames: Option<Vec<FrameScores>>,
}

/// Raw payload; images answer with `type.deepfake`, videos with `data.deepfake` or `data.frames`
#[derive(Debug, Deserialize)]
pub struct SightengineResponse {
    #[serde(rename = "type")]
    scores: Option<DeepfakeScores>,
    data: Option<MediaData>,
}

/// The numeric signal carried by a provider payload, whatever its shape
#[derive(Debug, PartialEq)]
pub enum ProviderSignal {
    Scalar(f64),
    Segments(Vec<f64>),
    Missing,
}

impl From<SightengineResponse> for ProviderSignal {
    fn from(response: SightengineResponse) -> Self {
        let scalar = response
            .scores
            .and_then(|scores| scores.deepfake)
            .or(response.data.as_ref().and_then(|data| data.deepfake));

        if let Some(score) = scalar {
            return ProviderSignal::Scalar(score);
        }

        let segments = response
            .data
            .and_then(|data| data.frames)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|frame| frame.scores.and_then(|scores| scores.deepfake))
            .collect::<Vec<_>>();

        match segments.is_empty() {
            true => ProviderSignal::Missing,
            false => ProviderSignal::Segments(segments),
        }
    }
}

impl ProviderSignal {
    /// Reduces the signal to a single score in [0, 1]; the most suspicious segment wins
    pub fn normalize(self) -> Option<f64> {
        match self {
            ProviderSignal::Scalar(score) => valid_score(score),
            ProviderSignal::Segments(scores) => scores
                .into_iter()
                .filter_map(valid_score)
                .reduce(f64::max),
            ProviderSignal::Missing => None,
        }
    }
}

pub struct SightengineClient {
    base_url: String,
    api_user: String,
    api_secret: String,
    http_client: Arc<HTTPClient>,
}

impl SightengineClient {
    pub fn new(base_url: String, api_user: String, api_secret: String, http_client: Arc<HTTPClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_user,
            api_secret,
            http_client,
        }
    }

    pub async fn fetch_deepfake_score(&self, media: &MediaRef) -> anyhow::Result<f64> {
        let (endpoint, media_param) = match media.kind {
            MediaKind::Image => (format!("{}/check.json", self.base_url), "url"),
            MediaKind::Video => (format!("{}/video/check-sync.json", self.base_url), "stream_url"),
        };

        let query = [
            ("models", "deepfake"),
            (media_param, media.url.as_str()),
            ("api_user", self.api_user.as_str()),
            ("api_secret", self.api_secret.as_str()),
        ];

        let response = self
            .http_client
            .get(&endpoint)
            .query(&query)
            .send()
            .await?
            .error_for_status()
            .context("[verisight.sightengine] provider refused the request")?
            .json::<SightengineResponse>()
            .await
            .context("[verisight.sightengine] malformed provider response")?;

        ProviderSignal::from(response)
            .normalize()
            .ok_or_else(|| anyhow!("[verisight.sightengine] deepfake score missing for {}", media))
    }
}
