// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

#[cfg(test)]
use crate::domain::detectors::FakeScorer;
use crate::domain::interfaces::MediaScoring;
use crate::domain::models::{MediaRef, ScoreOrigin, ScoreResult, valid_score};
use crate::infra::networking::inference::{InferenceServiceClient, Prediction};
use std::time::{Duration, Instant};

static UNKNOWN_MODEL_VERSION: &str = "unknown";

pub enum InternalScorer {
    InferenceService(InferenceServiceClient),
    #[cfg(test)]
    Fake(FakeScorer),
}

impl InternalScorer {
    async fn predict(&self, media: &MediaRef) -> anyhow::Result<Prediction> {
        match self {
            InternalScorer::InferenceService(delegate) => delegate.predict(media).await,
            #[cfg(test)]
            InternalScorer::Fake(fake) => Ok(Prediction {
                score: fake.score().await?,
                model_version: Some("fake-model".to_string()),
                runtime_ms: None,
            }),
        }
    }
}

/// Our own model, reached through the inference service; never fails, only goes absent
pub struct InternalDetector {
    scorer: InternalScorer,
    timeout: Duration,
}

impl InternalDetector {
    pub fn new(scorer: InternalScorer, timeout: Duration) -> Self {
        Self { scorer, timeout }
    }
}

impl MediaScoring for InternalDetector {
    async fn detect(&self, media: &MediaRef) -> ScoreResult {
        let started = Instant::now();

        let prediction = match tokio::time::timeout(self.timeout, self.scorer.predict(media)).await {
            Ok(Ok(prediction)) => prediction,
            Ok(Err(incoming)) => {
                log::warn!("[verisight.detector] cannot score {} | reason = {}", media, incoming);
                return ScoreResult::absent("unavailable", started.elapsed());
            },
            Err(_) => {
                log::warn!("[verisight.detector] gave up on {} after {:?}", media, self.timeout);
                return ScoreResult::absent("timeout", started.elapsed());
            },
        };

        let Some(score) = valid_score(prediction.score) else {
            log::warn!(
                "[verisight.detector] discarding score {} for {}",
                prediction.score,
                media
            );
            return ScoreResult::absent("malformed-score", started.elapsed());
        };

        let origin = ScoreOrigin::Inference {
            model_version: prediction
                .model_version
                .unwrap_or_else(|| UNKNOWN_MODEL_VERSION.to_string()),
            runtime_ms: prediction.runtime_ms,
        };

        log::info!("[verisight.detector] scored {} with {}", media, score);
        ScoreResult::present(score, origin, started.elapsed())
    }
}
