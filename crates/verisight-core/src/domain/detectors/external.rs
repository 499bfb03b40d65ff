// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::caching::{Fingerprint, ProviderCache};
#[cfg(test)]
use crate::domain::detectors::FakeScorer;
use crate::domain::interfaces::MediaScoring;
use crate::domain::models::{MediaRef, NeutralMode, ScoreOrigin, ScoreResult, valid_score};
use crate::infra::networking::sightengine::{SIGHTENGINE_PROVIDER_NAME, SightengineClient};
use chrono::TimeDelta;
use std::time::{Duration, Instant};

/// Score handed out when no real provider is involved; never decisive on its own
pub static NEUTRAL_SCORE: f64 = 0.5;

pub enum ExternalProvider {
    Sightengine(SightengineClient),
    #[cfg(test)]
    Fake(FakeScorer),
}

impl ExternalProvider {
    pub fn name(&self) -> &str {
        match self {
            ExternalProvider::Sightengine(_) => SIGHTENGINE_PROVIDER_NAME,
            #[cfg(test)]
            ExternalProvider::Fake(_) => "FAKE",
        }
    }

    async fn fetch_score(&self, media: &MediaRef) -> anyhow::Result<f64> {
        match self {
            ExternalProvider::Sightengine(delegate) => delegate.fetch_deepfake_score(media).await,
            #[cfg(test)]
            ExternalProvider::Fake(fake) => fake.score().await,
        }
    }
}

pub struct ProviderDetector {
    provider: ExternalProvider,
    cache: ProviderCache,
    cache_ttl: TimeDelta,
    timeout: Duration,
}

impl ProviderDetector {
    pub fn new(provider: ExternalProvider, cache: ProviderCache, cache_ttl: TimeDelta, timeout: Duration) -> Self {
        Self {
            provider,
            cache,
            cache_ttl,
            timeout,
        }
    }

    async fn detect(&self, media: &MediaRef) -> ScoreResult {
        let started = Instant::now();
        let provider_name = self.provider.name().to_string();
        let fingerprint = Fingerprint::new(&provider_name, media);

        if let Some(cached) = self.cache.get(&fingerprint)
            && let Some(score) = valid_score(cached.score)
        {
            return ScoreResult::present(score, ScoreOrigin::ProviderCache(provider_name), started.elapsed());
        }

        let fetched = match tokio::time::timeout(self.timeout, self.provider.fetch_score(media)).await {
            Ok(Ok(score)) => score,
            Ok(Err(incoming)) => {
                log::warn!("[verisight.detector] {} cannot score {} | reason = {}", provider_name, media, incoming);
                return ScoreResult::absent("unavailable", started.elapsed());
            },
            Err(_) => {
                log::warn!(
                    "[verisight.detector] gave up on {} for {} after {:?}",
                    provider_name,
                    media,
                    self.timeout
                );
                return ScoreResult::absent("timeout", started.elapsed());
            },
        };

        let Some(score) = valid_score(fetched) else {
            log::warn!("[verisight.detector] discarding score {} from {}", fetched, provider_name);
            return ScoreResult::absent("malformed-score", started.elapsed());
        };

        let latency = started.elapsed();
        self.cache.put(&fingerprint, media, score, self.cache_ttl);
        log::info!("[verisight.detector] {} scored {} with {}", provider_name, media, score);
        ScoreResult::present(score, ScoreOrigin::Provider(provider_name), latency)
    }
}

/// Third-party opinion about a media file, backed by the provider scores cache
pub enum ExternalDetector {
    Disabled,
    Mock,
    Live(ProviderDetector),
}

impl MediaScoring for ExternalDetector {
    async fn detect(&self, media: &MediaRef) -> ScoreResult {
        match self {
            ExternalDetector::Disabled => {
                ScoreResult::present(NEUTRAL_SCORE, ScoreOrigin::Neutral(NeutralMode::Disabled), Duration::ZERO)
            },
            ExternalDetector::Mock => {
                ScoreResult::present(NEUTRAL_SCORE, ScoreOrigin::Neutral(NeutralMode::Mock), Duration::ZERO)
            },
            ExternalDetector::Live(delegate) => delegate.detect(media).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::caching::{CacheEntry, Fingerprint, ProviderCache, ProviderScoreStore};
    use crate::domain::detectors::FakeScorer;
    use crate::domain::detectors::external::{ExternalDetector, ExternalProvider, ProviderDetector};
    use crate::domain::interfaces::{MediaScoring, ProviderScoreStorage};
    use crate::domain::models::{MediaKind, MediaRef};
    use crate::infra::caching::provider_scores::ProviderScoresDirectory;
    use crate::infra::networking::http::HTTP_CLIENT;
    use crate::infra::networking::sightengine::SightengineClient;
    use assertor::{BooleanAssertion, EqualityAssertion, OptionAssertion};
    use chrono::TimeDelta;
    use httpmock::MockServer;
    use serde_json::json;
    use std::path::Path;
    use std::time::Duration;
    use temp_dir::TempDir;

    fn sample_media() -> MediaRef {
        MediaRef::parse("https://cdn.example.com/face.png", MediaKind::Image).unwrap()
    }

    fn fake_detector(scorer: FakeScorer, cache_dir: &Path, timeout: Duration) -> ExternalDetector {
        let storage = ProviderScoreStore::FileSystem(ProviderScoresDirectory::new(cache_dir.to_path_buf()));
        let cache = ProviderCache::new(storage);
        let detector = ProviderDetector::new(ExternalProvider::Fake(scorer), cache, TimeDelta::hours(24), timeout);
        ExternalDetector::Live(detector)
    }

    fn provider_calls(detector: &ExternalDetector) -> usize {
        match detector {
            ExternalDetector::Live(ProviderDetector {
                provider: ExternalProvider::Fake(fake),
                ..
            }) => fake.calls(),
            _ => 0,
        }
    }

    #[tokio::test]
    async fn should_answer_neutral_scores_without_provider() {
        let disabled = ExternalDetector::Disabled.detect(&sample_media()).await;
        let mocked = ExternalDetector::Mock.detect(&sample_media()).await;

        assertor::assert_that!(disabled.value).is_equal_to(Some(0.5));
        assertor::assert_that!(disabled.source_label()).is_equal_to("DISABLED".to_string());
        assertor::assert_that!(mocked.value).is_equal_to(Some(0.5));
        assertor::assert_that!(mocked.source_label()).is_equal_to("MOCK".to_string());
        assertor::assert_that!(mocked.is_neutral()).is_true();
    }

    #[tokio::test]
    async fn should_call_provider_once_then_serve_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let detector = fake_detector(FakeScorer::answering(0.91), temp_dir.path(), Duration::from_secs(1));

        let first = detector.detect(&sample_media()).await;
        let second = detector.detect(&sample_media()).await;

        assertor::assert_that!(provider_calls(&detector)).is_equal_to(1);
        assertor::assert_that!(first.value).is_equal_to(Some(0.91));
        assertor::assert_that!(first.source_label()).is_equal_to("FAKE".to_string());
        assertor::assert_that!(second.value).is_equal_to(Some(0.91));
        assertor::assert_that!(second.source_label()).is_equal_to("FAKE:CACHE".to_string());
    }

    #[tokio::test]
    async fn should_ignore_expired_cache_entries() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ProviderScoresDirectory::new(temp_dir.path().to_path_buf());
        let media = sample_media();
        let stale = CacheEntry::new(&Fingerprint::new("FAKE", &media), &media, 0.99, TimeDelta::hours(-1));
        storage.upsert(&stale).unwrap();

        let detector = fake_detector(FakeScorer::answering(0.15), temp_dir.path(), Duration::from_secs(1));
        let result = detector.detect(&media).await;

        assertor::assert_that!(provider_calls(&detector)).is_equal_to(1);
        assertor::assert_that!(result.value).is_equal_to(Some(0.15));
        assertor::assert_that!(result.source_label()).is_equal_to("FAKE".to_string());
    }

    #[tokio::test]
    async fn should_not_cache_failures() {
        let temp_dir = TempDir::new().unwrap();
        let detector = fake_detector(FakeScorer::failing(), temp_dir.path(), Duration::from_secs(1));

        let first = detector.detect(&sample_media()).await;
        let second = detector.detect(&sample_media()).await;

        assertor::assert_that!(provider_calls(&detector)).is_equal_to(2);
        assertor::assert_that!(first.value).is_none();
        assertor::assert_that!(second.source_label()).is_equal_to("unavailable:unavailable".to_string());
    }

    #[tokio::test]
    async fn should_go_absent_when_provider_stalls() {
        let temp_dir = TempDir::new().unwrap();
        let detector = fake_detector(
            FakeScorer::stalling(0.7, Duration::from_millis(500)),
            temp_dir.path(),
            Duration::from_millis(50),
        );

        let result = detector.detect(&sample_media()).await;
        let storage = ProviderScoresDirectory::new(temp_dir.path().to_path_buf());
        let cached = storage.retrieve(&Fingerprint::new("FAKE", &sample_media())).unwrap();

        assertor::assert_that!(result.source_label()).is_equal_to("unavailable:timeout".to_string());
        assertor::assert_that!(cached).is_none();
    }

    #[tokio::test]
    async fn should_not_cache_scores_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let detector = fake_detector(FakeScorer::answering(3.0), temp_dir.path(), Duration::from_secs(1));

        let result = detector.detect(&sample_media()).await;
        let storage = ProviderScoresDirectory::new(temp_dir.path().to_path_buf());
        let cached = storage.retrieve(&Fingerprint::new("FAKE", &sample_media())).unwrap();

        assertor::assert_that!(result.source_label()).is_equal_to("unavailable:malformed-score".to_string());
        assertor::assert_that!(cached).is_none();
    }

    #[tokio::test]
    async fn should_keep_scoring_when_cache_is_broken() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_folder = temp_dir.path().join("provider-scores");
        std::fs::write(&not_a_folder, "garbage").unwrap();

        let detector = fake_detector(FakeScorer::answering(0.05), &not_a_folder, Duration::from_secs(1));
        let result = detector.detect(&sample_media()).await;

        assertor::assert_that!(result.value).is_equal_to(Some(0.05));
        assertor::assert_that!(result.source_label()).is_equal_to("FAKE".to_string());
    }

    #[tokio::test]
    async fn should_score_through_sightengine() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start();
        let client = SightengineClient::new(
            mock_server.base_url(),
            "api-user".to_string(),
            "api-secret".to_string(),
            HTTP_CLIENT.clone(),
        );
        let storage = ProviderScoreStore::FileSystem(ProviderScoresDirectory::new(temp_dir.path().to_path_buf()));
        let cache = ProviderCache::new(storage);
        let detector = ExternalDetector::Live(ProviderDetector::new(
            ExternalProvider::Sightengine(client),
            cache,
            TimeDelta::hours(1),
            Duration::from_secs(5),
        ));

        let mocked = mock_server.mock(|when, then| {
            when.method("GET").path("/check.json");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "status": "success", "type": { "deepfake": 0.88 } }));
        });

        let first = detector.detect(&sample_media()).await;
        let second = detector.detect(&sample_media()).await;

        mocked.assert_calls(1);
        assertor::assert_that!(first.source_label()).is_equal_to("SIGHTENGINE".to_string());
        assertor::assert_that!(second.source_label()).is_equal_to("SIGHTENGINE:CACHE".to_string());
        assertor::assert_that!(second.value).is_equal_to(Some(0.88));
    }
}
