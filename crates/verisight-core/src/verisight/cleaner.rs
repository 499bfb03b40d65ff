// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::infra::caching::CacheManager;
use crate::infra::caching::provider_scores::ProviderScoresDirectory;
use chrono::Utc;

pub struct VerisightCleaner {
    cache_manager: CacheManager,
}

impl VerisightCleaner {
    pub fn new(cache_manager: CacheManager) -> Self {
        Self { cache_manager }
    }

    pub fn cleanup_everything(&self) {
        self.cache_manager.cleanup_all();
    }

    pub fn cleanup_provider_scores(&self) {
        self.cache_manager.cleanup_provider_scores();
    }

    pub fn purge_expired_scores(&self) -> anyhow::Result<usize> {
        let provider_scores = ProviderScoresDirectory::new(self.cache_manager.provider_scores_dir());
        let purged = provider_scores.purge_expired(Utc::now())?;
        log::info!("[verisight.cache] purged {} expired provider scores", purged);
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::caching::{CacheEntry, Fingerprint};
    use crate::domain::interfaces::ProviderScoreStorage;
    use crate::domain::models::{MediaKind, MediaRef};
    use crate::infra::caching::CacheManager;
    use crate::infra::caching::provider_scores::ProviderScoresDirectory;
    use crate::verisight::cleaner::VerisightCleaner;
    use assertor::{BooleanAssertion, EqualityAssertion, OptionAssertion};
    use chrono::TimeDelta;
    use temp_dir::TempDir;

    #[test]
    fn should_purge_only_expired_scores() {
        let temp_dir = TempDir::new().unwrap();
        let cache_manager = CacheManager::new(temp_dir.path().to_path_buf());
        let storage = ProviderScoresDirectory::new(cache_manager.provider_scores_dir());

        let fresh_media = MediaRef::parse("https://cdn.example.com/fresh.png", MediaKind::Image).unwrap();
        let stale_media = MediaRef::parse("https://cdn.example.com/stale.png", MediaKind::Image).unwrap();
        let fresh = Fingerprint::new("SIGHTENGINE", &fresh_media);
        let stale = Fingerprint::new("SIGHTENGINE", &stale_media);

        storage
            .upsert(&CacheEntry::new(&fresh, &fresh_media, 0.3, TimeDelta::hours(1)))
            .unwrap();
        storage
            .upsert(&CacheEntry::new(&stale, &stale_media, 0.3, TimeDelta::hours(-1)))
            .unwrap();

        let purged = VerisightCleaner::new(cache_manager.clone()).purge_expired_scores().unwrap();

        assertor::assert_that!(purged).is_equal_to(1);
        assertor::assert_that!(storage.retrieve(&fresh).unwrap()).is_some();
        assertor::assert_that!(storage.retrieve(&stale).unwrap()).is_none();
    }

    #[test]
    fn should_keep_scans_when_removing_provider_scores() {
        let temp_dir = TempDir::new().unwrap();
        let cache_manager = CacheManager::new(temp_dir.path().to_path_buf());
        std::fs::create_dir_all(cache_manager.provider_scores_dir()).unwrap();
        std::fs::create_dir_all(cache_manager.scans_dir()).unwrap();

        VerisightCleaner::new(cache_manager.clone()).cleanup_provider_scores();

        assertor::assert_that!(cache_manager.provider_scores_dir().exists()).is_false();
        assertor::assert_that!(cache_manager.scans_dir().exists()).is_true();
    }
}
