// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::caching::{ProviderCache, ProviderScoreStore};
use crate::domain::detectors::external::{ExternalDetector, ExternalProvider, ProviderDetector};
use crate::domain::detectors::internal::{InternalDetector, InternalScorer};
use crate::domain::detectors::orchestrator::ScanOrchestrator;
use crate::domain::errors::ScanError;
use crate::domain::ownership::{ClientContext, OwnershipResolver};
use crate::infra::caching::CacheManager;
use crate::infra::caching::provider_scores::ProviderScoresDirectory;
use crate::infra::cli::reporter::ConsoleReporter;
use crate::infra::config::{DetectionSettings, ExternalProviderKind};
use crate::infra::identity::cookies::CookieSigner;
use crate::infra::identity::jar::GuestCookieJar;
use crate::infra::networking::http::HTTP_CLIENT;
use crate::infra::networking::inference::InferenceServiceClient;
use crate::infra::networking::sightengine::{SIGHTENGINE_PROVIDER_NAME, SightengineClient};
use crate::infra::persistence::scans::ScanRecordsDirectory;
use crate::infra::persistence::users::UsersDirectory;
use crate::verisight::Verisight;
use crate::verisight::cleaner::VerisightCleaner;
use crate::verisight::history::VerisightHistory;
use crate::verisight::scanner::VerisightScanner;
use crate::verisight::sessions::VerisightSessions;

fn internal_detector(settings: &DetectionSettings) -> InternalDetector {
    let client = InferenceServiceClient::new(settings.internal_url.clone(), HTTP_CLIENT.clone());
    InternalDetector::new(InternalScorer::InferenceService(client), settings.internal_timeout)
}

fn external_detector(settings: &DetectionSettings, cache_manager: &CacheManager) -> Result<ExternalDetector, ScanError> {
    if !settings.external_enabled {
        log::info!("[verisight.detector] external provider disabled");
        return Ok(ExternalDetector::Disabled);
    }

    let provider = match settings.external_provider {
        ExternalProviderKind::Mock => return Ok(ExternalDetector::Mock),
        ExternalProviderKind::Sightengine => {
            let Some(credentials) = &settings.external_credentials else {
                return Err(ScanError::MissingProviderCredentials {
                    provider: SIGHTENGINE_PROVIDER_NAME.to_string(),
                });
            };

            let client = SightengineClient::new(
                settings.external_api_url.clone(),
                credentials.api_user.clone(),
                credentials.api_secret.clone(),
                HTTP_CLIENT.clone(),
            );
            ExternalProvider::Sightengine(client)
        },
    };

    let storage = ProviderScoreStore::FileSystem(ProviderScoresDirectory::new(cache_manager.provider_scores_dir()));

    let cache = ProviderCache::new(storage);
    let detector = ProviderDetector::new(provider, cache, settings.cache_ttl, settings.external_timeout);
    Ok(ExternalDetector::Live(detector))
}

fn scanner(settings: &DetectionSettings, cache_manager: &CacheManager) -> Result<VerisightScanner, ScanError> {
    let orchestrator = ScanOrchestrator::new(
        internal_detector(settings),
        external_detector(settings, cache_manager)?,
        settings.thresholds,
    );

    let records = ScanRecordsDirectory::new(cache_manager.scans_dir());
    let time_budget = settings.internal_timeout.max(settings.external_timeout);
    Ok(VerisightScanner::new(orchestrator, records, time_budget))
}

fn sessions(
    settings: &DetectionSettings,
    cache_manager: &CacheManager,
    client: ClientContext,
) -> anyhow::Result<VerisightSessions> {
    let cookie_jar = GuestCookieJar::new(cache_manager.session_dir());

    let cookie_secret = match &settings.cookie_secret {
        Some(configured) => configured.clone(),
        None => cookie_jar.signing_secret()?,
    };

    let resolver = OwnershipResolver::new(
        CookieSigner::new(cookie_secret.as_bytes()),
        UsersDirectory::new(cache_manager.users_dir()),
    );

    Ok(VerisightSessions::new(resolver, cookie_jar, client))
}

pub fn create_verisight(
    settings: &DetectionSettings,
    client: ClientContext,
    use_colors: bool,
) -> anyhow::Result<Verisight> {
    let cache_manager = CacheManager::new(settings.home_dir.clone());

    let history = VerisightHistory::new(
        ScanRecordsDirectory::new(cache_manager.scans_dir()),
        UsersDirectory::new(cache_manager.users_dir()),
    );

    Ok(Verisight::new(
        scanner(settings, &cache_manager)?,
        history,
        VerisightCleaner::new(cache_manager.clone()),
        sessions(settings, &cache_manager, client)?,
        ConsoleReporter::new(use_colors),
    ))
}
