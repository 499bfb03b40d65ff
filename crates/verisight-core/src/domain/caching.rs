// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::interfaces::ProviderScoreStorage;
use crate::domain::models::{MediaKind, MediaRef};
use crate::infra::caching::provider_scores::ProviderScoresDirectory;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

#[cfg(test)]
use std::{collections::HashMap, sync::Mutex};

/// Cache key for a provider score: provider identity, media kind and the SHA-256 of the media URL
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    provider: String,
    kind: MediaKind,
    digest: String,
}

impl Fingerprint {
    pub fn new(provider: &str, media: &MediaRef) -> Self {
        let digest = hex::encode(Sha256::digest(media.url.as_str().as_bytes()));
        Self {
            provider: provider.to_string(),
            kind: media.kind,
            digest,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.provider, self.kind, self.digest)
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub provider: String,
    pub media_kind: MediaKind,
    pub media_url: String,
    pub score: f64,
    pub fetched_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(fingerprint: &Fingerprint, media: &MediaRef, score: f64, ttl: TimeDelta) -> Self {
        let fetched_at = Utc::now();
        Self {
            key: fingerprint.key(),
            provider: fingerprint.provider.clone(),
            media_kind: fingerprint.kind,
            media_url: media.url.to_string(),
            score,
            fetched_at,
            expire_at: fetched_at + ttl,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expire_at
    }
}

pub enum ProviderScoreStore {
    FileSystem(ProviderScoresDirectory),
    #[cfg(test)]
    FakeStore(Mutex<HashMap<String, CacheEntry>>),
}

impl ProviderScoreStorage for ProviderScoreStore {
    fn retrieve(&self, fingerprint: &Fingerprint) -> anyhow::Result<Option<CacheEntry>> {
        match self {
            ProviderScoreStore::FileSystem(delegate) => delegate.retrieve(fingerprint),
            #[cfg(test)]
            ProviderScoreStore::FakeStore(fakes) => {
                let entries = fakes.lock().map_err(|_| anyhow::anyhow!("poisoned fake store"))?;
                Ok(entries.get(&fingerprint.key()).cloned())
            },
        }
    }

    fn upsert(&self, entry: &CacheEntry) -> anyhow::Result<()> {
        match self {
            ProviderScoreStore::FileSystem(delegate) => delegate.upsert(entry),
            #[cfg(test)]
            ProviderScoreStore::FakeStore(fakes) => {
                let mut entries = fakes.lock().map_err(|_| anyhow::anyhow!("poisoned fake store"))?;
                entries.insert(entry.key.clone(), entry.clone());
                Ok(())
            },
        }
    }
}

/// Scores previously returned by the paid provider.
///
/// Purely an optimization: storage failures turn into misses on read and
/// no-ops on write. Expired entries are never served, even if still stored.
pub struct ProviderCache {
    storage: ProviderScoreStore,
}

impl ProviderCache {
    pub fn new(storage: ProviderScoreStore) -> Self {
        Self { storage }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        match self.storage.retrieve(fingerprint) {
            Ok(Some(entry)) if entry.is_fresh(Utc::now()) => {
                log::info!("[verisight.cache] cache hit for {}", fingerprint);
                Some(entry)
            },
            Ok(Some(entry)) => {
                log::info!(
                    "[verisight.cache] ignoring entry for {} (expired at {})",
                    fingerprint,
                    entry.expire_at
                );
                None
            },
            Ok(None) => {
                log::info!("[verisight.cache] {} not found", fingerprint);
                None
            },
            Err(incoming) => {
                log::warn!("[verisight.cache] cannot read {} | reason = {}", fingerprint, incoming);
                None
            },
        }
    }

    pub fn put(&self, fingerprint: &Fingerprint, media: &MediaRef, score: f64, ttl: TimeDelta) {
        self.store(CacheEntry::new(fingerprint, media, score, ttl))
    }

    pub fn store(&self, entry: CacheEntry) {
        match self.storage.upsert(&entry) {
            Ok(_) => log::info!("[verisight.cache] {} saved until {}", entry.key, entry.expire_at),
            Err(incoming) => log::warn!("[verisight.cache] cannot save {} | reason = {}", entry.key, incoming),
        }
    }
}
