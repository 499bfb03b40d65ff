// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::caching::{CacheEntry, Fingerprint};
use crate::domain::interfaces::ProviderScoreStorage;
use crate::infra::persistence::publish_replacing;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use walkdir::WalkDir;

static ENTRY_FILE_EXTENSION: &str = "json";

/// One JSON document per fingerprint, laid out as `<provider>/<kind>/<url digest>.json`
#[derive(Clone, Debug)]
pub struct ProviderScoresDirectory {
    root_dir: PathBuf,
}

impl ProviderScoresDirectory {
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    fn data_dir(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root_dir
            .join(fingerprint.provider())
            .join(fingerprint.kind().as_str())
    }

    fn entry_file(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.data_dir(fingerprint)
            .join(format!("{}.{}", fingerprint.digest(), ENTRY_FILE_EXTENSION))
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        if !self.root_dir.exists() {
            return Ok(0);
        }

        let mut purged = 0;

        for dir_entry in WalkDir::new(&self.root_dir).into_iter().filter_map(Result::ok) {
            let path = dir_entry.path();

            if !dir_entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != ENTRY_FILE_EXTENSION) {
                continue;
            }

            let Ok(serialized) = std::fs::read(path) else {
                continue;
            };

            let is_stale = match serde_json::from_slice::<CacheEntry>(&serialized) {
                Ok(entry) => !entry.is_fresh(now),
                Err(_) => true,
            };

            if is_stale {
                std::fs::remove_file(path)?;
                log::info!("[verisight.cache] purged {:?}", path);
                purged += 1;
            }
        }

        Ok(purged)
    }
}

impl ProviderScoreStorage for ProviderScoresDirectory {
    fn retrieve(&self, fingerprint: &Fingerprint) -> anyhow::Result<Option<CacheEntry>> {
        let entry_file = self.entry_file(fingerprint);

        if !entry_file.exists() {
            return Ok(None);
        }

        let serialized = std::fs::read(&entry_file)?;
        let entry: CacheEntry = serde_json::from_slice(&serialized)?;

        if entry.key != fingerprint.key() {
            log::warn!("[verisight.cache] unexpected key stored at {:?}", entry_file);
            return Ok(None);
        }

        Ok(Some(entry))
    }

    fn upsert(&self, entry: &CacheEntry) -> anyhow::Result<()> {
        let fingerprint_dir = self.root_dir.join(&entry.provider).join(entry.media_kind.as_str());
        std::fs::create_dir_all(&fingerprint_dir)?;

        let digest = entry.key.rsplit('|').next().unwrap_or(entry.key.as_str());
        let entry_file = fingerprint_dir.join(format!("{}.{}", digest, ENTRY_FILE_EXTENSION));

        // Concurrent writers for the same fingerprint race on rename; the last one wins
        publish_replacing(&entry_file, &serde_json::to_vec(entry)?)
    }
}
