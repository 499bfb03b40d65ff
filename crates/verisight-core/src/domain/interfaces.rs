// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::caching::{CacheEntry, Fingerprint};
use crate::domain::errors::ScanError;
use crate::domain::models::{
    MediaRef, Page, PageRequest, RecordOwner, ScanOutcome, ScanRecord, ScoreResult, UserAccount, VerdictStatistics,
    VerifiedPrincipal,
};

pub trait MediaScoring {
    async fn detect(&self, media: &MediaRef) -> ScoreResult;
}

pub trait ScanOrchestration {
    async fn scan(&self, media: &MediaRef) -> Result<ScanOutcome, ScanError>;
}

pub trait ProviderScoreStorage {
    fn retrieve(&self, fingerprint: &Fingerprint) -> anyhow::Result<Option<CacheEntry>>;
    fn upsert(&self, entry: &CacheEntry) -> anyhow::Result<()>;
}

pub trait ScanRecordStorage {
    fn create(&self, record: &ScanRecord) -> anyhow::Result<()>;
    fn find_by_id(&self, scan_id: &str) -> anyhow::Result<Option<ScanRecord>>;
    fn find_by_owner(&self, owner: &RecordOwner, page: PageRequest) -> anyhow::Result<Page<ScanRecord>>;
    fn statistics_for_owner(&self, owner: &RecordOwner) -> anyhow::Result<VerdictStatistics>;
}

pub trait UserDirectory {
    fn find_or_create(&self, principal: &VerifiedPrincipal) -> anyhow::Result<UserAccount>;
    fn find_by_id(&self, user_id: &str) -> anyhow::Result<Option<UserAccount>>;
}
