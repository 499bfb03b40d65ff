// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::interfaces::ScanRecordStorage;
use crate::domain::models::{Page, PageRequest, RecordOwner, ScanRecord, VerdictStatistics};
use crate::infra::persistence::publish_once;
use anyhow::bail;
use std::path::PathBuf;

static RECORD_FILE_EXTENSION: &str = "json";

/// Append-only store: one JSON document per scan, never rewritten
#[derive(Clone, Debug)]
pub struct ScanRecordsDirectory {
    root_dir: PathBuf,
}

impl ScanRecordsDirectory {
    pub fn new(root_dir: PathBuf) -> Self {
        Self { root_dir }
    }

    fn record_file(&self, scan_id: &str) -> Option<PathBuf> {
        let well_formed = !scan_id.is_empty()
            && scan_id
                .chars()
                .all(|char| char.is_ascii_alphanumeric() || char == '-');

        well_formed.then(|| self.root_dir.join(format!("{}.{}", scan_id, RECORD_FILE_EXTENSION)))
    }

    fn records_owned_by(&self, owner: &RecordOwner) -> anyhow::Result<Vec<ScanRecord>> {
        if !self.root_dir.exists() {
            return Ok(vec![]);
        }

        let mut owned = vec![];

        for dir_entry in std::fs::read_dir(&self.root_dir)? {
            let path = dir_entry?.path();

            if path.extension().is_none_or(|ext| ext != RECORD_FILE_EXTENSION) {
                continue;
            }

            match serde_json::from_slice::<ScanRecord>(&std::fs::read(&path)?) {
                Ok(record) if &record.owner == owner => owned.push(record),
                Ok(_) => {},
                Err(incoming) => log::warn!("[verisight.storage] skipping {:?} | reason = {}", path, incoming),
            }
        }

        owned.sort_by(|first, second| second.created_at.cmp(&first.created_at));
        Ok(owned)
    }
}

impl ScanRecordStorage for ScanRecordsDirectory {
    fn create(&self, record: &ScanRecord) -> anyhow::Result<()> {
        let Some(record_file) = self.record_file(&record.id) else {
            bail!("verisight.storage : invalid scan id '{}'", record.id)
        };

        std::fs::create_dir_all(&self.root_dir)?;
        let serialized = serde_json::to_vec(record)?;

        if !publish_once(&record_file, &serialized)? {
            bail!("verisight.storage : scan {} already exists", record.id)
        }

        log::info!("[verisight.storage] scan {} saved", record.id);
        Ok(())
    }

    fn find_by_id(&self, scan_id: &str) -> anyhow::Result<Option<ScanRecord>> {
        let Some(record_file) = self.record_file(scan_id) else {
            return Ok(None);
        };

        if !record_file.exists() {
            return Ok(None);
        }

        let record = serde_json::from_slice(&std::fs::read(record_file)?)?;
        Ok(Some(record))
    }

    fn find_by_owner(&self, owner: &RecordOwner, page: PageRequest) -> anyhow::Result<Page<ScanRecord>> {
        let owned = self.records_owned_by(owner)?;
        let total = owned.len();

        let items = owned
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .collect::<Vec<_>>();

        Ok(Page {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    fn statistics_for_owner(&self, owner: &RecordOwner) -> anyhow::Result<VerdictStatistics> {
        let statistics = self
            .records_owned_by(owner)?
            .iter()
            .fold(VerdictStatistics::default(), |mut statistics, record| {
                statistics.account(record.verdict);
                statistics
            });

        Ok(statistics)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::interfaces::ScanRecordStorage;
    use crate::domain::models::{
        MediaKind, MediaRef, PageRequest, RecordOwner, ScanOutcome, ScanRecord, ScoreOrigin, ScoreResult, Verdict,
        VerdictStatistics,
    };
    use crate::infra::persistence::scans::ScanRecordsDirectory;
    use assertor::{BooleanAssertion, EqualityAssertion, OptionAssertion, ResultAssertion};
    use chrono::TimeDelta;
    use std::time::Duration;
    use temp_dir::TempDir;

    fn guest(hash: &str) -> RecordOwner {
        RecordOwner::Guest {
            owner_hash: hash.to_string(),
        }
    }

    fn record(id: &str, owner: RecordOwner, verdict: Verdict, minutes_ago: i64) -> ScanRecord {
        let media = MediaRef::parse(&format!("https://cdn.example.com/{}.jpg", id), MediaKind::Image).unwrap();
        let outcome = ScanOutcome {
            internal: ScoreResult::present(0.5, ScoreOrigin::Provider("fake".to_string()), Duration::ZERO),
            external: ScoreResult::absent("timeout", Duration::ZERO),
            verdict,
        };

        let mut record = ScanRecord::new(id.to_string(), owner, media, &outcome);
        record.created_at -= TimeDelta::minutes(minutes_ago);
        record
    }

    #[test]
    fn should_refuse_to_overwrite_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScanRecordsDirectory::new(temp_dir.path().to_path_buf());
        let original = record("scan-1", guest("abc"), Verdict::Real, 0);

        store.create(&original).unwrap();
        let overwritten = store.create(&record("scan-1", guest("def"), Verdict::Fake, 0));

        assertor::assert_that!(overwritten).is_err();
        assertor::assert_that!(store.find_by_id("scan-1").unwrap()).is_equal_to(Some(original));
    }

    #[test]
    fn should_store_only_complete_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScanRecordsDirectory::new(temp_dir.path().to_path_buf());

        store.create(&record("scan-1", guest("abc"), Verdict::Real, 0)).unwrap();
        store.create(&record("scan-2", guest("abc"), Verdict::Fake, 0)).unwrap();

        let stored_files = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();

        assertor::assert_that!(stored_files.len()).is_equal_to(2);
        assertor::assert_that!(stored_files.iter().all(|name| name.ends_with(".json"))).is_true();
        assertor::assert_that!(store.find_by_owner(&guest("abc"), PageRequest::default()).unwrap().total).is_equal_to(2);
    }

    #[test]
    fn should_not_resolve_ids_outside_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScanRecordsDirectory::new(temp_dir.path().join("scans"));
        std::fs::write(temp_dir.path().join("secret.json"), "{}").unwrap();

        assertor::assert_that!(store.find_by_id("../secret").unwrap()).is_none();
        assertor::assert_that!(store.find_by_id("").unwrap()).is_none();
        assertor::assert_that!(store.find_by_id("unknown").unwrap()).is_none();
    }

    #[test]
    fn should_paginate_owned_records_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScanRecordsDirectory::new(temp_dir.path().to_path_buf());

        for (index, minutes_ago) in [30, 10, 20, 40, 0].iter().enumerate() {
            let scan_id = format!("mine-{}", index);
            store
                .create(&record(&scan_id, guest("abc"), Verdict::Inconclusive, *minutes_ago))
                .unwrap();
        }

        store
            .create(&record("theirs", guest("def"), Verdict::Fake, 5))
            .unwrap();

        let first_page = store.find_by_owner(&guest("abc"), PageRequest::new(1, 2)).unwrap();
        let last_page = store.find_by_owner(&guest("abc"), PageRequest::new(3, 2)).unwrap();

        let first_ids = first_page.items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        let last_ids = last_page.items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();

        assertor::assert_that!(first_page.total).is_equal_to(5);
        assertor::assert_that!(first_ids).is_equal_to(vec!["mine-4", "mine-1"]);
        assertor::assert_that!(last_ids).is_equal_to(vec!["mine-3"]);
    }

    #[test]
    fn should_compute_statistics_per_owner() {
        let temp_dir = TempDir::new().unwrap();
        let store = ScanRecordsDirectory::new(temp_dir.path().to_path_buf());
        let user = RecordOwner::User {
            user_id: "user-1".to_string(),
        };

        store.create(&record("a", user.clone(), Verdict::Fake, 3)).unwrap();
        store.create(&record("b", user.clone(), Verdict::Fake, 2)).unwrap();
        store.create(&record("c", user.clone(), Verdict::Real, 1)).unwrap();
        store.create(&record("d", guest("abc"), Verdict::Real, 1)).unwrap();

        let statistics = store.statistics_for_owner(&user).unwrap();

        let expected = VerdictStatistics {
            total: 3,
            real: 1,
            fake: 2,
            inconclusive: 0,
        };
        assertor::assert_that!(statistics).is_equal_to(expected);
    }
}
