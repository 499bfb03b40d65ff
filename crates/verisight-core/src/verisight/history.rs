// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::ScanError;
use crate::domain::interfaces::{ScanRecordStorage, UserDirectory};
use crate::domain::models::{Identity, Page, PageRequest, ScanRecord, UserProfile};
use crate::domain::ownership::owns_record;
use crate::infra::persistence::scans::ScanRecordsDirectory;
use crate::infra::persistence::users::UsersDirectory;

static RECENT_SCANS_ON_PROFILE: usize = 20;

pub struct VerisightHistory {
    records: ScanRecordsDirectory,
    users: UsersDirectory,
}

impl VerisightHistory {
    pub fn new(records: ScanRecordsDirectory, users: UsersDirectory) -> Self {
        Self { records, users }
    }

    pub fn list(&self, identity: &Identity, page: PageRequest) -> anyhow::Result<Page<ScanRecord>> {
        self.records.find_by_owner(&identity.owner(), page)
    }

    pub fn find(&self, identity: &Identity, scan_id: &str) -> anyhow::Result<ScanRecord> {
        let Some(record) = self.records.find_by_id(scan_id)? else {
            return Err(ScanError::ScanNotFound(scan_id.to_string()).into());
        };

        if !owns_record(identity, &record) {
            log::warn!("[verisight.identity] {} cannot access scan {}", identity, scan_id);
            return Err(ScanError::AccessDenied(scan_id.to_string()).into());
        }

        Ok(record)
    }

    pub fn profile(&self, identity: &Identity) -> anyhow::Result<UserProfile> {
        let Identity::AuthenticatedUser { id } = identity else {
            return Err(ScanError::AuthenticationRequired.into());
        };

        let Some(account) = self.users.find_by_id(id)? else {
            return Err(ScanError::AuthenticationRequired.into());
        };

        let owner = identity.owner();
        let statistics = self.records.statistics_for_owner(&owner)?;
        let recent = self
            .records
            .find_by_owner(&owner, PageRequest::new(1, RECENT_SCANS_ON_PROFILE))?
            .items;

        Ok(UserProfile {
            account,
            statistics,
            recent,
        })
    }
}
