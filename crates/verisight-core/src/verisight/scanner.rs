// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::detectors::orchestrator::ScanOrchestrator;
use crate::domain::interfaces::{ScanOrchestration, ScanRecordStorage};
use crate::domain::models::{CompletedScan, Identity, MediaRef, ScanRecord};
use crate::infra::persistence::scans::ScanRecordsDirectory;
use std::time::Duration;
use uuid::Uuid;

pub struct VerisightScanner {
    orchestrator: ScanOrchestrator,
    records: ScanRecordsDirectory,
    time_budget: Duration,
}

impl VerisightScanner {
    pub fn new(orchestrator: ScanOrchestrator, records: ScanRecordsDirectory, time_budget: Duration) -> Self {
        Self {
            orchestrator,
            records,
            time_budget,
        }
    }

    /// Longest time a single scan may take, given detectors run side by side
    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    pub async fn scan(&self, media: &MediaRef, identity: &Identity) -> anyhow::Result<CompletedScan> {
        let outcome = self.orchestrator.scan(media).await?;

        let record = ScanRecord::new(Uuid::new_v4().to_string(), identity.owner(), media.clone(), &outcome);
        self.records.create(&record)?;

        Ok(CompletedScan { record, outcome })
    }
}
