// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub(crate) mod batch;
pub(crate) mod cleaner;
pub(crate) mod history;
pub(crate) mod scanner;
pub(crate) mod sessions;

use crate::domain::models::{CleanupScope, MediaRef, PageRequest};
use crate::infra::cli::reporter::ConsoleReporter;
use crate::verisight::VerisightTask::{Cleanup, ListHistory, ScanBatch, ScanMedia, ShowProfile, ShowScan};
use anyhow::Context;
use batch::{VerisightBatch, parse_batch_entries};
use cleaner::VerisightCleaner;
use history::VerisightHistory;
use scanner::VerisightScanner;
use sessions::VerisightSessions;
use std::path::PathBuf;

#[derive(Debug)]
pub enum VerisightTask {
    ScanMedia(MediaRef),
    ScanBatch(PathBuf),
    ListHistory(PageRequest),
    ShowScan(String),
    ShowProfile,
    Cleanup(CleanupScope),
}

pub struct Verisight {
    scanner: VerisightScanner,
    history: VerisightHistory,
    cleaner: VerisightCleaner,
    sessions: VerisightSessions,
    console_reporter: ConsoleReporter,
}

impl Verisight {
    pub(crate) fn new(
        scanner: VerisightScanner,
        history: VerisightHistory,
        cleaner: VerisightCleaner,
        sessions: VerisightSessions,
        console_reporter: ConsoleReporter,
    ) -> Self {
        Self {
            scanner,
            history,
            cleaner,
            sessions,
            console_reporter,
        }
    }

    pub async fn execute(self, task: VerisightTask) -> anyhow::Result<()> {
        match task {
            ScanMedia(media) => {
                let identity = self.sessions.current_identity()?;
                self.console_reporter.report_scan_started(&media);
                let scan = self.scanner.scan(&media, &identity).await?;
                self.console_reporter.report_scan_outcome(&scan);
            },
            ScanBatch(batch_file) => {
                let contents = std::fs::read_to_string(&batch_file)
                    .with_context(|| format!("verisight.batch : cannot read {:?}", batch_file))?;
                let entries = parse_batch_entries(&contents)?;
                let identity = self.sessions.current_identity()?;
                self.console_reporter.report_batch_started(entries.len());
                let results = VerisightBatch::new(self.scanner, identity).scan_all(entries).await?;
                self.console_reporter.report_batch_outcomes(&results);
            },
            ListHistory(page) => {
                let identity = self.sessions.current_identity()?;
                let scans = self.history.list(&identity, page)?;
                self.console_reporter.report_history(&identity, &scans);
            },
            ShowScan(scan_id) => {
                let identity = self.sessions.current_identity()?;
                let record = self.history.find(&identity, &scan_id)?;
                self.console_reporter.report_scan_details(&record);
            },
            ShowProfile => {
                let identity = self.sessions.current_identity()?;
                let profile = self.history.profile(&identity)?;
                self.console_reporter.report_profile(&profile);
            },
            Cleanup(scope) => {
                let purged_entries = match scope {
                    CleanupScope::Everything => {
                        self.cleaner.cleanup_everything();
                        0
                    },
                    CleanupScope::ProviderScores => {
                        self.cleaner.cleanup_provider_scores();
                        0
                    },
                    CleanupScope::ExpiredScores => self.cleaner.purge_expired_scores()?,
                };
                self.console_reporter.report_cleaning_finished(scope, purged_entries);
            },
        }

        Ok(())
    }
}
