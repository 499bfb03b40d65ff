// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{
    BatchResults, CleanupScope, CompletedScan, Identity, MediaRef, Page, ScanRecord, ScoreResult, UserProfile, Verdict,
};
use comfy_table::Table;
use console::{StyledObject, style};

static ABSENT_SCORE: &str = "absent";

fn render_score(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.3}", value),
        None => ABSENT_SCORE.to_string(),
    }
}

fn render_detector(result: &ScoreResult) -> String {
    format!("{} ({})", render_score(result.value), result.source_label())
}

#[derive(Default)]
pub struct ConsoleReporter {
    use_colors: bool,
}

impl ConsoleReporter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn report_scan_started(&self, media: &MediaRef) {
        println!();
        println!("Scanning {} ...", self.cyan(media));
    }

    pub fn report_scan_outcome(&self, scan: &CompletedScan) {
        println!();
        println!("• scan id : {}", self.cyan(&scan.record.id));
        println!("• internal score : {}", render_detector(&scan.outcome.internal));
        println!("• external score : {}", render_detector(&scan.outcome.external));
        println!("• verdict : {}", self.verdict(scan.outcome.verdict));
        println!();
    }

    pub fn report_batch_started(&self, total: usize) {
        println!();
        println!("Scanning {} media files. This operation may take some time ...", total);
    }

    pub fn report_batch_outcomes(&self, results: &BatchResults) {
        let statistics = &results.statistics;
        println!();
        println!("Statistics : ");
        println!();
        println!("• total media scanned : {}", self.cyan(statistics.verdicts.total + statistics.failed));
        println!("• judged fake : {}", self.cyan(statistics.verdicts.fake));
        println!("• judged real : {}", self.cyan(statistics.verdicts.real));
        println!("• inconclusive : {}", self.cyan(statistics.verdicts.inconclusive));
        println!("• failed : {}", self.cyan(statistics.failed));
        println!();
        println!("Verdicts : ");
        println!();
        results
            .outcomes
            .iter()
            .for_each(|(media, maybe_record)| match maybe_record {
                Some(record) => {
                    println!("• {} : {} (scan {})", media, self.verdict(record.verdict), record.id);
                },
                None => {
                    println!("• {} : {}", media, self.red("failed to scan; please retry later"));
                },
            });

        println!();
    }

    pub fn report_history(&self, identity: &Identity, page: &Page<ScanRecord>) {
        println!();
        println!(
            "Scans for {} (page {}, {} in total) : ",
            self.cyan(identity),
            page.page,
            page.total
        );
        println!();

        if page.items.is_empty() {
            println!("{}", self.cyan("No scans to show"));
            println!();
            return;
        }

        println!("{}", self.records_table(&page.items));
        println!();
    }

    pub fn report_scan_details(&self, record: &ScanRecord) {
        println!();
        println!("• scan id : {}", self.cyan(&record.id));
        println!("• media : {}", record.media);
        println!("• created at : {}", record.created_at.to_rfc3339());
        println!("• internal score : {}", render_score(record.internal_score));

        if let Some(model) = &record.model {
            println!("• model : {} ({} ms)", model.model_version, model.runtime_ms);
        }

        println!("• external score : {}", render_score(record.external_score));

        if let Some(provider) = &record.provider {
            println!("• provider : {} ({} ms)", provider.name, provider.latency_ms);
        }

        println!("• verdict : {}", self.verdict(record.verdict));
        println!();
    }

    pub fn report_profile(&self, profile: &UserProfile) {
        let account = &profile.account;
        let statistics = &profile.statistics;

        println!();
        println!("• user : {}", self.cyan(&account.email));

        if let Some(name) = &account.name {
            println!("• name : {}", name);
        }

        println!("• member since : {}", account.created_at.to_rfc3339());
        println!();
        println!("Statistics : ");
        println!();
        println!("• total scans : {}", self.cyan(statistics.total));
        println!("• judged real : {}", self.cyan(statistics.real));
        println!("• judged fake : {}", self.cyan(statistics.fake));
        println!("• inconclusive : {}", self.cyan(statistics.inconclusive));
        println!();

        if !profile.recent.is_empty() {
            println!("Recent scans : ");
            println!();
            println!("{}", self.records_table(&profile.recent));
            println!();
        }
    }

    pub fn report_cleaning_finished(&self, scope: CleanupScope, purged_entries: usize) {
        let output = match scope {
            CleanupScope::Everything => "All stored data removed with success!".to_string(),
            CleanupScope::ProviderScores => "Cached provider scores removed with success!".to_string(),
            CleanupScope::ExpiredScores => format!("{} expired provider scores removed with success!", purged_entries),
        };

        println!();
        println!("{}", self.cyan(output));
        println!();
    }

    fn records_table(&self, records: &[ScanRecord]) -> Table {
        let mut table = Table::new();
        table.set_header(vec!["Scan id", "Kind", "Media", "Internal", "External", "Verdict", "Created at"]);

        records.iter().for_each(|record| {
            let row = vec![
                record.id.clone(),
                record.media.kind.to_string(),
                record.media.url.to_string(),
                render_score(record.internal_score),
                render_score(record.external_score),
                record.verdict.to_string(),
                record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ];

            table.add_row(row);
        });

        table
    }

    fn verdict(&self, verdict: Verdict) -> StyledObject<Verdict> {
        match verdict {
            Verdict::Fake => self.red(verdict),
            Verdict::Real => self.cyan(verdict),
            Verdict::Inconclusive => self.yellow(verdict),
        }
    }

    fn cyan<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).cyan(),
            false => style(what),
        }
    }

    fn red<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).red(),
            false => style(what),
        }
    }

    fn yellow<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).yellow(),
            false => style(what),
        }
    }
}
