// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{
    BatchOutcome, BatchResults, Identity, MediaKind, MediaRef, StatisticsForBatch, VerdictStatistics,
};
use crate::verisight::scanner::VerisightScanner;
use anyhow::{Context, anyhow, bail};
use clap::ValueEnum;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::time::Duration;

static MILLIS_OF_SLACK_PER_BATCH: u64 = 1000;

/// Milliseconds to wait for a whole batch, saturating instead of wrapping around
fn aggregation_timeout(budget_per_scan: Duration, total_entries: usize) -> u64 {
    let budget_millis = u64::try_from(budget_per_scan.as_millis()).unwrap_or(u64::MAX);
    let total_entries = u64::try_from(total_entries).unwrap_or(u64::MAX);

    budget_millis
        .saturating_mul(total_entries)
        .saturating_add(MILLIS_OF_SLACK_PER_BATCH)
}

/// Reads `<image|video> <url>` pairs, one per line; blank lines and `#` comments are skipped
pub fn parse_batch_entries(contents: &str) -> anyhow::Result<Vec<MediaRef>> {
    let mut entries = vec![];

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_number = index + 1;
        let mut parts = line.split_whitespace();

        let (Some(raw_kind), Some(raw_url), None) = (parts.next(), parts.next(), parts.next()) else {
            bail!("verisight.batch : expecting '<kind> <url>' at line {}", line_number)
        };

        let kind = MediaKind::from_str(raw_kind, true)
            .map_err(|_| anyhow!("verisight.batch : unknown media kind '{}' at line {}", raw_kind, line_number))?;

        let media =
            MediaRef::parse(raw_url, kind).with_context(|| format!("verisight.batch : invalid URL at line {}", line_number))?;
        entries.push(media);
    }

    Ok(entries)
}

pub(crate) enum BatchMessage {
    ScanMedia(MediaRef),
    AggregateResults(RpcReplyPort<BatchResults>),
}

pub(crate) struct VerisightBatch {
    scanner: VerisightScanner,
    identity: Identity,
}

impl VerisightBatch {
    pub fn new(scanner: VerisightScanner, identity: Identity) -> Self {
        Self { scanner, identity }
    }

    pub async fn scan_all(self, entries: Vec<MediaRef>) -> anyhow::Result<BatchResults> {
        let max_timeout = aggregation_timeout(self.scanner.time_budget(), entries.len());
        let (actor, _) = Actor::spawn(None, self, ()).await?;

        for media in entries {
            actor.cast(BatchMessage::ScanMedia(media))?
        }

        let results = ractor::call_t!(actor, BatchMessage::AggregateResults, max_timeout)?;
        actor.stop(None);
        Ok(results)
    }
}

impl Actor for VerisightBatch {
    type Msg = BatchMessage;
    type State = Vec<BatchOutcome>;
    type Arguments = ();

    async fn pre_start(&self, _: ActorRef<Self::Msg>, _: Self::Arguments) -> Result<Self::State, ActorProcessingErr> {
        Ok(vec![])
    }

    async fn handle(
        &self,
        _: ActorRef<Self::Msg>,
        message: Self::Msg,
        outcomes: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            BatchMessage::ScanMedia(media) => {
                log::info!("[verisight.actor] starting scan for {}", &media);

                let maybe_scanned = match self.scanner.scan(&media, &self.identity).await {
                    Ok(scan) => Some(scan.record),
                    Err(incoming) => {
                        log::warn!("[verisight.actor] cannot scan {} | reason = {}", &media, incoming);
                        None
                    },
                };

                log::info!("[verisight.actor] finished scan for {}", &media);
                outcomes.push((media, maybe_scanned));
            },
            BatchMessage::AggregateResults(reply) => {
                log::info!("[verisight.actor] computing aggregated results for scanned media");

                let mut verdicts = VerdictStatistics::default();
                let mut failed = 0;

                for (_, maybe_scanned) in outcomes.iter() {
                    match maybe_scanned {
                        Some(record) => verdicts.account(record.verdict),
                        None => failed += 1,
                    }
                }

                let results = BatchResults {
                    statistics: StatisticsForBatch { verdicts, failed },
                    outcomes: outcomes.clone(),
                };

                if reply.send(results).is_err() {
                    log::error!("[verisight.actor] cannot reply with state");
                }
            },
        }

        Ok(())
    }
}
