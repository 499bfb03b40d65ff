// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::detectors::external::ExternalDetector;
use crate::domain::detectors::internal::InternalDetector;
use crate::domain::errors::ScanError;
use crate::domain::interfaces::{MediaScoring, ScanOrchestration};
use crate::domain::models::{MediaRef, ScanOutcome};
use crate::domain::verdict::{VerdictThresholds, decide};

pub struct ScanOrchestrator {
    internal: InternalDetector,
    external: ExternalDetector,
    thresholds: VerdictThresholds,
}

impl ScanOrchestrator {
    pub fn new(internal: InternalDetector, external: ExternalDetector, thresholds: VerdictThresholds) -> Self {
        Self {
            internal,
            external,
            thresholds,
        }
    }
}

impl ScanOrchestration for ScanOrchestrator {
    async fn scan(&self, media: &MediaRef) -> Result<ScanOutcome, ScanError> {
        // Both detectors always settle, each one bounded by its own timeout
        let (internal, external) = tokio::join!(self.internal.detect(media), self.external.detect(media));

        log::info!(
            "[verisight.orchestrator] {} | internal = {} | external = {}",
            media,
            internal.source_label(),
            external.source_label()
        );

        if internal.value.is_none() && external.value.is_none() {
            log::warn!("[verisight.orchestrator] no detector could score {}", media);
            return Err(ScanError::BothDetectorsFailed);
        }

        // A neutral score left alone must not drive the verdict
        let external_signal = match (internal.value, external.is_neutral()) {
            (None, true) => None,
            _ => external.value,
        };

        let verdict = decide(internal.value, external_signal, &self.thresholds);
        log::info!("[verisight.orchestrator] {} judged as {}", media, verdict);

        Ok(ScanOutcome {
            internal,
            external,
            verdict,
        })
    }
}
