// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

pub mod external;
pub mod internal;
pub mod orchestrator;

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
#[cfg(test)]
use std::time::Duration;

/// Scripted scorer standing in for remote detectors
#[cfg(test)]
pub struct FakeScorer {
    score: Option<f64>,
    delay: Duration,
    calls: AtomicUsize,
}

#[cfg(test)]
impl FakeScorer {
    pub fn answering(score: f64) -> Self {
        Self {
            score: Some(score),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            score: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn stalling(score: f64, delay: Duration) -> Self {
        Self {
            score: Some(score),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn score(&self) -> anyhow::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.score.ok_or_else(|| anyhow::anyhow!("fake scorer is down"))
    }
}
