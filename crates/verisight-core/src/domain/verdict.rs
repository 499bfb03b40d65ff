// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::ScanError;
use crate::domain::models::Verdict;

pub static DEFAULT_VERDICT_HI: f64 = 0.8;
pub static DEFAULT_VERDICT_LO: f64 = 0.2;

/// Cut points splitting [0, 1] into Real / Inconclusive / Fake.
/// Can only be built through `new`, so `0 <= lo < hi <= 1` always holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerdictThresholds {
    hi: f64,
    lo: f64,
}

impl VerdictThresholds {
    pub fn new(hi: f64, lo: f64) -> Result<Self, ScanError> {
        let in_range = |value: f64| value.is_finite() && (0.0..=1.0).contains(&value);

        if !in_range(hi) || !in_range(lo) || lo >= hi {
            return Err(ScanError::InvalidThresholdConfiguration { hi, lo });
        }

        Ok(Self { hi, lo })
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            hi: DEFAULT_VERDICT_HI,
            lo: DEFAULT_VERDICT_LO,
        }
    }
}

fn single_signal_verdict(score: f64, hi: f64, lo: f64) -> Verdict {
    if score >= hi {
        return Verdict::Fake;
    }

    if score <= lo {
        return Verdict::Real;
    }

    Verdict::Inconclusive
}

/// Decides a verdict out of two independent scores.
///
/// When both are present they must agree to produce a decisive verdict; a lonely score
/// is judged on its own with the same cut points. Total over its inputs: two absent
/// scores yield `Inconclusive`.
pub fn verdict(internal: Option<f64>, external: Option<f64>, hi: f64, lo: f64) -> Verdict {
    match (internal, external) {
        (Some(ours), Some(theirs)) => {
            if ours >= hi && theirs >= hi {
                Verdict::Fake
            } else if ours <= lo && theirs <= lo {
                Verdict::Real
            } else {
                Verdict::Inconclusive
            }
        },
        (Some(single), None) | (None, Some(single)) => single_signal_verdict(single, hi, lo),
        (None, None) => Verdict::Inconclusive,
    }
}

pub fn decide(internal: Option<f64>, external: Option<f64>, thresholds: &VerdictThresholds) -> Verdict {
    verdict(internal, external, thresholds.hi, thresholds.lo)
}
