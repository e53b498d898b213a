//! Pre-flight network quality probe and retry-budget tiers.
//!
//! The prober measures the direct path to a well-known target before any
//! tunnel is started. Its report is reduced to a [`QualityTier`], and the
//! tiers for every scanned family form the [`RetryPlan`] handed to the
//! probe scheduler.

mod prober;
mod resolver;

pub use prober::QualityProber;
pub use resolver::FamilyResolver;

use std::fmt;

use crate::config::QualityThresholds;
use crate::endpoint::AddressFamily;

/// Retry budget chosen from ambient network quality.
///
/// Ordered from best to worst network; a worse tier never has fewer retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum QualityTier {
    #[default]
    Good,
    Moderate,
    Poor,
}

impl QualityTier {
    pub const ALL: [QualityTier; 3] = [QualityTier::Good, QualityTier::Moderate, QualityTier::Poor];

    /// Probe attempts issued per endpoint under this tier
    pub const fn retries(self) -> u32 {
        match self {
            QualityTier::Good => 3,
            QualityTier::Moderate => 5,
            QualityTier::Poor => 7,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::Good => f.write_str("good"),
            QualityTier::Moderate => f.write_str("moderate"),
            QualityTier::Poor => f.write_str("poor"),
        }
    }
}

/// Per-family retry tiers, fixed before scheduling starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPlan {
    pub ipv4: QualityTier,
    pub ipv6: QualityTier,
}

impl RetryPlan {
    pub fn uniform(tier: QualityTier) -> Self {
        Self { ipv4: tier, ipv6: tier }
    }

    pub fn tier_for(&self, family: AddressFamily) -> QualityTier {
        match family {
            AddressFamily::Ipv4 => self.ipv4,
            AddressFamily::Ipv6 => self.ipv6,
        }
    }

    pub fn set(&mut self, family: AddressFamily, tier: QualityTier) {
        match family {
            AddressFamily::Ipv4 => self.ipv4 = tier,
            AddressFamily::Ipv6 => self.ipv6 = tier,
        }
    }

    pub fn retries_for(&self, family: AddressFamily) -> u32 {
        self.tier_for(family).retries()
    }
}

/// Outcome of one quality probe burst
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub family: AddressFamily,
    pub samples: u32,
    /// Latencies of successful samples, ascending
    latencies_ms: Vec<u64>,
}

impl QualityReport {
    /// Build a report from raw sample outcomes (`None` = failed sample)
    pub fn from_samples<I>(family: AddressFamily, samples: I) -> Self
    where
        I: IntoIterator<Item = Option<u64>>,
    {
        let mut total: u32 = 0;
        let mut latencies_ms = Vec::new();
        for sample in samples {
            total = total.saturating_add(1);
            if let Some(ms) = sample {
                latencies_ms.push(ms);
            }
        }
        latencies_ms.sort_unstable();
        Self { family, samples: total, latencies_ms }
    }

    pub fn successes(&self) -> usize {
        self.latencies_ms.len()
    }

    pub fn loss_percent(&self) -> f64 {
        if self.samples == 0 {
            return 100.0;
        }
        let failed = (self.samples as usize).saturating_sub(self.successes());
        failed as f64 / f64::from(self.samples) * 100.0
    }

    pub fn median_latency_ms(&self) -> Option<u64> {
        self.latencies_ms.get(self.latencies_ms.len() / 2).copied()
    }

    /// Mean absolute difference between consecutive latencies in sorted order.
    ///
    /// This estimates spread rather than sequential variance. Needs two
    /// successful samples.
    pub fn jitter_ms(&self) -> Option<f64> {
        if self.latencies_ms.len() < 2 {
            return None;
        }
        let total: u64 = self.latencies_ms.windows(2).map(|w| w[1].abs_diff(w[0])).sum();
        Some(total as f64 / (self.latencies_ms.len() - 1) as f64)
    }

    /// Worst band triggered by any single metric; the default tier when
    /// nothing succeeded.
    pub fn tier(&self, thresholds: &QualityThresholds) -> QualityTier {
        let Some(median) = self.median_latency_ms() else {
            return QualityTier::default();
        };
        let loss = self.loss_percent();
        let jitter = self.jitter_ms();

        let poor = median >= thresholds.poor_latency_ms
            || loss >= thresholds.poor_loss_percent
            || jitter.is_some_and(|j| j >= thresholds.poor_jitter_ms);
        if poor {
            return QualityTier::Poor;
        }

        let moderate = median >= thresholds.moderate_latency_ms
            || loss >= thresholds.moderate_loss_percent
            || jitter.is_some_and(|j| j >= thresholds.moderate_jitter_ms);
        if moderate {
            return QualityTier::Moderate;
        }

        QualityTier::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_uses_sorted_order() {
        let report = QualityReport::from_samples(
            AddressFamily::Ipv4,
            vec![Some(30), Some(10), Some(20), None],
        );
        assert_eq!(report.successes(), 3);
        assert_eq!(report.median_latency_ms(), Some(20));
        assert_eq!(report.jitter_ms(), Some(10.0));
        assert!((report.loss_percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_success_has_no_jitter() {
        let report = QualityReport::from_samples(AddressFamily::Ipv6, vec![Some(40), None]);
        assert_eq!(report.jitter_ms(), None);
        assert_eq!(report.tier(&QualityThresholds::default()), QualityTier::Poor);
    }
}
