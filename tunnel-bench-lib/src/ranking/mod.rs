//! Aggregation of probe attempts, ordering of measured endpoints and the
//! CSV result file.

mod aggregate;
mod persist;

pub use aggregate::aggregate;
pub use persist::{
    format_results, parse_results, read_results, write_results, PersistedResult, RESULT_HEADER,
};

use serde::Deserialize;
use std::cmp::Ordering;

use crate::endpoint::Endpoint;

/// Loss rate and mean latency of one reachable endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMeasurement {
    pub endpoint: Endpoint,
    /// In `[0, 100)`; an endpoint with no successes is never measured
    pub loss_rate_percent: f64,
    pub avg_latency_ms: u64,
}

impl EndpointMeasurement {
    /// Latency inflated by the loss rate: `avg / (1 - loss/100)`
    pub fn effective_latency_ms(&self) -> f64 {
        let delivered = 1.0 - self.loss_rate_percent / 100.0;
        if delivered <= 0.0 {
            return f64::INFINITY;
        }
        self.avg_latency_ms as f64 / delivered
    }
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    /// Ascending average latency; loss rate is informational
    #[default]
    Latency,
    /// Ascending loss-weighted latency
    LossWeighted,
}

/// Measurements in rank order with the configured head length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    entries: Vec<EndpointMeasurement>,
    top_k: usize,
}

impl Ranking {
    pub fn all(&self) -> &[EndpointMeasurement] {
        &self.entries
    }

    /// The first `min(top_k, len)` entries
    pub fn top(&self) -> &[EndpointMeasurement] {
        &self.entries[..self.top_k.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> Vec<EndpointMeasurement> {
        self.entries
    }
}

/// Order measurements by `order`. The sort is stable: ties keep input order.
pub fn rank(mut measurements: Vec<EndpointMeasurement>, top_k: usize, order: RankOrder) -> Ranking {
    match order {
        RankOrder::Latency => measurements.sort_by_key(|m| m.avg_latency_ms),
        RankOrder::LossWeighted => measurements.sort_by(|a, b| {
            a.effective_latency_ms()
                .partial_cmp(&b.effective_latency_ms())
                .unwrap_or(Ordering::Equal)
        }),
    }
    Ranking { entries: measurements, top_k }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(
        endpoint: &str,
        loss: f64,
        latency: u64,
    ) -> Result<EndpointMeasurement, Box<dyn std::error::Error + Send + Sync>> {
        Ok(EndpointMeasurement {
            endpoint: endpoint.parse()?,
            loss_rate_percent: loss,
            avg_latency_ms: latency,
        })
    }

    #[test]
    fn loss_weighted_prefers_clean_paths() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let lossy = measurement("1.1.1.1:2408", 50.0, 60)?;
        let clean = measurement("1.1.1.2:2408", 0.0, 100)?;

        let by_latency = rank(vec![lossy.clone(), clean.clone()], 10, RankOrder::Latency);
        assert_eq!(by_latency.all()[0], lossy);

        let weighted = rank(vec![lossy.clone(), clean.clone()], 10, RankOrder::LossWeighted);
        assert_eq!(weighted.all()[0], clean);
        Ok(())
    }

    #[test]
    fn top_clamps_to_len() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ranking = rank(vec![measurement("1.1.1.1:2408", 0.0, 10)?], 5, RankOrder::Latency);
        assert_eq!(ranking.top().len(), 1);
        let empty = rank(Vec::new(), 5, RankOrder::Latency);
        assert!(empty.top().is_empty());
        Ok(())
    }
}
