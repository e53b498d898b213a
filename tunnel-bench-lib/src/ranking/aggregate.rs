use super::EndpointMeasurement;
use crate::endpoint::Endpoint;
use crate::scheduler::ProbeAttempt;

/// Fold one endpoint's attempts into a measurement.
///
/// Returns `None` when no attempt succeeded, so an unreachable endpoint never
/// carries a loss rate of 100 into the ranking. The average is the integer
/// mean over successful attempts only.
pub fn aggregate(endpoint: &Endpoint, attempts: &[ProbeAttempt]) -> Option<EndpointMeasurement> {
    let latencies: Vec<u64> = attempts.iter().filter_map(ProbeAttempt::latency_ms).collect();
    if latencies.is_empty() {
        return None;
    }

    let successes = latencies.len() as u64;
    let total = attempts.len() as u64;
    let sum = latencies.iter().fold(0u64, |acc, l| acc.saturating_add(*l));
    let loss_rate_percent = (total - successes) as f64 / total as f64 * 100.0;

    Some(EndpointMeasurement {
        endpoint: endpoint.clone(),
        loss_rate_percent,
        avg_latency_ms: sum / successes,
    })
}
