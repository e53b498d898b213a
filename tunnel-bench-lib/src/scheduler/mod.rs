//! Concurrent per-endpoint measurement through the running tunnel engine.

mod attempt;

pub use attempt::{proxied_client, run_attempt, ProbeAttempt};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::endpoint::Endpoint;
use crate::quality::RetryPlan;
use crate::ranking::{aggregate, EndpointMeasurement};
use crate::tunnel::EndpointSlot;

/// Measurements of one scheduling pass, in slot order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleOutcome {
    pub measurements: Vec<EndpointMeasurement>,
    /// Endpoints where every attempt failed
    pub unreachable: Vec<Endpoint>,
}

struct SlotResult {
    position: usize,
    measurement: Option<EndpointMeasurement>,
}

#[derive(Debug, Clone)]
pub struct ProbeScheduler {
    config: Arc<ProbeConfig>,
}

impl ProbeScheduler {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    /// Measure every slot concurrently.
    ///
    /// Each endpoint task waits `index * endpoint_stagger_ms`, then fans out
    /// the retry count its family's tier allows, attempt `t` delayed by
    /// `t * attempt_stagger_ms`. Must only be called while the engine that
    /// serves these slots is running. Dropping the returned future aborts
    /// every endpoint task still in flight.
    pub async fn measure(&self, slots: &[EndpointSlot], plan: RetryPlan) -> ScheduleOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel::<SlotResult>();
        let mut tasks = JoinSet::new();

        for (position, slot) in slots.iter().enumerate() {
            let tx = tx.clone();
            let config = Arc::clone(&self.config);
            let slot = slot.clone();
            let retries = plan.retries_for(slot.family);
            tasks.spawn(async move {
                sleep(stagger(config.endpoint_stagger_ms, slot.index)).await;
                let attempts = measure_slot(&config, &slot, retries).await;
                let measurement = aggregate(&slot.endpoint, &attempts);
                match &measurement {
                    Some(m) => info!(
                        index = slot.index.saturating_add(1),
                        endpoint = %slot.endpoint,
                        loss_percent = format!("{:.1}", m.loss_rate_percent),
                        avg_latency_ms = m.avg_latency_ms,
                        "endpoint measured"
                    ),
                    None => debug!(
                        index = slot.index.saturating_add(1),
                        endpoint = %slot.endpoint,
                        retries,
                        "endpoint unreachable"
                    ),
                }
                // The receiver outlives every sender.
                let _ = tx.send(SlotResult { position, measurement });
            });
        }
        drop(tx);

        let mut reported: Vec<Option<Option<EndpointMeasurement>>> = vec![None; slots.len()];
        while let Some(result) = rx.recv().await {
            if let Some(entry) = reported.get_mut(result.position) {
                *entry = Some(result.measurement);
            }
        }
        while tasks.join_next().await.is_some() {}

        let mut outcome = ScheduleOutcome::default();
        for (slot, entry) in slots.iter().zip(reported) {
            match entry.flatten() {
                Some(measurement) => outcome.measurements.push(measurement),
                None => outcome.unreachable.push(slot.endpoint.clone()),
            }
        }
        outcome
    }
}

async fn measure_slot(
    config: &ProbeConfig,
    slot: &EndpointSlot,
    retries: u32,
) -> Vec<ProbeAttempt> {
    let timeout = Duration::from_millis(config.timeout_ms);
    let client = match proxied_client(&config.proxy_host, slot.port, timeout) {
        Ok(client) => client,
        Err(err) => {
            debug!(endpoint = %slot.endpoint, %err, "could not build probe client");
            return vec![ProbeAttempt::failed(); retries as usize];
        }
    };

    let mut attempts = JoinSet::new();
    for t in 0..retries {
        let client = client.clone();
        let url = config.target_url.clone();
        let delay = stagger(config.attempt_stagger_ms, t as usize);
        attempts.spawn(async move {
            sleep(delay).await;
            run_attempt(&client, &url).await
        });
    }

    let mut out = Vec::with_capacity(retries as usize);
    while let Some(joined) = attempts.join_next().await {
        out.push(joined.unwrap_or_else(|_| ProbeAttempt::failed()));
    }
    out
}

fn stagger(step_ms: u64, index: usize) -> Duration {
    let index = u64::try_from(index).unwrap_or(u64::MAX);
    Duration::from_millis(step_ms.saturating_mul(index))
}
