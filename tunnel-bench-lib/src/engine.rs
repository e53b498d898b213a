//! End-to-end benchmark run: provision, assess network quality, measure
//! every endpoint through the tunnel engine, rank and persist.

use tracing::{error, info, warn};

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::provision::{EgressParams, Provisioner};
use crate::quality::{QualityProber, RetryPlan};
use crate::ranking::{rank, write_results, EndpointMeasurement, Ranking};
use crate::scheduler::ProbeScheduler;
use crate::tunnel::{build_batch_config, BuildOptions, TunnelSupervisor};

/// Everything a finished run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchReport {
    pub ranking: Ranking,
    /// Number of endpoints submitted
    pub total: usize,
    pub unreachable: Vec<Endpoint>,
    pub plan: RetryPlan,
    /// Batches (1-based) whose engine exited before measurement finished;
    /// their unreachable endpoints may be healthy
    pub interrupted_batches: Vec<usize>,
}

impl BenchReport {
    pub fn unreachable_count(&self) -> usize {
        self.unreachable.len()
    }
}

#[derive(Debug)]
pub struct Benchmark {
    config: Config,
}

impl Benchmark {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Probe each scanned family directly and map it to a retry tier
    pub async fn assess_quality(&self) -> RetryPlan {
        let prober = QualityProber::new(self.config.quality.clone());
        let mut plan = RetryPlan::default();
        for &family in self.config.scan.family.families() {
            let tier = prober.probe_tier(family).await;
            info!(%family, %tier, retries = tier.retries(), "retry tier selected");
            plan.set(family, tier);
        }
        plan
    }

    /// Full run. An empty endpoint list returns an empty report without
    /// provisioning or starting the engine.
    pub async fn run<P: Provisioner>(
        &self,
        endpoints: &[Endpoint],
        provisioner: &P,
    ) -> Result<BenchReport> {
        if endpoints.is_empty() {
            warn!("no endpoints to measure");
            return Ok(BenchReport {
                ranking: rank(Vec::new(), self.config.scan.top_k, self.config.scan.rank_order),
                ..BenchReport::default()
            });
        }

        let params = provisioner.provision().await?;
        info!(addresses = ?params.addresses, "tunnel parameters provisioned");

        let plan = self.assess_quality().await;
        self.measure(endpoints, &params, plan).await
    }

    /// Measure `endpoints` with a known retry plan, one engine instance per
    /// batch. The engine is stopped after each batch whether or not its
    /// measurements succeeded.
    pub async fn measure(
        &self,
        endpoints: &[Endpoint],
        params: &EgressParams,
        plan: RetryPlan,
    ) -> Result<BenchReport> {
        let total = endpoints.len();
        let batch_size = self.config.scan.batch_size.unwrap_or(total).max(1);
        let options = BuildOptions::from_config(&self.config);
        let supervisor = TunnelSupervisor::new(self.config.engine.clone());
        let scheduler = ProbeScheduler::new(self.config.probe.clone());

        let mut measurements: Vec<EndpointMeasurement> = Vec::with_capacity(total);
        let mut unreachable = Vec::new();
        let mut interrupted_batches = Vec::new();

        for (batch, chunk) in endpoints.chunks(batch_size).enumerate() {
            let offset = batch.saturating_mul(batch_size);
            let number = batch.saturating_add(1);
            let tunnel = build_batch_config(chunk, offset, total, params, &options)?;
            info!(
                batch = number,
                endpoints = chunk.len(),
                first_port = options.ports.base(),
                "measuring batch"
            );

            let mut process = supervisor.start(&tunnel).await?;
            let outcome = scheduler.measure(&tunnel.slots, plan).await;
            if let Some(status) = process.exit_status() {
                error!(
                    batch = number,
                    %status,
                    unreachable = outcome.unreachable.len(),
                    "tunnel engine exited during measurement, unreachable count is unreliable"
                );
                interrupted_batches.push(number);
            }
            if let Err(err) = process.stop().await {
                error!(%err, "failed to stop tunnel engine");
            }

            measurements.extend(outcome.measurements);
            unreachable.extend(outcome.unreachable);
        }

        let ranking = rank(measurements, self.config.scan.top_k, self.config.scan.rank_order);
        let output = &self.config.output.path;
        match write_results(output, ranking.all()).await {
            Ok(()) => info!(path = %output.display(), rows = ranking.len(), "results written"),
            Err(err) => error!(path = %output.display(), %err, "failed to write results"),
        }
        info!("{} of {} endpoints unreachable", unreachable.len(), total);

        Ok(BenchReport { ranking, total, unreachable, plan, interrupted_batches })
    }
}
