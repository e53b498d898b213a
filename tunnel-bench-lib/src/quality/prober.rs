use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use super::{FamilyResolver, QualityReport, QualityTier};
use crate::config::QualityConfig;
use crate::endpoint::AddressFamily;
use crate::error::Result;

/// Direct (untunneled) network quality probe
#[derive(Debug, Clone)]
pub struct QualityProber {
    config: QualityConfig,
}

impl QualityProber {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    fn build_client(&self, family: AddressFamily) -> Result<Client> {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .dns_resolver(Arc::new(FamilyResolver::new(family)))
            .build()?;
        Ok(client)
    }

    /// Run the probe burst for one address family.
    ///
    /// At most `max_concurrency` requests are in flight. A sample succeeds
    /// only on 204 No Content within the timeout.
    pub async fn probe(&self, family: AddressFamily) -> Result<QualityReport> {
        let client = self.build_client(family)?;
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();

        info!(%family, samples = self.config.samples, "measuring network quality");
        for _ in 0..self.config.samples {
            let client = client.clone();
            let limiter = Arc::clone(&limiter);
            let url = self.config.target_url.clone();
            tasks.spawn(async move {
                let Ok(_permit) = limiter.acquire_owned().await else {
                    return None;
                };
                sample(&client, &url).await
            });
        }

        let mut samples = Vec::with_capacity(self.config.samples as usize);
        while let Some(joined) = tasks.join_next().await {
            samples.push(joined.unwrap_or(None));
        }

        Ok(QualityReport::from_samples(family, samples))
    }

    /// Probe one family and reduce the result to a tier.
    ///
    /// Never fails: a client error or a burst without any successful sample
    /// falls back to the default tier with a warning.
    pub async fn probe_tier(&self, family: AddressFamily) -> QualityTier {
        let report = match self.probe(family).await {
            Ok(report) => report,
            Err(err) => {
                warn!(%family, %err, "network quality probe failed, falling back to default tier");
                return QualityTier::default();
            }
        };

        if report.successes() == 0 {
            warn!(
                %family,
                samples = report.samples,
                "network quality probe found zero reachable samples, falling back to default tier"
            );
            return QualityTier::default();
        }

        let tier = report.tier(&self.config.thresholds);
        info!(
            %family,
            median_ms = report.median_latency_ms(),
            jitter_ms = report.jitter_ms(),
            loss_percent = report.loss_percent(),
            %tier,
            retries = tier.retries(),
            "network quality measured"
        );
        tier
    }
}

async fn sample(client: &Client, url: &str) -> Option<u64> {
    let start = Instant::now();
    match client.head(url).send().await {
        Ok(resp) if resp.status() == StatusCode::NO_CONTENT => {
            let elapsed = start.elapsed().as_millis();
            trace!(latency_ms = elapsed, "quality sample ok");
            Some(u64::try_from(elapsed).unwrap_or(u64::MAX))
        }
        Ok(resp) => {
            debug!(status = %resp.status(), "quality sample unexpected status");
            None
        }
        Err(err) => {
            debug!(%err, "quality sample failed");
            None
        }
    }
}
