use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

use super::builder::TunnelPlan;
use crate::config::{EngineConfig, Readiness, CONFIG_PLACEHOLDER};
use crate::error::{BenchError, Result};

/// Starts the external tunnel engine for a plan and hands out the process handle
#[derive(Debug, Clone)]
pub struct TunnelSupervisor {
    config: EngineConfig,
}

impl TunnelSupervisor {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Persist the engine document where the engine will read it
    pub async fn write_config(&self, plan: &TunnelPlan) -> Result<()> {
        create_parent_dir(&self.config.config_path).await?;
        for log in [&self.config.access_log, &self.config.error_log] {
            if !log.is_empty() && log != "none" {
                create_parent_dir(Path::new(log)).await?;
            }
        }
        let json = serde_json::to_vec_pretty(&plan.config)?;
        tokio::fs::write(&self.config.config_path, json).await?;
        debug!(path = %self.config.config_path.display(), "tunnel configuration written");
        Ok(())
    }

    fn command(&self) -> Command {
        let config_path = self.config.config_path.display().to_string();
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(self.config.args.iter().map(|a| a.replace(CONFIG_PLACEHOLDER, &config_path)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// Write the configuration, spawn the engine and wait until it is usable.
    ///
    /// On any failure the child (if spawned) is killed when the handle drops.
    pub async fn start(&self, plan: &TunnelPlan) -> Result<TunnelProcess> {
        self.write_config(plan).await?;

        let child = self.command().spawn().map_err(|e| {
            BenchError::EngineStart(format!("{}: {e}", self.config.binary.display()))
        })?;
        let mut process = TunnelProcess { child };
        info!(pid = process.id(), "tunnel engine started, waiting for it to initialize");

        sleep(Duration::from_millis(self.config.settle_ms)).await;
        process.ensure_running()?;

        if matches!(self.config.readiness, Readiness::ConnectProbe) {
            self.probe_first_ingress(plan, &mut process).await?;
        }

        Ok(process)
    }

    async fn probe_first_ingress(
        &self,
        plan: &TunnelPlan,
        process: &mut TunnelProcess,
    ) -> Result<()> {
        let Some(inbound) = plan.config.inbounds.first() else {
            return Ok(());
        };
        let interval = Duration::from_millis(self.config.readiness_interval_ms);
        let attempts = self.config.readiness_attempts;

        for attempt in 1..=attempts {
            process.ensure_running()?;
            let connect = TcpStream::connect((inbound.listen.as_str(), inbound.port));
            match timeout(interval.max(Duration::from_millis(100)), connect).await {
                Ok(Ok(_)) => {
                    debug!(port = inbound.port, attempt, "tunnel engine accepting connections");
                    return Ok(());
                }
                Ok(Err(err)) => debug!(port = inbound.port, attempt, %err, "ingress not ready"),
                Err(_) => debug!(port = inbound.port, attempt, "ingress connect timed out"),
            }
            if attempt < attempts {
                sleep(interval).await;
            }
        }

        Err(BenchError::EngineNotReady { port: inbound.port, attempts })
    }
}

async fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Handle to a running tunnel engine
#[derive(Debug)]
pub struct TunnelProcess {
    child: Child,
}

impl TunnelProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether the engine is still alive; reaps it if it has exited
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// How the engine terminated, if it already has
    pub fn exit_status(&mut self) -> Option<String> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(describe(status)),
            Ok(None) | Err(_) => None,
        }
    }

    fn ensure_running(&mut self) -> Result<()> {
        match self.child.try_wait()? {
            None => Ok(()),
            Some(status) => Err(BenchError::EngineExited(describe(status))),
        }
    }

    /// Signal the engine to terminate and wait for it.
    ///
    /// An engine that already exited counts as stopped. Failing to deliver
    /// the signal is an error; a failed wait afterwards is only logged since
    /// the process is already going away.
    pub async fn stop(mut self) -> Result<()> {
        let pid = self.id();
        if let Some(status) = self.exit_status() {
            debug!(?pid, %status, "tunnel engine had already exited");
            return Ok(());
        }
        self.child.start_kill().map_err(|e| BenchError::Stop(e.to_string()))?;
        match self.child.wait().await {
            Ok(status) => debug!(?pid, status = %describe(status), "tunnel engine stopped"),
            Err(err) => warn!(?pid, %err, "failed waiting for tunnel engine exit"),
        }
        Ok(())
    }
}

fn describe(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => status.to_string(),
    }
}
