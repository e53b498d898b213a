use std::fs;
use std::path::Path;

use crate::config::engine::{Readiness, CONFIG_PLACEHOLDER};
use crate::config::Config;
use crate::error::{BenchError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| BenchError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| BenchError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.scan.base_port == 0 {
        return Err(BenchError::Config("scan.base_port must be > 0".into()));
    }
    if cfg.scan.base_port > cfg.scan.max_port {
        return Err(BenchError::Config(format!(
            "scan.base_port ({}) exceeds scan.max_port ({})",
            cfg.scan.base_port, cfg.scan.max_port
        )));
    }
    if cfg.scan.batch_size == Some(0) {
        return Err(BenchError::Config("scan.batch_size must be > 0".into()));
    }
    if cfg.scan.top_k == 0 {
        return Err(BenchError::Config("scan.top_k must be > 0".into()));
    }

    if cfg.quality.samples == 0 {
        return Err(BenchError::Config("quality.samples must be > 0".into()));
    }
    if cfg.quality.max_concurrency == 0 {
        return Err(BenchError::Config("quality.max_concurrency must be > 0".into()));
    }
    if cfg.quality.timeout_ms == 0 {
        return Err(BenchError::Config("quality.timeout_ms must be > 0".into()));
    }
    let t = &cfg.quality.thresholds;
    if t.moderate_latency_ms > t.poor_latency_ms
        || t.moderate_loss_percent > t.poor_loss_percent
        || t.moderate_jitter_ms > t.poor_jitter_ms
    {
        return Err(BenchError::Config(
            "quality.thresholds: moderate bands must not exceed poor bands".into(),
        ));
    }

    if cfg.probe.timeout_ms == 0 {
        return Err(BenchError::Config("probe.timeout_ms must be > 0".into()));
    }

    if !cfg.engine.args.iter().any(|a| a.contains(CONFIG_PLACEHOLDER)) {
        return Err(BenchError::Config(format!(
            "engine.args must reference the generated config via {CONFIG_PLACEHOLDER}"
        )));
    }
    if matches!(cfg.engine.readiness, Readiness::ConnectProbe) && cfg.engine.readiness_attempts == 0
    {
        return Err(BenchError::Config("engine.readiness_attempts must be > 0".into()));
    }

    if let Some(noise) = &cfg.noise {
        if noise.count == 0 {
            return Err(BenchError::Config("noise.count must be > 0".into()));
        }
    }

    Ok(())
}
