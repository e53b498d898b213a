use std::fmt::Write as _;
use std::path::Path;

use super::EndpointMeasurement;
use crate::endpoint::Endpoint;
use crate::error::{BenchError, Result};

pub const RESULT_HEADER: &str = "Endpoint,Loss rate,Avg. Latency";

/// One row of a persisted result file
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedResult {
    pub endpoint: Endpoint,
    pub loss_rate_percent: f64,
    pub avg_latency_ms: u64,
}

/// Render measurements as CSV: the header line, then one row per measurement
/// with the loss rate at two decimals.
pub fn format_results(rows: &[EndpointMeasurement]) -> String {
    let mut out = String::with_capacity(rows.len().saturating_mul(40).saturating_add(32));
    out.push_str(RESULT_HEADER);
    out.push('\n');
    for row in rows {
        let _ = writeln!(
            out,
            "{},{:.2},{}",
            row.endpoint, row.loss_rate_percent, row.avg_latency_ms
        );
    }
    out
}

/// Write measurements to `path`, replacing any previous file
pub async fn write_results<P: AsRef<Path>>(path: P, rows: &[EndpointMeasurement]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, format_results(rows)).await?;
    Ok(())
}

pub async fn read_results<P: AsRef<Path>>(path: P) -> Result<Vec<PersistedResult>> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_results(&content)
}

pub fn parse_results(content: &str) -> Result<Vec<PersistedResult>> {
    let mut lines = content.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header.trim() == RESULT_HEADER => {}
        _ => {
            return Err(BenchError::ResultFormat {
                line: 1,
                reason: format!("expected header \"{RESULT_HEADER}\""),
            })
        }
    }

    let mut results = Vec::new();
    for (idx, line) in lines {
        let line_no = idx.saturating_add(1);
        if line.trim().is_empty() {
            continue;
        }
        results.push(parse_row(line).map_err(|reason| BenchError::ResultFormat {
            line: line_no,
            reason,
        })?);
    }
    Ok(results)
}

fn parse_row(line: &str) -> std::result::Result<PersistedResult, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [endpoint, loss, latency] = fields.as_slice() else {
        return Err(format!("expected 3 fields, found {}", fields.len()));
    };
    let endpoint: Endpoint = endpoint.parse().map_err(|e| format!("{e}"))?;
    let loss_rate_percent: f64 = loss
        .parse()
        .map_err(|_| format!("invalid loss rate \"{loss}\""))?;
    if !(0.0..=100.0).contains(&loss_rate_percent) {
        return Err(format!("loss rate {loss_rate_percent} out of range"));
    }
    let avg_latency_ms: u64 = latency
        .parse()
        .map_err(|_| format!("invalid latency \"{latency}\""))?;
    Ok(PersistedResult { endpoint, loss_rate_percent, avg_latency_ms })
}
