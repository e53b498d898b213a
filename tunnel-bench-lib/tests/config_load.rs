use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tunnel_bench_lib::config::{load_from_path, validate_config, Config, Readiness};
use tunnel_bench_lib::{BenchError, FamilyMode, RankOrder};

type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn write_config(content: &str) -> TestResult<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{content}")?;
    Ok(file)
}

#[test]
fn empty_file_yields_defaults() -> TestResult<()> {
    let file = write_config("")?;
    let cfg = load_from_path(file.path())?;

    assert_eq!(cfg.scan.family, FamilyMode::Ipv4);
    assert_eq!(cfg.scan.base_port, 1080);
    assert_eq!(cfg.scan.top_k, 10);
    assert_eq!(cfg.scan.rank_order, RankOrder::Latency);
    assert!(cfg.scan.batch_size.is_none());
    assert_eq!(cfg.quality.samples, 100);
    assert_eq!(cfg.quality.max_concurrency, 5);
    assert_eq!(cfg.quality.timeout_ms, 5000);
    assert_eq!(cfg.quality.thresholds.moderate_latency_ms, 100);
    assert_eq!(cfg.quality.thresholds.poor_latency_ms, 200);
    assert_eq!(cfg.probe.timeout_ms, 2000);
    assert_eq!(cfg.probe.target_url, "http://www.gstatic.com/generate_204");
    assert_eq!(cfg.engine.args, vec!["-c", "{config}"]);
    assert_eq!(cfg.engine.readiness, Readiness::ConnectProbe);
    assert_eq!(cfg.output.path, PathBuf::from("result.csv"));
    assert!(cfg.noise.is_none());
    assert!(cfg.peer.is_none());
    assert!(cfg.registration.is_none());
    Ok(())
}

#[test]
fn loads_full_config() -> TestResult<()> {
    let file = write_config(
        r#"
[scan]
family = "both"
base_port = 20000
batch_size = 50
rank_order = "loss_weighted"
top_k = 3

[quality]
samples = 20
timeout_ms = 1500

[quality.thresholds]
moderate_latency_ms = 80
poor_latency_ms = 160

[probe]
endpoint_stagger_ms = 2
attempt_stagger_ms = 50

[engine]
binary = "/usr/local/bin/xray"
args = ["run", "-c", "{config}"]
readiness = "fixed_delay"
settle_ms = 1500

[noise]
type = "base64"
packet = "SGVsbG8="
delay = "10-20"
count = 2

[peer]
private_key = "priv"
peer_public_key = "pub"
addresses = ["172.16.0.2/32"]
reserved = [1, 2, 3]

[output]
path = "out/results.csv"

[logging]
level = "debug"
show_target = true
"#,
    )?;

    let cfg = load_from_path(file.path())?;
    assert_eq!(cfg.scan.family, FamilyMode::Both);
    assert_eq!(cfg.scan.base_port, 20000);
    assert_eq!(cfg.scan.batch_size, Some(50));
    assert_eq!(cfg.scan.rank_order, RankOrder::LossWeighted);
    assert_eq!(cfg.quality.samples, 20);
    assert_eq!(cfg.quality.thresholds.moderate_latency_ms, 80);
    // Unset thresholds keep their defaults.
    assert_eq!(cfg.quality.thresholds.poor_loss_percent, 10.0);
    assert_eq!(cfg.engine.readiness, Readiness::FixedDelay);
    assert_eq!(cfg.engine.args, vec!["run", "-c", "{config}"]);

    let noise = cfg.noise.ok_or("noise missing")?;
    assert_eq!(noise.kind, "base64");
    assert_eq!(noise.count, 2);

    let peer = cfg.peer.ok_or("peer missing")?;
    assert_eq!(peer.reserved, vec![1, 2, 3]);
    assert_eq!(peer.mtu, 1280);
    assert_eq!(peer.keep_alive_secs, 5);

    assert_eq!(cfg.output.path, PathBuf::from("out/results.csv"));
    assert!(cfg.logging.show_target);
    Ok(())
}

#[test]
fn rejects_unknown_family() -> TestResult<()> {
    let file = write_config("[scan]\nfamily = \"ipv5\"\n")?;
    assert!(matches!(load_from_path(file.path()), Err(BenchError::Config(_))));
    Ok(())
}

#[test]
fn missing_file_is_config_error() {
    let result = load_from_path("/nonexistent/tunnel-bench/config.toml");
    assert!(matches!(result, Err(BenchError::Config(_))));
}

#[test]
fn validation_rejects_inconsistent_values() {
    let mut cfg = Config::default();
    cfg.scan.base_port = 2000;
    cfg.scan.max_port = 1999;
    assert!(validate_config(&cfg).is_err());

    let mut cfg = Config::default();
    cfg.scan.batch_size = Some(0);
    assert!(validate_config(&cfg).is_err());

    let mut cfg = Config::default();
    cfg.quality.thresholds.moderate_loss_percent = 20.0;
    assert!(validate_config(&cfg).is_err());

    let mut cfg = Config::default();
    cfg.engine.args = vec!["-c".to_string(), "config.json".to_string()];
    assert!(validate_config(&cfg).is_err());

    let mut cfg = Config::default();
    cfg.quality.samples = 0;
    assert!(validate_config(&cfg).is_err());

    assert!(validate_config(&Config::default()).is_ok());
}

#[test]
fn registration_keys_are_optional() -> TestResult<()> {
    let file = write_config("[registration]\nurl = \"http://127.0.0.1:9/reg\"\n")?;
    let registration = load_from_path(file.path())?.registration.ok_or("registration missing")?;
    assert!(registration.private_key.is_empty());
    assert!(registration.public_key.is_empty());
    assert_eq!(registration.timeout_ms, 5000);
    Ok(())
}
