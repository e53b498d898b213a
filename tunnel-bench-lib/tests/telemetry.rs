use serial_test::serial;
use tunnel_bench_lib::config::LoggingConfig;
use tunnel_bench_lib::telemetry::{build_filter, init_tracing};

fn logging(level: &str) -> LoggingConfig {
    LoggingConfig { level: level.to_string(), show_target: false }
}

#[test]
#[serial]
fn configured_level_applies_without_rust_log() {
    std::env::remove_var("RUST_LOG");
    assert_eq!(build_filter(&logging("warn")).to_string(), "warn");
}

#[test]
#[serial]
fn rust_log_overrides_configured_level() {
    std::env::set_var("RUST_LOG", "tunnel_bench_lib=trace");
    let filter = build_filter(&logging("warn")).to_string();
    std::env::remove_var("RUST_LOG");
    assert_eq!(filter, "tunnel_bench_lib=trace");
}

#[test]
#[serial]
fn global_subscriber_installs_once() {
    std::env::remove_var("RUST_LOG");
    assert!(init_tracing(&logging("info")).is_ok());
    assert!(init_tracing(&logging("info")).is_err());
}
