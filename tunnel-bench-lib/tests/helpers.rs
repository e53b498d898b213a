//! Shared fixtures for integration tests: local HTTP responders, port
//! helpers and sample tunnel parameters.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use tunnel_bench_lib::config::{EngineConfig, Readiness};
use tunnel_bench_lib::{EgressParams, Endpoint};

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A port nothing listens on at the time of the call
pub fn pick_free_port() -> TestResult<u16> {
    let listener = StdTcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// Bind a listener whose next port is currently free
pub async fn bind_with_free_successor() -> TestResult<TcpListener> {
    for _ in 0..32 {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        if port < u16::MAX && StdTcpListener::bind(("127.0.0.1", port + 1)).is_ok() {
            return Ok(listener);
        }
    }
    Err("could not find two adjacent ports".into())
}

/// Answer every request on `listener` with `status` and `body`; returns the
/// request counter
pub fn serve(listener: TcpListener, status: StatusCode, body: &'static str) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let svc = service_fn(move |_req: Request<Incoming>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        let body = Full::new(Bytes::from_static(body.as_bytes()));
                        let mut resp = Response::new(body);
                        *resp.status_mut() = status;
                        Ok::<_, Infallible>(resp)
                    }
                });
                let _ = http1::Builder::new().serve_connection(TokioIo::new(stream), svc).await;
            });
        }
    });
    hits
}

/// Local responder standing in for a forward proxy or probe target
pub async fn spawn_status_server(status: StatusCode) -> TestResult<(SocketAddr, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok((addr, serve(listener, status, "")))
}

/// 204 responder that holds every request for `delay`; returns the highest
/// number of requests it ever had in flight at once
pub async fn spawn_slow_server(delay: Duration) -> TestResult<(SocketAddr, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&peak);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            tokio::spawn(async move {
                let svc = service_fn(move |_req: Request<Incoming>| {
                    let in_flight = Arc::clone(&in_flight);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(delay).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        let mut resp = Response::new(Full::new(Bytes::new()));
                        *resp.status_mut() = StatusCode::NO_CONTENT;
                        Ok::<_, Infallible>(resp)
                    }
                });
                let _ = http1::Builder::new().serve_connection(TokioIo::new(stream), svc).await;
            });
        }
    });
    Ok((addr, observed))
}

pub fn sample_params() -> EgressParams {
    EgressParams {
        private_key: "cHJpdmF0ZS1rZXktZm9yLXRlc3RzLW9ubHktMDAwMDA=".to_string(),
        peer_public_key: "bmAUkNjkS3PPL1iRG4bJsUbhMIMpm9ZJAVTGuDrQPD4=".to_string(),
        addresses: vec!["172.16.0.2/32".to_string(), "2606:4700:110:8a36::1/128".to_string()],
        reserved: vec![78, 135, 76],
        mtu: 1280,
        keep_alive_secs: 5,
    }
}

pub fn sample_endpoints(count: usize) -> TestResult<Vec<Endpoint>> {
    let mut endpoints = Vec::with_capacity(count);
    for i in 0..count {
        endpoints.push(format!("162.159.192.{}:2408", i + 1).parse()?);
    }
    Ok(endpoints)
}

/// Engine settings that run `/bin/sh -c <script>` instead of a tunnel
/// engine, writing the document under `dir`
pub fn shell_engine(dir: &Path, script: &str, readiness: Readiness) -> EngineConfig {
    EngineConfig {
        binary: "/bin/sh".into(),
        args: vec!["-c".to_string(), script.to_string(), "{config}".to_string()],
        config_path: dir.join("core").join("config.json"),
        access_log: dir.join("log").join("access.log").display().to_string(),
        error_log: "none".to_string(),
        settle_ms: 50,
        readiness,
        readiness_attempts: 3,
        readiness_interval_ms: 50,
        ..EngineConfig::default()
    }
}
