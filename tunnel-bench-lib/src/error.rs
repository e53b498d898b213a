use thiserror::Error;

/// Errors that can occur during a benchmark run
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not provision tunnel parameters: {0}")]
    Provisioning(String),

    #[error("Missing provisioning parameter: {0}")]
    MissingProvisioning(&'static str),

    #[error("Port range exhausted: {requested} endpoints requested, {available} ports available")]
    PortRangeExhausted { requested: usize, available: usize },

    #[error("Could not start tunnel engine: {0}")]
    EngineStart(String),

    #[error("Tunnel engine exited during startup: {0}")]
    EngineExited(String),

    #[error("Tunnel engine not accepting connections on port {port} after {attempts} attempts")]
    EngineNotReady { port: u16, attempts: u32 },

    #[error("Could not stop tunnel engine: {0}")]
    Stop(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Malformed result file at line {line}: {reason}")]
    ResultFormat { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, BenchError>;
