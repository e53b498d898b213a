mod engine;
mod loader;
mod peer;
mod probe;
mod quality;
mod scan;
mod telemetry;
mod types;

pub use engine::{EngineConfig, Readiness, CONFIG_PLACEHOLDER};
pub use loader::{load_from_path, validate_config};
pub use peer::{NoiseConfig, PeerConfig, RegistrationConfig};
pub use probe::ProbeConfig;
pub use quality::{QualityConfig, QualityThresholds};
pub use scan::{OutputConfig, ScanConfig};
pub use telemetry::LoggingConfig;
pub use types::Config;
