#![forbid(unsafe_code)]

pub mod config;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod provision;
pub mod quality;
pub mod ranking;
pub mod scheduler;
pub mod telemetry;
pub mod tunnel;

pub use config::{load_from_path, Config};
pub use endpoint::{load_endpoints, AddressFamily, CandidateGenerator, Endpoint, FamilyMode};
pub use engine::{BenchReport, Benchmark};
pub use error::{BenchError, Result};
pub use provision::{ConfiguredProvisioner, EgressParams, Provisioner, StaticProvisioner};
pub use quality::{QualityProber, QualityTier, RetryPlan};
pub use ranking::{rank, EndpointMeasurement, RankOrder, Ranking};
pub use scheduler::{ProbeScheduler, ScheduleOutcome};
pub use tunnel::{build_config, TunnelPlan, TunnelSupervisor};
