pub mod builder;
pub mod document;
pub mod ports;
pub mod supervisor;

pub use builder::{
    build_batch_config, build_config, inbound_tag, outbound_tag, BuildOptions, EndpointSlot,
    TunnelPlan,
};
pub use document::TunnelRunConfig;
pub use ports::PortAllocator;
pub use supervisor::{TunnelProcess, TunnelSupervisor};
