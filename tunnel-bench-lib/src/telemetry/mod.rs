pub mod tracing;

pub use self::tracing::{build_filter, init_tracing};
