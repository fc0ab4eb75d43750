pub mod config;
pub mod telemetry;
pub mod tracing;

pub use self::tracing::*;
pub use config::*;
