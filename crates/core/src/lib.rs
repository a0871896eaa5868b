pub mod config;
pub mod logging;
pub mod models;
pub mod traits;

pub use crate::config::{ApiConfig, AppConfig, EngineConfig, ObservabilityConfig};
pub use logging::{LogFormat, LogLevel};
pub use models::*;
pub use traits::*;

pub use dispatch_errors::{DispatchError, DispatchResult};
