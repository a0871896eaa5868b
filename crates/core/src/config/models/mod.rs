pub mod api_observability;
pub mod app_config;
pub mod engine;

pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use engine::EngineConfig;
