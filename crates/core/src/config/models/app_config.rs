use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    engine::EngineConfig,
};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DISPATCH";

/// 未指定配置文件时依次尝试的默认路径
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/dispatch.toml",
    "dispatch.toml",
    "/etc/order-dispatch/config.toml",
];

/// System configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: DISPATCH_, nested keys split by `__`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Self::with_defaults(Config::builder())?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate().context("派发引擎配置验证失败")?;
        self.api.validate().context("API配置验证失败")?;
        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }

    fn with_defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>> {
        let defaults = AppConfig::default();

        Ok(builder
            .set_default(
                "engine.processing_time_ms",
                defaults.engine.processing_time_ms,
            )?
            .set_default("engine.command_buffer", defaults.engine.command_buffer as u64)?
            .set_default("engine.snapshot_buffer", defaults.engine.snapshot_buffer as u64)?
            .set_default("api.enabled", defaults.api.enabled)?
            .set_default("api.bind_address", defaults.api.bind_address)?
            .set_default("api.cors_enabled", defaults.api.cors_enabled)?
            .set_default(
                "api.request_timeout_seconds",
                defaults.api.request_timeout_seconds,
            )?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .set_default("observability.log_format", defaults.observability.log_format)?
            .set_default(
                "observability.metrics_enabled",
                defaults.observability.metrics_enabled,
            )?
            .set_default(
                "observability.metrics_endpoint",
                defaults.observability.metrics_endpoint,
            )?)
    }
}
