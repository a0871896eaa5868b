use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::logging::{LogFormat, LogLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub cors_enabled: bool,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:3000".to_string(),
            cors_enabled: true,
            request_timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_address.is_empty() {
            return Err(anyhow::anyhow!("API绑定地址不能为空"));
        }

        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("API绑定地址格式无效: {}", self.bind_address));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
    pub metrics_enabled: bool,
    pub metrics_endpoint: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_endpoint: "/metrics".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.log_level
            .parse::<LogLevel>()
            .map_err(|_| anyhow::anyhow!("无效的日志级别: {}", self.log_level))?;

        self.log_format
            .parse::<LogFormat>()
            .map_err(|_| anyhow::anyhow!("无效的日志格式: {}", self.log_format))?;

        if self.metrics_enabled && !self.metrics_endpoint.starts_with('/') {
            return Err(anyhow::anyhow!(
                "指标端点必须以 '/' 开头: {}",
                self.metrics_endpoint
            ));
        }

        Ok(())
    }
}
