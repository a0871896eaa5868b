use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 派发引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 每个订单的固定处理时长（毫秒）
    pub processing_time_ms: u64,
    /// 命令通道容量
    pub command_buffer: usize,
    /// 快照广播通道容量
    pub snapshot_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            processing_time_ms: 10_000,
            command_buffer: 256,
            snapshot_buffer: 256,
        }
    }
}

impl EngineConfig {
    pub fn processing_time(&self) -> Duration {
        Duration::from_millis(self.processing_time_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.processing_time_ms == 0 {
            return Err(anyhow::anyhow!("订单处理时长必须大于0"));
        }

        if self.command_buffer == 0 {
            return Err(anyhow::anyhow!("命令通道容量必须大于0"));
        }

        if self.snapshot_buffer == 0 {
            return Err(anyhow::anyhow!("快照广播通道容量必须大于0"));
        }

        Ok(())
    }
}
