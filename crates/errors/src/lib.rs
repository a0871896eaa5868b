use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("待处理队列为空")]
    EmptyQueue,
    #[error("没有可移除的机器人")]
    EmptyRegistry,
    #[error("过期的完成事件: 订单 {order_id}")]
    StaleCompletion { order_id: u64 },
    #[error("派发引擎不可用")]
    EngineUnavailable,
    #[error("无效的命令: {0}")]
    InvalidCommand(String),
    #[error("配置错误: {0}")]
    Configuration(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn stale_completion(order_id: u64) -> Self {
        Self::StaleCompletion { order_id }
    }
    pub fn invalid_command<S: Into<String>>(msg: S) -> Self {
        Self::InvalidCommand(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    /// 引擎内部用于门控的错误，调用方永远看不到，只会退化为无操作
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            DispatchError::EmptyQueue
                | DispatchError::EmptyRegistry
                | DispatchError::StaleCompletion { .. }
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            DispatchError::InvalidCommand(_) => "命令格式有误",
            DispatchError::EngineUnavailable => "派发引擎已停止，请稍后重试",
            DispatchError::Configuration(_) => "系统配置有误",
            _ => "系统繁忙，请稍后重试",
        }
    }
}
