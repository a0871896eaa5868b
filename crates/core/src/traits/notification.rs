use crate::models::Snapshot;

/// 快照接收端口
///
/// 引擎在每次状态变更后同步调用 `publish`，实现不得阻塞。
pub trait NotificationPort: Send + Sync {
    fn publish(&self, snapshot: Snapshot);

    fn name(&self) -> &str;
}
