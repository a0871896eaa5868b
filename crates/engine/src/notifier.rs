use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use dispatch_core::{models::Snapshot, traits::NotificationPort};

/// 通过 tokio broadcast 通道向所有订阅者推送快照
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Snapshot>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationPort for BroadcastNotifier {
    fn publish(&self, snapshot: Snapshot) {
        let event = snapshot.event_name();
        match self.sender.send(snapshot) {
            Ok(receivers) => trace!("快照 {} 已推送给 {} 个订阅者", event, receivers),
            Err(_) => trace!("没有订阅者，丢弃快照 {}", event),
        }
    }

    fn name(&self) -> &str {
        "Broadcast"
    }
}

/// 以调试日志记录快照摘要
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn publish(&self, snapshot: Snapshot) {
        match &snapshot {
            Snapshot::Orders(orders) => debug!(
                pending = orders.pending.len(),
                processing = orders.processing.len(),
                completed = orders.completed.len(),
                "订单快照"
            ),
            Snapshot::Bots(bots) => debug!(
                bots = bots.bots.len(),
                idle = bots.idle_count(),
                "机器人快照"
            ),
        }
    }

    fn name(&self) -> &str {
        "Tracing"
    }
}

/// 把快照依次转发给多个接收端
#[derive(Default)]
pub struct CompositeNotifier {
    notifiers: Vec<Arc<dyn NotificationPort>>,
}

impl CompositeNotifier {
    pub fn new(notifiers: Vec<Arc<dyn NotificationPort>>) -> Self {
        Self { notifiers }
    }

    pub fn add_notifier(&mut self, notifier: Arc<dyn NotificationPort>) {
        self.notifiers.push(notifier);
    }
}

impl NotificationPort for CompositeNotifier {
    fn publish(&self, snapshot: Snapshot) {
        for notifier in &self.notifiers {
            trace!("转发快照 {} 到 {}", snapshot.event_name(), notifier.name());
            notifier.publish(snapshot.clone());
        }
    }

    fn name(&self) -> &str {
        "Composite"
    }
}

/// 在内存中记录所有快照，供测试检查
#[derive(Default)]
pub struct RecordingNotifier {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 取出并清空已记录的快照
    pub fn take(&self) -> Vec<Snapshot> {
        std::mem::take(
            &mut *self
                .snapshots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl NotificationPort for RecordingNotifier {
    fn publish(&self, snapshot: Snapshot) {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(snapshot);
    }

    fn name(&self) -> &str {
        "Recording"
    }
}
