use serde::{Deserialize, Serialize};

use super::bot::Bot;
use super::order::Order;

/// 订单区域快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersSnapshot {
    pub pending: Vec<Order>,
    pub processing: Vec<Order>,
    pub completed: Vec<Order>,
}

impl OrdersSnapshot {
    pub fn total(&self) -> usize {
        self.pending.len() + self.processing.len() + self.completed.len()
    }

    pub fn pending_ids(&self) -> Vec<u64> {
        self.pending.iter().map(|order| order.id).collect()
    }

    pub fn processing_ids(&self) -> Vec<u64> {
        self.processing.iter().map(|order| order.id).collect()
    }

    pub fn completed_ids(&self) -> Vec<u64> {
        self.completed.iter().map(|order| order.id).collect()
    }
}

/// 机器人列表快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotsSnapshot {
    pub bots: Vec<Bot>,
}

impl BotsSnapshot {
    pub fn idle_count(&self) -> usize {
        self.bots.iter().filter(|bot| bot.is_idle()).count()
    }
}

/// 引擎每次状态变更后发出的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Snapshot {
    Orders(OrdersSnapshot),
    Bots(BotsSnapshot),
}

impl Snapshot {
    /// 推送给观察者时使用的事件名
    pub fn event_name(&self) -> &'static str {
        match self {
            Snapshot::Orders(_) => "orders",
            Snapshot::Bots(_) => "bots",
        }
    }
}

/// 引擎统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub submitted: u64,
    pub pending: usize,
    /// 待处理订单中的 VIP 订单数
    pub pending_vip: usize,
    pub processing: usize,
    pub completed: usize,
    pub preempted: u64,
    pub bots: usize,
    pub idle_bots: usize,
}
