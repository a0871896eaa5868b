use serde::{Deserialize, Serialize};

use super::order::OrderId;

/// 机器人ID
pub type BotId = u64;

/// 处理订单的机器人，同一时刻最多绑定一个订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    id: BotId,
    is_idle: bool,
    order_id: Option<OrderId>,
}

impl Bot {
    pub fn new(id: BotId) -> Self {
        Self {
            id,
            is_idle: true,
            order_id: None,
        }
    }

    pub fn id(&self) -> BotId {
        self.id
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    /// 当前绑定的订单
    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// 绑定订单；已忙碌时返回 false 且不做任何修改
    pub fn bind(&mut self, order_id: OrderId) -> bool {
        if !self.is_idle {
            return false;
        }
        self.is_idle = false;
        self.order_id = Some(order_id);
        true
    }

    /// 解除绑定并返回之前的订单
    pub fn release(&mut self) -> Option<OrderId> {
        self.is_idle = true;
        self.order_id.take()
    }
}
