use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DispatchError, DispatchResult};

/// 订单ID
pub type OrderId = u64;

/// 订单优先级，VIP 严格先于 Normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderPriority {
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "Normal")]
    Normal,
}

impl OrderPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPriority::Vip => "VIP",
            OrderPriority::Normal => "Normal",
        }
    }
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderPriority {
    type Err = DispatchError;

    fn from_str(s: &str) -> DispatchResult<Self> {
        match s.to_lowercase().as_str() {
            "vip" => Ok(OrderPriority::Vip),
            "normal" => Ok(OrderPriority::Normal),
            _ => Err(DispatchError::invalid_command(format!(
                "未知的订单优先级: {s}"
            ))),
        }
    }
}

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "PROCESSING")]
    Processing,
    #[serde(rename = "COMPLETED")]
    Completed,
}

/// 订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub priority: OrderPriority,
    pub status: OrderStatus,
}

impl Order {
    /// 新订单总是以 Pending 状态进入队列
    pub fn new(id: OrderId, priority: OrderPriority) -> Self {
        Self {
            id,
            priority,
            status: OrderStatus::Pending,
        }
    }

    pub fn is_vip(&self) -> bool {
        self.priority == OrderPriority::Vip
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.status, OrderStatus::Processing)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, OrderStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_pending() {
        let order = Order::new(1, OrderPriority::Vip);
        assert!(order.is_pending());
        assert!(order.is_vip());
        assert!(!order.is_processing());
        assert!(!order.is_completed());
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("VIP".parse::<OrderPriority>().unwrap(), OrderPriority::Vip);
        assert_eq!(
            "normal".parse::<OrderPriority>().unwrap(),
            OrderPriority::Normal
        );
        assert!(matches!(
            "urgent".parse::<OrderPriority>(),
            Err(DispatchError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_order_serialization() {
        let order = Order::new(3, OrderPriority::Normal);
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["priority"], "Normal");
        assert_eq!(json["status"], "PENDING");
    }
}
