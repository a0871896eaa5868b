use std::collections::VecDeque;

use dispatch_core::{
    models::{Order, OrderId, OrderPriority, OrderStatus},
    DispatchError, DispatchResult,
};

/// 待处理订单队列
///
/// VIP 队列与普通队列逻辑上首尾相接，保证所有 VIP 订单排在普通订单之前，
/// 同一优先级内部按进入顺序处理。
#[derive(Debug, Default)]
pub struct OrderQueue {
    vip: VecDeque<Order>,
    normal: VecDeque<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane_mut(&mut self, priority: OrderPriority) -> &mut VecDeque<Order> {
        match priority {
            OrderPriority::Vip => &mut self.vip,
            OrderPriority::Normal => &mut self.normal,
        }
    }

    /// 新订单排到同优先级的末尾
    pub fn admit(&mut self, mut order: Order) {
        order.status = OrderStatus::Pending;
        self.lane_mut(order.priority).push_back(order);
    }

    /// 被抢占的订单回到同优先级的最前面
    pub fn reinsert(&mut self, mut order: Order) {
        order.status = OrderStatus::Pending;
        self.lane_mut(order.priority).push_front(order);
    }

    pub fn take_front(&mut self) -> DispatchResult<Order> {
        self.vip
            .pop_front()
            .or_else(|| self.normal.pop_front())
            .ok_or(DispatchError::EmptyQueue)
    }

    pub fn len(&self) -> usize {
        self.vip.len() + self.normal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vip.is_empty() && self.normal.is_empty()
    }

    pub fn count(&self, priority: OrderPriority) -> usize {
        match priority {
            OrderPriority::Vip => self.vip.len(),
            OrderPriority::Normal => self.normal.len(),
        }
    }

    /// 按处理顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.vip.iter().chain(self.normal.iter())
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.iter().find(|order| order.id == order_id)
    }

    pub fn to_vec(&self) -> Vec<Order> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(queue: &OrderQueue) -> Vec<OrderId> {
        queue.iter().map(|order| order.id).collect()
    }

    #[test]
    fn test_vip_goes_after_existing_vips() {
        let mut queue = OrderQueue::new();
        queue.admit(Order::new(1, OrderPriority::Normal));
        queue.admit(Order::new(2, OrderPriority::Vip));
        queue.admit(Order::new(3, OrderPriority::Normal));
        queue.admit(Order::new(4, OrderPriority::Vip));

        assert_eq!(ids(&queue), vec![2, 4, 1, 3]);
        assert_eq!(queue.count(OrderPriority::Vip), 2);
        assert_eq!(queue.count(OrderPriority::Normal), 2);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn test_take_front_drains_in_order() {
        let mut queue = OrderQueue::new();
        queue.admit(Order::new(1, OrderPriority::Normal));
        queue.admit(Order::new(2, OrderPriority::Vip));

        assert_eq!(queue.take_front().unwrap().id, 2);
        assert_eq!(queue.take_front().unwrap().id, 1);
        assert!(matches!(queue.take_front(), Err(DispatchError::EmptyQueue)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_reinsert_goes_to_front_of_its_class() {
        let mut queue = OrderQueue::new();
        queue.admit(Order::new(1, OrderPriority::Vip));
        queue.admit(Order::new(2, OrderPriority::Normal));

        let mut preempted_normal = Order::new(5, OrderPriority::Normal);
        preempted_normal.status = OrderStatus::Processing;
        queue.reinsert(preempted_normal);
        assert_eq!(ids(&queue), vec![1, 5, 2]);

        queue.reinsert(Order::new(6, OrderPriority::Vip));
        assert_eq!(ids(&queue), vec![6, 1, 5, 2]);

        assert!(queue.iter().all(|order| order.is_pending()));
    }

    #[test]
    fn test_get_finds_queued_order() {
        let mut queue = OrderQueue::new();
        queue.admit(Order::new(7, OrderPriority::Normal));

        assert!(queue.get(7).is_some());
        assert!(queue.get(8).is_none());
        assert_eq!(queue.to_vec().len(), 1);
    }
}
