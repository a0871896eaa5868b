use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    models::{
        Bot, CommandOutcome, DispatchCommand, DispatchStats, Order, OrderId, OrderPriority,
        OrdersSnapshot, BotsSnapshot, Snapshot,
    },
    DispatchResult,
};

/// 新观察者的订阅：附加时的订单快照加上后续所有快照
#[derive(Debug)]
pub struct Subscription {
    pub orders: OrdersSnapshot,
    pub receiver: broadcast::Receiver<Snapshot>,
}

/// 订单派发服务接口
///
/// 所有调用都在派发引擎的事件循环中串行执行。
#[async_trait]
pub trait OrderDispatchService: Send + Sync {
    /// 提交订单
    async fn submit_order(&self, priority: OrderPriority) -> DispatchResult<Order>;

    /// 添加机器人
    async fn add_bot(&self) -> DispatchResult<Bot>;

    /// 移除最后添加的机器人，没有机器人时返回 None
    async fn remove_bot(&self) -> DispatchResult<Option<Bot>>;

    /// 当前订单快照
    async fn orders_snapshot(&self) -> DispatchResult<OrdersSnapshot>;

    /// 当前机器人快照
    async fn bots_snapshot(&self) -> DispatchResult<BotsSnapshot>;

    /// 按ID查询订单
    async fn get_order(&self, order_id: OrderId) -> DispatchResult<Option<Order>>;

    /// 统计信息
    async fn stats(&self) -> DispatchResult<DispatchStats>;

    /// 订阅快照，附加与取快照在同一步中完成
    async fn subscribe(&self) -> DispatchResult<Subscription>;

    /// 执行外部命令
    async fn execute(&self, command: DispatchCommand) -> DispatchResult<CommandOutcome> {
        match command {
            DispatchCommand::SubmitNormalOrder => self
                .submit_order(OrderPriority::Normal)
                .await
                .map(CommandOutcome::OrderSubmitted),
            DispatchCommand::SubmitVipOrder => self
                .submit_order(OrderPriority::Vip)
                .await
                .map(CommandOutcome::OrderSubmitted),
            DispatchCommand::AddBot => self.add_bot().await.map(CommandOutcome::BotAdded),
            DispatchCommand::RemoveBot => self.remove_bot().await.map(CommandOutcome::BotRemoved),
        }
    }
}
