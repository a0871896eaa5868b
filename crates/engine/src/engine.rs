use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use dispatch_core::{
    models::{
        Bot, BotsSnapshot, DispatchStats, Order, OrderId, OrderPriority, OrderStatus,
        OrdersSnapshot, Snapshot,
    },
    traits::NotificationPort,
    DispatchError, DispatchResult,
};

use crate::{
    completion_scheduler::{CompletionDue, CompletionScheduler},
    id_generator::IdGenerator,
    observability::{DispatchMetrics, StructuredLogger},
    order_queue::OrderQueue,
    worker_registry::WorkerRegistry,
};

/// 订单派发引擎
///
/// 独占待处理队列、处理中集合、已完成列表、机器人列表和完成计时器。
/// 每次状态变更后通过 [`NotificationPort`] 发出快照。
/// 所有方法都应在同一个任务中串行调用，引擎本身不加锁。
pub struct DispatchEngine {
    order_ids: IdGenerator,
    queue: OrderQueue,
    processing: Vec<Order>,
    completed: Vec<Order>,
    registry: WorkerRegistry,
    scheduler: CompletionScheduler,
    notifier: Arc<dyn NotificationPort>,
    metrics: DispatchMetrics,
    preempted: u64,
}

impl DispatchEngine {
    /// 创建引擎，同时返回完成事件的接收端，调用方负责把事件交回
    /// [`DispatchEngine::handle_completion`]
    pub fn new(
        processing_time: Duration,
        notifier: Arc<dyn NotificationPort>,
    ) -> (Self, mpsc::UnboundedReceiver<CompletionDue>) {
        let (scheduler, completions) = CompletionScheduler::new(processing_time);
        (
            Self {
                order_ids: IdGenerator::new(),
                queue: OrderQueue::new(),
                processing: Vec::new(),
                completed: Vec::new(),
                registry: WorkerRegistry::new(),
                scheduler,
                notifier,
                metrics: DispatchMetrics::new(),
                preempted: 0,
            },
            completions,
        )
    }

    pub fn processing_time(&self) -> Duration {
        self.scheduler.delay()
    }

    /// 提交新订单，最多触发一次分配
    pub fn submit_order(&mut self, priority: OrderPriority) -> Order {
        let order = Order::new(self.order_ids.next_id(), priority);
        self.queue.admit(order.clone());

        self.metrics.record_submitted(priority);
        StructuredLogger::log_order_submitted(order.id, priority, self.queue.len());
        self.emit_orders();

        self.dispatch_to_first_idle();
        order
    }

    /// 添加机器人，有待处理订单时立即为其分配
    pub fn add_bot(&mut self) -> Bot {
        let bot_id = self.registry.add_bot().id();
        let index = self.registry.len() - 1;

        StructuredLogger::log_bot_added(bot_id, self.registry.len());
        self.emit_bots();

        if !self.queue.is_empty() {
            self.try_assign(index);
        }
        self.registry
            .get(index)
            .cloned()
            .unwrap_or_else(|| Bot::new(bot_id))
    }

    /// 移除最后添加的机器人，处理中的订单回到其优先级队首
    pub fn remove_bot(&mut self) -> Option<Bot> {
        let bot = match self.registry.remove_last_bot() {
            Ok(bot) => bot,
            Err(e) => {
                debug!("{}", e);
                return None;
            }
        };

        let Some(order_id) = bot.order_id() else {
            StructuredLogger::log_bot_removed(bot.id(), false, self.registry.len());
            self.emit_bots();
            return Some(bot);
        };

        if let Some(position) = self.processing.iter().position(|o| o.id == order_id) {
            let order = self.processing.remove(position);
            self.scheduler.cancel(order_id);
            StructuredLogger::log_order_preempted(order.id, order.priority, bot.id());
            self.queue.reinsert(order);
            self.preempted += 1;
            self.metrics.record_preempted();
        } else {
            warn!(
                "机器人 {} 绑定的订单 {} 不在处理中集合，仅取消其计时器",
                bot.id(),
                order_id
            );
            self.scheduler.cancel(order_id);
        }

        StructuredLogger::log_bot_removed(bot.id(), true, self.registry.len());
        self.emit_orders();
        self.dispatch_to_first_idle();
        self.emit_bots();
        Some(bot)
    }

    /// 处理计时器到期事件；过期事件返回 `StaleCompletion` 且不改变任何状态
    pub fn handle_completion(&mut self, due: CompletionDue) -> DispatchResult<Order> {
        let position = self
            .processing
            .iter()
            .position(|order| order.id == due.order_id);

        let position = match position {
            Some(position) if self.scheduler.is_current(&due) => position,
            _ => {
                self.metrics.record_stale_completion();
                StructuredLogger::log_stale_completion(due.order_id, due.generation);
                return Err(DispatchError::stale_completion(due.order_id));
            }
        };
        self.scheduler.finish(&due)?;

        let mut order = self.processing.remove(position);
        order.status = OrderStatus::Completed;
        self.completed.push(order.clone());
        let bot_id = self.registry.release_order(order.id);

        self.metrics.record_completed();
        StructuredLogger::log_order_completed(order.id, bot_id);
        self.emit_orders();
        self.emit_bots();

        self.dispatch_to_first_idle();
        Ok(order)
    }

    /// 若机器人空闲且有待处理订单，则取队首订单分配给它
    pub fn try_assign(&mut self, bot_index: usize) -> bool {
        let Some(bot) = self.registry.get(bot_index) else {
            return false;
        };
        if !bot.is_idle() {
            return false;
        }
        let bot_id = bot.id();

        let mut order = match self.queue.take_front() {
            Ok(order) => order,
            Err(e) => {
                debug!("机器人 {} 无订单可分配: {}", bot_id, e);
                return false;
            }
        };

        self.registry.bind(bot_index, order.id);
        order.status = OrderStatus::Processing;
        let generation = self.scheduler.schedule(order.id);
        StructuredLogger::log_order_assigned(order.id, order.priority, bot_id, generation);
        self.processing.push(order);

        self.emit_bots();
        self.emit_orders();
        true
    }

    fn dispatch_to_first_idle(&mut self) -> bool {
        if self.queue.is_empty() {
            return false;
        }
        match self.registry.first_idle() {
            Some(index) => self.try_assign(index),
            None => false,
        }
    }

    pub fn orders_snapshot(&self) -> OrdersSnapshot {
        OrdersSnapshot {
            pending: self.queue.to_vec(),
            processing: self.processing.clone(),
            completed: self.completed.clone(),
        }
    }

    pub fn bots_snapshot(&self) -> BotsSnapshot {
        self.registry.snapshot()
    }

    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        self.queue
            .get(order_id)
            .or_else(|| self.processing.iter().find(|order| order.id == order_id))
            .or_else(|| self.completed.iter().find(|order| order.id == order_id))
            .cloned()
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            submitted: self.order_ids.issued(),
            pending: self.queue.len(),
            pending_vip: self.queue.count(OrderPriority::Vip),
            processing: self.processing.len(),
            completed: self.completed.len(),
            preempted: self.preempted,
            bots: self.registry.len(),
            idle_bots: self.registry.idle_count(),
        }
    }

    /// 未到期的计时器数量
    pub fn outstanding_timers(&self) -> usize {
        self.scheduler.outstanding()
    }

    /// 取消所有计时器，事件循环退出时调用
    pub fn shutdown(&mut self) {
        let outstanding = self.scheduler.outstanding();
        self.scheduler.cancel_all();
        debug!("派发引擎已关闭，取消了 {} 个计时器", outstanding);
    }

    fn emit_orders(&self) {
        self.metrics.update_gauges(&self.stats());
        self.notifier
            .publish(Snapshot::Orders(self.orders_snapshot()));
    }

    fn emit_bots(&self) {
        self.metrics.update_gauges(&self.stats());
        self.notifier.publish(Snapshot::Bots(self.bots_snapshot()));
    }
}
