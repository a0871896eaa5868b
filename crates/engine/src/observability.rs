//! Structured logging and metrics for the dispatch engine
//!
//! Log events carry an `event` field so they can be filtered in JSON output.
//! Metrics are recorded through the `metrics` facade; without an installed
//! recorder they are no-ops.

use metrics::{counter, gauge, Counter, Gauge};
use tracing::{debug, info};

use dispatch_core::models::{BotId, DispatchStats, OrderId, OrderPriority};

/// Structured logging utilities
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_order_submitted(order_id: OrderId, priority: OrderPriority, pending: usize) {
        info!(
            event = "order_submitted",
            order.id = order_id,
            order.priority = priority.as_str(),
            queue.pending = pending,
            "订单已提交"
        );
    }

    pub fn log_order_assigned(
        order_id: OrderId,
        priority: OrderPriority,
        bot_id: BotId,
        generation: u64,
    ) {
        info!(
            event = "order_assigned",
            order.id = order_id,
            order.priority = priority.as_str(),
            bot.id = bot_id,
            timer.generation = generation,
            "订单已分配给机器人"
        );
    }

    pub fn log_order_completed(order_id: OrderId, bot_id: Option<BotId>) {
        info!(
            event = "order_completed",
            order.id = order_id,
            bot.id = bot_id,
            "订单处理完成"
        );
    }

    pub fn log_order_preempted(order_id: OrderId, priority: OrderPriority, bot_id: BotId) {
        info!(
            event = "order_preempted",
            order.id = order_id,
            order.priority = priority.as_str(),
            bot.id = bot_id,
            "机器人被移除，订单重新排队"
        );
    }

    pub fn log_bot_added(bot_id: BotId, total: usize) {
        info!(event = "bot_added", bot.id = bot_id, bots.total = total, "机器人已添加");
    }

    pub fn log_bot_removed(bot_id: BotId, was_busy: bool, total: usize) {
        info!(
            event = "bot_removed",
            bot.id = bot_id,
            bot.was_busy = was_busy,
            bots.total = total,
            "机器人已移除"
        );
    }

    pub fn log_stale_completion(order_id: OrderId, generation: u64) {
        debug!(
            event = "stale_completion_ignored",
            order.id = order_id,
            timer.generation = generation,
            "忽略过期的完成事件"
        );
    }
}

/// Dispatch engine metrics
pub struct DispatchMetrics {
    vip_submitted_total: Counter,
    normal_submitted_total: Counter,
    completed_total: Counter,
    preempted_total: Counter,
    stale_completions_total: Counter,

    pending_orders: Gauge,
    processing_orders: Gauge,
    bots: Gauge,
    idle_bots: Gauge,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self {
            vip_submitted_total: counter!("dispatch_orders_submitted_total", "priority" => "VIP"),
            normal_submitted_total: counter!(
                "dispatch_orders_submitted_total",
                "priority" => "Normal"
            ),
            completed_total: counter!("dispatch_orders_completed_total"),
            preempted_total: counter!("dispatch_orders_preempted_total"),
            stale_completions_total: counter!("dispatch_stale_completions_total"),
            pending_orders: gauge!("dispatch_pending_orders"),
            processing_orders: gauge!("dispatch_processing_orders"),
            bots: gauge!("dispatch_bots"),
            idle_bots: gauge!("dispatch_idle_bots"),
        }
    }

    pub fn record_submitted(&self, priority: OrderPriority) {
        match priority {
            OrderPriority::Vip => self.vip_submitted_total.increment(1),
            OrderPriority::Normal => self.normal_submitted_total.increment(1),
        }
    }

    pub fn record_completed(&self) {
        self.completed_total.increment(1);
    }

    pub fn record_preempted(&self) {
        self.preempted_total.increment(1);
    }

    pub fn record_stale_completion(&self) {
        self.stale_completions_total.increment(1);
    }

    pub fn update_gauges(&self, stats: &DispatchStats) {
        self.pending_orders.set(stats.pending as f64);
        self.processing_orders.set(stats.processing as f64);
        self.bots.set(stats.bots as f64);
        self.idle_bots.set(stats.idle_bots as f64);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}
