use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use dispatch_core::{models::OrderId, DispatchError, DispatchResult};

/// 计时器到期后投递回事件循环的完成事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionDue {
    pub order_id: OrderId,
    pub generation: u64,
}

struct TimerEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

/// 完成计时器管理
///
/// 每个处理中的订单最多有一个计时器。计时器是一个休眠 `delay` 后
/// 发送 [`CompletionDue`] 的任务；取消时中止任务并丢弃句柄。
/// 每个计时器带有代数，过期的到期事件由 [`CompletionScheduler::finish`] 拒绝。
pub struct CompletionScheduler {
    delay: Duration,
    sender: mpsc::UnboundedSender<CompletionDue>,
    timers: HashMap<OrderId, TimerEntry>,
    next_generation: u64,
}

impl CompletionScheduler {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<CompletionDue>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                sender,
                timers: HashMap::new(),
                next_generation: 1,
            },
            receiver,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 为订单启动计时器，返回其代数。已有的计时器会先被取消。
    ///
    /// 必须在 tokio 运行时内调用。
    pub fn schedule(&mut self, order_id: OrderId) -> u64 {
        self.cancel(order_id);

        let generation = self.next_generation;
        self.next_generation += 1;

        let sender = self.sender.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if sender
                .send(CompletionDue {
                    order_id,
                    generation,
                })
                .is_err()
            {
                trace!("事件循环已停止，丢弃订单 {} 的完成事件", order_id);
            }
        });

        debug!(
            "订单 {} 的完成计时器已启动 (代数: {}, 延迟: {:?})",
            order_id, generation, delay
        );
        self.timers.insert(order_id, TimerEntry { generation, handle });
        generation
    }

    /// 取消订单的计时器，返回是否存在
    pub fn cancel(&mut self, order_id: OrderId) -> bool {
        match self.timers.remove(&order_id) {
            Some(entry) => {
                entry.handle.abort();
                debug!(
                    "订单 {} 的完成计时器已取消 (代数: {})",
                    order_id, entry.generation
                );
                true
            }
            None => false,
        }
    }

    /// 到期事件是否属于订单当前的计时器
    pub fn is_current(&self, due: &CompletionDue) -> bool {
        self.timers
            .get(&due.order_id)
            .is_some_and(|entry| entry.generation == due.generation)
    }

    /// 接受到期事件并清除计时器句柄；过期事件返回 `StaleCompletion`
    pub fn finish(&mut self, due: &CompletionDue) -> DispatchResult<()> {
        if !self.is_current(due) {
            return Err(DispatchError::stale_completion(due.order_id));
        }
        self.timers.remove(&due.order_id);
        Ok(())
    }

    pub fn outstanding(&self) -> usize {
        self.timers.len()
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in self.timers.drain() {
            entry.handle.abort();
        }
    }
}

impl Drop for CompletionScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};

    const DELAY: Duration = Duration::from_millis(10_000);

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_exact_delay() {
        let (mut scheduler, mut rx) = CompletionScheduler::new(DELAY);
        let start = Instant::now();
        let generation = scheduler.schedule(1);

        let due = rx.recv().await.unwrap();
        assert_eq!(
            due,
            CompletionDue {
                order_id: 1,
                generation
            }
        );
        assert!(start.elapsed() >= DELAY);
        assert!(start.elapsed() < DELAY + Duration::from_millis(1));
        assert!(scheduler.finish(&due).is_ok());
        assert_eq!(scheduler.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_does_not_fire_early() {
        let (mut scheduler, mut rx) = CompletionScheduler::new(DELAY);
        scheduler.schedule(1);

        let early = timeout(DELAY - Duration::from_millis(1), rx.recv()).await;
        assert!(early.is_err());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let (mut scheduler, mut rx) = CompletionScheduler::new(DELAY);
        scheduler.schedule(1);
        assert!(scheduler.cancel(1));
        assert!(!scheduler.cancel(1));

        let fired = timeout(DELAY * 2, rx.recv()).await;
        assert!(fired.is_err());
        assert_eq!(scheduler.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduled_timer_rejects_old_generation() {
        let (mut scheduler, _rx) = CompletionScheduler::new(DELAY);
        let first = scheduler.schedule(1);
        let second = scheduler.schedule(1);
        assert!(second > first);
        assert_eq!(scheduler.outstanding(), 1);

        let stale = CompletionDue {
            order_id: 1,
            generation: first,
        };
        assert!(!scheduler.is_current(&stale));
        assert!(matches!(
            scheduler.finish(&stale),
            Err(DispatchError::StaleCompletion { order_id: 1 })
        ));
        assert!(scheduler.is_current(&CompletionDue {
            order_id: 1,
            generation: second
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_clears_timers() {
        let (mut scheduler, mut rx) = CompletionScheduler::new(DELAY);
        scheduler.schedule(1);
        scheduler.schedule(2);
        scheduler.cancel_all();

        assert_eq!(scheduler.outstanding(), 0);
        assert!(timeout(DELAY * 2, rx.recv()).await.is_err());
    }
}
