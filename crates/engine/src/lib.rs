//! 订单派发引擎
//!
//! [`DispatchEngine`] 持有全部派发状态；[`DispatchService`] 在单个任务中
//! 串行处理外部请求与计时器到期事件，[`DispatchHandle`] 是其对外接口。

pub mod completion_scheduler;
pub mod engine;
pub mod id_generator;
pub mod notifier;
pub mod observability;
pub mod order_queue;
pub mod service;
pub mod worker_registry;

pub use completion_scheduler::{CompletionDue, CompletionScheduler};
pub use engine::DispatchEngine;
pub use id_generator::IdGenerator;
pub use notifier::*;
pub use observability::{DispatchMetrics, StructuredLogger};
pub use order_queue::OrderQueue;
pub use service::{DispatchHandle, DispatchRequest, DispatchService, DispatchServiceBuilder};
pub use worker_registry::WorkerRegistry;
