//! # 数据模型
//!
//! 订单派发系统的核心数据结构。
//!
//! ## 订单状态流转
//! ```text
//! Pending → Processing → Completed
//!    ↑          │
//!    └──────────┘  (绑定的机器人被移除)
//! ```
//!
//! 机器人同一时刻最多绑定一个订单，空闲当且仅当没有绑定订单。

pub mod bot;
pub mod command;
pub mod order;
pub mod snapshot;

pub use bot::*;
pub use command::*;
pub use order::*;
pub use snapshot::*;
