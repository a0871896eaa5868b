pub mod dispatch;
pub mod notification;

pub use dispatch::*;
pub use notification::*;
