//! 配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：
//!
//! - 内置默认值（[`AppConfig::default`]）
//! - TOML 配置文件
//! - `DISPATCH_` 前缀的环境变量，嵌套字段以 `__` 分隔，
//!   例如 `DISPATCH_ENGINE__PROCESSING_TIME_MS=5000`

pub mod models;

pub use models::*;

#[cfg(test)]
mod tests;
