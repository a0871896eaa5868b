use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bot::Bot;
use super::order::Order;
use crate::{DispatchError, DispatchResult};

/// 外部命令，除隐含的优先级外没有其他负载
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchCommand {
    SubmitNormalOrder,
    #[serde(rename = "SubmitVIPOrder")]
    SubmitVipOrder,
    AddBot,
    RemoveBot,
}

impl DispatchCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchCommand::SubmitNormalOrder => "SubmitNormalOrder",
            DispatchCommand::SubmitVipOrder => "SubmitVIPOrder",
            DispatchCommand::AddBot => "AddBot",
            DispatchCommand::RemoveBot => "RemoveBot",
        }
    }
}

impl fmt::Display for DispatchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchCommand {
    type Err = DispatchError;

    fn from_str(s: &str) -> DispatchResult<Self> {
        match s {
            "SubmitNormalOrder" => Ok(DispatchCommand::SubmitNormalOrder),
            "SubmitVIPOrder" => Ok(DispatchCommand::SubmitVipOrder),
            "AddBot" => Ok(DispatchCommand::AddBot),
            "RemoveBot" => Ok(DispatchCommand::RemoveBot),
            _ => Err(DispatchError::invalid_command(format!("未知的命令: {s}"))),
        }
    }
}

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    OrderSubmitted(Order),
    BotAdded(Bot),
    /// 没有机器人时为 None
    BotRemoved(Option<Bot>),
}
