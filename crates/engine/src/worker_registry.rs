use dispatch_core::{
    models::{Bot, BotId, BotsSnapshot, OrderId},
    DispatchError, DispatchResult,
};

use crate::id_generator::IdGenerator;

/// 机器人注册表，按添加顺序保存
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    bots: Vec<Bot>,
    ids: IdGenerator,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新建一个空闲机器人并追加到末尾
    pub fn add_bot(&mut self) -> &Bot {
        let bot = Bot::new(self.ids.next_id());
        self.bots.push(bot);
        &self.bots[self.bots.len() - 1]
    }

    /// 移除最后添加的机器人
    pub fn remove_last_bot(&mut self) -> DispatchResult<Bot> {
        self.bots.pop().ok_or(DispatchError::EmptyRegistry)
    }

    /// 列表中第一个空闲机器人的下标
    pub fn first_idle(&self) -> Option<usize> {
        self.bots.iter().position(|bot| bot.is_idle())
    }

    pub fn get(&self, index: usize) -> Option<&Bot> {
        self.bots.get(index)
    }

    pub fn bind(&mut self, index: usize, order_id: OrderId) -> bool {
        self.bots
            .get_mut(index)
            .is_some_and(|bot| bot.bind(order_id))
    }

    /// 释放绑定了该订单的机器人，返回其ID
    pub fn release_order(&mut self, order_id: OrderId) -> Option<BotId> {
        let bot = self
            .bots
            .iter_mut()
            .find(|bot| bot.order_id() == Some(order_id))?;
        bot.release();
        Some(bot.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn idle_count(&self) -> usize {
        self.bots.iter().filter(|bot| bot.is_idle()).count()
    }

    pub fn snapshot(&self) -> BotsSnapshot {
        BotsSnapshot {
            bots: self.bots.clone(),
        }
    }
}
