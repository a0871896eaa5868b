/// 单调递增的ID生成器，从 1 开始
///
/// 订单和机器人各自持有一个实例，互不影响。
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// 已发放的ID数量
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
