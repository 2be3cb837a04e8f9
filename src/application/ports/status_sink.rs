//! Status Sink Port - 进度展示
//!
//! 通知栏 / UI 属于外部协作者，这里只定义推送人类可读状态文本的出口

/// Status Sink Port
pub trait StatusSinkPort: Send + Sync {
    /// 推送某本书的最新状态文本
    fn publish(&self, book_id: &str, text: &str);

    /// 推送与具体任务无关的提示（如"已在下载队列中"）
    fn notice(&self, text: &str);
}
