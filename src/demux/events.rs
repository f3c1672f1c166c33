use crate::core::{ErrorCode, MediaStatus};
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::RwLock;
use std::sync::Arc;

/// 解封装事件 - 对外的全部可观察面，除此之外没有其它旁路
#[derive(Debug, Clone, PartialEq)]
pub enum DemuxEvent {
    /// 已卸载
    Unloaded,
    /// 用户主动中断（在阻塞调用回卷之前发出，不算错误）
    UserInterrupted,
    /// 加载完成
    Loaded,
    /// 第一个数据包读取成功（每次加载只发一次）
    Started,
    /// 到达媒体末尾（每次加载只发一次）
    Finished,
    /// 错误事件
    Error { code: ErrorCode, message: String },
    /// 媒体状态变化
    MediaStatusChanged(MediaStatus),
}

/// 监听回调
pub type EventListener = Box<dyn Fn(&DemuxEvent) + Send + Sync>;

/// 事件中心
///
/// 监听器按注册顺序、在触发操作的线程上同步调用
#[derive(Clone, Default)]
pub struct EventHub {
    listeners: Arc<RwLock<Vec<EventListener>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听回调
    pub fn register<F>(&self, listener: F)
    where
        F: Fn(&DemuxEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push(Box::new(listener));
    }

    /// 订阅为通道：返回接收端，事件以克隆发送
    pub fn subscribe(&self) -> Receiver<DemuxEvent> {
        let (tx, rx) = unbounded();
        self.register(move |event| {
            let _ = tx.send(event.clone());
        });
        rx
    }

    /// 派发事件
    pub fn emit(&self, event: DemuxEvent) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_emit() {
        let hub = EventHub::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        hub.register(move |_| {
            count2.fetch_add(1, Ordering::SeqCst);
        });

        hub.emit(DemuxEvent::Loaded);
        hub.emit(DemuxEvent::Finished);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_channel() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        hub.emit(DemuxEvent::MediaStatusChanged(MediaStatus::Loading));
        hub.emit(DemuxEvent::Loaded);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                DemuxEvent::MediaStatusChanged(MediaStatus::Loading),
                DemuxEvent::Loaded,
            ]
        );
    }
}
