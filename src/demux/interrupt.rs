use crate::demux::events::{DemuxEvent, EventHub};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// 默认中断超时（毫秒）：足够宽松，不会误伤正常的网络停顿，但保证有限
pub const DEFAULT_INTERRUPT_TIMEOUT_MS: i64 = 30_000;

/// 中断上下文 - 取消令牌
///
/// 只含原子标志、超时值和当前阻塞调用的起点，不含任何会话状态。
/// 标志和超时是唯一允许从其它线程修改的状态，仅依赖原子语义，无需加锁
pub struct InterruptContext {
    interrupted: AtomicBool,
    timeout_ms: AtomicI64,
    // 当前阻塞调用的起点；下一次 begin 覆盖
    mark: Mutex<Option<Instant>>,
}

impl InterruptContext {
    pub fn new() -> Self {
        Self {
            interrupted: AtomicBool::new(false),
            timeout_ms: AtomicI64::new(DEFAULT_INTERRUPT_TIMEOUT_MS),
            mark: Mutex::new(None),
        }
    }

    /// 标记一次阻塞调用开始（load / read_frame / seek 进入时）
    pub(crate) fn begin(&self) {
        *self.mark.lock() = Some(Instant::now());
    }

    pub fn set_status(&self, interrupt: bool) {
        self.interrupted.store(interrupt, Ordering::SeqCst);
    }

    pub fn status(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn set_timeout(&self, timeout_ms: i64) {
        self.timeout_ms.store(timeout_ms, Ordering::SeqCst);
    }

    pub fn timeout(&self) -> i64 {
        self.timeout_ms.load(Ordering::SeqCst)
    }

    /// 当前阻塞调用是否已超过超时
    pub(crate) fn timed_out(&self) -> bool {
        let mark = self.mark.lock();
        match *mark {
            Some(started) => started.elapsed().as_millis() as i64 >= self.timeout(),
            None => false,
        }
    }
}

impl Default for InterruptContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 跨线程中断句柄
///
/// 监督线程用它取消 demux 线程上卡住的阻塞调用，无需与 demux 线程共享锁。
/// 标志不会自动复位：中断后继续使用会话前需 set_status(false)
#[derive(Clone)]
pub struct InterruptHandle {
    ctx: Arc<InterruptContext>,
}

impl InterruptHandle {
    pub(crate) fn new(ctx: Arc<InterruptContext>) -> Self {
        Self { ctx }
    }

    /// true: 中止正在进行的加载/读包/seek；false: 解除中断
    pub fn set_status(&self, interrupt: bool) {
        self.ctx.set_status(interrupt);
    }

    pub fn status(&self) -> bool {
        self.ctx.status()
    }

    /// 设置阻塞调用超时（毫秒）
    pub fn set_timeout(&self, timeout_ms: i64) {
        self.ctx.set_timeout(timeout_ms);
    }

    pub fn timeout(&self) -> i64 {
        self.ctx.timeout()
    }
}

/// 引擎阻塞调用期间周期性询问的回调
///
/// 显式标志触发时，在阻塞调用回卷之前（尽力而为）发出 UserInterrupted 事件，
/// 每次阻塞调用最多一次；超时中止不在这里发事件，由上层翻译为超时错误
pub struct InterruptCallback {
    ctx: Arc<InterruptContext>,
    events: EventHub,
    notified: AtomicBool,
}

impl InterruptCallback {
    pub(crate) fn new(ctx: Arc<InterruptContext>, events: EventHub) -> Self {
        Self {
            ctx,
            events,
            notified: AtomicBool::new(false),
        }
    }

    /// true = 中止当前阻塞操作
    pub fn check(&self) -> bool {
        if self.ctx.status() {
            if !self.notified.swap(true, Ordering::SeqCst) {
                self.events.emit(DemuxEvent::UserInterrupted);
            }
            return true;
        }
        self.ctx.timed_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_timeout_aborts_without_user_event() {
        let ctx = Arc::new(InterruptContext::new());
        ctx.set_timeout(10);
        let hub = EventHub::new();
        let rx = hub.subscribe();

        let cb = InterruptCallback::new(ctx.clone(), hub);
        ctx.begin();
        assert!(!cb.check());
        thread::sleep(Duration::from_millis(20));
        assert!(cb.check());
        // 超时中止不发 UserInterrupted
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn test_flag_abort_notifies_once() {
        let ctx = Arc::new(InterruptContext::new());
        let hub = EventHub::new();
        let rx = hub.subscribe();

        let cb = InterruptCallback::new(ctx.clone(), hub);
        ctx.begin();
        ctx.set_status(true);
        assert!(cb.check());
        assert!(cb.check());

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![DemuxEvent::UserInterrupted]);
    }

    #[test]
    fn test_handle_mutates_shared_context() {
        let ctx = Arc::new(InterruptContext::new());
        let handle = InterruptHandle::new(ctx.clone());
        assert_eq!(handle.timeout(), DEFAULT_INTERRUPT_TIMEOUT_MS);

        let worker = {
            let handle = handle.clone();
            thread::spawn(move || {
                handle.set_status(true);
                handle.set_timeout(5_000);
            })
        };
        worker.join().unwrap();
        assert!(ctx.status());
        assert_eq!(ctx.timeout(), 5_000);
    }
}
