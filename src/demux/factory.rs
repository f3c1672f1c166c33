use crate::core::MediaInput;
use crate::demux::Demuxer;
use crossbeam_channel::Sender;
use log::{error, info};
use std::thread;

/// 异步加载结果
pub enum LoadResult {
    /// 加载成功，会话已处于 Loaded
    Loaded { demuxer: Demuxer, url: String },
    /// 加载失败
    Failed { url: String, error: String },
}

/// Demuxer 工厂 - 负责异步加载
///
/// 打开网络流可能阻塞很久，放到子线程执行，控制线程不被 open 卡住。
/// 调用前先拿走 interrupt_handle()，随时可以取消在途的加载
///
/// 使用方法：
/// ```ignore
/// let (tx, rx) = unbounded();
/// let handle = demuxer.interrupt_handle();
/// DemuxerFactory::load_async(demuxer, input, tx);
///
/// // 在控制线程中接收结果
/// match rx.recv() {
///     Ok(LoadResult::Loaded { demuxer, .. }) => { /* 开始读包 */ }
///     Ok(LoadResult::Failed { error, .. }) => { error!("加载失败: {}", error); }
///     Err(_) => {}
/// }
/// ```
pub struct DemuxerFactory;

impl DemuxerFactory {
    /// 在子线程中执行阻塞的 load，结果经通道送回
    pub fn load_async(mut demuxer: Demuxer, input: MediaInput, result_tx: Sender<LoadResult>) {
        thread::spawn(move || {
            let url = input.file_name();
            info!("🔨 开始在子线程中加载: {}", url);

            let result = if demuxer.load(input) {
                LoadResult::Loaded { demuxer, url }
            } else {
                let error = demuxer
                    .last_error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "加载被中断".to_string());
                LoadResult::Failed { url, error }
            };

            if result_tx.send(result).is_err() {
                error!("❌ 发送加载结果失败，接收端可能已关闭");
            }
        });
    }
}
