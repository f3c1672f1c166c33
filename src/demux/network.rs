use crate::core::StreamProtocol;
use log::info;
use std::collections::HashMap;

/// 缓冲状态监视器
///
/// 根据上层回报的已缓冲时长（秒）做滞回判断：
/// 低于目标的 20% 进入缓冲，补回目标值后退出
#[derive(Debug)]
pub struct BufferState {
    /// 目标缓冲大小（秒）
    target_buffer_size: f64,
    /// 当前缓冲大小（秒）
    current_buffer_size: f64,
    /// 最小缓冲阈值（秒）
    min_buffer_threshold: f64,
    /// 是否正在缓冲
    is_buffering: bool,
}

impl BufferState {
    pub fn new(target_buffer_size: f64) -> Self {
        Self {
            target_buffer_size,
            current_buffer_size: 0.0,
            min_buffer_threshold: target_buffer_size * 0.2, // 20% 阈值
            is_buffering: false,
        }
    }

    /// 更新缓冲状态
    pub fn update(&mut self, current_buffer: f64) {
        self.current_buffer_size = current_buffer;

        if self.current_buffer_size < self.min_buffer_threshold {
            if !self.is_buffering {
                info!(
                    "🔄 开始缓冲（当前: {:.2}s / 目标: {:.2}s）",
                    self.current_buffer_size, self.target_buffer_size
                );
                self.is_buffering = true;
            }
        } else if self.current_buffer_size >= self.target_buffer_size {
            if self.is_buffering {
                info!("✅ 缓冲完成（当前: {:.2}s）", self.current_buffer_size);
                self.is_buffering = false;
            }
        }
    }

    /// 是否应该缓冲
    pub fn should_buffer(&self) -> bool {
        self.is_buffering
    }

    /// 缓冲是否已完全耗尽
    pub fn is_drained(&self) -> bool {
        self.current_buffer_size <= f64::EPSILON
    }

    /// 获取缓冲进度（0.0-1.0）
    pub fn buffer_progress(&self) -> f64 {
        (self.current_buffer_size / self.target_buffer_size).min(1.0)
    }

    /// 获取当前缓冲大小
    pub fn current_buffer_size(&self) -> f64 {
        self.current_buffer_size
    }
}

/// 网络流的默认引擎选项
///
/// 用户字典中的同名键优先于这里的默认值
pub fn default_network_options(protocol: StreamProtocol) -> HashMap<String, String> {
    let mut options = HashMap::new();

    // 组合多个 fflags（避免花屏和加速）
    // discardcorrupt: 丢弃损坏的帧
    // genpts: 生成 PTS（防止时间戳问题）
    // nobuffer: 减少缓冲延迟
    // igndts: 忽略 DTS（某些流的 DTS 不准确）
    options.insert(
        "fflags".to_string(),
        "+discardcorrupt+genpts+nobuffer+igndts".to_string(),
    );

    // 降低分析时间（加快启动）
    options.insert("analyzeduration".to_string(), "5000000".to_string()); // 5秒
    options.insert("probesize".to_string(), "10000000".to_string()); // 10MB

    // 网络超时设置
    options.insert("timeout".to_string(), "15000000".to_string()); // 15秒超时

    // 增加网络缓冲（减少卡顿）
    options.insert("buffer_size".to_string(), "8388608".to_string()); // 8MB 缓冲区

    // 低延迟模式
    options.insert("max_delay".to_string(), "500000".to_string()); // 最大延迟 0.5 秒
    options.insert("reorder_queue_size".to_string(), "0".to_string());

    options.insert("rw_timeout".to_string(), "8000000".to_string()); // 读写操作 8s 超时
    options.insert("stimeout".to_string(), "8000000".to_string()); // socket 层超时
    options.insert("http_multiple".to_string(), "1".to_string());
    options.insert("reconnect".to_string(), "1".to_string());
    options.insert("reconnect_streamed".to_string(), "1".to_string());
    options.insert("reconnect_delay_max".to_string(), "4".to_string());

    // HLS 特定选项
    if protocol == StreamProtocol::HLS {
        info!("🎬 HLS 流检测，应用 HLS 优化");
        // 从最新片段开始（点播流使用 -1，直播流使用 -3）
        options.insert("live_start_index".to_string(), "-1".to_string());
        options.insert("max_reload".to_string(), "10".to_string());
        options.insert("http_persistent".to_string(), "1".to_string());
        options.insert("hls_init_time".to_string(), "5".to_string()); // 初始缓冲5秒
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_hysteresis() {
        let mut buffer = BufferState::new(3.0);
        assert!(!buffer.should_buffer());

        buffer.update(0.1);
        assert!(buffer.should_buffer());

        // 高于阈值但未到目标值：保持缓冲
        buffer.update(1.0);
        assert!(buffer.should_buffer());

        buffer.update(3.5);
        assert!(!buffer.should_buffer());
        assert_eq!(buffer.buffer_progress(), 1.0);
    }

    #[test]
    fn test_hls_gets_extra_options() {
        let hls = default_network_options(StreamProtocol::HLS);
        assert!(hls.contains_key("live_start_index"));

        let rtsp = default_network_options(StreamProtocol::RTSP);
        assert!(!rtsp.contains_key("live_start_index"));
        assert_eq!(rtsp.get("reconnect").unwrap(), "1");
    }
}
