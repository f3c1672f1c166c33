use crate::core::{FormatInfo, MediaInput, Packet, SeekTarget, SeekUnit, StreamType};
use crate::demux::interrupt::InterruptCallback;
use std::collections::HashMap;

/// 解码引擎的原生错误码（FFmpeg 风格的负数错误码）
pub mod native {
    /// 到达文件末尾 - AVERROR_EOF
    pub const ERR_EOF: i32 = -541_478_725;
    /// 中断回调要求立即退出 - AVERROR_EXIT
    pub const ERR_EXIT: i32 = -1_414_092_869;
    /// 数据无效或格式不可识别 - AVERROR_INVALIDDATA
    pub const ERR_INVALID_DATA: i32 = -1_094_995_529;
    /// 操作超时 - AVERROR(ETIMEDOUT)
    pub const ERR_TIMED_OUT: i32 = -110;
    /// IO 错误 - AVERROR(EIO)
    pub const ERR_IO: i32 = -5;
    /// 文件或协议不存在 - AVERROR(ENOENT)
    pub const ERR_NOT_FOUND: i32 = -2;
    /// 操作不支持 - AVERROR(ENOSYS)
    pub const ERR_UNSUPPORTED: i32 = -38;

    /// 是否为已知错误码
    pub fn is_known(code: i32) -> bool {
        matches!(
            code,
            ERR_EOF | ERR_EXIT | ERR_INVALID_DATA | ERR_TIMED_OUT | ERR_IO | ERR_NOT_FOUND
                | ERR_UNSUPPORTED
        )
    }

    /// 错误码转可读文本，未知码附带原始数值便于诊断
    pub fn err_to_string(code: i32) -> String {
        match code {
            ERR_EOF => "到达文件末尾".to_string(),
            ERR_EXIT => "操作被中断".to_string(),
            ERR_INVALID_DATA => "数据无效或格式不可识别".to_string(),
            ERR_TIMED_OUT => "操作超时".to_string(),
            ERR_IO => "IO 错误".to_string(),
            ERR_NOT_FOUND => "文件或协议不存在".to_string(),
            ERR_UNSUPPORTED => "操作不支持".to_string(),
            _ => format!("引擎错误码 {}", code),
        }
    }
}

/// 引擎调用结果：失败时返回原生负数错误码
pub type EngineResult<T> = std::result::Result<T, i32>;

/// 一次 seek 请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    /// 目标位置：ByTime 为毫秒，ByByte 为字节偏移，ByFrame 为帧号
    pub position: i64,
    pub unit: SeekUnit,
    pub target: SeekTarget,
}

/// 解码引擎抽象接口
///
/// 会话通过 open / read_packet / seek 协议驱动具体引擎。
/// 所有阻塞调用都拿到中断回调，实现必须在内部周期性调用 check()，
/// 返回 true 时尽快放弃当前操作并返回 ERR_EXIT（已获取的资源照常释放）
pub trait DecodeEngine: Send {
    /// 打开并探测输入，返回容器格式信息和全部流的编解码参数
    fn open(
        &mut self,
        input: &mut MediaInput,
        options: &HashMap<String, String>,
        interrupt: &InterruptCallback,
    ) -> EngineResult<FormatInfo>;

    /// 阻塞读取下一个数据包（任意流）；到达末尾时返回 Err(ERR_EOF)
    fn read_packet(&mut self, interrupt: &InterruptCallback) -> EngineResult<Packet>;

    /// Seek 到目标位置；单位/精度是否支持取决于具体引擎
    fn seek(&mut self, request: &SeekRequest, interrupt: &InterruptCallback) -> EngineResult<()>;

    /// 引擎的最佳流启发式（auto 选流时使用）
    fn best_stream(&self, stream_type: StreamType) -> Option<usize>;

    /// 释放原生资源（可重复调用）
    fn close(&mut self);
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::core::StreamInfo;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// 测试用共享观测点：引擎被会话拿走之后，测试端仍可通过这份 Arc 操控
    #[derive(Default)]
    pub struct MockControl {
        pub seeks: Mutex<Vec<SeekRequest>>,
        pub open_options: Mutex<HashMap<String, String>>,
        pub closes: AtomicUsize,
        pub stall_reads: AtomicBool,
        pub read_error: Mutex<Option<i32>>,
    }

    /// 脚本化假引擎：按预设数据返回，可模拟打开失败和卡住的读取
    pub struct MockEngine {
        pub format: FormatInfo,
        pub packets: Vec<Packet>,
        pub cursor: usize,
        pub open_error: Option<i32>,
        pub seek_error: Option<i32>,
        pub control: Arc<MockControl>,
    }

    impl MockEngine {
        pub fn new(streams: Vec<StreamInfo>) -> (Self, Arc<MockControl>) {
            let control = Arc::new(MockControl::default());
            let format = FormatInfo {
                format_name: "matroska".to_string(),
                format_long_name: "Matroska / WebM".to_string(),
                start_time_us: 0,
                duration_us: 10_000_000,
                bit_rate: 5_000_000,
                seekable: true,
                streams,
            };
            let engine = Self {
                format,
                packets: Vec::new(),
                cursor: 0,
                open_error: None,
                seek_error: None,
                control: control.clone(),
            };
            (engine, control)
        }
    }

    impl DecodeEngine for MockEngine {
        fn open(
            &mut self,
            _input: &mut MediaInput,
            options: &HashMap<String, String>,
            interrupt: &InterruptCallback,
        ) -> EngineResult<FormatInfo> {
            if interrupt.check() {
                return Err(native::ERR_EXIT);
            }
            if let Some(code) = self.open_error {
                return Err(code);
            }
            *self.control.open_options.lock() = options.clone();
            self.cursor = 0;
            Ok(self.format.clone())
        }

        fn read_packet(&mut self, interrupt: &InterruptCallback) -> EngineResult<Packet> {
            // 模拟卡住的 IO：只能靠中断回调跳出
            while self.control.stall_reads.load(Ordering::SeqCst) {
                if interrupt.check() {
                    return Err(native::ERR_EXIT);
                }
                thread::sleep(Duration::from_millis(2));
            }
            if let Some(code) = *self.control.read_error.lock() {
                return Err(code);
            }
            match self.packets.get(self.cursor) {
                Some(p) => {
                    self.cursor += 1;
                    Ok(p.clone())
                }
                None => Err(native::ERR_EOF),
            }
        }

        fn seek(
            &mut self,
            request: &SeekRequest,
            interrupt: &InterruptCallback,
        ) -> EngineResult<()> {
            if interrupt.check() {
                return Err(native::ERR_EXIT);
            }
            if let Some(code) = self.seek_error {
                return Err(code);
            }
            self.control.seeks.lock().push(*request);
            if request.unit == SeekUnit::ByTime {
                // 回退到目标时间之前最近的关键帧
                let mut target = 0;
                for (i, p) in self.packets.iter().enumerate() {
                    if p.key_frame && p.pts <= request.position {
                        target = i;
                    }
                }
                self.cursor = target;
            }
            Ok(())
        }

        fn best_stream(&self, stream_type: StreamType) -> Option<usize> {
            self.format
                .streams
                .iter()
                .find(|s| s.stream_type == Some(stream_type) && !s.attached_pic)
                .map(|s| s.index)
        }

        fn close(&mut self) {
            self.control.closes.fetch_add(1, Ordering::SeqCst);
            self.cursor = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_err_to_string_known_codes() {
        assert_eq!(native::err_to_string(native::ERR_EOF), "到达文件末尾");
        assert!(native::is_known(native::ERR_EXIT));
        assert!(!native::is_known(-99_999));
        assert!(native::err_to_string(-99_999).contains("-99999"));
    }
}
