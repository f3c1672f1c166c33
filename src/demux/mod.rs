// 解封装核心模块

pub mod demuxer;
pub mod engine;   // 解码引擎抽象接口
pub mod events;   // 事件中心（监听/订阅）
pub mod factory;  // Demuxer 工厂（异步加载）
pub mod interrupt; // 中断上下文与跨线程句柄
pub mod network;

#[cfg(feature = "ffmpeg")]
pub mod ffmpeg; // FFmpeg 引擎适配器

pub use demuxer::Demuxer;
pub use engine::{DecodeEngine, EngineResult, SeekRequest};
pub use events::{DemuxEvent, EventHub};
pub use factory::{DemuxerFactory, LoadResult};
pub use interrupt::{InterruptCallback, InterruptHandle, DEFAULT_INTERRUPT_TIMEOUT_MS};
pub use network::BufferState;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegEngine;
