// 媒体容器解封装核心库
//
// 打开字节流，识别容器格式，枚举媒体流，按需产出带时间戳的压缩数据包；
// 支持随机 seek 与跨线程协作式取消。容器解析本身由外部解码引擎承担，
// 会话只负责驱动 open/读包/seek 协议并翻译引擎的错误码

pub mod core;
pub mod demux;

pub use crate::core::{
    DemuxError, ErrorCode, FormatInfo, MediaInput, MediaStatus, OptionDict, OptionValue, Packet,
    SeekTarget, SeekUnit, StreamInfo, StreamType,
};
pub use demux::{
    DecodeEngine, DemuxEvent, Demuxer, DemuxerFactory, EventHub, InterruptHandle, LoadResult,
    SeekRequest,
};
