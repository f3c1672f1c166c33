use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Seek};
use std::path::PathBuf;

/// 媒体状态
///
/// 会话在任意时刻只处于一个状态，状态迁移是"现在能调用什么"的权威信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    /// 未加载（初始状态，close 后回到这里）
    Unloaded,
    /// 加载中
    Loading,
    /// 已加载，可以读包
    Loaded,
    /// 底层 IO 停滞
    Stalled,
    /// 缓冲中
    Buffering,
    /// 缓冲完成
    Buffered,
    /// 到达媒体末尾
    EndOfMedia,
    /// 加载失败
    LoadFailed,
    /// 打开成功但格式无效
    InvalidMedia,
    /// 没有可解码的媒体流
    NoMedia,
}

/// 流类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    Audio,
    Video,
    Subtitle,
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Audio => "音频",
            StreamType::Video => "视频",
            StreamType::Subtitle => "字幕",
        }
    }
}

/// Seek 单位
///
/// 只有 ByTime 保证支持，其余取决于容器和解码引擎的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekUnit {
    ByTime,
    ByByte,
    ByFrame,
}

/// Seek 目标精度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekTarget {
    /// 落在关键帧上（最快）
    KeyFrame,
    /// 任意帧
    AnyFrame,
    /// 精确到帧
    AccurateFrame,
}

/// 压缩数据包 - 解封装的输出单元
///
/// 每次成功读取都产生一个新包，会话只保留最后一个成功的包，不做队列缓冲
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// 所属流索引（容器内的原生索引）
    pub stream_index: usize,
    /// 显示时间戳（毫秒）
    pub pts: i64,
    /// 解码时间戳（毫秒）
    pub dts: i64,
    /// 持续时间（毫秒）
    pub duration: i64,
    /// 是否关键帧
    pub key_frame: bool,
    /// 丢弃标记
    pub discard: bool,
    /// 压缩数据
    pub data: Vec<u8>,
}

/// 单个媒体流的信息（解码引擎在 open 时给出的编解码参数）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// 容器内的流索引
    pub index: usize,
    /// 流类型（数据流等无法归类的为 None）
    pub stream_type: Option<StreamType>,
    /// 编解码器短名称
    pub codec_name: String,
    /// 编解码器完整名称
    pub codec_long_name: String,
    /// 视频宽度
    pub width: u32,
    /// 视频高度
    pub height: u32,
    /// 码率（bit/s）
    pub bit_rate: i64,
    /// 平均帧率
    pub fps: f64,
    /// 帧数（容器已知时）
    pub frames: i64,
    /// 音频采样率
    pub sample_rate: u32,
    /// 音频声道数
    pub channels: u16,
    /// 是否为附加图片流（封面图等）
    pub attached_pic: bool,
}

/// 容器格式信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatInfo {
    /// 格式短名称
    pub format_name: String,
    /// 格式完整名称
    pub format_long_name: String,
    /// 起始时间（微秒）
    pub start_time_us: i64,
    /// 总时长（微秒）
    pub duration_us: i64,
    /// 总码率（bit/s）
    pub bit_rate: i64,
    /// 是否支持 seek
    pub seekable: bool,
    /// 所有媒体流（容器原生顺序）
    pub streams: Vec<StreamInfo>,
}

/// 通用可读设备抽象
///
/// 内存流、自定义协议实现等非文件/URL 的输入走这个接口
pub trait MediaIo: Read + Seek + Send {
    /// 是否支持 seek
    fn is_seekable(&self) -> bool {
        true
    }

    /// 获取描述信息（用于调试）
    fn description(&self) -> String {
        "设备流".to_string()
    }
}

/// 媒体输入源类型
pub enum MediaInput {
    /// 本地文件路径
    LocalFile(PathBuf),

    /// 网络流 URL
    NetworkStream {
        url: String,
        protocol: StreamProtocol,
    },

    /// 通用可读设备（内存流、自定义协议等）
    Device(Box<dyn MediaIo>),
}

impl MediaInput {
    /// 从 URL 字符串解析媒体输入
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        if url.starts_with("rtsp://") {
            Ok(MediaInput::NetworkStream {
                url: url.to_string(),
                protocol: StreamProtocol::RTSP,
            })
        } else if url.starts_with("rtmp://") {
            Ok(MediaInput::NetworkStream {
                url: url.to_string(),
                protocol: StreamProtocol::RTMP,
            })
        } else if url.ends_with(".m3u8") || url.contains("/hls/") {
            Ok(MediaInput::NetworkStream {
                url: url.to_string(),
                protocol: StreamProtocol::HLS,
            })
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Ok(MediaInput::NetworkStream {
                url: url.to_string(),
                protocol: StreamProtocol::HTTP,
            })
        } else {
            // 默认当作本地文件
            Ok(MediaInput::LocalFile(PathBuf::from(url)))
        }
    }

    /// 判断是否为网络流
    pub fn is_network_stream(&self) -> bool {
        matches!(self, MediaInput::NetworkStream { .. })
    }

    /// 文件名 / URL（设备流返回描述）
    pub fn file_name(&self) -> String {
        match self {
            MediaInput::LocalFile(path) => path.to_string_lossy().to_string(),
            MediaInput::NetworkStream { url, .. } => url.clone(),
            MediaInput::Device(io) => io.description(),
        }
    }
}

impl fmt::Debug for MediaInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaInput::LocalFile(path) => f.debug_tuple("LocalFile").field(path).finish(),
            MediaInput::NetworkStream { url, protocol } => f
                .debug_struct("NetworkStream")
                .field("url", url)
                .field("protocol", protocol)
                .finish(),
            MediaInput::Device(io) => f.debug_tuple("Device").field(&io.description()).finish(),
        }
    }
}

/// 流媒体协议类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamProtocol {
    /// RTSP - 实时流协议（监控摄像头）
    RTSP,
    /// RTMP - 实时消息协议（直播流）
    RTMP,
    /// HLS - HTTP Live Streaming
    HLS,
    /// HTTP - 普通 HTTP 流
    HTTP,
}

impl StreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamProtocol::RTSP => "RTSP",
            StreamProtocol::RTMP => "RTMP",
            StreamProtocol::HLS => "HLS",
            StreamProtocol::HTTP => "HTTP",
        }
    }
}

/// 支持的输入协议（不完整，静态列表）
pub fn supported_protocols() -> &'static [&'static str] {
    &[
        "file", "http", "https", "rtsp", "rtmp", "rtp", "udp", "tcp", "hls", "concat",
    ]
}
