use thiserror::Error;

/// 错误分类码（随 error 事件上报给观察者）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoError,
    OpenTimedout,
    OpenError,
    ReadTimedout,
    ReadError,
    SeekError,
    InvalidMedia,
    NoMedia,
    UnknownError,
}

/// 解封装错误
///
/// 按阶段分组：加载期 OpenTimeout/OpenError/InvalidMedia/NoMedia，
/// 读取期 ReadTimeout/ReadError，Seek 期 SeekError。
/// 用户主动中断不是错误，走 UserInterrupted 事件
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DemuxError {
    #[error("打开媒体超时: {0}")]
    OpenTimeout(String),

    #[error("无法打开媒体: {0}")]
    OpenError(String),

    #[error("读取数据包超时: {0}")]
    ReadTimeout(String),

    #[error("读取数据包失败: {0}")]
    ReadError(String),

    #[error("Seek 失败: {0}")]
    SeekError(String),

    #[error("无效的媒体格式: {0}")]
    InvalidMedia(String),

    #[error("没有可解码的媒体流")]
    NoMedia,

    #[error("未知错误 (code={code}): {msg}")]
    Unknown { code: i32, msg: String },
}

impl DemuxError {
    /// 对应的分类码
    pub fn code(&self) -> ErrorCode {
        match self {
            DemuxError::OpenTimeout(_) => ErrorCode::OpenTimedout,
            DemuxError::OpenError(_) => ErrorCode::OpenError,
            DemuxError::ReadTimeout(_) => ErrorCode::ReadTimedout,
            DemuxError::ReadError(_) => ErrorCode::ReadError,
            DemuxError::SeekError(_) => ErrorCode::SeekError,
            DemuxError::InvalidMedia(_) => ErrorCode::InvalidMedia,
            DemuxError::NoMedia => ErrorCode::NoMedia,
            DemuxError::Unknown { .. } => ErrorCode::UnknownError,
        }
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
