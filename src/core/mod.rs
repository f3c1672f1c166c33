// 核心数据结构和类型定义

pub mod error;
pub mod options;
pub mod types;

// 重新导出常用类型
pub use types::{MediaInput, MediaStatus, Packet, StreamType};

pub use error::*;
pub use options::*;
pub use types::*;
