// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 错误类型 (Error taxonomy)
//!
//! 解码失败 / 格式不符 不是错误: 前者用空字符串表示, 后者静默丢弃

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// 模型加载失败, 构造阶段致命
    #[error("failed to load detection model `{path}`: {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("detection inference failed: {0}")]
    Inference(#[source] BoxError),

    #[error("unexpected model output shape {0:?}, expected [1, 4 + nc, anchors]")]
    OutputShape(Vec<usize>),

    #[error("invalid QR code format pattern: {0}")]
    InvalidFormat(#[from] regex::Error),
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;
