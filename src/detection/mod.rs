// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测系统 (Detection System)
//!
//! 负责在帧中寻找 QR 码候选区域
//! - ObjectDetector: 尺寸适配 + 模型推理 + 置信度过滤
//! - types:          检测框与原始检测

pub mod detector;
pub mod types;

pub use detector::ObjectDetector;
pub use types::{BoundingBox, Detection};
