// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测模型接口与实现
//!
//! # 架构说明
//!
//! `Model` 是检测提供者的最小契约: 一帧图像进, 一组原始检测出.
//! 坐标为输入帧的绝对像素坐标, 原点左上角.
//!
//! ## 完整模型实现
//! - **YOLOv8**: ONNX Runtime 推理, letterbox 预处理 + NMS 后处理
//!   - 文件: `yolov8.rs`
//!
//! 任何满足该契约的后端都可以替换 YOLOv8, 流水线无需改动.
//!
//! ## 使用示例
//! ```no_run
//! use qr_box_scanner::models::{Model, YOLOv8, YOLOv8Config};
//!
//! let mut model = YOLOv8::new(YOLOv8Config::new("models/qr-det.onnx"))?;
//! let frame = image::open("frame.png")?.to_rgb8();
//! let detections = model.infer(&frame)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use image::RgbImage;

use crate::detection::Detection;
use crate::error::Result;

/// 统一的检测模型接口
///
/// ## 核心流程
/// ```text
/// 原始帧 → preprocess → 张量 → 推理 → postprocess → Vec<Detection>
/// ```
pub trait Model {
    /// 同步推理, 返回帧坐标系下的检测结果 (不保证顺序)
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<Detection>>;

    /// 打印模型信息
    fn summary(&self);
}

pub mod yolov8;

pub use yolov8::{YOLOv8, YOLOv8Config};
