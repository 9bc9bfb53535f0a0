// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 运行参数
pub mod detection; // 目标检测 (候选区域)
pub mod error; // 错误类型
pub mod models; // 模型接口与具体实现
pub mod pipeline; // 检测 → 解码 流水线
pub mod qrcode; // QR 码预处理、解码、格式校验与去重

pub mod ort_backend;

pub use crate::config::Args;
pub use crate::detection::{BoundingBox, Detection, ObjectDetector};
pub use crate::error::{Error, Result};
pub use crate::models::{Model, YOLOv8, YOLOv8Config};
pub use crate::ort_backend::{OrtBackend, OrtConfig, OrtEP};
pub use crate::pipeline::Pipeline;
pub use crate::qrcode::{
    AcceptAll, FormatValidator, QrCodeFinder, RegexFormat, RqrrDecoder, SymbolDecoder,
};

/// 类别无关 NMS, 结果按置信度降序
pub fn non_max_suppression(xs: &mut Vec<Detection>, iou_threshold: f32) {
    xs.sort_by(|b1, b2| b2.confidence.total_cmp(&b1.confidence));

    let mut current_index = 0;
    for index in 0..xs.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = xs[prev_index].iou(&xs[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            xs.swap(current_index, index);
            current_index += 1;
        }
    }
    xs.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nms_keeps_best_of_overlap() {
        let mut xs = vec![
            Detection::new(0., 0., 10., 10., 0.6),
            Detection::new(1., 1., 11., 11., 0.9),
            Detection::new(50., 50., 60., 60., 0.3),
        ];
        non_max_suppression(&mut xs, 0.45);
        assert_eq!(xs.len(), 2);
        assert_eq!(xs[0].confidence, 0.9);
        assert_eq!(xs[1].confidence, 0.3);
    }

    #[test]
    fn test_nms_empty() {
        let mut xs: Vec<Detection> = Vec::new();
        non_max_suppression(&mut xs, 0.45);
        assert!(xs.is_empty());
    }
}
