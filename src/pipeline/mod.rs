// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测 → 解码 流水线 (QR Scan Pipeline)
//!
//! 单线程, 每个周期处理一帧并跑完才进入下一周期:
//! - 帧尺寸适配 (一次)
//! - ObjectDetector: 候选区域
//! - QrCodeFinder:   逐框解码, 结果写回检测框并进入去重集合
//!
//! 检测与解码使用同一张适配后的帧, 检测框坐标与裁剪坐标属于同一像素空间.

use std::collections::HashSet;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info};

use crate::detection::{BoundingBox, ObjectDetector};
use crate::error::Result;
use crate::qrcode::{QrCodeFinder, RegexFormat};
use crate::Args;

#[derive(Debug)]
pub struct Pipeline {
    detector: ObjectDetector,
    finder: QrCodeFinder,
    cycles: u64,
}

impl Pipeline {
    pub fn new(detector: ObjectDetector, finder: QrCodeFinder) -> Self {
        Self {
            detector,
            finder,
            cycles: 0,
        }
    }

    /// 按运行参数构造: YOLOv8 检测器 + rqrr 解码 (+ 可选正则格式)
    pub fn from_config(args: &Args) -> Result<Self> {
        let detector = ObjectDetector::from_config(args)?;
        let finder = match &args.format {
            Some(pattern) => {
                let format = RegexFormat::new(pattern)?;
                info!("📐 QR 码格式: {}", format.as_str());
                QrCodeFinder::new().with_format(format)
            }
            None => QrCodeFinder::new(),
        };
        info!(
            "🚀 流水线就绪: 帧 {}x{}, conf {}",
            detector.image_width(),
            detector.image_height(),
            detector.conf()
        );
        Ok(Self::new(detector, finder))
    }

    /// 处理一帧, 返回带解码结果的检测框 (坐标属于适配后的帧)
    pub fn scan(&mut self, frame: &RgbImage) -> Result<Vec<BoundingBox>> {
        let t = Instant::now();
        let frame = self.detector.fit_frame(frame);
        let mut boxes = self.detector.find_objects(&frame)?;
        let decoded = self.finder.find_qr_codes(&frame, &mut boxes);

        self.cycles += 1;
        debug!(
            "[Cycle {}] 候选 {}, 解码 {}, 累计 {}, 耗时 {:?}",
            self.cycles,
            boxes.len(),
            decoded,
            self.finder.qr_codes().len(),
            t.elapsed()
        );
        Ok(boxes)
    }

    pub fn qr_codes(&self) -> &HashSet<String> {
        self.finder.qr_codes()
    }

    pub fn clear_qr_codes(&mut self) {
        self.finder.clear_qr_codes();
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn detector(&self) -> &ObjectDetector {
        &self.detector
    }

    pub fn finder(&self) -> &QrCodeFinder {
        &self.finder
    }
}
