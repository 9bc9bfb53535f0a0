// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! QR 码查找器 (QrCodeFinder)
//! 职责: 逐框裁剪 → 二值化 → 解码 → 格式校验 → 写回检测框 + 去重集合
//!
//! 每个框最多取一个 QR 码, 同一裁剪区域内的其余符号被丢弃.

use std::collections::HashSet;

use image::imageops;
use image::{GrayImage, RgbImage};
use tracing::{debug, info};

use super::binarize;
use super::decoder::{RqrrDecoder, SymbolDecoder};
use super::format::FormatValidator;
use crate::detection::BoundingBox;

pub struct QrCodeFinder {
    qr_codes: HashSet<String>,
    format: Option<Box<dyn FormatValidator>>,
    decoder: Box<dyn SymbolDecoder>,
}

impl std::fmt::Debug for QrCodeFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrCodeFinder")
            .field("qr_codes", &self.qr_codes)
            .field("format", &self.format.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for QrCodeFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrCodeFinder {
    pub fn new() -> Self {
        Self {
            qr_codes: HashSet::new(),
            format: None,
            decoder: Box::new(RqrrDecoder),
        }
    }

    pub fn with_format(mut self, format: impl FormatValidator + 'static) -> Self {
        self.format = Some(Box::new(format));
        self
    }

    pub fn with_decoder(mut self, decoder: impl SymbolDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// 已接受的 QR 码 (只读)
    pub fn qr_codes(&self) -> &HashSet<String> {
        &self.qr_codes
    }

    pub fn clear_qr_codes(&mut self) {
        self.qr_codes.clear();
    }

    pub fn image_binarization(&self, image: &RgbImage) -> GrayImage {
        binarize::image_binarization(image)
    }

    pub fn check_qr_code_format(&self, qr_code: &str) -> bool {
        match &self.format {
            Some(format) => format.check(qr_code),
            None => true,
        }
    }

    /// 按检测框复制出区域 (裁剪到帧范围内), 空区域返回 None
    pub fn crop_box(image: &RgbImage, bbox: &BoundingBox) -> Option<RgbImage> {
        let (x1, y1, x2, y2) = bbox.coordinates();
        let clamp_x = |v: i32| v.clamp(0, image.width() as i32) as u32;
        let clamp_y = |v: i32| v.clamp(0, image.height() as i32) as u32;
        let (x1, x2) = (clamp_x(x1), clamp_x(x2));
        let (y1, y2) = (clamp_y(y1), clamp_y(y2));
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1).to_image())
    }

    /// 解码框内的 QR 码, 未找到返回空字符串
    pub fn detect_and_decode_qr_code_in_box(
        &self,
        image: &RgbImage,
        bbox: &BoundingBox,
    ) -> String {
        let Some(crop) = Self::crop_box(image, bbox) else {
            return String::new();
        };
        let binary = self.image_binarization(&crop);

        // 只取第一个符号
        match self.decoder.decode(&binary).into_iter().next() {
            Some(payload) => String::from_utf8(payload).unwrap_or_else(|e| {
                debug!("QR 码内容不是 UTF-8, 忽略: {}", e);
                String::new()
            }),
            None => String::new(),
        }
    }

    /// 逐框解码, 通过校验的写入框与集合. 返回写入了 QR 码的框数
    pub fn find_qr_codes(&mut self, image: &RgbImage, boxes: &mut [BoundingBox]) -> usize {
        let mut found = 0;
        for bbox in boxes.iter_mut() {
            let qr_code = self.detect_and_decode_qr_code_in_box(image, bbox);
            if qr_code.is_empty() {
                continue;
            }
            if !self.check_qr_code_format(&qr_code) {
                debug!("QR 码格式不符, 丢弃: {}", qr_code);
                continue;
            }

            if self.qr_codes.insert(qr_code.clone()) {
                info!("🔖 新 QR 码: {}", qr_code);
            }
            bbox.set_qr_code(qr_code);
            found += 1;
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use image::Rgb;

    /// 按裁剪尺寸返回预设内容, 并记录收到的图像
    #[derive(Default)]
    struct FakeDecoder {
        by_size: HashMap<(u32, u32), Vec<Vec<u8>>>,
        seen: Arc<Mutex<Vec<GrayImage>>>,
    }

    impl FakeDecoder {
        fn with(mut self, size: (u32, u32), payloads: &[&[u8]]) -> Self {
            self.by_size
                .insert(size, payloads.iter().map(|p| p.to_vec()).collect());
            self
        }
    }

    impl SymbolDecoder for FakeDecoder {
        fn decode(&self, image: &GrayImage) -> Vec<Vec<u8>> {
            self.seen.lock().unwrap().push(image.clone());
            self.by_size
                .get(&image.dimensions())
                .cloned()
                .unwrap_or_default()
        }
    }

    fn frame() -> RgbImage {
        RgbImage::from_pixel(480, 600, Rgb([128, 128, 128]))
    }

    #[test]
    fn test_single_box_decodes() {
        let decoder = FakeDecoder::default().with((100, 100), &[b"ABC123"]);
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        let mut boxes = vec![BoundingBox::new(10, 10, 110, 110, 0.9)];

        assert_eq!(finder.find_qr_codes(&frame(), &mut boxes), 1);
        assert_eq!(boxes[0].qr_code(), "ABC123");
        assert_eq!(finder.qr_codes(), &HashSet::from(["ABC123".to_string()]));
    }

    #[test]
    fn test_duplicate_codes_collapse() {
        let decoder = FakeDecoder::default().with((50, 50), &[b"XYZ"]);
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        let mut boxes = vec![
            BoundingBox::new(0, 0, 50, 50, 0.9),
            BoundingBox::new(200, 300, 250, 350, 0.85),
        ];

        finder.find_qr_codes(&frame(), &mut boxes);
        assert_eq!(finder.qr_codes().len(), 1);
        assert!(finder.qr_codes().contains("XYZ"));
        assert!(boxes.iter().all(|b| b.qr_code() == "XYZ"));
    }

    #[test]
    fn test_format_rejection() {
        let decoder = FakeDecoder::default().with((100, 100), &[b"AB"]);
        let mut finder = QrCodeFinder::new()
            .with_decoder(decoder)
            .with_format(|s: &str| s.len() == 6);
        let mut boxes = vec![BoundingBox::new(10, 10, 110, 110, 0.9)];

        assert_eq!(finder.find_qr_codes(&frame(), &mut boxes), 0);
        assert!(finder.qr_codes().is_empty());
        assert_eq!(boxes[0].qr_code(), "");
    }

    #[test]
    fn test_reject_all_never_grows() {
        let decoder = FakeDecoder::default().with((100, 100), &[b"ABC123"]);
        let mut finder = QrCodeFinder::new()
            .with_decoder(decoder)
            .with_format(|_: &str| false);
        for _ in 0..5 {
            let mut boxes = vec![BoundingBox::new(10, 10, 110, 110, 0.9)];
            finder.find_qr_codes(&frame(), &mut boxes);
            assert!(finder.qr_codes().is_empty());
        }
    }

    #[test]
    fn test_miss_leaves_box_empty() {
        let decoder = FakeDecoder::default().with((100, 100), &[b"ABC123"]);
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        let mut boxes = vec![
            BoundingBox::new(10, 10, 110, 110, 0.9),
            BoundingBox::new(0, 0, 30, 30, 0.9),
        ];

        assert_eq!(finder.find_qr_codes(&frame(), &mut boxes), 1);
        assert_eq!(boxes[0].qr_code(), "ABC123");
        assert_eq!(boxes[1].qr_code(), "");
        assert_eq!(finder.qr_codes().len(), 1);
    }

    #[test]
    fn test_repeated_calls_are_idempotent() {
        let decoder = FakeDecoder::default()
            .with((100, 100), &[b"ONE"])
            .with((40, 40), &[b"TWO"]);
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        let image = frame();

        let mut previous = 0;
        for _ in 0..3 {
            let mut boxes = vec![
                BoundingBox::new(10, 10, 110, 110, 0.9),
                BoundingBox::new(300, 300, 340, 340, 0.9),
            ];
            finder.find_qr_codes(&image, &mut boxes);
            assert!(finder.qr_codes().len() >= previous);
            assert!(finder.qr_codes().len() <= 2);
            previous = finder.qr_codes().len();
        }
        assert_eq!(previous, 2);
    }

    #[test]
    fn test_clear() {
        let decoder = FakeDecoder::default().with((100, 100), &[b"ABC123"]);
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        finder.clear_qr_codes();
        assert!(finder.qr_codes().is_empty());

        let mut boxes = vec![BoundingBox::new(10, 10, 110, 110, 0.9)];
        finder.find_qr_codes(&frame(), &mut boxes);
        assert!(!finder.qr_codes().is_empty());
        finder.clear_qr_codes();
        assert!(finder.qr_codes().is_empty());
    }

    #[test]
    fn test_first_symbol_wins() {
        let decoder = FakeDecoder::default().with((100, 100), &[b"FIRST", b"SECOND"]);
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        let mut boxes = vec![BoundingBox::new(10, 10, 110, 110, 0.9)];

        finder.find_qr_codes(&frame(), &mut boxes);
        assert_eq!(boxes[0].qr_code(), "FIRST");
        assert!(!finder.qr_codes().contains("SECOND"));
    }

    #[test]
    fn test_invalid_utf8_is_miss() {
        let decoder = FakeDecoder::default().with((100, 100), &[&[0xff, 0xfe, 0x00]]);
        let finder = QrCodeFinder::new().with_decoder(decoder);
        let bbox = BoundingBox::new(10, 10, 110, 110, 0.9);
        assert_eq!(finder.detect_and_decode_qr_code_in_box(&frame(), &bbox), "");
    }

    #[test]
    fn test_decoder_receives_binary_crop() {
        let decoder = FakeDecoder::default();
        let seen = decoder.seen.clone();
        let finder = QrCodeFinder::new().with_decoder(decoder);
        let bbox = BoundingBox::new(10, 20, 74, 68, 0.9);

        assert_eq!(finder.detect_and_decode_qr_code_in_box(&frame(), &bbox), "");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].dimensions(), (64, 48));
        assert!(seen[0].pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_crop_is_clamped_and_copied() {
        let mut image = frame();
        image.put_pixel(0, 0, Rgb([1, 2, 3]));
        let bbox = BoundingBox::new(-10, -10, 30, 30, 0.9);
        let crop = QrCodeFinder::crop_box(&image, &bbox).unwrap();
        assert_eq!(crop.dimensions(), (30, 30));

        image.put_pixel(0, 0, Rgb([9, 9, 9]));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([1, 2, 3]));

        let past_edge = BoundingBox::new(460, 580, 520, 640, 0.9);
        let crop = QrCodeFinder::crop_box(&image, &past_edge).unwrap();
        assert_eq!(crop.dimensions(), (20, 20));
    }

    #[test]
    fn test_degenerate_box_skips_decoder() {
        let decoder = FakeDecoder::default();
        let seen = decoder.seen.clone();
        let mut finder = QrCodeFinder::new().with_decoder(decoder);
        let mut boxes = vec![
            BoundingBox::new(50, 50, 50, 80, 0.9),
            BoundingBox::new(60, 60, 40, 40, 0.9),
            BoundingBox::new(500, 700, 600, 800, 0.9),
        ];

        assert_eq!(finder.find_qr_codes(&frame(), &mut boxes), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_format_check_without_validator() {
        let finder = QrCodeFinder::new();
        assert!(finder.check_qr_code_format("anything"));
        assert!(finder.check_qr_code_format(""));
    }
}
