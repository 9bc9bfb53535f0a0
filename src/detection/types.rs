// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测系统数据结构定义
//! Data structures for the detection stage

// ========== 检测模型原始输出 ==========

/// 原始检测 (模型输出, 浮点像素坐标)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id: 0,
        }
    }

    pub fn with_class(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.) * self.height().max(0.)
    }

    pub fn intersection_area(&self, another: &Detection) -> f32 {
        let l = self.x1.max(another.x1);
        let r = self.x2.min(another.x2);
        let t = self.y1.max(another.y1);
        let b = self.y2.min(another.y2);
        (r - l).max(0.) * (b - t).max(0.)
    }

    pub fn iou(&self, another: &Detection) -> f32 {
        let inter = self.intersection_area(another);
        let union = self.area() + another.area() - inter;
        if union <= 0. {
            return 0.;
        }
        inter / union
    }
}

// ========== 检测框 ==========

/// 检测框 (Bounding box)
///
/// 坐标为整数像素, 原点左上角, x 向右 y 向下. 构造后几何与置信度不可变,
/// 唯一可变的是解码文本 (空字符串表示未解码), 只由 `QrCodeFinder` 写入.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundingBox {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    confidence: f32,
    qr_code: String,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, confidence: f32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            qr_code: String::new(),
        }
    }

    /// 由模型输出构造, 坐标向零截断
    pub fn from_detection(det: &Detection) -> Self {
        Self::new(
            det.x1 as i32,
            det.y1 as i32,
            det.x2 as i32,
            det.y2 as i32,
            det.confidence,
        )
    }

    /// (x1, y1, x2, y2)
    pub fn coordinates(&self) -> (i32, i32, i32, i32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn upper_left_corner(&self) -> (i32, i32) {
        (self.x1, self.y1)
    }

    pub fn lower_right_corner(&self) -> (i32, i32) {
        (self.x2, self.y2)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn set_qr_code(&mut self, qr_code: impl Into<String>) {
        self.qr_code = qr_code.into();
    }

    pub fn qr_code(&self) -> &str {
        &self.qr_code
    }

    pub fn has_qr_code(&self) -> bool {
        !self.qr_code.is_empty()
    }
}
