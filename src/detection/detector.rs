// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 检测器 (ObjectDetector)
//! 职责: 帧 → 尺寸适配 → 模型推理 → Vec<BoundingBox>

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

use super::types::BoundingBox;
use crate::error::Result;
use crate::models::{Model, YOLOv8, YOLOv8Config};
use crate::Args;

pub struct ObjectDetector {
    model: Box<dyn Model>,
    image_width: u32,
    image_height: u32,
    conf: f32,
}

impl std::fmt::Debug for ObjectDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDetector")
            .field("image_width", &self.image_width)
            .field("image_height", &self.image_height)
            .field("conf", &self.conf)
            .finish_non_exhaustive()
    }
}

impl ObjectDetector {
    /// 加载 YOLOv8 权重. 模型加载失败时构造失败 (`Error::ModelLoad`)
    pub fn new(weights: &str, image_width: u32, image_height: u32, conf: f32) -> Result<Self> {
        let mut config = YOLOv8Config::new(weights);
        config.conf = conf;
        let model = YOLOv8::new(config)?;
        Ok(Self::with_model(model, image_width, image_height, conf))
    }

    /// 按运行参数构造 (执行设备、IOU、输入尺寸、线程数)
    pub fn from_config(args: &Args) -> Result<Self> {
        let model = YOLOv8::new(args.yolov8_config())?;
        model.summary();
        Ok(Self::with_model(model, args.width, args.height, args.conf))
    }

    /// 使用任意检测后端
    pub fn with_model(
        model: impl Model + 'static,
        image_width: u32,
        image_height: u32,
        conf: f32,
    ) -> Self {
        Self {
            model: Box::new(model),
            image_width,
            image_height,
            conf,
        }
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn conf(&self) -> f32 {
        self.conf
    }

    pub fn is_right_image_size(&self, image: &RgbImage) -> bool {
        image.dimensions() == (self.image_width, self.image_height)
    }

    /// 精确缩放到 (width, height), 双线性插值
    pub fn resize_image(&self, image: &RgbImage) -> RgbImage {
        imageops::resize(
            image,
            self.image_width,
            self.image_height,
            FilterType::Triangle,
        )
    }

    /// 尺寸一致时借用原帧, 否则返回缩放后的副本
    pub fn fit_frame<'a>(&self, image: &'a RgbImage) -> Cow<'a, RgbImage> {
        if self.is_right_image_size(image) {
            Cow::Borrowed(image)
        } else {
            debug!(
                "帧尺寸 {:?} → ({}, {})",
                image.dimensions(),
                self.image_width,
                self.image_height
            );
            Cow::Owned(self.resize_image(image))
        }
    }

    /// 检测候选区域. 坐标属于 (width, height) 尺寸的帧, 顺序不固定
    pub fn find_objects(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>> {
        let image = self.fit_frame(image);
        let detections = self.model.infer(&image)?;

        let bounding_boxes: Vec<BoundingBox> = detections
            .iter()
            .filter(|det| det.confidence >= self.conf)
            .map(BoundingBox::from_detection)
            .collect();
        debug!("检测到 {} 个候选区域", bounding_boxes.len());
        Ok(bounding_boxes)
    }
}
