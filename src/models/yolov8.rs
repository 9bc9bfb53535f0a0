// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLOv8 检测模型实现
// 包含: 模型加载、letterbox 预处理、推理、后处理 (解码 + NMS)

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{s, Array, ArrayViewD, Axis, Ix3, IxDyn};
use tracing::{debug, info};

use super::Model;
use crate::detection::Detection;
use crate::error::{Error, Result};
use crate::{non_max_suppression, OrtBackend, OrtConfig, OrtEP};

/// 推理输入默认尺寸
pub const DEFAULT_IMGSZ: u32 = 640;

/// letterbox 填充值
const PAD_VALUE: f32 = 144.0 / 255.0;

#[derive(Debug, Clone)]
pub struct YOLOv8Config {
    pub model: String,
    pub imgsz: u32,
    pub conf: f32,
    pub iou: f32,
    pub ep: OrtEP,
    pub intra_threads: usize,
    pub profile: bool,
}

impl YOLOv8Config {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            imgsz: DEFAULT_IMGSZ,
            conf: 0.25,
            iou: 0.45,
            ep: OrtEP::CPU,
            intra_threads: 4,
            profile: false,
        }
    }
}

/// YOLOv8 检测模型
#[derive(Debug)]
pub struct YOLOv8 {
    engine: OrtBackend,
    conf: f32,
    iou: f32,
    profile: bool,
}

impl YOLOv8 {
    /// 加载模型, 失败返回 `Error::ModelLoad`
    pub fn new(config: YOLOv8Config) -> Result<Self> {
        let engine = OrtBackend::build(OrtConfig {
            f: config.model,
            ep: config.ep,
            image_size: (config.imgsz, config.imgsz),
            intra_threads: config.intra_threads,
        })?;

        Ok(Self {
            engine,
            conf: config.conf,
            iou: config.iou,
            profile: config.profile,
        })
    }

    pub fn height(&self) -> u32 {
        self.engine.height()
    }

    pub fn width(&self) -> u32 {
        self.engine.width()
    }

    pub fn conf(&self) -> f32 {
        self.conf
    }

    pub fn iou(&self) -> f32 {
        self.iou
    }

    pub fn preprocess(&self, x: &RgbImage) -> Array<f32, IxDyn> {
        letterbox(x, self.width(), self.height())
    }

    pub fn postprocess(&self, preds: ArrayViewD<f32>, x0: &RgbImage) -> Result<Vec<Detection>> {
        let ratio = scale_wh(
            x0.width() as f32,
            x0.height() as f32,
            self.width() as f32,
            self.height() as f32,
        )
        .0;
        decode_predictions(
            preds,
            ratio,
            (x0.width() as f32, x0.height() as f32),
            self.conf,
            self.iou,
        )
    }
}

impl Model for YOLOv8 {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let t_pre = std::time::Instant::now();
        let xs = self.preprocess(frame);
        if self.profile {
            debug!("[Model Preprocess]: {:?}", t_pre.elapsed());
        }

        let ys = self.engine.run(xs, self.profile)?;

        let t_post = std::time::Instant::now();
        let ys = self.postprocess(ys.view(), frame)?;
        if self.profile {
            debug!("[Model Postprocess]: {:?}", t_post.elapsed());
        }
        Ok(ys)
    }

    fn summary(&self) {
        info!(
            "\nSummary:\n\
            > Task: Detect\n\
            > EP: {:?}\n\
            > Height: {}, Width: {}\n\
            > conf: {}, iou: {}",
            self.engine.ep(),
            self.height(),
            self.width(),
            self.conf,
            self.iou,
        );
    }
}

/// 等比缩放: 返回 (ratio, 新宽, 新高)
pub fn scale_wh(w0: f32, h0: f32, w1: f32, h1: f32) -> (f32, f32, f32) {
    let r = (w1 / w0).min(h1 / h0);
    (r, (w0 * r).round(), (h0 * r).round())
}

/// letterbox: 等比缩放后贴在左上角, 其余填充 144/255. 输出 NCHW, RGB, [0, 1]
pub fn letterbox(x: &RgbImage, width: u32, height: u32) -> Array<f32, IxDyn> {
    let mut ys = Array::ones((1, 3, height as usize, width as usize)).into_dyn();
    ys.fill(PAD_VALUE);

    let (_, w_new, h_new) = scale_wh(
        x.width() as f32,
        x.height() as f32,
        width as f32,
        height as f32,
    );
    let w_new = (w_new as u32).clamp(1, width);
    let h_new = (h_new as u32).clamp(1, height);
    let img = imageops::resize(x, w_new, h_new, FilterType::Triangle);

    for (x, y, rgb) in img.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = rgb.0;
        ys[[0, 0, y, x]] = (r as f32) / 255.0;
        ys[[0, 1, y, x]] = (g as f32) / 255.0;
        ys[[0, 2, y, x]] = (b as f32) / 255.0;
    }
    ys
}

/// 解码 YOLOv8 检测头输出 `[1, 4 + nc, anchors]`
///
/// 坐标除以 `ratio` 还原到原图, 并裁剪到 `[0, w0] x [0, h0]`
pub fn decode_predictions(
    preds: ArrayViewD<f32>,
    ratio: f32,
    (w0, h0): (f32, f32),
    conf: f32,
    iou: f32,
) -> Result<Vec<Detection>> {
    const CXYWH_OFFSET: usize = 4;

    let shape = preds.shape().to_vec();
    let preds = preds
        .into_dimensionality::<Ix3>()
        .map_err(|_| Error::OutputShape(shape.clone()))?;
    if shape[0] != 1 || shape[1] <= CXYWH_OFFSET {
        return Err(Error::OutputShape(shape));
    }

    let anchor = preds.index_axis(Axis(0), 0);
    let mut data: Vec<Detection> = Vec::new();
    for pred in anchor.axis_iter(Axis(1)) {
        let bbox = pred.slice(s![0..CXYWH_OFFSET]);
        let clss = pred.slice(s![CXYWH_OFFSET..]);

        let Some((id, &confidence)) = clss
            .iter()
            .enumerate()
            .reduce(|max, x| if x.1 > max.1 { x } else { max })
        else {
            continue;
        };

        if confidence < conf {
            continue;
        }

        let cx = bbox[0] / ratio;
        let cy = bbox[1] / ratio;
        let w = bbox[2] / ratio;
        let h = bbox[3] / ratio;
        data.push(
            Detection::new(
                (cx - w / 2.).clamp(0., w0),
                (cy - h / 2.).clamp(0., h0),
                (cx + w / 2.).clamp(0., w0),
                (cy + h / 2.).clamp(0., h0),
                confidence,
            )
            .with_class(id),
        );
    }

    non_max_suppression(&mut data, iou);
    Ok(data)
}
