// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::Parser;

use crate::models::YOLOv8Config;
use crate::OrtEP;

/// QR 码区域检测 + 解码
#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "QR 码区域检测与解码", long_about = None)]
pub struct Args {
    /// ONNX 模型路径 (YOLOv8 导出)
    #[arg(short = 'm', long = "weights", alias = "model", required = true)]
    pub model: String,

    /// 图片文件或目录
    #[arg(required = true)]
    pub source: Vec<PathBuf>,

    /// 检测帧宽度, 尺寸不一致的帧先缩放
    #[arg(long, default_value_t = 480)]
    pub width: u32,

    /// 检测帧高度
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// 置信度阈值
    #[arg(short, long, default_value_t = 0.8)]
    pub conf: f32,

    /// NMS IOU 阈值
    #[arg(long, default_value_t = 0.45)]
    pub iou: f32,

    /// 模型输入尺寸
    #[arg(long, default_value_t = 640)]
    pub imgsz: u32,

    /// 使用 CUDA (需要 `cuda` 特性)
    #[arg(long)]
    pub cuda: bool,

    /// GPU 设备号
    #[arg(long, default_value_t = 0)]
    pub device_id: i32,

    /// ORT intra-op 线程数
    #[arg(long, default_value_t = 4)]
    pub threads: usize,

    /// 只接受完整匹配该正则的 QR 码
    #[arg(short, long)]
    pub format: Option<String>,

    /// 每张图片前清空已识别集合
    #[arg(long)]
    pub reset_per_image: bool,

    /// 输出各阶段耗时
    #[arg(long)]
    pub profile: bool,
}

impl Args {
    pub fn ep(&self) -> OrtEP {
        if self.cuda {
            OrtEP::CUDA(self.device_id)
        } else {
            OrtEP::CPU
        }
    }

    pub fn yolov8_config(&self) -> YOLOv8Config {
        YOLOv8Config {
            model: self.model.clone(),
            imgsz: self.imgsz,
            conf: self.conf,
            iou: self.iou,
            ep: self.ep(),
            intra_threads: self.threads,
            profile: self.profile,
        }
    }
}
