// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! QR 码识别 (QR Code System)
//!
//! 检测框 → 裁剪副本 → 二值化 → 解码 → 格式校验 → 去重集合
//! - binarize: 灰度 + 高斯自适应阈值
//! - decoder:  QR 解码接口 (rqrr 实现)
//! - format:   格式校验策略
//! - finder:   逐框解码与去重

pub mod binarize;
pub mod decoder;
pub mod finder;
pub mod format;

pub use decoder::{RqrrDecoder, SymbolDecoder};
pub use finder::QrCodeFinder;
pub use format::{AcceptAll, FormatValidator, RegexFormat};
