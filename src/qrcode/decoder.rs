// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! QR 符号解码 (decode provider)

use image::GrayImage;
use rqrr::PreparedImage;
use tracing::trace;

/// QR 码解码接口: 二值图 → 每个成功解码符号的原始字节 (按解码器顺序)
pub trait SymbolDecoder: Send + Sync {
    fn decode(&self, image: &GrayImage) -> Vec<Vec<u8>>;
}

/// 基于 rqrr 的纯 Rust 解码器, 只识别 QR 码
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl SymbolDecoder for RqrrDecoder {
    fn decode(&self, image: &GrayImage) -> Vec<Vec<u8>> {
        let (width, height) = image.dimensions();
        let mut prepared =
            PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                image.get_pixel(x as u32, y as u32)[0]
            });

        // 定位成功但纠错失败的网格不算符号
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| {
                let mut payload = Vec::new();
                match grid.decode_to(&mut payload) {
                    Ok(_) => Some(payload),
                    Err(e) => {
                        trace!("QR 网格解码失败: {:?}", e);
                        None
                    }
                }
            })
            .collect()
    }
}
