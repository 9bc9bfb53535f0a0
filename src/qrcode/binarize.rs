// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 二值化 (Binarization)
//!
//! 灰度: Y = 0.299*R + 0.587*G + 0.114*B, 定点运算 (与 OpenCV BGR2GRAY 一致)
//! 阈值: 11x11 高斯加权邻域均值 - 2, 边界复制
//!
//! 模块边长超过约 10 像素时, 黑色模块内部与邻域均值相等而被置白, 符号无法解码.
//! 检测框应对应适配后帧中的正常尺寸 QR 码.

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::filter::separable_filter_equal;

/// 邻域大小 (奇数)
pub const BLOCK_SIZE: usize = 11;
/// 从邻域均值中减去的常数
pub const OFFSET: i32 = 2;

const GRAY_SHIFT: u32 = 14;
const COEF_R: u32 = 4899;
const COEF_G: u32 = 9617;
const COEF_B: u32 = 1868;

/// RGB → 灰度
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (dst, src) in gray.pixels_mut().zip(image.pixels()) {
        let [r, g, b] = src.0;
        let y = (r as u32 * COEF_R + g as u32 * COEF_G + b as u32 * COEF_B
            + (1 << (GRAY_SHIFT - 1)))
            >> GRAY_SHIFT;
        dst.0 = [y as u8];
    }
    gray
}

/// 归一化一维高斯核, sigma = 0.3 * ((ksize - 1) * 0.5 - 1) + 0.8
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize / 2) as f32;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// 高斯自适应阈值: src > round(mean) - offset → 255, 否则 0
pub fn adaptive_threshold_gaussian(gray: &GrayImage, block_size: usize, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let src: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([gray.get_pixel(x, y)[0] as f32]));
    let kernel = gaussian_kernel(block_size);
    let mean = separable_filter_equal(&src, &kernel);

    let mut binary = GrayImage::new(width, height);
    for ((dst, s), m) in binary.pixels_mut().zip(gray.pixels()).zip(mean.pixels()) {
        let m = m[0].round() as i32;
        dst.0 = if s[0] as i32 - m > -offset { [255] } else { [0] };
    }
    binary
}

/// 灰度化 + 高斯自适应阈值 (block 11, C 2)
pub fn image_binarization(image: &RgbImage) -> GrayImage {
    let gray = to_grayscale(image);
    adaptive_threshold_gaussian(&gray, BLOCK_SIZE, OFFSET)
}
