// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! QR 码批量扫描
//!
//! 对每张图片: 检测候选区域 → 逐框解码 → 去重
//! 结束后按字典序输出全部 QR 码, 每行一个

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageFormat;
use mimalloc::MiMalloc;
use qr_box_scanner::{Args, Pipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let frames = collect_frames(&args.source)?;
    info!("📦 模型: {}", args.model);
    info!("🖼️ 待处理图片: {}", frames.len());

    let mut pipeline = Pipeline::from_config(&args).context("failed to build pipeline")?;

    for path in &frames {
        if args.reset_per_image {
            pipeline.clear_qr_codes();
        }

        let frame = match image::open(path) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                warn!("⚠️ 跳过 {}: {}", path.display(), e);
                continue;
            }
        };

        let boxes = pipeline
            .scan(&frame)
            .with_context(|| format!("scan failed: {}", path.display()))?;
        info!("{}: {} 个候选区域", path.display(), boxes.len());
        for bbox in boxes.iter().filter(|b| b.has_qr_code()) {
            let (x1, y1, x2, y2) = bbox.coordinates();
            info!(
                "  [{}, {}, {}, {}] {:.2} → {}",
                x1,
                y1,
                x2,
                y2,
                bbox.confidence(),
                bbox.qr_code()
            );
        }
    }

    let mut codes: Vec<&String> = pipeline.qr_codes().iter().collect();
    codes.sort();
    info!("✅ 完成: {} 帧, {} 个 QR 码", pipeline.cycles(), codes.len());
    for code in codes {
        println!("{}", code);
    }
    Ok(())
}

/// 展开目录, 只保留可识别的图片格式
fn collect_frames(sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for source in sources {
        if source.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(source)
                .with_context(|| format!("failed to read {}", source.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_image(p))
                .collect();
            entries.sort();
            frames.extend(entries);
        } else {
            frames.push(source.clone());
        }
    }
    Ok(frames)
}

fn is_image(path: &Path) -> bool {
    path.is_file() && ImageFormat::from_path(path).is_ok()
}
