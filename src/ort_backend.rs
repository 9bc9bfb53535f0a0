// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX Runtime 推理后端
//!
//! 只负责会话构建与执行, 预处理/后处理在 `models` 中完成

use std::path::Path;

use anyhow::Context;
use ndarray::{Array, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// 执行设备 (Execution Provider)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrtEP {
    #[default]
    CPU,
    CUDA(i32),
}

#[derive(Debug, Clone)]
pub struct OrtConfig {
    pub f: String,
    pub ep: OrtEP,
    pub image_size: (u32, u32), // (height, width)
    pub intra_threads: usize,
}

pub struct OrtBackend {
    session: Session,
    input_name: String,
    ep: OrtEP,
    height: u32,
    width: u32,
}

impl std::fmt::Debug for OrtBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtBackend")
            .field("input_name", &self.input_name)
            .field("ep", &self.ep)
            .field("height", &self.height)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

impl OrtBackend {
    /// 加载模型, 失败即返回 `Error::ModelLoad`
    pub fn build(config: OrtConfig) -> Result<Self> {
        let path = config.f.clone();
        let (session, ep) = Self::commit(&config).map_err(|e| Error::ModelLoad {
            path,
            source: e.into(),
        })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());
        debug!("模型输入: {}, 输出数: {}", input_name, session.outputs.len());

        let (height, width) = config.image_size;
        info!("✅ 检测模型加载成功: {} ({:?})", config.f, ep);

        Ok(Self {
            session,
            input_name,
            ep,
            height,
            width,
        })
    }

    fn commit(config: &OrtConfig) -> anyhow::Result<(Session, OrtEP)> {
        let model_path = Path::new(&config.f);
        if !model_path.exists() {
            anyhow::bail!("model file not found: {}", model_path.display());
        }

        #[cfg(feature = "cuda")]
        if let OrtEP::CUDA(device_id) = config.ep {
            use ort::execution_providers::CUDAExecutionProvider;

            let cuda = Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build()])
                .context("Failed to set CUDA execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(config.intra_threads)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path);
            match cuda {
                Ok(session) => return Ok((session, config.ep)),
                Err(e) => warn!("⚠️ CUDA 初始化失败, 回退到 CPU: {}", e),
            }
        }

        #[cfg(not(feature = "cuda"))]
        if let OrtEP::CUDA(_) = config.ep {
            warn!("⚠️ 未启用 `cuda` 特性, 使用 CPU 推理");
        }

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
        Ok((session, OrtEP::CPU))
    }

    /// 同步推理, 返回第一个输出张量 (检测头)
    pub fn run(&mut self, xs: Array<f32, IxDyn>, profile: bool) -> Result<Array<f32, IxDyn>> {
        let t = std::time::Instant::now();
        let ys = self
            .forward(xs)
            .map_err(|e| Error::Inference(e.into()))?;
        if profile {
            debug!("[ORT Inference]: {:?}", t.elapsed());
        }
        Ok(ys)
    }

    fn forward(&mut self, xs: Array<f32, IxDyn>) -> anyhow::Result<Array<f32, IxDyn>> {
        let input = Value::from_array(xs).context("Failed to create input tensor")?;
        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input])
            .context("Session run failed")?;

        let y = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        Ok(y.into_owned())
    }

    pub fn ep(&self) -> OrtEP {
        self.ep
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}
