#![cfg(feature = "backend-tract")]

use std::path::Path;

use image::imageops::{self, FilterType};
use tract_onnx::prelude::*;

use crate::delegate::Delegate;
use crate::detect::backend::{BackendProvider, DetectorBackend};
use crate::detect::decode::{decode_rows, decode_ssd, ROW_WIDTH};
use crate::detect::labels::LabelMap;
use crate::detect::result::Detection;
use crate::error::{BenchError, Result};
use crate::frame::Image;
use crate::options::{DetectorOptions, InputSpec, TensorLayout};

type Plan = TypedRunnableModel<TypedModel>;

/// Catch-all provider: any path not claimed by an earlier provider is
/// treated as an ONNX model. tract only executes on the CPU.
pub struct TractProvider;

impl BackendProvider for TractProvider {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn accepts(&self, _model_path: &Path) -> bool {
        true
    }

    fn supports(&self, delegate: Delegate) -> bool {
        matches!(delegate, Delegate::Cpu)
    }

    fn create(&self, options: &DetectorOptions) -> Result<Box<dyn DetectorBackend>> {
        let settings = &options.settings;
        let backend = TractBackend::new(
            &options.base_options.model_asset_path,
            settings.input,
            settings.label_map,
        )?;
        Ok(Box::new(backend))
    }
}

/// Tract-based backend for ONNX inference.
///
/// The model is loaded and optimized once; each `detect` call resizes the
/// image to the model input, runs the plan and decodes the outputs.
pub struct TractBackend {
    model: Plan,
    input: InputSpec,
    labels: LabelMap,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, input: InputSpec, labels: LabelMap) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.is_file() {
            return Err(BenchError::ModelNotFound(model_path.to_path_buf()));
        }
        let config_err = |stage: &str, e: TractError| {
            BenchError::Config(format!("{stage} {}: {e:#}", model_path.display()))
        };
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(|e| config_err("failed to load ONNX model from", e))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), input_shape(input)),
            )
            .map_err(|e| config_err("failed to set input fact for", e))?
            .into_optimized()
            .map_err(|e| config_err("failed to optimize", e))?
            .into_runnable()
            .map_err(|e| config_err("failed to build runnable plan for", e))?;

        log::debug!(
            "loaded {} ({}x{} {:?}, {:?} labels)",
            model_path.display(),
            input.width,
            input.height,
            input.layout,
            labels
        );
        Ok(Self {
            model,
            input,
            labels,
        })
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn delegate(&self) -> Delegate {
        Delegate::Cpu
    }

    fn detect(&mut self, image: &Image) -> Result<Vec<Detection>> {
        let input = input_tensor(image, self.input);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| BenchError::Inference(format!("{e:#}")))?;
        decode_outputs(&outputs, image.width(), image.height(), self.labels)
    }

    fn warm_up(&mut self) -> Result<()> {
        let zeros = Tensor::zero::<f32>(&input_shape(self.input))
            .map_err(|e| BenchError::Inference(format!("{e:#}")))?;
        self.model
            .run(tvec!(zeros.into()))
            .map_err(|e| BenchError::Inference(format!("warm-up run failed: {e:#}")))?;
        Ok(())
    }
}

/// Resize `image` to the model input and scale pixels to `[0, 1]`, packed
/// in the requested layout.
pub fn input_tensor(image: &Image, input: InputSpec) -> Tensor {
    let resized = imageops::resize(image.as_rgb(), input.width, input.height, FilterType::Triangle);
    let raw = resized.as_raw();
    let (w, h) = (input.width as usize, input.height as usize);
    let px = move |y: usize, x: usize, channel: usize| raw[(y * w + x) * 3 + channel] as f32 / 255.0;

    match input.layout {
        TensorLayout::Nchw => {
            tract_ndarray::Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| px(y, x, c))
                .into_tensor()
        }
        TensorLayout::Nhwc => {
            tract_ndarray::Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| px(y, x, c))
                .into_tensor()
        }
    }
}

/// Decode model outputs by count: one `[1, N, 6]` row tensor, or the four
/// SSD tensors (extra outputs are ignored).
pub fn decode_outputs(
    outputs: &[TValue],
    image_width: u32,
    image_height: u32,
    labels: LabelMap,
) -> Result<Vec<Detection>> {
    match outputs.len() {
        1 => {
            if outputs[0].shape().last() != Some(&ROW_WIDTH) {
                return Err(BenchError::Inference(format!(
                    "expected [1, N, {}] output, got {:?}",
                    ROW_WIDTH,
                    outputs[0].shape()
                )));
            }
            let rows = f32_values(&outputs[0])?;
            decode_rows(&rows, image_width, image_height, labels)
        }
        n if n >= 4 => {
            let boxes = f32_values(&outputs[0])?;
            let classes = f32_values(&outputs[1])?;
            let scores = f32_values(&outputs[2])?;
            let count = f32_values(&outputs[3])?
                .first()
                .map(|c| c.max(0.0) as usize)
                .unwrap_or(scores.len());
            decode_ssd(&boxes, &classes, &scores, count, image_width, image_height, labels)
        }
        n => Err(BenchError::Inference(format!(
            "unsupported detection output layout: {n} tensors"
        ))),
    }
}

fn input_shape(input: InputSpec) -> TVec<usize> {
    let (w, h) = (input.width as usize, input.height as usize);
    match input.layout {
        TensorLayout::Nchw => tvec!(1, 3, h, w),
        TensorLayout::Nhwc => tvec!(1, h, w, 3),
    }
}

fn f32_values(value: &TValue) -> Result<Vec<f32>> {
    let cast = value
        .cast_to::<f32>()
        .map_err(|e| BenchError::Inference(format!("output tensor is not numeric: {e:#}")))?;
    let slice = cast
        .as_slice::<f32>()
        .map_err(|e| BenchError::Inference(format!("{e:#}")))?;
    Ok(slice.to_vec())
}
