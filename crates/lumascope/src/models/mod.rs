//! Domain models
//!
//! Typed representations of the data flowing through the service: the decoded
//! image tensor handed over by the host runtime, the histogram report produced
//! by the analysis engine, and the host-facing analyze request/output pair.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// A decoded image as a dense tensor of normalized `[0.0, 1.0]` samples.
///
/// The canonical layout is `height x width x channel` (channels last) with an
/// optional leading batch dimension, matching what image-producing graph
/// runtimes emit. Channel-first buffers (`channel x height x width`) are
/// accepted and reordered transparently by the accessors. The channel axis
/// must be 3 (RGB) or 4 (RGBA); alpha is carried but ignored by analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl ImageTensor {
    /// Build a tensor from an explicit shape and sample buffer.
    ///
    /// Accepts rank 3 (`h x w x c` or `c x h x w`) or rank 4 (leading batch
    /// dimension). Fails on zero-sized dimensions, a data length that does not
    /// match the shape product, or the absence of a 3/4-wide channel axis.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> AppResult<Self> {
        if shape.len() != 3 && shape.len() != 4 {
            return Err(AppError::invalid_shape(format!(
                "expected a rank 3 or 4 tensor, got rank {}",
                shape.len()
            )));
        }
        if shape.contains(&0) {
            return Err(AppError::invalid_shape(format!(
                "zero-sized dimension in shape {shape:?}"
            )));
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(AppError::invalid_shape(format!(
                "shape {shape:?} implies {expected} samples, buffer holds {}",
                data.len()
            )));
        }
        let image_dims = if shape.len() == 4 { &shape[1..] } else { &shape[..] };
        if !matches!(image_dims[2], 3 | 4) && !matches!(image_dims[0], 3 | 4) {
            return Err(AppError::invalid_shape(format!(
                "no channel axis of width 3 or 4 in shape {shape:?}"
            )));
        }
        Ok(Self { shape, data })
    }

    /// Convenience constructor for a channels-last single image.
    pub fn from_pixels(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> AppResult<Self> {
        Self::new(vec![height, width, channels], data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of images stacked along the leading dimension (1 for rank 3).
    pub fn batch_len(&self) -> usize {
        if self.shape.len() == 4 { self.shape[0] } else { 1 }
    }

    /// The single-image dims, with a redundant leading batch axis collapsed.
    fn image_shape(&self) -> &[usize] {
        if self.shape.len() == 4 { &self.shape[1..] } else { &self.shape }
    }

    /// A buffer is treated as channel-first only when its innermost axis
    /// cannot be a channel axis and its outermost can. Channels-last wins the
    /// ambiguous cases, so tiny images like 2x2x3 are never misread.
    fn channel_first(&self) -> bool {
        let dims = self.image_shape();
        !matches!(dims[2], 3 | 4) && matches!(dims[0], 3 | 4)
    }

    /// `(height, width, channels)` of the single-image, channels-last view.
    pub fn logical_dims(&self) -> (usize, usize, usize) {
        let dims = self.image_shape();
        if self.channel_first() {
            (dims[1], dims[2], dims[0])
        } else {
            (dims[0], dims[1], dims[2])
        }
    }

    /// Read one sample from the single-image, channels-last view.
    ///
    /// Callers must have rejected multi-image batches first; for rank-4
    /// tensors this reads the first image.
    pub fn sample(&self, y: usize, x: usize, c: usize) -> f32 {
        let dims = self.image_shape();
        let index = if self.channel_first() {
            (c * dims[1] + y) * dims[2] + x
        } else {
            (y * dims[1] + x) * dims[2] + c
        };
        self.data[index]
    }
}

/// Summary statistics over one quantized 8-bit channel.
///
/// Field names are part of the wire contract consumed by the histogram
/// viewer, hence the camelCase rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub median: u32,
    pub std_dev: f64,
    pub mode: u32,
    pub dynamic_range: u32,
}

/// 256-bucket histograms for the four analyzed planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelHistograms {
    pub luminance: Vec<u32>,
    pub red: Vec<u32>,
    pub green: Vec<u32>,
    pub blue: Vec<u32>,
}

/// Per-channel summary statistics for the four analyzed planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelStatsSet {
    pub luminance: ChannelStats,
    pub red: ChannelStats,
    pub green: ChannelStats,
    pub blue: ChannelStats,
}

/// Full output of the statistics engine for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistogramReport {
    pub histograms: ChannelHistograms,
    pub stats: ChannelStatsSet,
}

/// Workflow identity attached to an analyze call by the host runtime.
#[derive(Debug, Clone, Default)]
pub struct WorkflowMetadata {
    pub workflow: WorkflowInfo,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowInfo {
    pub id: Option<String>,
}

/// One analysis invocation as handed over by the host runtime.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    /// Opaque version tag forwarded by the invoking node, logged only.
    pub version: String,
    pub image: ImageTensor,
    pub workflow_metadata: Option<WorkflowMetadata>,
    pub node_id: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(image: ImageTensor) -> Self {
        Self {
            version: "init".to_string(),
            image,
            workflow_metadata: None,
            node_id: None,
        }
    }

    pub fn with_workflow_id<S: Into<String>>(mut self, id: S) -> Self {
        self.workflow_metadata = Some(WorkflowMetadata {
            workflow: WorkflowInfo {
                id: Some(id.into()),
            },
        });
        self
    }

    pub fn with_node_id<S: Into<String>>(mut self, id: S) -> Self {
        self.node_id = Some(id.into());
        self
    }
}

/// Side-channel metadata for the invoking UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiMetadata {
    pub cache_key: String,
    pub message: String,
}

/// Result of one analysis step: UI metadata plus the serialized stats record.
#[derive(Debug, Clone)]
pub struct AnalyzeOutput {
    pub ui: UiMetadata,
    /// The `stats` portion of the report, pretty-printed JSON.
    pub result: String,
}
