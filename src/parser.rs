//! High-level RetinaFace output parser.
//!
//! `RetinaParser` runs the full per-frame pipeline: decode the named layers,
//! keep candidates above the confidence threshold, suppress overlaps, and
//! assemble pixel-space detections. A parser holds only immutable
//! configuration, so one instance can serve any number of frames and threads.

use crate::candidate::filter::filter_candidates;
use crate::candidate::nms::{suppress, SuppressionMode};
use crate::geometry::NUM_LANDMARKS;
use crate::output::{assemble, AssemblyParams, DetectionOutput, NetworkInfo};
use crate::tensor::{LayerNames, TensorOutputs, TensorViews};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{RetinaParseError, RetinaParseResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// IoU above which two candidates belong to the same cluster.
pub const NMS_IOU_THRESHOLD: f32 = 0.2;
/// Fraction of the box extent added on each side of a face box.
pub const PADDING_FACTOR: f32 = 0.1;
/// Foreground threshold used when none is configured.
pub const DEFAULT_CLASS_THRESHOLD: f32 = 0.5;

/// Configuration for [`RetinaParser`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParserConfig {
    /// Network input resolution.
    pub network: NetworkInfo,
    /// Per-class detection thresholds; entry 0 applies to faces.
    pub class_thresholds: Vec<f32>,
    /// Cluster IoU threshold.
    pub iou_threshold: f32,
    /// Box padding factor (0 disables padding).
    pub padding_factor: f32,
    /// Suppression strategy.
    pub suppression: SuppressionMode,
    /// Attach pixel-space landmarks to each face.
    pub attach_landmarks: bool,
    /// Emit 1x1 landmark marker detections for debugging.
    pub landmark_markers: bool,
    /// Names of the box, class and landmark layers.
    pub layer_names: LayerNames,
    /// Parse batches on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            network: NetworkInfo::default(),
            class_thresholds: vec![DEFAULT_CLASS_THRESHOLD],
            iou_threshold: NMS_IOU_THRESHOLD,
            padding_factor: PADDING_FACTOR,
            suppression: SuppressionMode::AnchorOrder,
            attach_landmarks: true,
            landmark_markers: false,
            layer_names: LayerNames::default(),
            parallel: false,
        }
    }
}

impl ParserConfig {
    /// Checks the configuration for values the pipeline cannot use.
    pub fn validate(&self) -> RetinaParseResult<()> {
        if self.network.width == 0 || self.network.height == 0 {
            return Err(RetinaParseError::InvalidInput(
                "network width and height must be positive",
            ));
        }
        let Some(threshold) = self.class_thresholds.first() else {
            return Err(RetinaParseError::InvalidInput(
                "class_thresholds must hold at least one entry",
            ));
        };
        if !threshold.is_finite() {
            return Err(RetinaParseError::InvalidInput(
                "class threshold must be finite",
            ));
        }
        if !self.iou_threshold.is_finite() {
            return Err(RetinaParseError::InvalidInput("iou_threshold must be finite"));
        }
        if !self.padding_factor.is_finite() || self.padding_factor < 0.0 {
            return Err(RetinaParseError::InvalidInput(
                "padding_factor must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Foreground threshold (class 0 entry).
    pub fn detection_threshold(&self) -> f32 {
        self.class_thresholds
            .first()
            .copied()
            .unwrap_or(DEFAULT_CLASS_THRESHOLD)
    }

    fn assembly_params(&self) -> AssemblyParams {
        AssemblyParams {
            network: self.network,
            padding_factor: self.padding_factor,
            attach_landmarks: self.attach_landmarks,
            landmark_markers: self.landmark_markers,
        }
    }
}

/// Per-frame RetinaFace post-processor.
#[derive(Clone, Debug)]
pub struct RetinaParser {
    cfg: ParserConfig,
}

impl RetinaParser {
    /// Creates a parser after validating `cfg`.
    pub fn new(cfg: ParserConfig) -> RetinaParseResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.cfg
    }

    /// Parses one frame's tensor outputs.
    ///
    /// An empty candidate set is not an error and yields an empty list.
    pub fn parse(&self, outputs: &TensorOutputs<'_>) -> RetinaParseResult<Vec<DetectionOutput>> {
        let _span = trace_span!("parse", layers = outputs.len()).entered();

        let views: TensorViews<'_, NUM_LANDMARKS> =
            TensorViews::decode(outputs, &self.cfg.layer_names)?;
        let candidates = filter_candidates(views.probs, self.cfg.detection_threshold());
        trace_event!(
            "filtered",
            total = views.len(),
            candidates = candidates.len()
        );
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let survivors = suppress(
            self.cfg.suppression,
            &candidates,
            views.boxes,
            self.cfg.iou_threshold,
        )?;
        assemble(&survivors, &views, &self.cfg.assembly_params())
    }

    /// Parses one frame into `out`, reporting success as a flag.
    ///
    /// `out` is cleared first and stays empty when the frame is dropped; the
    /// reason is logged.
    pub fn parse_into(&self, outputs: &TensorOutputs<'_>, out: &mut Vec<DetectionOutput>) -> bool {
        out.clear();
        match self.parse(outputs) {
            Ok(detections) => {
                out.extend(detections);
                true
            }
            Err(err) => {
                trace_warn!("frame_dropped", error = err.to_string().as_str());
                false
            }
        }
    }

    /// Parses independent frames, keeping frame order.
    ///
    /// With the `rayon` feature and `parallel` set, frames are spread over the
    /// rayon pool; results match sequential parsing.
    pub fn parse_batch(
        &self,
        frames: &[TensorOutputs<'_>],
    ) -> Vec<RetinaParseResult<Vec<DetectionOutput>>> {
        let _span = trace_span!("parse_batch", frames = frames.len()).entered();

        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return frames.par_iter().map(|frame| self.parse(frame)).collect();
        }

        frames.iter().map(|frame| self.parse(frame)).collect()
    }
}
