//! retinaparse turns raw RetinaFace output tensors into final face detections.
//!
//! The crate reads the `bboxes`, `classes` and `landmarks` layers of one
//! inference result as borrowed views, keeps candidates above a confidence
//! threshold, collapses overlapping candidates with greedy IoU suppression,
//! and returns padded pixel-space boxes with optional landmarks. Optional
//! batch parallelism is available via the `rayon` feature and structured
//! spans via the `tracing` feature.

mod candidate;
pub mod geometry;
pub mod lowlevel;
pub mod output;
mod parser;
pub mod tensor;
mod trace;
pub mod util;

pub use candidate::nms::SuppressionMode;
pub use candidate::{Candidate, ClassProbabilities};
pub use geometry::{BoundingBox, Landmark, Landmark5, Point2D, NUM_LANDMARKS};
pub use output::{DetectionKind, DetectionOutput, NetworkInfo, PixelRect};
pub use parser::{
    ParserConfig, RetinaParser, DEFAULT_CLASS_THRESHOLD, NMS_IOU_THRESHOLD, PADDING_FACTOR,
};
pub use tensor::{LayerInfo, LayerNames, TensorOutputs, TensorViews};
pub use util::{RetinaParseError, RetinaParseResult};
