//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the individual pipeline stages behind [`RetinaParser`]:
//! the confidence filter, both suppression strategies and the output
//! assembler. Most users should prefer `RetinaParser::parse`.
//!
//! [`RetinaParser`]: crate::RetinaParser

pub use crate::candidate::filter::filter_candidates;
pub use crate::candidate::nms::{nms_anchor_order, nms_score_order, suppress};
pub use crate::geometry::overlaps;
pub use crate::output::{assemble, AssemblyParams};
pub use crate::tensor::{BoxView, LandmarkView, ProbView};
