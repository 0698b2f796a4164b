//! Borrowed typed views over flat layer buffers.
//!
//! Views never copy the backing buffer. Each `get` materializes a small value
//! record from the `stride` floats belonging to one candidate index.

use super::{LayerInfo, LayerNames, TensorOutputs};
use crate::candidate::ClassProbabilities;
use crate::geometry::{BoundingBox, Landmark, NUM_LANDMARKS};
use crate::trace::trace_span;
use crate::util::{RetinaParseError, RetinaParseResult};

const BOX_STRIDE: usize = 4;
const PROB_STRIDE: usize = 2;

fn required_len(layer: &LayerInfo<'_>, stride: usize) -> RetinaParseResult<usize> {
    layer
        .num_elements()
        .checked_mul(stride)
        .ok_or(RetinaParseError::InvalidInput("layer element count overflows"))
}

/// Returns the first `num_elements * stride` floats of `layer`.
fn records<'a>(layer: &LayerInfo<'a>, stride: usize) -> RetinaParseResult<&'a [f32]> {
    if let Some(got) = layer.record_len().filter(|&got| got != stride) {
        return Err(RetinaParseError::RecordLengthMismatch {
            layer: layer.name().to_string(),
            expected: stride,
            got,
        });
    }
    let needed = required_len(layer, stride)?;
    let data = layer.data();
    data.get(..needed)
        .ok_or_else(|| RetinaParseError::BufferTooSmall {
            layer: layer.name().to_string(),
            needed,
            got: data.len(),
        })
}

fn find<'o, 'a>(
    outputs: &'o TensorOutputs<'a>,
    name: &str,
) -> RetinaParseResult<&'o LayerInfo<'a>> {
    outputs
        .layer(name)
        .ok_or_else(|| RetinaParseError::MissingLayer {
            name: name.to_string(),
        })
}

/// Box records `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug)]
pub struct BoxView<'a> {
    data: &'a [f32],
}

impl<'a> BoxView<'a> {
    /// Views `data` as consecutive boxes; trailing partial records are ignored.
    pub fn from_slice(data: &'a [f32]) -> Self {
        let len = data.len() / BOX_STRIDE * BOX_STRIDE;
        Self { data: &data[..len] }
    }

    /// Number of boxes.
    pub fn len(&self) -> usize {
        self.data.len() / BOX_STRIDE
    }

    /// Returns true if the view holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns box `index` if it is within bounds.
    pub fn get(&self, index: usize) -> Option<BoundingBox> {
        let start = index.checked_mul(BOX_STRIDE)?;
        let c = self.data.get(start..start.checked_add(BOX_STRIDE)?)?;
        Some(BoundingBox::from_corners([c[0], c[1], c[2], c[3]]))
    }

    /// Iterates over all boxes in index order.
    pub fn iter(&self) -> impl Iterator<Item = BoundingBox> + 'a {
        self.data
            .chunks_exact(BOX_STRIDE)
            .map(|c| BoundingBox::from_corners([c[0], c[1], c[2], c[3]]))
    }
}

/// Class probability records `[background, foreground]`.
#[derive(Clone, Copy, Debug)]
pub struct ProbView<'a> {
    data: &'a [f32],
}

impl<'a> ProbView<'a> {
    /// Views `data` as consecutive probability pairs.
    pub fn from_slice(data: &'a [f32]) -> Self {
        let len = data.len() / PROB_STRIDE * PROB_STRIDE;
        Self { data: &data[..len] }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len() / PROB_STRIDE
    }

    /// Returns true if the view holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns record `index` if it is within bounds.
    pub fn get(&self, index: usize) -> Option<ClassProbabilities> {
        let start = index.checked_mul(PROB_STRIDE)?;
        let c = self.data.get(start..start.checked_add(PROB_STRIDE)?)?;
        Some(ClassProbabilities::new(c[0], c[1]))
    }

    /// Iterates over all records in index order.
    pub fn iter(&self) -> impl Iterator<Item = ClassProbabilities> + 'a {
        self.data
            .chunks_exact(PROB_STRIDE)
            .map(|c| ClassProbabilities::new(c[0], c[1]))
    }
}

/// Landmark records of `K` interleaved points.
#[derive(Clone, Copy, Debug)]
pub struct LandmarkView<'a, const K: usize> {
    data: &'a [f32],
}

impl<'a, const K: usize> LandmarkView<'a, K> {
    const STRIDE: usize = 2 * K;

    /// Views `data` as consecutive landmark sets.
    pub fn from_slice(data: &'a [f32]) -> Self {
        let len = data.len().checked_div(Self::STRIDE).unwrap_or(0) * Self::STRIDE;
        Self { data: &data[..len] }
    }

    /// Number of landmark sets.
    pub fn len(&self) -> usize {
        self.data.len().checked_div(Self::STRIDE).unwrap_or(0)
    }

    /// Returns true if the view holds no landmark sets.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns landmark set `index` if it is within bounds.
    pub fn get(&self, index: usize) -> Option<Landmark<K>> {
        let start = index.checked_mul(Self::STRIDE)?;
        let coords = self.data.get(start..start.checked_add(Self::STRIDE)?)?;
        Landmark::from_interleaved(coords)
    }
}

/// The three decoder inputs for one frame, indexed by a shared candidate index.
#[derive(Clone, Copy, Debug)]
pub struct TensorViews<'a, const K: usize = NUM_LANDMARKS> {
    pub boxes: BoxView<'a>,
    pub probs: ProbView<'a>,
    pub landmarks: LandmarkView<'a, K>,
}

impl<'a, const K: usize> TensorViews<'a, K> {
    /// Locates the named layers and builds views over them.
    ///
    /// Fails with `MissingLayer` if any layer is absent, `CountMismatch` if the
    /// class or landmark layer declares a different element count than the box
    /// layer, `RecordLengthMismatch` if a layer reports the wrong number of
    /// values per record, and `BufferTooSmall` if a buffer cannot hold its
    /// declared count.
    pub fn decode(outputs: &TensorOutputs<'a>, names: &LayerNames) -> RetinaParseResult<Self> {
        let bbox_layer = find(outputs, &names.bboxes)?;
        let class_layer = find(outputs, &names.classes)?;
        let landmark_layer = find(outputs, &names.landmarks)?;

        let count = bbox_layer.num_elements();
        let _span = trace_span!("decode", candidates = count).entered();
        for layer in [landmark_layer, class_layer] {
            if layer.num_elements() != count {
                return Err(RetinaParseError::CountMismatch {
                    layer: layer.name().to_string(),
                    expected: count,
                    got: layer.num_elements(),
                });
            }
        }

        Ok(Self {
            boxes: BoxView::from_slice(records(bbox_layer, BOX_STRIDE)?),
            probs: ProbView::from_slice(records(class_layer, PROB_STRIDE)?),
            landmarks: LandmarkView::from_slice(records(landmark_layer, 2 * K)?),
        })
    }

    /// Number of candidates shared by all three views.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
