//! Named tensor outputs and typed views over them.
//!
//! A `TensorOutputs` collection holds the flat `f32` buffers an inference
//! engine produced for one frame, each tagged with its layer name and leading
//! dimension. `TensorViews::decode` finds the box, class and landmark layers
//! by name, checks that they agree on the number of candidates, and hands out
//! borrowed views that read one record at a time.

mod view;

pub use view::{BoxView, LandmarkView, ProbView, TensorViews};

/// Default name of the box regression layer.
pub const BBOX_LAYER: &str = "bboxes";
/// Default name of the classification layer.
pub const CLASS_LAYER: &str = "classes";
/// Default name of the landmark regression layer.
pub const LANDMARK_LAYER: &str = "landmarks";

/// Layer names used to locate the three decoder inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerNames {
    pub bboxes: String,
    pub classes: String,
    pub landmarks: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            bboxes: BBOX_LAYER.to_string(),
            classes: CLASS_LAYER.to_string(),
            landmarks: LANDMARK_LAYER.to_string(),
        }
    }
}

/// One named output layer borrowed from the inference engine.
#[derive(Clone, Copy, Debug)]
pub struct LayerInfo<'a> {
    name: &'a str,
    num_elements: usize,
    record_len: Option<usize>,
    data: &'a [f32],
}

impl<'a> LayerInfo<'a> {
    /// Creates a layer with an explicit leading dimension.
    ///
    /// `num_elements` is the number of records (the first inference
    /// dimension), not the number of floats.
    pub fn new(name: &'a str, num_elements: usize, data: &'a [f32]) -> Self {
        Self {
            name,
            num_elements,
            record_len: None,
            data,
        }
    }

    /// Creates a layer from a row-major `rows x cols` matrix.
    ///
    /// The column count is checked against the record width when the layer is
    /// decoded, so a matrix of the wrong shape is rejected instead of being
    /// read with a shifted stride.
    pub fn from_rows(name: &'a str, rows: usize, cols: usize, data: &'a [f32]) -> Self {
        Self {
            record_len: Some(cols),
            ..Self::new(name, rows, data)
        }
    }

    /// Creates a layer whose leading dimension is `data.len() / stride`.
    ///
    /// A zero `stride` yields an empty layer.
    pub fn from_flat(name: &'a str, data: &'a [f32], stride: usize) -> Self {
        let num_elements = data.len().checked_div(stride).unwrap_or(0);
        Self::new(name, num_elements, data)
    }

    /// Layer name as reported by the engine.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Declared number of records.
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// Floats per record, if the engine reported it.
    pub fn record_len(&self) -> Option<usize> {
        self.record_len
    }

    /// Backing buffer.
    pub fn data(&self) -> &'a [f32] {
        self.data
    }
}

/// Per-frame collection of named output layers.
#[derive(Clone, Debug, Default)]
pub struct TensorOutputs<'a> {
    layers: Vec<LayerInfo<'a>>,
}

impl<'a> TensorOutputs<'a> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Adds a layer and returns the collection.
    pub fn with_layer(mut self, layer: LayerInfo<'a>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Adds a layer.
    pub fn push(&mut self, layer: LayerInfo<'a>) {
        self.layers.push(layer);
    }

    /// Returns the first layer called `name`.
    pub fn layer(&self, name: &str) -> Option<&LayerInfo<'a>> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Number of layers in the collection.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the collection holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl<'a> FromIterator<LayerInfo<'a>> for TensorOutputs<'a> {
    fn from_iter<I: IntoIterator<Item = LayerInfo<'a>>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}
