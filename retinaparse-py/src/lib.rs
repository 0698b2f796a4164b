//! Python bindings for the retinaparse RetinaFace post-processor.
//!
//! Arrays come in as 2-D `float32` numpy arrays with one row per anchor.

use numpy::{PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use retinaparse::{
    DetectionKind, DetectionOutput, LayerInfo, LayerNames, NetworkInfo,
    ParserConfig as RustParserConfig, RetinaParseError, RetinaParser as RustRetinaParser,
    SuppressionMode, TensorOutputs,
};

/// Convert a RetinaParseError to a Python exception.
fn to_py_err(err: RetinaParseError) -> PyErr {
    match err {
        RetinaParseError::InvalidInput(_) | RetinaParseError::RecordLengthMismatch { .. } => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// One final detection in network pixel space.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// 0 for faces, 1 for landmark markers.
    #[pyo3(get)]
    pub class_id: u32,
    #[pyo3(get)]
    pub left: i32,
    #[pyo3(get)]
    pub top: i32,
    #[pyo3(get)]
    pub width: u32,
    #[pyo3(get)]
    pub height: u32,
    /// Foreground probability of the surviving candidate.
    #[pyo3(get)]
    pub confidence: f32,
    /// Five (x, y) points, or None when landmarks are not attached.
    #[pyo3(get)]
    pub landmarks: Option<Vec<(f32, f32)>>,
    /// RGBA colour suggested for drawing.
    #[pyo3(get)]
    pub colour: (f32, f32, f32, f32),
}

#[pymethods]
impl Detection {
    fn __repr__(&self) -> String {
        format!(
            "Detection(class_id={}, left={}, top={}, width={}, height={}, confidence={:.4})",
            self.class_id, self.left, self.top, self.width, self.height, self.confidence
        )
    }
}

impl From<DetectionOutput> for Detection {
    fn from(d: DetectionOutput) -> Self {
        let c = d.colour();
        Self {
            class_id: d.class_id(),
            left: d.rect.left,
            top: d.rect.top,
            width: d.rect.width,
            height: d.rect.height,
            confidence: d.confidence,
            landmarks: d.landmarks.map(|lm| lm.iter().map(|p| (p.x, p.y)).collect()),
            colour: (c.red, c.green, c.blue, c.alpha),
        }
    }
}

fn parse_suppression(name: &str) -> PyResult<SuppressionMode> {
    match name.to_lowercase().as_str() {
        "anchor_order" => Ok(SuppressionMode::AnchorOrder),
        "score_order" => Ok(SuppressionMode::ScoreOrder),
        _ => Err(PyValueError::new_err(
            "suppression must be 'anchor_order' or 'score_order'",
        )),
    }
}

/// Parser configuration.
#[pyclass]
#[derive(Clone)]
pub struct ParserConfig {
    inner: RustParserConfig,
}

#[pymethods]
impl ParserConfig {
    /// Create a new ParserConfig.
    ///
    /// Args:
    ///     network_width: Network input width (default: 640)
    ///     network_height: Network input height (default: 640)
    ///     threshold: Foreground probability threshold (default: 0.5)
    ///     iou_threshold: Cluster IoU threshold (default: 0.2)
    ///     padding_factor: Box padding per side (default: 0.1)
    ///     suppression: "anchor_order" or "score_order" (default: "anchor_order")
    ///     attach_landmarks: Attach landmarks to faces (default: True)
    ///     landmark_markers: Emit 1x1 landmark markers (default: False)
    ///     parallel: Parse batches in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        network_width = 640,
        network_height = 640,
        threshold = 0.5,
        iou_threshold = 0.2,
        padding_factor = 0.1,
        suppression = "anchor_order",
        attach_landmarks = true,
        landmark_markers = false,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        network_width: u32,
        network_height: u32,
        threshold: f32,
        iou_threshold: f32,
        padding_factor: f32,
        suppression: &str,
        attach_landmarks: bool,
        landmark_markers: bool,
        parallel: bool,
    ) -> PyResult<Self> {
        let inner = RustParserConfig {
            network: NetworkInfo::new(network_width, network_height),
            class_thresholds: vec![threshold],
            iou_threshold,
            padding_factor,
            suppression: parse_suppression(suppression)?,
            attach_landmarks,
            landmark_markers,
            layer_names: LayerNames::default(),
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        let suppression = match self.inner.suppression {
            SuppressionMode::AnchorOrder => "anchor_order",
            SuppressionMode::ScoreOrder => "score_order",
        };
        format!(
            "ParserConfig(network={}x{}, threshold={}, iou_threshold={}, padding_factor={}, suppression='{}', parallel={})",
            self.inner.network.width,
            self.inner.network.height,
            self.inner.detection_threshold(),
            self.inner.iou_threshold,
            self.inner.padding_factor,
            suppression,
            self.inner.parallel
        )
    }
}

/// Borrows an `N x cols` array as a layer; the decoder checks `cols`.
fn matrix_layer<'a>(
    name: &'a str,
    array: &'a PyReadonlyArray2<'_, f32>,
) -> PyResult<LayerInfo<'a>> {
    let shape = array.shape();
    Ok(LayerInfo::from_rows(name, shape[0], shape[1], array.as_slice()?))
}

fn collect_outputs<'a>(
    names: &'a LayerNames,
    bboxes: &'a PyReadonlyArray2<'_, f32>,
    classes: &'a PyReadonlyArray2<'_, f32>,
    landmarks: &'a PyReadonlyArray2<'_, f32>,
) -> PyResult<TensorOutputs<'a>> {
    Ok(TensorOutputs::new()
        .with_layer(matrix_layer(&names.bboxes, bboxes)?)
        .with_layer(matrix_layer(&names.classes, classes)?)
        .with_layer(matrix_layer(&names.landmarks, landmarks)?))
}

type FrameArrays<'py> = (
    PyReadonlyArray2<'py, f32>,
    PyReadonlyArray2<'py, f32>,
    PyReadonlyArray2<'py, f32>,
);

/// Per-frame RetinaFace post-processor.
#[pyclass]
pub struct RetinaParser {
    inner: RustRetinaParser,
}

#[pymethods]
impl RetinaParser {
    /// Create a parser.
    ///
    /// Args:
    ///     config: ParserConfig (default: ParserConfig())
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<ParserConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner = RustRetinaParser::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Parse one frame.
    ///
    /// Args:
    ///     bboxes: float32 array (N x 4), normalized corners
    ///     classes: float32 array (N x 2), background/foreground
    ///     landmarks: float32 array (N x 10), interleaved x/y
    ///
    /// Returns:
    ///     List of Detection objects in suppression order
    fn parse(
        &self,
        bboxes: PyReadonlyArray2<'_, f32>,
        classes: PyReadonlyArray2<'_, f32>,
        landmarks: PyReadonlyArray2<'_, f32>,
    ) -> PyResult<Vec<Detection>> {
        let names = &self.inner.config().layer_names;
        let outputs = collect_outputs(names, &bboxes, &classes, &landmarks)?;
        let detections = self.inner.parse(&outputs).map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    /// Parse several frames, in parallel when the config sets `parallel`.
    ///
    /// Args:
    ///     frames: list of (bboxes, classes, landmarks) array tuples
    ///
    /// Returns:
    ///     One list of Detection objects per frame, in input order
    fn parse_batch<'py>(&self, frames: Vec<FrameArrays<'py>>) -> PyResult<Vec<Vec<Detection>>> {
        let names = &self.inner.config().layer_names;
        let outputs = frames
            .iter()
            .map(|(bboxes, classes, landmarks)| collect_outputs(names, bboxes, classes, landmarks))
            .collect::<PyResult<Vec<_>>>()?;
        self.inner
            .parse_batch(&outputs)
            .into_iter()
            .map(|result| {
                let detections = result.map_err(to_py_err)?;
                Ok(detections.into_iter().map(Detection::from).collect())
            })
            .collect()
    }

    fn __repr__(&self) -> String {
        "RetinaParser()".to_string()
    }
}

/// Convenience function to parse one frame with default settings.
///
/// Args:
///     bboxes: float32 array (N x 4)
///     classes: float32 array (N x 2)
///     landmarks: float32 array (N x 10)
///     network_width: Network input width (default: 640)
///     network_height: Network input height (default: 640)
///     threshold: Foreground probability threshold (default: 0.5)
///
/// Returns:
///     List of Detection objects
#[pyfunction]
#[pyo3(signature = (bboxes, classes, landmarks, network_width = 640, network_height = 640, threshold = 0.5))]
fn parse_detections(
    bboxes: PyReadonlyArray2<'_, f32>,
    classes: PyReadonlyArray2<'_, f32>,
    landmarks: PyReadonlyArray2<'_, f32>,
    network_width: u32,
    network_height: u32,
    threshold: f32,
) -> PyResult<Vec<Detection>> {
    let cfg = RustParserConfig {
        network: NetworkInfo::new(network_width, network_height),
        class_thresholds: vec![threshold],
        ..RustParserConfig::default()
    };
    let parser = RustRetinaParser::new(cfg).map_err(to_py_err)?;
    let outputs = collect_outputs(&parser.config().layer_names, &bboxes, &classes, &landmarks)?;
    let detections = parser.parse(&outputs).map_err(to_py_err)?;
    Ok(detections.into_iter().map(Detection::from).collect())
}

/// Python module for RetinaFace output parsing.
#[pymodule]
fn _retinaparse(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<ParserConfig>()?;
    m.add_class::<RetinaParser>()?;
    m.add_function(wrap_pyfunction!(parse_detections, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
