use retinaparse::{
    DetectionOutput, LayerInfo, NetworkInfo, ParserConfig, RetinaParser, SuppressionMode,
    TensorOutputs,
};

struct Frame {
    boxes: Vec<f32>,
    classes: Vec<f32>,
    landmarks: Vec<f32>,
}

impl Frame {
    fn new(faces: &[([f32; 4], f32)]) -> Self {
        let mut boxes = Vec::new();
        let mut classes = Vec::new();
        for (bbox, score) in faces {
            boxes.extend_from_slice(bbox);
            classes.extend_from_slice(&[1.0 - score, *score]);
        }
        Self {
            boxes,
            classes,
            landmarks: vec![0.0; faces.len() * 10],
        }
    }

    fn outputs(&self) -> TensorOutputs<'_> {
        TensorOutputs::new()
            .with_layer(LayerInfo::from_flat("bboxes", &self.boxes, 4))
            .with_layer(LayerInfo::from_flat("classes", &self.classes, 2))
            .with_layer(LayerInfo::from_flat("landmarks", &self.landmarks, 10))
    }
}

fn parser(suppression: SuppressionMode) -> RetinaParser {
    RetinaParser::new(ParserConfig {
        network: NetworkInfo::new(64, 64),
        padding_factor: 0.0,
        attach_landmarks: false,
        suppression,
        ..ParserConfig::default()
    })
    .unwrap()
}

fn scores(detections: &[DetectionOutput]) -> Vec<f32> {
    detections.iter().map(|d| d.confidence).collect()
}

#[test]
fn isolated_boxes_pass_through_in_input_order() {
    let frame = Frame::new(&[
        ([0.0, 0.0, 0.25, 0.25], 0.6),
        ([0.5, 0.5, 0.75, 0.75], 0.9),
        ([0.0, 0.5, 0.25, 0.75], 0.7),
    ]);
    let out = parser(SuppressionMode::AnchorOrder)
        .parse(&frame.outputs())
        .unwrap();

    assert_eq!(scores(&out), vec![0.6, 0.9, 0.7]);
    assert_eq!(out[1].rect.left, 32);
    assert_eq!(out[1].rect.width, 16);
}

#[test]
fn overlapping_pair_collapses_to_more_confident_box() {
    let frame = Frame::new(&[
        ([0.25, 0.25, 0.75, 0.75], 0.6),
        ([0.3125, 0.25, 0.8125, 0.75], 0.9),
    ]);
    let out = parser(SuppressionMode::AnchorOrder)
        .parse(&frame.outputs())
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].confidence, 0.9);
    assert_eq!(out[0].rect.left, 20);
}

#[test]
fn anchor_absorbs_both_neighbours_of_a_chain() {
    // A=[0,0.5], B=[0.25,0.75], C=[0.5,1.0]; IoU(A,B)=IoU(B,C)=1/3, IoU(A,C)=0.
    let a = ([0.0, 0.0, 0.5, 0.25], 0.9);
    let b = ([0.25, 0.0, 0.75, 0.25], 0.6);
    let c = ([0.5, 0.0, 1.0, 0.25], 0.8);

    let b_first = Frame::new(&[b, a, c]);
    let out = parser(SuppressionMode::AnchorOrder)
        .parse(&b_first.outputs())
        .unwrap();
    assert_eq!(scores(&out), vec![0.9]);
    assert_eq!(out[0].rect.left, 0);

    let a_first = Frame::new(&[a, b, c]);
    let out = parser(SuppressionMode::AnchorOrder)
        .parse(&a_first.outputs())
        .unwrap();
    assert_eq!(scores(&out), vec![0.9, 0.8]);
}

#[test]
fn score_order_mode_keeps_chain_ends() {
    let frame = Frame::new(&[
        ([0.25, 0.0, 0.75, 0.25], 0.6),
        ([0.0, 0.0, 0.5, 0.25], 0.9),
        ([0.5, 0.0, 1.0, 0.25], 0.8),
    ]);
    let out = parser(SuppressionMode::ScoreOrder)
        .parse(&frame.outputs())
        .unwrap();
    assert_eq!(scores(&out), vec![0.9, 0.8]);
}

#[test]
fn equal_maxima_resolve_to_last_cluster_member() {
    // Anchor X first; Y and Z both overlap X with equal scores. The cluster is
    // [Y, Z, X] so Z is the last maximal member.
    let frame = Frame::new(&[
        ([0.25, 0.25, 0.75, 0.75], 0.5),
        ([0.3125, 0.25, 0.8125, 0.75], 0.7),
        ([0.1875, 0.25, 0.6875, 0.75], 0.7),
    ]);
    let parser = RetinaParser::new(ParserConfig {
        class_thresholds: vec![0.1],
        ..parser(SuppressionMode::AnchorOrder).config().clone()
    })
    .unwrap();
    let out = parser.parse(&frame.outputs()).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].rect.left, 12);
}

#[test]
fn anchor_wins_ties_against_absorbed_members() {
    let frame = Frame::new(&[
        ([0.25, 0.25, 0.75, 0.75], 0.7),
        ([0.3125, 0.25, 0.8125, 0.75], 0.7),
    ]);
    let out = parser(SuppressionMode::AnchorOrder)
        .parse(&frame.outputs())
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].rect.left, 16);
}

#[test]
fn iou_equal_to_threshold_does_not_suppress() {
    let frame = Frame::new(&[
        ([0.0, 0.0, 0.5, 0.25], 0.9),
        ([0.25, 0.0, 0.75, 0.25], 0.6),
    ]);
    let parser = RetinaParser::new(ParserConfig {
        iou_threshold: 1.0 / 3.0,
        ..parser(SuppressionMode::AnchorOrder).config().clone()
    })
    .unwrap();
    let out = parser.parse(&frame.outputs()).unwrap();
    assert_eq!(scores(&out), vec![0.9, 0.6]);
}

#[test]
fn zero_area_boxes_never_suppress() {
    let frame = Frame::new(&[
        ([0.5, 0.5, 0.5, 0.5], 0.95),
        ([0.25, 0.25, 0.75, 0.75], 0.6),
        ([0.5, 0.5, 0.5, 0.5], 0.9),
    ]);
    let out = parser(SuppressionMode::AnchorOrder)
        .parse(&frame.outputs())
        .unwrap();

    assert_eq!(scores(&out), vec![0.95, 0.6, 0.9]);
    assert_eq!(out[0].rect.width, 0);
    assert_eq!(out[0].rect.height, 0);

    let out = parser(SuppressionMode::ScoreOrder)
        .parse(&frame.outputs())
        .unwrap();
    assert_eq!(out.len(), 3);
}
