#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retinaparse::{LayerInfo, ParserConfig, RetinaParseError, RetinaParser, TensorOutputs};

struct Frame {
    boxes: Vec<f32>,
    classes: Vec<f32>,
    landmarks: Vec<f32>,
}

fn random_frame(rng: &mut StdRng, n: usize) -> Frame {
    let mut boxes = Vec::with_capacity(n * 4);
    let mut classes = Vec::with_capacity(n * 2);
    let mut landmarks = Vec::with_capacity(n * 10);
    for _ in 0..n {
        let x1 = rng.random_range(0.0f32..0.9);
        let y1 = rng.random_range(0.0f32..0.9);
        let side = rng.random_range(0.02f32..0.1);
        boxes.extend_from_slice(&[x1, y1, x1 + side, y1 + side]);
        let score = rng.random_range(0.0f32..1.0);
        classes.extend_from_slice(&[1.0 - score, score]);
        for _ in 0..5 {
            landmarks.push(x1 + rng.random_range(0.0..side));
            landmarks.push(y1 + rng.random_range(0.0..side));
        }
    }
    Frame {
        boxes,
        classes,
        landmarks,
    }
}

impl Frame {
    fn outputs(&self) -> TensorOutputs<'_> {
        TensorOutputs::new()
            .with_layer(LayerInfo::from_flat("bboxes", &self.boxes, 4))
            .with_layer(LayerInfo::from_flat("classes", &self.classes, 2))
            .with_layer(LayerInfo::from_flat("landmarks", &self.landmarks, 10))
    }
}

#[test]
fn parallel_batch_matches_sequential_batch() {
    let mut rng = StdRng::seed_from_u64(7);
    let frames: Vec<Frame> = (0..32).map(|i| random_frame(&mut rng, 20 + i)).collect();
    let outputs: Vec<TensorOutputs<'_>> = frames.iter().map(Frame::outputs).collect();

    let base_cfg = ParserConfig {
        landmark_markers: true,
        ..ParserConfig::default()
    };
    let seq = RetinaParser::new(ParserConfig {
        parallel: false,
        ..base_cfg.clone()
    })
    .unwrap();
    let par = RetinaParser::new(ParserConfig {
        parallel: true,
        ..base_cfg
    })
    .unwrap();

    let seq_out = seq.parse_batch(&outputs);
    let par_out = par.parse_batch(&outputs);

    assert_eq!(seq_out.len(), par_out.len());
    for (s, p) in seq_out.iter().zip(par_out.iter()) {
        assert_eq!(s.as_ref().unwrap(), p.as_ref().unwrap());
    }
}

#[test]
fn parallel_batch_isolates_a_misshapen_frame() {
    let mut rng = StdRng::seed_from_u64(11);
    let frames: Vec<Frame> = (0..8).map(|_| random_frame(&mut rng, 24)).collect();
    let mut outputs: Vec<TensorOutputs<'_>> = frames
        .iter()
        .map(|f| {
            TensorOutputs::new()
                .with_layer(LayerInfo::from_rows("bboxes", 24, 4, &f.boxes))
                .with_layer(LayerInfo::from_rows("classes", 24, 2, &f.classes))
                .with_layer(LayerInfo::from_rows("landmarks", 24, 10, &f.landmarks))
        })
        .collect();
    // Landmark matrix declared with five columns instead of ten.
    outputs[3] = TensorOutputs::new()
        .with_layer(LayerInfo::from_rows("bboxes", 24, 4, &frames[3].boxes))
        .with_layer(LayerInfo::from_rows("classes", 24, 2, &frames[3].classes))
        .with_layer(LayerInfo::from_rows("landmarks", 24, 5, &frames[3].landmarks));

    let par = RetinaParser::new(ParserConfig {
        parallel: true,
        ..ParserConfig::default()
    })
    .unwrap();
    let results = par.parse_batch(&outputs);

    assert_eq!(results.len(), 8);
    for (i, result) in results.iter().enumerate() {
        if i == 3 {
            assert!(matches!(
                result,
                Err(RetinaParseError::RecordLengthMismatch { expected: 10, got: 5, .. })
            ));
        } else {
            assert_eq!(result.as_ref().unwrap(), &par.parse(&outputs[i]).unwrap());
        }
    }
}
