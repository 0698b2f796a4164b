use clap::Parser;
use retinaparse::{
    DetectionKind, DetectionOutput, LayerInfo, LayerNames, NetworkInfo, ParserConfig,
    RetinaParser, SuppressionMode, TensorOutputs,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "RetinaFace output parser CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SuppressionConfig {
    AnchorOrder,
    ScoreOrder,
}

impl From<SuppressionConfig> for SuppressionMode {
    fn from(value: SuppressionConfig) -> Self {
        match value {
            SuppressionConfig::AnchorOrder => SuppressionMode::AnchorOrder,
            SuppressionConfig::ScoreOrder => SuppressionMode::ScoreOrder,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NetworkJson {
    width: u32,
    height: u32,
}

impl Default for NetworkJson {
    fn default() -> Self {
        let net = NetworkInfo::default();
        Self {
            width: net.width,
            height: net.height,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LayerNamesJson {
    bboxes: String,
    classes: String,
    landmarks: String,
}

impl Default for LayerNamesJson {
    fn default() -> Self {
        let names = LayerNames::default();
        Self {
            bboxes: names.bboxes,
            classes: names.classes,
            landmarks: names.landmarks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    frame_path: String,
    output_path: Option<String>,
    network: NetworkJson,
    class_thresholds: Vec<f32>,
    iou_threshold: f32,
    padding_factor: f32,
    suppression: SuppressionConfig,
    attach_landmarks: bool,
    landmark_markers: bool,
    layer_names: LayerNamesJson,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = ParserConfig::default();
        Self {
            frame_path: String::new(),
            output_path: None,
            network: NetworkJson::default(),
            class_thresholds: cfg.class_thresholds,
            iou_threshold: cfg.iou_threshold,
            padding_factor: cfg.padding_factor,
            suppression: SuppressionConfig::AnchorOrder,
            attach_landmarks: cfg.attach_landmarks,
            landmark_markers: cfg.landmark_markers,
            layer_names: LayerNamesJson::default(),
        }
    }
}

impl Config {
    fn into_parser_config(self) -> ParserConfig {
        ParserConfig {
            network: NetworkInfo::new(self.network.width, self.network.height),
            class_thresholds: self.class_thresholds,
            iou_threshold: self.iou_threshold,
            padding_factor: self.padding_factor,
            suppression: self.suppression.into(),
            attach_landmarks: self.attach_landmarks,
            landmark_markers: self.landmark_markers,
            layer_names: LayerNames {
                bboxes: self.layer_names.bboxes,
                classes: self.layer_names.classes,
                landmarks: self.layer_names.landmarks,
            },
            parallel: false,
        }
    }
}

/// One output layer as dumped from the inference engine.
#[derive(Debug, Deserialize)]
struct LayerDump {
    name: String,
    dims: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct FrameDump {
    layers: Vec<LayerDump>,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    class_id: u32,
    kind: &'static str,
    left: i32,
    top: i32,
    width: u32,
    height: u32,
    confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    landmarks: Option<Vec<[f32; 2]>>,
    colour: [f32; 4],
}

impl From<DetectionOutput> for DetectionRecord {
    fn from(value: DetectionOutput) -> Self {
        let kind = match value.kind {
            DetectionKind::Face => "face",
            DetectionKind::LandmarkMarker { .. } => "landmark",
        };
        let c = value.colour();
        Self {
            class_id: value.class_id(),
            kind,
            left: value.rect.left,
            top: value.rect.top,
            width: value.rect.width,
            height: value.rect.height,
            confidence: value.confidence,
            landmarks: value
                .landmarks
                .map(|lm| lm.iter().map(|p| [p.x, p.y]).collect()),
            colour: [c.red, c.green, c.blue, c.alpha],
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    faces: usize,
    detections: Vec<DetectionRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("retinaparse=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frame_path.is_empty() {
        return Err("frame_path must be set in the config".into());
    }

    let frame_text = fs::read_to_string(&config.frame_path)?;
    let frame: FrameDump = serde_json::from_str(&frame_text)?;
    let mut outputs = TensorOutputs::new();
    for layer in &frame.layers {
        let info = match layer.dims.as_slice() {
            [] => return Err(format!("layer '{}' has no dimensions", layer.name).into()),
            [rows] => LayerInfo::new(&layer.name, *rows, &layer.data),
            [rows, cols, ..] => LayerInfo::from_rows(&layer.name, *rows, *cols, &layer.data),
        };
        outputs.push(info);
    }

    let output_path = config.output_path.clone();
    let parser = RetinaParser::new(config.into_parser_config())?;
    let detections = parser.parse(&outputs)?;
    let faces = detections.iter().filter(|d| d.is_face()).count();
    tracing::info!(faces, total = detections.len(), "frame parsed");

    let output = Output {
        faces,
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
