//! Constant colour table for tagging detections.

/// An RGBA colour with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    /// Creates a colour from normalized components.
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

macro_rules! rgb8 {
    ($red:expr, $green:expr, $blue:expr) => {
        Color::new($red / 255.0, $green / 255.0, $blue / 255.0, 1.0)
    };
}

/// Border colour used for face boxes.
pub const FACE_BORDER: Color = Color::new(1.0, 0.0, 0.0, 1.0);

/// Ten clearly distinguishable colours.
pub const TEN_COLOURS: [Color; 10] = [
    rgb8!(230.0, 25.0, 75.0),
    rgb8!(245.0, 130.0, 48.0),
    rgb8!(255.0, 255.0, 25.0),
    rgb8!(210.0, 245.0, 60.0),
    rgb8!(60.0, 180.0, 75.0),
    rgb8!(70.0, 240.0, 240.0),
    rgb8!(0.0, 130.0, 200.0),
    rgb8!(145.0, 30.0, 180.0),
    rgb8!(240.0, 50.0, 230.0),
    rgb8!(128.0, 128.0, 128.0),
];

/// Returns the palette entry for `index`, wrapping past the end of the table.
pub fn colour(index: usize) -> Color {
    TEN_COLOURS[index % TEN_COLOURS.len()]
}
