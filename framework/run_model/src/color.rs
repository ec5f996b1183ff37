use crate::label::{sentiment_kind, SentimentKind};
use crate::TestRun;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const PASSED_COLOR: Rgb = Rgb::new(0x22, 0xc5, 0x5e);
const FAILED_COLOR: Rgb = Rgb::new(0xef, 0x44, 0x44);
const UNKNOWN_COLOR: Rgb = Rgb::new(0x9c, 0xa3, 0xaf);

/// A 24-bit color, displayed as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("#{r:02x}{g:02x}{b:02x}")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

/// Gradient used to color runs by load
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    #[display("viridis")]
    Viridis,
    #[display("plasma")]
    Plasma,
    #[display("inferno")]
    Inferno,
    #[display("magma")]
    Magma,
    #[display("cividis")]
    Cividis,
    #[display("turbo")]
    Turbo,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        ColorScheme::Viridis,
        ColorScheme::Plasma,
        ColorScheme::Inferno,
        ColorScheme::Magma,
        ColorScheme::Cividis,
        ColorScheme::Turbo,
    ];

    /// Evenly spaced gradient stops, low to high
    pub fn stops(&self) -> &'static [Rgb] {
        match self {
            ColorScheme::Viridis => &VIRIDIS,
            ColorScheme::Plasma => &PLASMA,
            ColorScheme::Inferno => &INFERNO,
            ColorScheme::Magma => &MAGMA,
            ColorScheme::Cividis => &CIVIDIS,
            ColorScheme::Turbo => &TURBO,
        }
    }

    /// Sample the gradient at `t`, clamped to `[0, 1]`. NaN samples the low end.
    pub fn color_at(&self, t: f64) -> Rgb {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let position = t * (stops.len() - 1) as f64;
        let index = position.floor() as usize;
        if index + 1 >= stops.len() {
            return stops[stops.len() - 1];
        }
        stops[index].lerp(stops[index + 1], position - index as f64)
    }
}

impl FromStr for ColorScheme {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseColorError::new("color scheme", s))
    }
}

/// What the color of a run encodes
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Total vusers relative to the busiest run in view
    #[default]
    #[display("vusers")]
    Vusers,
    /// Pass or fail
    #[display("status")]
    Status,
    #[display("sentiment")]
    Sentiment,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [ColorMode::Vusers, ColorMode::Status, ColorMode::Sentiment];

    /// Color for a run
    ///
    /// `max_vusers` is the largest total vuser count among the runs being shown and is only used
    /// in [ColorMode::Vusers].
    pub fn color_for(&self, run: &TestRun, scheme: ColorScheme, max_vusers: u64) -> Rgb {
        match self {
            ColorMode::Vusers => {
                let t = if max_vusers == 0 {
                    0.0
                } else {
                    run.total_vusers() as f64 / max_vusers as f64
                };
                scheme.color_at(t)
            }
            ColorMode::Status if run.is_passed() => PASSED_COLOR,
            ColorMode::Status => FAILED_COLOR,
            ColorMode::Sentiment => match sentiment_kind(run) {
                SentimentKind::Positive => PASSED_COLOR,
                SentimentKind::Negative => FAILED_COLOR,
                SentimentKind::Unknown => UNKNOWN_COLOR,
            },
        }
    }
}

impl FromStr for ColorMode {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorMode::ALL
            .into_iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseColorError::new("color mode", s))
    }
}

/// Returned when a color scheme or mode name is not recognised
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq, Eq)]
#[display("unknown {kind}: {value}")]
pub struct ParseColorError {
    kind: &'static str,
    value: String,
}

impl ParseColorError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

const VIRIDIS: [Rgb; 10] = [
    Rgb::hex(0x440154),
    Rgb::hex(0x482878),
    Rgb::hex(0x3e4989),
    Rgb::hex(0x31688e),
    Rgb::hex(0x26828e),
    Rgb::hex(0x1f9e89),
    Rgb::hex(0x35b779),
    Rgb::hex(0x6ece58),
    Rgb::hex(0xb5de2b),
    Rgb::hex(0xfde725),
];

const PLASMA: [Rgb; 10] = [
    Rgb::hex(0x0d0887),
    Rgb::hex(0x46039f),
    Rgb::hex(0x7201a8),
    Rgb::hex(0x9c179e),
    Rgb::hex(0xbd3786),
    Rgb::hex(0xd8576b),
    Rgb::hex(0xed7953),
    Rgb::hex(0xfb9f3a),
    Rgb::hex(0xfdca26),
    Rgb::hex(0xf0f921),
];

const INFERNO: [Rgb; 10] = [
    Rgb::hex(0x000004),
    Rgb::hex(0x1b0c41),
    Rgb::hex(0x4a0c6b),
    Rgb::hex(0x781c6d),
    Rgb::hex(0xa52c60),
    Rgb::hex(0xcf4446),
    Rgb::hex(0xed6925),
    Rgb::hex(0xfb9b06),
    Rgb::hex(0xf7d13d),
    Rgb::hex(0xfcffa4),
];

const MAGMA: [Rgb; 10] = [
    Rgb::hex(0x000004),
    Rgb::hex(0x180f3d),
    Rgb::hex(0x440f76),
    Rgb::hex(0x721f81),
    Rgb::hex(0x9e2f7f),
    Rgb::hex(0xcd4071),
    Rgb::hex(0xf1605d),
    Rgb::hex(0xfd9668),
    Rgb::hex(0xfeca8d),
    Rgb::hex(0xfcfdbf),
];

const CIVIDIS: [Rgb; 10] = [
    Rgb::hex(0x00224e),
    Rgb::hex(0x123570),
    Rgb::hex(0x3b496c),
    Rgb::hex(0x575d6d),
    Rgb::hex(0x707173),
    Rgb::hex(0x8a8779),
    Rgb::hex(0xa69d75),
    Rgb::hex(0xc4b56c),
    Rgb::hex(0xe4cf5b),
    Rgb::hex(0xfee838),
];

const TURBO: [Rgb; 10] = [
    Rgb::hex(0x30123b),
    Rgb::hex(0x4662d7),
    Rgb::hex(0x36aaf9),
    Rgb::hex(0x1ae4b6),
    Rgb::hex(0x72fe5e),
    Rgb::hex(0xc8ef34),
    Rgb::hex(0xfaba39),
    Rgb::hex(0xf66b19),
    Rgb::hex(0xca2a04),
    Rgb::hex(0x7a0403),
];
