//! The configuration model: the single description of one renderable artwork.
//!
//! A [`Configuration`] is created once with defaults, then mutated by
//! partial replacement ([`ConfigPatch`]) for the rest of the session.
//! Blob coordinates are percentages of the configuration's `width x height`
//! space, so changing the dimensions never rescales existing blobs.

use serde::{Deserialize, Serialize};

use crate::error::ArtError;

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Background painted before the first regenerate.
pub const DEFAULT_BACKGROUND: &str = "#0a0a0a";
/// Default blur spread applied to the blob group.
pub const DEFAULT_BLUR: f64 = 80.0;

/// A single soft-edged circular color region.
///
/// `x`, `y` and `radius` are percentages and may fall outside 0..100 so
/// blurred shapes can bleed past the canvas edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobLayer {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
    pub opacity: f64,
}

/// Procedural noise flavour, named after the vector filter vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseType {
    #[default]
    #[serde(rename = "fractalNoise")]
    Fractal,
    #[serde(rename = "turbulence")]
    Turbulence,
}

impl NoiseType {
    /// Returns the name used in serialized scenes.
    pub fn as_str(self) -> &'static str {
        match self {
            NoiseType::Fractal => "fractalNoise",
            NoiseType::Turbulence => "turbulence",
        }
    }

    /// Parses a noise type name. Accepts `fractal` as a short form.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "fractalNoise" | "fractal" => Some(NoiseType::Fractal),
            "turbulence" => Some(NoiseType::Turbulence),
            _ => None,
        }
    }
}

/// Compositing function used to lay the noise over the blobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Overlay,
    Multiply,
    Screen,
    SoftLight,
}

impl BlendMode {
    /// Every blend mode, in the order the control surface lists them.
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Overlay,
        BlendMode::Multiply,
        BlendMode::SoftLight,
        BlendMode::Screen,
    ];

    /// Returns the CSS/SVG name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Overlay => "overlay",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::SoftLight => "soft-light",
        }
    }

    /// Parses a blend mode name.
    pub fn from_name(name: &str) -> Option<Self> {
        BlendMode::ALL.into_iter().find(|m| m.as_str() == name.trim())
    }
}

/// Parameters of the procedural noise overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseSettings {
    pub base_frequency: f64,
    pub num_octaves: u32,
    pub opacity: f64,
    #[serde(rename = "type")]
    pub kind: NoiseType,
    pub blend_mode: BlendMode,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            base_frequency: 0.65,
            num_octaves: 3,
            opacity: 0.5,
            kind: NoiseType::Fractal,
            blend_mode: BlendMode::Overlay,
        }
    }
}

/// The aggregate root describing one artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub blobs: Vec<BlobLayer>,
    pub noise: NoiseSettings,
    pub blur: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background_color: DEFAULT_BACKGROUND.to_string(),
            blobs: Vec::new(),
            noise: NoiseSettings::default(),
            blur: DEFAULT_BLUR,
        }
    }
}

impl Configuration {
    /// Checks every numeric invariant of the model.
    ///
    /// Configurations built through [`ConfigPatch::from_params`] always pass;
    /// this guards configurations read from files.
    pub fn validate(&self) -> Result<(), ArtError> {
        if self.width == 0 || self.height == 0 {
            return Err(ArtError::InvalidDimensions);
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(ArtError::parameter("blur", "must be a finite value >= 0"));
        }
        let noise = &self.noise;
        if !noise.base_frequency.is_finite() || noise.base_frequency <= 0.0 {
            return Err(ArtError::parameter("baseFrequency", "must be > 0"));
        }
        if noise.num_octaves == 0 {
            return Err(ArtError::parameter("numOctaves", "must be >= 1"));
        }
        check_unit("noise.opacity", noise.opacity)?;
        for blob in &self.blobs {
            check_unit(&format!("blobs[{}].opacity", blob.id), blob.opacity)?;
            if ![blob.x, blob.y, blob.radius].iter().all(|v| v.is_finite()) {
                return Err(ArtError::parameter(
                    &format!("blobs[{}]", blob.id),
                    "coordinates must be finite",
                ));
            }
        }
        Ok(())
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(background) = patch.background_color {
            self.background_color = background;
        }
        if let Some(blobs) = patch.blobs {
            self.blobs = blobs;
        }
        if let Some(blur) = patch.blur {
            self.blur = blur;
        }
        if let Some(noise) = patch.noise {
            noise.apply_to(&mut self.noise);
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), ArtError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ArtError::parameter(name, format!("{value} is outside [0, 1]")))
    }
}

/// Partial replacement of [`NoiseSettings`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoisePatch {
    pub base_frequency: Option<f64>,
    pub num_octaves: Option<u32>,
    pub opacity: Option<f64>,
    pub kind: Option<NoiseType>,
    pub blend_mode: Option<BlendMode>,
}

impl NoisePatch {
    fn apply_to(self, noise: &mut NoiseSettings) {
        if let Some(v) = self.base_frequency {
            noise.base_frequency = v;
        }
        if let Some(v) = self.num_octaves {
            noise.num_octaves = v;
        }
        if let Some(v) = self.opacity {
            noise.opacity = v;
        }
        if let Some(v) = self.kind {
            noise.kind = v;
        }
        if let Some(v) = self.blend_mode {
            noise.blend_mode = v;
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == NoisePatch::default()
    }
}

/// Partial replacement of a [`Configuration`]. Absent fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background_color: Option<String>,
    pub blobs: Option<Vec<BlobLayer>>,
    pub noise: Option<NoisePatch>,
    pub blur: Option<f64>,
}
