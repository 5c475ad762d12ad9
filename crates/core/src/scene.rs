//! Render surface: maps a [`Configuration`] to a layered vector scene.
//!
//! Layers, bottom to top:
//!
//! 1. an opaque background rectangle covering the whole view box
//! 2. a group of circles, one per blob, blurred together as one shape
//! 3. a full-canvas desaturated noise field blended over everything beneath
//!
//! A [`Scene`] is structured data. Its declared size (the `width`/`height`
//! of the root element) is independent of its view box, so exports can
//! change the output resolution without touching any coordinate.

use std::collections::HashMap;
use std::fmt;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::{BlendMode, Configuration, NoiseSettings, NoiseType, DEFAULT_BACKGROUND};
use crate::error::ArtError;
use crate::params::parse_leading_float;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Filter id of the noise overlay.
pub const NOISE_FILTER_ID: &str = "noiseFilter";
/// Filter id of the blob-group blur.
pub const BLUR_FILTER_ID: &str = "blurFilter";

/// One blob as drawn: centre and radius in percent of the view box.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub id: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    pub opacity: f64,
}

impl Circle {
    /// Resolves the percentages to absolute view box units.
    ///
    /// `cx` is relative to the width, `cy` to the height and `r` to the
    /// normalized diagonal `sqrt((w² + h²) / 2)`, as vector graphics define
    /// percentage lengths that are neither horizontal nor vertical.
    pub fn resolve(&self, view_width: f64, view_height: f64) -> (f64, f64, f64) {
        (
            self.cx / 100.0 * view_width,
            self.cy / 100.0 * view_height,
            self.r / 100.0 * normalized_diagonal(view_width, view_height),
        )
    }
}

fn normalized_diagonal(w: f64, h: f64) -> f64 {
    ((w * w + h * h) / 2.0).sqrt()
}

/// A rendered artwork, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    width: u32,
    height: u32,
    view_width: u32,
    view_height: u32,
    background: String,
    circles: Vec<Circle>,
    blur: f64,
    noise: NoiseSettings,
}

/// Builds the scene for `config`.
///
/// Pure: equal configurations always give equal scenes. The declared size
/// and the view box both equal the configuration's dimensions.
pub fn render(config: &Configuration) -> Scene {
    Scene {
        width: config.width,
        height: config.height,
        view_width: config.width,
        view_height: config.height,
        background: config.background_color.clone(),
        circles: config
            .blobs
            .iter()
            .map(|b| Circle {
                id: b.id.clone(),
                cx: b.x,
                cy: b.y,
                r: b.radius,
                fill: b.color.clone(),
                opacity: b.opacity,
            })
            .collect(),
        blur: config.blur,
        noise: config.noise.clone(),
    }
}

impl Scene {
    /// Declared document width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Declared document height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The internal coordinate space, `(width, height)`.
    pub fn view_box(&self) -> (u32, u32) {
        (self.view_width, self.view_height)
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    /// Blob circles in paint order.
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn blur(&self) -> f64 {
        self.blur
    }

    pub fn noise(&self) -> &NoiseSettings {
        &self.noise
    }

    /// Returns a copy with only the declared size changed.
    pub fn with_size(&self, width: u32, height: u32) -> Scene {
        Scene {
            width,
            height,
            ..self.clone()
        }
    }

    /// Serializes the scene as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        self.to_string()
    }

    /// Reads a serialized scene back.
    ///
    /// Coordinates without a `%` suffix are taken as absolute view box units
    /// and converted. Missing filter parameters fall back to their defaults.
    pub fn from_svg(svg: &str) -> Result<Scene, ArtError> {
        let mut reader = Reader::from_str(svg);
        let mut builder = SceneReader::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => builder.visit(&e)?,
                Event::Eof => break,
                _ => {}
            }
        }
        builder.finish()
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let background = escape(self.background.as_str());
        let noise = &self.noise;
        writeln!(
            f,
            r#"<svg xmlns="{SVG_NS}" width="{}" height="{}" viewBox="0 0 {} {}" preserveAspectRatio="xMidYMid slice" style="background-color: {background}">"#,
            self.width, self.height, self.view_width, self.view_height,
        )?;
        writeln!(f, "  <defs>")?;
        writeln!(f, r#"    <filter id="{NOISE_FILTER_ID}">"#)?;
        writeln!(
            f,
            r#"      <feTurbulence type="{}" baseFrequency="{}" numOctaves="{}" stitchTiles="stitch" result="noise"/>"#,
            noise.kind.as_str(),
            noise.base_frequency,
            noise.num_octaves,
        )?;
        writeln!(
            f,
            r#"      <feColorMatrix type="saturate" values="0" in="noise" result="desaturatedNoise"/>"#
        )?;
        writeln!(
            f,
            r#"      <feComponentTransfer in="desaturatedNoise" result="theNoise">"#
        )?;
        writeln!(f, r#"        <feFuncA type="linear" slope="{}"/>"#, noise.opacity)?;
        writeln!(f, "      </feComponentTransfer>")?;
        writeln!(
            f,
            r#"      <feBlend in="theNoise" in2="SourceGraphic" mode="{}" result="blend"/>"#,
            noise.blend_mode.as_str(),
        )?;
        writeln!(f, "    </filter>")?;
        writeln!(f, r#"    <filter id="{BLUR_FILTER_ID}">"#)?;
        writeln!(
            f,
            r#"      <feGaussianBlur in="SourceGraphic" stdDeviation="{}"/>"#,
            self.blur
        )?;
        writeln!(f, "    </filter>")?;
        writeln!(f, "  </defs>")?;
        writeln!(
            f,
            r#"  <rect width="100%" height="100%" fill="{background}"/>"#
        )?;
        writeln!(f, r#"  <g filter="url(#{BLUR_FILTER_ID})">"#)?;
        for c in &self.circles {
            writeln!(
                f,
                r#"    <circle data-id="{}" cx="{}%" cy="{}%" r="{}%" fill="{}" opacity="{}"/>"#,
                escape(c.id.as_str()),
                c.cx,
                c.cy,
                c.r,
                escape(c.fill.as_str()),
                c.opacity,
            )?;
        }
        writeln!(f, "  </g>")?;
        writeln!(
            f,
            r#"  <rect width="100%" height="100%" filter="url(#{NOISE_FILTER_ID})" fill="transparent" style="mix-blend-mode: {}" opacity="{}"/>"#,
            noise.blend_mode.as_str(),
            noise.opacity,
        )?;
        writeln!(f, "</svg>")
    }
}

/// Accumulates scene fields while walking a document.
#[derive(Default)]
struct SceneReader {
    size: Option<(Option<f64>, Option<f64>)>,
    view_box: Option<(f64, f64)>,
    background: Option<String>,
    circles: Vec<Circle>,
    blur: Option<f64>,
    noise: NoiseSettings,
}

impl SceneReader {
    fn visit(&mut self, element: &BytesStart<'_>) -> Result<(), ArtError> {
        let name = element.local_name();
        let attrs = attributes(element)?;
        let number = |key: &str| attrs.get(key).and_then(|v| parse_leading_float(v));
        match name.as_ref() {
            b"svg" => {
                self.size = Some((number("width"), number("height")));
                self.view_box = attrs.get("viewBox").and_then(|v| parse_view_box(v));
            }
            b"rect" if !attrs.contains_key("filter") && self.background.is_none() => {
                self.background = attrs.get("fill").cloned();
            }
            b"circle" => {
                let declared = match self.size {
                    Some((Some(w), Some(h))) => Some((w, h)),
                    _ => None,
                };
                let (vw, vh) = self.view_box.or(declared).ok_or_else(|| {
                    ArtError::InvalidScene("circle outside a sized root element".into())
                })?;
                let diagonal = normalized_diagonal(vw, vh);
                let length = |key: &str, reference: f64| {
                    attrs
                        .get(key)
                        .and_then(|v| percent_of(v, reference))
                        .unwrap_or(0.0)
                };
                self.circles.push(Circle {
                    id: attrs
                        .get("data-id")
                        .cloned()
                        .unwrap_or_else(|| format!("circle-{}", self.circles.len())),
                    cx: length("cx", vw),
                    cy: length("cy", vh),
                    r: length("r", diagonal),
                    fill: attrs.get("fill").cloned().unwrap_or_else(|| "black".into()),
                    opacity: number("opacity").unwrap_or(1.0),
                });
            }
            b"feGaussianBlur" => self.blur = number("stdDeviation"),
            b"feTurbulence" => {
                if let Some(kind) = attrs.get("type").and_then(|v| NoiseType::from_name(v)) {
                    self.noise.kind = kind;
                }
                if let Some(v) = number("baseFrequency") {
                    self.noise.base_frequency = v;
                }
                if let Some(v) = number("numOctaves") {
                    self.noise.num_octaves = v.max(1.0) as u32;
                }
            }
            b"feFuncA" => {
                if let Some(v) = number("slope") {
                    self.noise.opacity = v;
                }
            }
            b"feBlend" => {
                if let Some(mode) = attrs.get("mode").and_then(|v| BlendMode::from_name(v)) {
                    self.noise.blend_mode = mode;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Scene, ArtError> {
        let (width, height) = self
            .size
            .ok_or_else(|| ArtError::InvalidScene("missing <svg> root element".into()))?;
        let (view_width, view_height) = match (self.view_box, width, height) {
            (Some(vb), _, _) => vb,
            (None, Some(w), Some(h)) => (w, h),
            _ => {
                return Err(ArtError::InvalidScene(
                    "root declares neither a size nor a viewBox".into(),
                ))
            }
        };
        let to_u32 = |v: f64| v.round().clamp(0.0, u32::MAX as f64) as u32;
        let scene = Scene {
            width: to_u32(width.unwrap_or(view_width)),
            height: to_u32(height.unwrap_or(view_height)),
            view_width: to_u32(view_width),
            view_height: to_u32(view_height),
            background: self
                .background
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            circles: self.circles,
            blur: self.blur.unwrap_or(0.0),
            noise: self.noise,
        };
        if scene.width == 0 || scene.height == 0 || scene.view_width == 0 || scene.view_height == 0
        {
            return Err(ArtError::InvalidDimensions);
        }
        Ok(scene)
    }
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, ArtError> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((*w, *h)),
        _ => None,
    }
}

/// Reads a length as a percentage of `reference`.
fn percent_of(value: &str, reference: f64) -> Option<f64> {
    let value = value.trim();
    match value.strip_suffix('%') {
        Some(pct) => parse_leading_float(pct),
        None if reference > 0.0 => parse_leading_float(value).map(|v| v / reference * 100.0),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlobLayer;

    fn blob(id: &str, x: f64, y: f64, radius: f64) -> BlobLayer {
        BlobLayer {
            id: id.into(),
            x,
            y,
            radius,
            color: "#fa709a".into(),
            opacity: 0.55,
        }
    }

    fn sample_config() -> Configuration {
        Configuration {
            blobs: vec![
                blob("aaaaaaaaa", -20.0, 40.0, 25.0),
                blob("bbbbbbbbb", 120.0, 60.0, 60.0),
            ],
            ..Configuration::default()
        }
    }

    // -- render --

    #[test]
    fn render_is_pure() {
        let config = sample_config();
        let a = render(&config);
        let b = render(&config.clone());
        assert_eq!(a, b);
        assert_eq!(a.to_svg(), b.to_svg());
    }

    #[test]
    fn render_keeps_blob_order_and_values() {
        let scene = render(&sample_config());
        let ids: Vec<_> = scene.circles().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["aaaaaaaaa", "bbbbbbbbb"]);
        assert_eq!(scene.circles()[1].cx, 120.0);
        assert_eq!(scene.circles()[1].r, 60.0);
    }

    #[test]
    fn render_declares_configuration_size() {
        let scene = render(&Configuration::default());
        assert_eq!((scene.width(), scene.height()), (1920, 1080));
        assert_eq!(scene.view_box(), (1920, 1080));
    }

    #[test]
    fn empty_blob_list_renders_background_and_noise() {
        let svg = render(&Configuration::default()).to_svg();
        assert!(!svg.contains("<circle"));
        assert!(svg.contains(r##"fill="#0a0a0a""##));
        assert!(svg.contains(r#"filter="url(#noiseFilter)""#));
    }

    // -- serialization --

    #[test]
    fn svg_declares_native_size_and_view_box() {
        let svg = render(&Configuration::default()).to_svg();
        assert!(svg.contains(r#"width="1920" height="1080""#), "{svg}");
        assert!(svg.contains(r#"viewBox="0 0 1920 1080""#), "{svg}");
    }

    #[test]
    fn svg_contains_filter_graph() {
        let svg = render(&Configuration::default()).to_svg();
        for fragment in [
            r#"<feTurbulence type="fractalNoise" baseFrequency="0.65" numOctaves="3" stitchTiles="stitch""#,
            r#"<feColorMatrix type="saturate" values="0""#,
            r#"<feFuncA type="linear" slope="0.5"/>"#,
            r#"<feBlend in="theNoise" in2="SourceGraphic" mode="overlay""#,
            r#"<feGaussianBlur in="SourceGraphic" stdDeviation="80"/>"#,
            r#"<g filter="url(#blurFilter)">"#,
        ] {
            assert!(svg.contains(fragment), "missing {fragment} in {svg}");
        }
    }

    #[test]
    fn svg_writes_percentage_circles() {
        let svg = render(&sample_config()).to_svg();
        assert!(
            svg.contains(r##"cx="-20%" cy="40%" r="25%" fill="#fa709a" opacity="0.55""##),
            "{svg}"
        );
    }

    #[test]
    fn svg_escapes_attribute_values() {
        let mut config = sample_config();
        config.blobs[0].color = r#"x" onload="y"#.into();
        let svg = render(&config).to_svg();
        assert!(!svg.contains(r#"onload="y""#));
        assert!(svg.contains("&quot;"));
    }

    #[test]
    fn with_size_changes_only_declared_size() {
        let scene = render(&sample_config());
        let scaled = scene.with_size(3840, 2160);
        assert_eq!((scaled.width(), scaled.height()), (3840, 2160));
        assert_eq!(scaled.view_box(), scene.view_box());
        assert_eq!(scaled.circles(), scene.circles());
        let svg = scaled.to_svg();
        assert!(svg.contains(r#"width="3840" height="2160" viewBox="0 0 1920 1080""#));
    }

    // -- geometry --

    #[test]
    fn resolve_uses_normalized_diagonal_for_radius() {
        let c = Circle {
            id: "c".into(),
            cx: 50.0,
            cy: 50.0,
            r: 10.0,
            fill: "red".into(),
            opacity: 1.0,
        };
        let (x, y, r) = c.resolve(300.0, 400.0);
        assert_eq!((x, y), (150.0, 200.0));
        let expected = ((300.0_f64.powi(2) + 400.0_f64.powi(2)) / 2.0).sqrt() * 0.1;
        assert!((r - expected).abs() < 1e-9);
    }

    // -- parsing --

    #[test]
    fn from_svg_round_trips_rendered_scene() {
        let mut config = sample_config();
        config.noise.kind = NoiseType::Turbulence;
        config.noise.blend_mode = BlendMode::SoftLight;
        config.noise.num_octaves = 5;
        config.blur = 42.0;
        let scene = render(&config);
        let parsed = Scene::from_svg(&scene.to_svg()).unwrap();
        assert_eq!(parsed, scene);
    }

    #[test]
    fn from_svg_round_trips_scaled_scene() {
        let scene = render(&sample_config()).with_size(960, 540);
        let parsed = Scene::from_svg(&scene.to_svg()).unwrap();
        assert_eq!((parsed.width(), parsed.height()), (960, 540));
        assert_eq!(parsed.view_box(), (1920, 1080));
    }

    #[test]
    fn from_svg_converts_absolute_coordinates() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100">
            <rect width="100%" height="100%" fill="navy"/>
            <g><circle cx="50" cy="25" r="10%" fill="red"/></g>
        </svg>"#;
        let scene = Scene::from_svg(svg).unwrap();
        assert_eq!((scene.width(), scene.height()), (200, 100));
        assert_eq!(scene.background(), "navy");
        let c = &scene.circles()[0];
        assert_eq!((c.cx, c.cy, c.r), (25.0, 25.0, 10.0));
        assert_eq!(c.opacity, 1.0);
        assert_eq!(c.id, "circle-0");
    }

    #[test]
    fn from_svg_rejects_document_without_root() {
        assert!(matches!(
            Scene::from_svg("<rect width=\"10\"/>"),
            Err(ArtError::InvalidScene(_))
        ));
    }

    #[test]
    fn from_svg_rejects_malformed_markup() {
        assert!(Scene::from_svg(r#"<svg width="10" height="10"><g></svg>"#).is_err());
    }

    #[test]
    fn from_svg_requires_size_or_view_box() {
        assert!(Scene::from_svg(r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#).is_err());
    }
}
