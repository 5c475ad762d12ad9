//! Lenient extraction of configuration updates from loosely-typed JSON.
//!
//! Control surfaces hand over whatever their widgets produce: numbers,
//! numeric strings, or garbage. These helpers never fail. Invalid input is
//! coerced to a safe value or ignored so the configuration always stays
//! renderable.

use serde_json::Value;

use crate::config::{BlendMode, BlobLayer, ConfigPatch, NoisePatch, NoiseType};

/// Dimension used when a width or height entry cannot be read.
pub const FALLBACK_DIMENSION: u32 = 100;
/// Upper bound of the blur control.
pub const MAX_BLUR: f64 = 250.0;
/// Lower bound of the base frequency control.
pub const MIN_BASE_FREQUENCY: f64 = 0.1;
/// Upper bound of the base frequency control.
pub const MAX_BASE_FREQUENCY: f64 = 3.0;

/// Parses the longest integer prefix of `text`, ignoring leading whitespace.
///
/// `"640px"` gives 640, `"-3"` gives -3, `"abc"` gives `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse().ok()
}

/// Parses the longest decimal prefix of `text`, ignoring leading whitespace.
///
/// Accepts an optional sign, a fraction and an exponent: `"0.65abc"` gives
/// 0.65, `".5"` gives 0.5, `"e3"` gives `None`.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut digits = 0;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        digits += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a JSON number or numeric string as `f64`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

/// Reads a JSON number or numeric string as an integer, truncating fractions.
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Extracts a canvas dimension from `params[name]`.
///
/// Returns `None` if the key is absent. A present entry that is not a
/// positive integer becomes [`FALLBACK_DIMENSION`].
pub fn param_dimension(params: &Value, name: &str) -> Option<u32> {
    let raw = params.get(name)?;
    let value = as_integer(raw)
        .filter(|&v| v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
        .unwrap_or(FALLBACK_DIMENSION);
    Some(value)
}

/// Extracts a number from `params[name]` clamped to `[min, max]`.
///
/// Returns `None` if the key is absent or not numeric.
pub fn param_clamped(params: &Value, name: &str, min: f64, max: f64) -> Option<f64> {
    params.get(name).and_then(as_number).map(|v| v.clamp(min, max))
}

/// Extracts a string from `params[name]`, or `None` if missing or not a string.
pub fn param_str<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

impl NoisePatch {
    /// Builds a noise patch from a JSON object, coercing every entry.
    pub fn from_params(params: &Value) -> Self {
        Self {
            base_frequency: param_clamped(
                params,
                "baseFrequency",
                MIN_BASE_FREQUENCY,
                MAX_BASE_FREQUENCY,
            ),
            num_octaves: params
                .get("numOctaves")
                .and_then(as_integer)
                .map(|v| u32::try_from(v.max(1)).unwrap_or(u32::MAX)),
            opacity: param_clamped(params, "opacity", 0.0, 1.0),
            kind: param_str(params, "type").and_then(NoiseType::from_name),
            blend_mode: param_str(params, "blendMode").and_then(BlendMode::from_name),
        }
    }
}

impl ConfigPatch {
    /// Builds a configuration patch from a loosely-typed JSON object.
    ///
    /// Keys follow the serialized configuration (`width`, `height`,
    /// `backgroundColor`, `blur`, `blobs`, `noise.*`). A blob list that does
    /// not parse is ignored as a whole.
    pub fn from_params(params: &Value) -> Self {
        let noise = params
            .get("noise")
            .map(NoisePatch::from_params)
            .filter(|p| !p.is_empty());
        Self {
            width: param_dimension(params, "width"),
            height: param_dimension(params, "height"),
            background_color: param_str(params, "backgroundColor")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            blobs: params
                .get("blobs")
                .and_then(|v| serde_json::from_value::<Vec<BlobLayer>>(v.clone()).ok()),
            noise,
            blur: param_clamped(params, "blur", 0.0, MAX_BLUR).map(f64::trunc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use serde_json::json;

    // -- leading-number parsing --

    #[test]
    fn parse_leading_int_reads_numeric_prefix() {
        assert_eq!(parse_leading_int("640px"), Some(640));
        assert_eq!(parse_leading_int("  42"), Some(42));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("12.9"), Some(12));
    }

    #[test]
    fn parse_leading_int_rejects_non_numeric() {
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn parse_leading_float_reads_fraction_and_exponent() {
        assert_eq!(parse_leading_float("0.65abc"), Some(0.65));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("1e2x"), Some(100.0));
        assert_eq!(parse_leading_float("2e"), Some(2.0));
    }

    #[test]
    fn parse_leading_float_rejects_non_numeric() {
        assert_eq!(parse_leading_float("e3"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("fast"), None);
    }

    // -- dimensions --

    #[test]
    fn param_dimension_absent_is_none() {
        assert_eq!(param_dimension(&json!({}), "width"), None);
    }

    #[test]
    fn param_dimension_accepts_numbers_and_strings() {
        assert_eq!(param_dimension(&json!({"width": 800}), "width"), Some(800));
        assert_eq!(param_dimension(&json!({"width": "1024"}), "width"), Some(1024));
        assert_eq!(param_dimension(&json!({"width": 99.7}), "width"), Some(99));
    }

    #[test]
    fn param_dimension_coerces_garbage_to_fallback() {
        for bad in [json!("abc"), json!(0), json!(-5), json!(null), json!(true)] {
            let params = json!({ "height": bad });
            assert_eq!(
                param_dimension(&params, "height"),
                Some(FALLBACK_DIMENSION),
                "input {params}"
            );
        }
    }

    // -- patches --

    #[test]
    fn config_patch_from_params_clamps_and_truncates_blur() {
        let p = ConfigPatch::from_params(&json!({"blur": "300"}));
        assert_eq!(p.blur, Some(MAX_BLUR));
        let p = ConfigPatch::from_params(&json!({"blur": 12.8}));
        assert_eq!(p.blur, Some(12.0));
        let p = ConfigPatch::from_params(&json!({"blur": "soft"}));
        assert_eq!(p.blur, None);
    }

    #[test]
    fn noise_patch_ignores_unknown_names() {
        let p = NoisePatch::from_params(&json!({"blendMode": "darken", "type": "perlin"}));
        assert!(p.is_empty());
    }

    #[test]
    fn noise_patch_clamps_ranges() {
        let p = NoisePatch::from_params(&json!({
            "baseFrequency": 9.0,
            "opacity": -1,
            "numOctaves": 0,
        }));
        assert_eq!(p.base_frequency, Some(MAX_BASE_FREQUENCY));
        assert_eq!(p.opacity, Some(0.0));
        assert_eq!(p.num_octaves, Some(1));
    }

    #[test]
    fn coerced_patch_always_leaves_valid_configuration() {
        let mut c = Configuration::default();
        c.apply(ConfigPatch::from_params(&json!({
            "width": "wide",
            "height": -20,
            "blur": -4,
            "backgroundColor": "   ",
            "blobs": "not a list",
            "noise": {"baseFrequency": 0, "opacity": 7, "numOctaves": "x"},
        })));
        assert_eq!(c.width, FALLBACK_DIMENSION);
        assert_eq!(c.height, FALLBACK_DIMENSION);
        assert_eq!(c.blur, 0.0);
        assert_eq!(c.background_color, "#0a0a0a");
        assert_eq!(c.noise.base_frequency, MIN_BASE_FREQUENCY);
        assert_eq!(c.noise.opacity, 1.0);
        assert_eq!(c.noise.num_octaves, 3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn config_patch_reads_blob_list() {
        let p = ConfigPatch::from_params(&json!({
            "blobs": [{"id": "a", "x": 10, "y": 20, "radius": 30, "color": "#fff", "opacity": 0.5}]
        }));
        let blobs = p.blobs.unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].x, 10.0);
    }
}
