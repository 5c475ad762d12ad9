//! Random composition generator.
//!
//! Picks one curated palette, then draws every blob independently. Blob
//! centres range past the visible canvas so blurred shapes bleed over the
//! edges.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::config::BlobLayer;
use crate::palette::Palette;
use crate::prng::Xorshift64;

/// Background of every generated composition.
///
/// Fixed rather than palette-derived so the blobs keep their contrast.
pub const GENERATED_BACKGROUND: &str = "#050505";
/// Blob count used by the regenerate action.
pub const DEFAULT_BLOB_COUNT: usize = 5;

/// Integer range of blob centre coordinates, in percent.
pub const POSITION_RANGE: RangeInclusive<i64> = -20..=120;
/// Integer range of blob radii, in percent.
pub const RADIUS_RANGE: RangeInclusive<i64> = 25..=60;
/// Lower bound of blob opacity (inclusive).
pub const OPACITY_MIN: f64 = 0.4;
/// Upper bound of blob opacity (exclusive).
pub const OPACITY_MAX: f64 = 0.8;

/// Blobs and background produced by one [`generate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub blobs: Vec<BlobLayer>,
    pub background: String,
}

/// Generates `count` random blobs from a single randomly chosen palette.
///
/// Depends only on `rng`. Identifiers are unique within the result.
pub fn generate(count: usize, rng: &mut Xorshift64) -> Composition {
    let colors = rng.pick(Palette::all()).map_or(&[][..], Palette::colors);

    let mut ids = HashSet::with_capacity(count);
    let blobs = (0..count)
        .map(|_| {
            let id = loop {
                let candidate = rng.next_id();
                if ids.insert(candidate.clone()) {
                    break candidate;
                }
            };
            BlobLayer {
                id,
                x: draw_int(rng, &POSITION_RANGE),
                y: draw_int(rng, &POSITION_RANGE),
                radius: draw_int(rng, &RADIUS_RANGE),
                color: rng.pick(colors).map(|c| c.to_string()).unwrap_or_default(),
                opacity: rng.next_range(OPACITY_MIN, OPACITY_MAX),
            }
        })
        .collect();

    Composition {
        blobs,
        background: GENERATED_BACKGROUND.to_string(),
    }
}

fn draw_int(rng: &mut Xorshift64, range: &RangeInclusive<i64>) -> f64 {
    rng.next_int_inclusive(*range.start(), *range.end()) as f64
}
