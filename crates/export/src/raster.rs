//! Raster export: the scene rasterized at an arbitrary scale and encoded as PNG.
//!
//! Only the document's declared size changes with the scale. The view box,
//! and with it every coordinate and filter parameter, stays in the
//! configuration's space, so the rasterizer resamples the same composition
//! at a higher density.

use std::io::Cursor;

use noisy_gradient_core::Scene;
use resvg::{tiny_skia, usvg};
use tracing::{debug, info};

use crate::error::ExportError;
use crate::file::{ExportFormat, ExportedFile};
use crate::pixel::pixmap_to_rgba;
use crate::resource::ObjectUrlRegistry;
use crate::worker::run_in_background;

/// Largest pixel surface an export may allocate (16384 x 16384).
pub const MAX_PIXELS: u64 = 16_384 * 16_384;

/// Rejects surfaces larger than [`MAX_PIXELS`].
fn check_surface(width: u32, height: u32) -> Result<(), ExportError> {
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(ExportError::Surface { width, height });
    }
    Ok(())
}

/// Returns the pixel size of `width x height` at `scale`, rounded.
///
/// Fails with [`ExportError::InvalidScale`] unless `scale` is finite and
/// positive and both results land in `1..=u32::MAX`, and with
/// [`ExportError::Surface`] if the result exceeds [`MAX_PIXELS`].
pub fn scaled_size(width: u32, height: u32, scale: f64) -> Result<(u32, u32), ExportError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ExportError::InvalidScale(scale));
    }
    let dim = |v: u32| {
        let scaled = (f64::from(v) * scale).round();
        (1.0..=f64::from(u32::MAX))
            .contains(&scaled)
            .then_some(scaled as u32)
    };
    match (dim(width), dim(height)) {
        (Some(w), Some(h)) => {
            check_surface(w, h)?;
            Ok((w, h))
        }
        _ => Err(ExportError::InvalidScale(scale)),
    }
}

/// Decodes an SVG document and draws it onto a `width x height` surface,
/// returning straight RGBA8 pixels.
pub fn rasterize(document: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    check_surface(width, height)?;
    let tree = usvg::Tree::from_data(document, &usvg::Options::default())
        .map_err(|e| ExportError::Decode(e.to_string()))?;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;
    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap_to_rgba(&pixmap))
}

/// Encodes an RGBA8 buffer as PNG.
pub fn encode_png(rgba: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ExportError::Encode("RGBA buffer size mismatch".into()))?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Rasterizes scenes through temporary object URLs.
///
/// Each export owns its URL and pixel surface, so overlapping exports never
/// share state beyond the registry table.
#[derive(Debug, Clone, Default)]
pub struct Rasterizer {
    registry: ObjectUrlRegistry,
}

impl Rasterizer {
    pub fn new(registry: ObjectUrlRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// Exports `scene` as a PNG of exactly `view_box * scale` pixels.
    pub async fn export(&self, scene: &Scene, scale: f64) -> Result<ExportedFile, ExportError> {
        let (view_width, view_height) = scene.view_box();
        let (width, height) = scaled_size(view_width, view_height, scale)?;
        let document = scene.with_size(width, height).to_svg();
        debug!(scale, width, height, "rasterizing scene");
        self.export_document(document, width, height).await
    }

    /// Rasterizes an already serialized document onto a `width x height`
    /// surface and encodes it.
    ///
    /// Decoding and drawing run on a background worker. The document's URL
    /// is revoked once the worker has finished, however it finished.
    pub async fn export_document(
        &self,
        document: String,
        width: u32,
        height: u32,
    ) -> Result<ExportedFile, ExportError> {
        let url = self.registry.create(document.into_bytes());
        let registry = self.registry.clone();
        let href = url.as_str().to_string();
        let outcome = run_in_background(move || {
            let bytes = registry
                .resolve(&href)
                .ok_or_else(|| ExportError::MissingResource(href.clone()))?;
            let rgba = rasterize(&bytes, width, height)?;
            encode_png(rgba, width, height)
        })
        .await;
        drop(url);
        let png = outcome??;
        info!(width, height, bytes = png.len(), "raster export complete");
        Ok(ExportedFile::new(ExportFormat::Png, width, height, png))
    }
}

/// Exports `scene` at `scale` with a private registry.
pub async fn export_raster(scene: &Scene, scale: f64) -> Result<ExportedFile, ExportError> {
    Rasterizer::default().export(scene, scale).await
}
