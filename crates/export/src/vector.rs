//! Vector export: the rendered scene serialized verbatim.

use noisy_gradient_core::Scene;
use tracing::debug;

use crate::file::{ExportFormat, ExportedFile};

/// Serializes `scene` as a standalone SVG file at its declared size.
pub fn export_vector(scene: &Scene) -> ExportedFile {
    let document = scene.to_svg();
    debug!(
        width = scene.width(),
        height = scene.height(),
        bytes = document.len(),
        "serialized vector scene"
    );
    ExportedFile::new(
        ExportFormat::Svg,
        scene.width(),
        scene.height(),
        document.into_bytes(),
    )
}
