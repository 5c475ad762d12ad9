//! Error types for the export pipeline.

use thiserror::Error;

/// Errors produced while exporting a scene.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The raster scale was not a finite positive number, or rounded to an
    /// empty pixel surface.
    #[error("invalid export scale {0}: must be a finite number > 0 giving at least 1px")]
    InvalidScale(f64),

    /// The rasterizer could not read the serialized document.
    #[error("failed to decode scene document: {0}")]
    Decode(String),

    /// The pixel surface exceeds the size limit or could not be allocated.
    #[error("cannot allocate a {width}x{height} pixel surface")]
    Surface { width: u32, height: u32 },

    /// The pixel surface could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// A temporary document handle was looked up after it was revoked.
    #[error("object URL '{0}' is not registered")]
    MissingResource(String),

    /// The background worker exited without reporting a result.
    #[error("export worker stopped before finishing")]
    WorkerLost,

    /// The requested format was compiled out of this build.
    #[error("{0} export is not available in this build")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_scale_includes_value() {
        let msg = ExportError::InvalidScale(-2.0).to_string();
        assert!(msg.contains("-2"), "missing scale in: {msg}");
    }

    #[test]
    fn surface_includes_dimensions() {
        let msg = ExportError::Surface {
            width: 3840,
            height: 2160,
        }
        .to_string();
        assert!(msg.contains("3840x2160"), "missing size in: {msg}");
    }

    #[test]
    fn io_error_converts() {
        let err: ExportError = std::io::Error::other("disk full").into();
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn export_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExportError>();
    }
}
