#![deny(unsafe_code)]
//! Export pipeline and session controller for noisy-gradient.
//!
//! Scenes leave the process either as SVG documents ([`export_vector`]) or,
//! with the default `png` feature, as PNG images rasterized at any scale on
//! a background worker. [`Session`] ties a live configuration to its scene
//! and drives downloads the way a control panel would.

pub mod error;
pub mod file;
#[cfg(feature = "png")]
pub mod pixel;
#[cfg(feature = "png")]
pub mod raster;
pub mod resource;
pub mod session;
pub mod vector;
pub mod worker;

pub use error::ExportError;
pub use file::{ExportFormat, ExportedFile};
#[cfg(feature = "png")]
pub use raster::{export_raster, Rasterizer};
pub use resource::{ObjectUrl, ObjectUrlRegistry};
pub use session::{DownloadFormat, DownloadRequest, Notifier, Session, EXPORT_FAILED_MESSAGE};
pub use vector::export_vector;
