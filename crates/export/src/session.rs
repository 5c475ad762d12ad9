//! The session: owner of the live configuration and its rendered scene.
//!
//! A [`Session`] is the control surface a panel drives. Every mutation
//! re-renders synchronously once the scene is attached, and downloads read
//! a snapshot of the scene so later edits never leak into a running export.

use std::cell::Cell;
use std::time::Duration;

use noisy_gradient_core::generate::DEFAULT_BLOB_COUNT;
use noisy_gradient_core::{generate, render, ConfigPatch, Configuration, Scene, Xorshift64};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::ExportError;
use crate::file::ExportedFile;
#[cfg(feature = "png")]
use crate::raster::Rasterizer;
use crate::vector::export_vector;
use crate::worker::delay;

/// Message shown to the user when an export fails.
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to export image. Please try again.";
/// Pause before an export starts, so a busy indicator can appear first.
pub const DEFAULT_EXPORT_DELAY: Duration = Duration::from_millis(100);

/// Receives user-facing notifications.
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<F: Fn(&str)> Notifier for F {
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Output kind of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Vector,
    Raster,
}

/// A download trigger. `scale` only affects raster output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadRequest {
    pub format: DownloadFormat,
    pub scale: f64,
}

impl DownloadRequest {
    pub fn vector() -> Self {
        Self {
            format: DownloadFormat::Vector,
            scale: 1.0,
        }
    }

    pub fn raster(scale: f64) -> Self {
        Self {
            format: DownloadFormat::Raster,
            scale,
        }
    }
}

/// Marks the session busy for as long as it lives.
struct BusyGuard<'a>(&'a Cell<usize>);

impl<'a> BusyGuard<'a> {
    fn enter(count: &'a Cell<usize>) -> Self {
        count.set(count.get() + 1);
        Self(count)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

pub struct Session {
    config: Configuration,
    scene: Option<Scene>,
    rng: Xorshift64,
    blob_count: usize,
    export_delay: Duration,
    in_flight: Cell<usize>,
    notifier: Box<dyn Notifier>,
    #[cfg(feature = "png")]
    rasterizer: Rasterizer,
}

impl Session {
    /// Creates a session with the default configuration and no scene.
    pub fn new(seed: u64, notifier: impl Notifier + 'static) -> Self {
        Self::with_config(Configuration::default(), seed, notifier)
    }

    /// Creates a session around an existing configuration.
    pub fn with_config(config: Configuration, seed: u64, notifier: impl Notifier + 'static) -> Self {
        Self {
            config,
            scene: None,
            rng: Xorshift64::new(seed),
            blob_count: DEFAULT_BLOB_COUNT,
            export_delay: DEFAULT_EXPORT_DELAY,
            in_flight: Cell::new(0),
            notifier: Box::new(notifier),
            #[cfg(feature = "png")]
            rasterizer: Rasterizer::default(),
        }
    }

    /// Sets the number of blobs drawn by [`Session::regenerate`].
    pub fn set_blob_count(&mut self, count: usize) {
        self.blob_count = count;
    }

    pub fn set_export_delay(&mut self, delay: Duration) {
        self.export_delay = delay;
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The current scene, or `None` before the first [`Session::render`].
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Renders the configuration and attaches the scene.
    pub fn render(&mut self) -> &Scene {
        self.scene.insert(render(&self.config))
    }

    fn refresh(&mut self) {
        if self.scene.is_some() {
            self.render();
        }
    }

    /// Applies a partial update.
    pub fn update(&mut self, patch: ConfigPatch) {
        self.config.apply(patch);
        self.refresh();
    }

    /// Applies a loosely-typed update, coercing invalid values.
    pub fn update_from_params(&mut self, params: &Value) {
        self.update(ConfigPatch::from_params(params));
    }

    /// Replaces the whole configuration.
    pub fn replace(&mut self, config: Configuration) {
        self.config = config;
        self.refresh();
    }

    /// Draws a fresh composition. Only blobs and background change.
    pub fn regenerate(&mut self) {
        let composition = generate(self.blob_count, &mut self.rng);
        debug!(blobs = composition.blobs.len(), "regenerated composition");
        self.update(ConfigPatch {
            blobs: Some(composition.blobs),
            background_color: Some(composition.background),
            ..ConfigPatch::default()
        });
    }

    /// True while at least one download is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get() > 0
    }

    /// Exports the current scene.
    ///
    /// Returns `None` without side effects if no scene is attached yet.
    /// Failures are logged and reported once through the notifier; the busy
    /// state is cleared on every path.
    pub async fn download(&self, request: DownloadRequest) -> Option<ExportedFile> {
        self.try_download(request).await.ok().flatten()
    }

    /// Like [`Session::download`], but hands the failure back to the caller
    /// after it has been logged and notified.
    pub async fn try_download(
        &self,
        request: DownloadRequest,
    ) -> Result<Option<ExportedFile>, ExportError> {
        let Some(scene) = self.scene.clone() else {
            warn!(?request, "download declined: no scene rendered yet");
            return Ok(None);
        };
        let _busy = BusyGuard::enter(&self.in_flight);
        match self.export(&scene, request).await {
            Ok(file) => {
                info!(file = %file.file_name, width = file.width, height = file.height, "export ready");
                Ok(Some(file))
            }
            Err(e) => {
                error!(error = %e, ?request, "export failed");
                self.notifier.notify(EXPORT_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    async fn export(
        &self,
        scene: &Scene,
        request: DownloadRequest,
    ) -> Result<ExportedFile, ExportError> {
        delay(self.export_delay).await?;
        match request.format {
            DownloadFormat::Vector => Ok(export_vector(scene)),
            #[cfg(feature = "png")]
            DownloadFormat::Raster => self.rasterizer.export(scene, request.scale).await,
            #[cfg(not(feature = "png"))]
            DownloadFormat::Raster => Err(ExportError::Unsupported("png")),
        }
    }

    #[cfg(all(test, feature = "png"))]
    fn live_urls(&self) -> usize {
        self.rasterizer.registry().live_count()
    }
}
