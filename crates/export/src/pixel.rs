//! Conversion from the rasterizer's premultiplied pixels to straight RGBA8.

use resvg::tiny_skia::Pixmap;

/// Un-premultiplies every pixel of `pixmap` into an RGBA8 buffer of
/// `width * height * 4` bytes.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}
