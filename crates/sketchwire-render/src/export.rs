//! On-demand rasterization of the current history to a PNG artifact.

use std::path::Path;

use crate::pixmap::Pixmap;
use crate::renderer::paint_stroke;
use crate::surface::{DrawSurface, SurfaceDimensions};
use sketchwire_core::{Rgba, Stroke};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),
    #[error("failed to write image file: {0}")]
    Io(#[from] std::io::Error),
}

/// Rasterize history into a pixmap at the given dimensions and scale.
///
/// `background` is the optional fill behind the strokes; `None` leaves the
/// surface transparent.
pub fn rasterize(
    history: &[Stroke],
    dimensions: SurfaceDimensions,
    scale: (f64, f64),
    background: Option<Rgba>,
) -> Pixmap {
    let width = dimensions.width.round().max(1.0) as u32;
    let height = dimensions.height.round().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height);
    if let Some(color) = background {
        pixmap.fill(color);
    }
    for stroke in history {
        paint_stroke(&mut pixmap, stroke, scale.0, scale.1);
    }
    pixmap
}

/// Encode a pixmap as PNG bytes.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixmap.pixels())?;
    }
    Ok(data)
}

/// Rasterize and encode in one step.
pub fn export_png(
    history: &[Stroke],
    dimensions: SurfaceDimensions,
    scale: (f64, f64),
    background: Option<Rgba>,
) -> Result<Vec<u8>, ExportError> {
    encode_png(&rasterize(history, dimensions, scale, background))
}

/// Write exported PNG bytes to a local file.
pub fn save_png(path: impl AsRef<Path>, data: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchwire_core::Point;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn history() -> Vec<Stroke> {
        vec![Stroke::freehand(
            vec![Point::new(2.0, 2.0), Point::new(30.0, 2.0)],
            "#ff0000",
            4.0,
        )]
    }

    #[test]
    fn test_export_produces_png() {
        let data = export_png(
            &history(),
            SurfaceDimensions::new(64.0, 48.0),
            (1.0, 1.0),
            Some(Rgba::white()),
        )
        .unwrap();
        assert_eq!(&data[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_background_flag() {
        let dims = SurfaceDimensions::new(32.0, 32.0);
        let with_bg = rasterize(&history(), dims, (1.0, 1.0), Some(Rgba::white()));
        let without_bg = rasterize(&history(), dims, (1.0, 1.0), None);

        // An untouched corner pixel shows the difference.
        assert_eq!(with_bg.pixel(31, 31), Rgba::white());
        assert_eq!(without_bg.pixel(31, 31), Rgba::transparent());
        // The stroke is present either way.
        assert_eq!(with_bg.pixel(10, 2), Rgba::new(255, 0, 0, 255));
        assert_eq!(without_bg.pixel(10, 2), Rgba::new(255, 0, 0, 255));
    }

    #[test]
    fn test_rasterize_applies_scale() {
        let dims = SurfaceDimensions::new(64.0, 64.0);
        let strokes = vec![Stroke::freehand(
            vec![Point::new(4.0, 4.0), Point::new(8.0, 4.0)],
            "#000000",
            2.0,
        )];
        let scaled = rasterize(&strokes, dims, (4.0, 4.0), None);
        assert_eq!(scaled.pixel(24, 16), Rgba::black());
    }

    #[test]
    fn test_save_png_writes_file() {
        let dir = std::env::temp_dir().join("sketchwire-export-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("surface.png");

        let data = export_png(
            &history(),
            SurfaceDimensions::new(16.0, 16.0),
            (1.0, 1.0),
            None,
        )
        .unwrap();
        save_png(&path, &data).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, data);
        std::fs::remove_file(&path).ok();
    }
}
