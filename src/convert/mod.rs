//! Design-file conversion collaborators.
//!
//! [`DesignConverter`] is the capability the pipeline consumes: turn a
//! design file into a raster image on disk. [`StitchRenderer`] is the
//! production implementation for Brother PES files: it decodes the PEC
//! stitch section and rasterizes the polylines into a JPEG preview.

mod pes;
mod render;

pub use pes::{Pattern, Stitch, StitchCommand, parse_pes};
pub use render::{RenderOptions, render};

use std::path::Path;

use crate::error::ConvertError;

/// Converts a design file into a raster image at `output`.
pub trait DesignConverter {
    fn convert(&self, source: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// PES → JPEG converter. Parses the stitch data and draws each thread
/// run as a polyline on a white canvas.
pub struct StitchRenderer {
    options: RenderOptions,
}

impl StitchRenderer {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            options: RenderOptions {
                max_width,
                max_height,
                ..RenderOptions::default()
            },
        }
    }
}

impl Default for StitchRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl DesignConverter for StitchRenderer {
    fn convert(&self, source: &Path, output: &Path) -> Result<(), ConvertError> {
        tracing::info!(source = %source.display(), output = %output.display(), "converting design file");

        let data = std::fs::read(source)?;
        let pattern = parse_pes(&data)?;
        let img = render(&pattern, &self.options);

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        img.save_with_format(output, image::ImageFormat::Jpeg)?;

        tracing::debug!(stitches = pattern.stitches.len(), "conversion finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::pes::test_support::synthetic_pes;

    #[test]
    fn convert_writes_a_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bear.pes");
        let output = dir.path().join("out/bear.jpg");
        std::fs::write(&source, synthetic_pes(&[(0, 0), (40, 0), (40, 40), (0, 40)])).unwrap();

        let converter = StitchRenderer::default();
        converter.convert(&source, &output).unwrap();

        assert!(output.is_file());
        // JPEG magic bytes.
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn convert_rejects_non_pes_input() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        let output = dir.path().join("notes.jpg");
        std::fs::write(&source, b"just some text").unwrap();

        let err = StitchRenderer::default()
            .convert(&source, &output)
            .unwrap_err();
        assert!(matches!(err, ConvertError::BadMagic));
        assert!(!output.exists());
    }

    #[test]
    fn convert_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StitchRenderer::default()
            .convert(&dir.path().join("ghost.pes"), &dir.path().join("ghost.jpg"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
