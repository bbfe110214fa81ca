use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat};
use leptess::{LepTess, Variable};

use crate::engine::{BackendKind, OcrError, Recognizer};

/// Page segmentation mode 6: assume a single uniform block of text.
const SINGLE_BLOCK_PSM: &str = "6";

/// Tesseract prefers ~300 DPI; crops carry no resolution metadata.
const SOURCE_DPI: i32 = 300;

pub struct TesseractRecognizer {
    tess: LepTess,
}

impl TesseractRecognizer {
    pub fn new(language: &str) -> Result<Self, OcrError> {
        let mut tess = LepTess::new(None, language).map_err(|e| {
            OcrError::EngineError(format!(
                "failed to initialize Tesseract for language '{language}': {e}"
            ))
        })?;
        tess.set_variable(Variable::TesseditPagesegMode, SINGLE_BLOCK_PSM)
            .map_err(|e| OcrError::EngineError(format!("failed to set page segmentation mode: {e}")))?;

        Ok(Self { tess })
    }
}

fn to_gray(crop: &DynamicImage) -> GrayImage {
    match crop {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => other.to_luma8(),
    }
}

impl Recognizer for TesseractRecognizer {
    fn kind(&self) -> BackendKind {
        BackendKind::Traditional
    }

    fn recognize(&mut self, crop: &DynamicImage) -> Result<String, OcrError> {
        let gray = to_gray(crop);

        let mut png_bytes = Vec::new();
        gray.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| OcrError::InvalidInput(format!("failed to encode crop: {e}")))?;

        self.tess
            .set_image_from_mem(&png_bytes)
            .map_err(|e| OcrError::EngineError(format!("failed to load crop into Tesseract: {e}")))?;
        self.tess.set_source_resolution(SOURCE_DPI);

        let text = self
            .tess
            .get_utf8_text()
            .map_err(|e| OcrError::EngineError(format!("failed to read text: {e}")))?;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    #[test]
    fn test_to_gray_keeps_luma_input() {
        let gray = ImageBuffer::from_pixel(4, 3, Luma([17u8]));
        let converted = to_gray(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }

    #[test]
    fn test_to_gray_converts_color_input() {
        let rgb = ImageBuffer::from_pixel(4, 3, Rgb([255u8, 255, 255]));
        let converted = to_gray(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(converted.dimensions(), (4, 3));
        assert_eq!(converted.get_pixel(0, 0), &Luma([255u8]));
    }

    #[test]
    fn test_blank_crop_yields_no_text() {
        let mut recognizer = match TesseractRecognizer::new("eng") {
            Ok(r) => r,
            Err(e) => {
                eprintln!("skipping test: {e}");
                return;
            }
        };
        let blank = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(120, 40, Luma([255u8])));
        let text = recognizer.recognize(&blank).unwrap();
        assert!(text.trim().is_empty());
    }
}
