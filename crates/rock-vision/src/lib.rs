//! Reads the rock composition panel out of cockpit HUD screenshots.
//!
//! Two OCR passes per frame: the first finds the "SCAN RESULTS" label in a
//! fixed window of the HUD, the second reads the panel rendered under it.

pub mod error;
pub mod fields;
pub mod locator;
pub mod ocr;
pub mod similarity;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Field, ScanError};
pub use fields::{composition_window, extract_composition, read_composition};
pub use locator::{detection_window, locate_scan_results, ANCHOR_PHRASE};
pub use ocr::{OcrEngine, OcrError, PageLevel, Tesseract, TesseractConfig, WordBox, OCR_WHITELIST};
pub use similarity::{similarity, NEEDED_SIMILARITY};

use image::RgbaImage;
use rock_state::RockComposition;
use tracing::debug;

/// Run the full frame → composition read. Composition extraction is only
/// attempted once the anchor label has been found.
pub fn read_rock<E: OcrEngine + ?Sized>(
    frame: &RgbaImage,
    engine: &E,
) -> Result<RockComposition, ScanError> {
    let anchor = locate_scan_results(frame, engine)?;
    debug!(
        origin = ?(anchor.min_x, anchor.min_y),
        size = ?(anchor.width(), anchor.height()),
        "scan results label located"
    );
    extract_composition(frame, &anchor, engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rock_capture::PixelRect;
    use rock_state::RockCategory;
    use crate::testing::ScriptedEngine;

    fn line(text: &str, confidence: f32, y: i32) -> WordBox {
        WordBox::new(text, confidence, PixelRect::from_origin_size(4, y, 120, 18))
    }

    #[test]
    fn test_read_rock() {
        let frame = RgbaImage::new(1920, 1080);
        let engine = ScriptedEngine::new(vec![
            vec![line("SCAN RESULTS", 93.0, 10)],
            vec![
                line("ASTEROID (S-TYPE)", 92.0, 0),
                line("MASS: 10250", 91.0, 20),
                line("RESISTANCE: 35%", 90.0, 40),
                line("INSTABILITY: 310.42", 89.0, 60),
            ],
        ]);

        let comp = read_rock(&frame, &engine).unwrap();
        assert_eq!(comp.category, RockCategory::SType);
        assert_eq!(comp.mass, 10250);
        assert_eq!(comp.resistance, 35);
        assert_eq!(comp.instability, 310.42);

        // anchor (1271,425)-(1391,443) in full-frame coordinates
        let window = composition_window(&PixelRect::new(1271, 425, 1391, 443), 1920, 1080);
        let crops = engine.crops();
        assert_eq!(crops.len(), 2);
        assert_eq!(crops[1], (window.width() as u32, window.height() as u32));
    }

    #[test]
    fn test_missing_anchor_skips_extraction() {
        let frame = RgbaImage::new(1920, 1080);
        let engine = ScriptedEngine::new(vec![vec![line("LANDING GEAR", 99.0, 0)]]);

        assert!(matches!(
            read_rock(&frame, &engine),
            Err(ScanError::AnchorNotFound)
        ));
        assert_eq!(engine.crops().len(), 1);
    }
}
