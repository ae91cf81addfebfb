use image::RgbaImage;
use rock_capture::{crop_rect, encode_png, regions, PixelRect};
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::ocr::{OcrEngine, PageLevel, WordBox, OCR_WHITELIST};
use crate::similarity::{is_similar, similarity};

/// Label that anchors the composition panel
pub const ANCHOR_PHRASE: &str = "SCAN RESULTS";

/// Anchor matches below this OCR confidence are accepted with a warning
pub const LOW_CONFIDENCE_WARNING: f32 = 50.0;

/// Pixel window scanned for the anchor label in a `width` x `height` frame.
pub fn detection_window(width: u32, height: u32) -> PixelRect {
    regions::scan_results().to_pixels(width, height)
}

/// Find the "SCAN RESULTS" label in the cockpit HUD.
///
/// Returns the label's box in full-frame coordinates. Fails with
/// [`ScanError::AnchorNotFound`] when the label is not visible, e.g. outside
/// the cockpit view.
pub fn locate_scan_results<E: OcrEngine + ?Sized>(
    frame: &RgbaImage,
    engine: &E,
) -> Result<PixelRect, ScanError> {
    let window = detection_window(frame.width(), frame.height());
    debug!(
        origin = ?(window.min_x, window.min_y),
        size = ?(window.width(), window.height()),
        "anchor detection box"
    );

    let png = encode_png(&crop_rect(frame, &window))?;
    let boxes = engine.recognize(&png, OCR_WHITELIST, PageLevel::Line)?;

    find_anchor(&boxes, &window).ok_or(ScanError::AnchorNotFound)
}

/// First box whose text matches the anchor phrase, translated out of the
/// detection window.
fn find_anchor(boxes: &[WordBox], window: &PixelRect) -> Option<PixelRect> {
    for word_box in boxes {
        let word = word_box.text.trim_matches(['\n', '.', ' ']).trim();
        let score = similarity(word, ANCHOR_PHRASE);
        let bbox = word_box.bbox.translate(window.min_x, window.min_y);
        debug!(
            raw = ?word_box.text,
            word,
            confidence = word_box.confidence,
            similarity = score,
            origin = ?(bbox.min_x, bbox.min_y),
            size = ?(bbox.width(), bbox.height()),
            "anchor candidate"
        );

        if is_similar(word, ANCHOR_PHRASE) {
            if word_box.confidence < LOW_CONFIDENCE_WARNING {
                warn!(
                    confidence = word_box.confidence,
                    "scan results detection confidence is too low"
                );
            }
            return Some(bbox);
        }
    }
    None
}
