use image::RgbaImage;
use rock_capture::{crop_rect, encode_png, PixelRect};
use rock_state::{RockCategory, RockComposition};
use tracing::debug;

use crate::error::{Field, ScanError};
use crate::ocr::{OcrEngine, PageLevel, WordBox, OCR_WHITELIST};
use crate::similarity::{is_similar, similarity, NEEDED_SIMILARITY};

/// Minimum OCR confidence, as a fraction of 100, for a composition box.
/// Shares its value with the similarity gate.
pub const NEEDED_CONFIDENCE: f64 = NEEDED_SIMILARITY;

const CATEGORY_TRIM: [char; 5] = ['\n', ' ', '.', ':', '%'];

/// A "LABEL: value" line on the composition panel
struct LabeledField {
    field: Field,
    label: &'static str,
    /// Stripped from both ends of the line before splitting
    trim: &'static [char],
}

const MASS: LabeledField = LabeledField {
    field: Field::Mass,
    label: "MASS:",
    trim: &['\n'],
};

const RESISTANCE: LabeledField = LabeledField {
    field: Field::Resistance,
    label: "RESISTANCE:",
    trim: &['\n', ' ', '.'],
};

const INSTABILITY: LabeledField = LabeledField {
    field: Field::Instability,
    label: "INSTABILITY:",
    trim: &['\n', '%', '.', ' ', ':'],
};

/// Window holding the composition panel, derived from the anchor label box.
///
/// The panel renders below and to the right of the label: the window starts
/// 0.7% of the frame width left of the label and half a label height down,
/// and extends 1.45 label widths right and ten label heights down, clipped
/// to the frame.
pub fn composition_window(anchor: &PixelRect, width: u32, height: u32) -> PixelRect {
    let left = (anchor.min_x as f64 - width as f64 * 0.007) as i32;
    let right = anchor.max_x + (1.45 * anchor.width() as f64) as i32;
    PixelRect::new(
        left.max(0),
        (anchor.min_y + anchor.height() / 2).max(0),
        right.min(width as i32),
        (anchor.max_y + 10 * anchor.height()).min(height as i32),
    )
}

/// Read the rock composition from the panel under the anchor label.
pub fn extract_composition<E: OcrEngine + ?Sized>(
    frame: &RgbaImage,
    anchor: &PixelRect,
    engine: &E,
) -> Result<RockComposition, ScanError> {
    let window = composition_window(anchor, frame.width(), frame.height());
    debug!(
        origin = ?(window.min_x, window.min_y),
        size = ?(window.width(), window.height()),
        "composition detection box"
    );

    let png = encode_png(&crop_rect(frame, &window))?;
    let boxes = engine.recognize(&png, OCR_WHITELIST, PageLevel::Line)?;
    read_composition(&boxes)
}

/// Parse all four composition fields out of the panel's OCR boxes.
/// Each field is looked up independently; the first missing or malformed
/// one fails the whole read.
pub fn read_composition(boxes: &[WordBox]) -> Result<RockComposition, ScanError> {
    let category = find_category(boxes)?;
    let mass = parse_int(Field::Mass, find_value(boxes, &MASS)?)?;
    let resistance = parse_int(
        Field::Resistance,
        find_value(boxes, &RESISTANCE)?.trim_matches([' ', '%']),
    )?;
    let instability = parse_float(Field::Instability, find_value(boxes, &INSTABILITY)?)?;

    Ok(RockComposition::new(category, mass, resistance, instability))
}

fn is_confident(confidence: f32) -> bool {
    confidence as f64 / 100.0 >= NEEDED_CONFIDENCE
}

/// Category labels must match the closed set exactly; no fuzzy matching.
fn find_category(boxes: &[WordBox]) -> Result<RockCategory, ScanError> {
    for word_box in boxes {
        let word = word_box.text.trim_matches(CATEGORY_TRIM);
        let category = RockCategory::from_label(word);
        debug!(
            raw = ?word_box.text,
            word,
            confidence = word_box.confidence,
            known = category.is_some(),
            "category candidate"
        );

        if let Some(category) = category.filter(|_| is_confident(word_box.confidence)) {
            return Ok(category);
        }
    }
    Err(ScanError::FieldNotFound(Field::Category))
}

/// Value part of the first confident line whose label resembles `spec.label`
fn find_value<'a>(boxes: &'a [WordBox], spec: &LabeledField) -> Result<&'a str, ScanError> {
    for word_box in boxes {
        let line = word_box.text.trim_matches(spec.trim).trim();
        let (label, value) = match line.split_once(' ') {
            Some((label, value)) => (label, Some(value)),
            None => (line, None),
        };

        if !is_confident(word_box.confidence) || !is_similar(label, spec.label) {
            continue;
        }
        debug!(
            field = %spec.field,
            label,
            value,
            confidence = word_box.confidence,
            similarity = similarity(label, spec.label),
            "labeled line found"
        );

        return value.ok_or_else(|| ScanError::InvalidField {
            field: spec.field,
            value: String::new(),
            reason: "label has no value".to_string(),
        });
    }
    Err(ScanError::FieldNotFound(spec.field))
}

fn parse_int(field: Field, value: &str) -> Result<i64, ScanError> {
    let value = value.trim();
    value.parse().map_err(|e: std::num::ParseIntError| ScanError::InvalidField {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_float(field: Field, value: &str) -> Result<f32, ScanError> {
    let value = value.trim();
    value.parse().map_err(|e: std::num::ParseFloatError| ScanError::InvalidField {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
