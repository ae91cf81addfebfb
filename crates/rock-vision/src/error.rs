use crate::ocr::OcrError;
use std::fmt;

/// Composition fields read off the scan panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Category,
    Mass,
    Resistance,
    Instability,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Category => "rock category",
            Field::Mass => "rock mass",
            Field::Resistance => "rock resistance",
            Field::Instability => "rock instability",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan results label not found in detection window")]
    AnchorNotFound,
    #[error("{0} not found in composition window")]
    FieldNotFound(Field),
    #[error("{field} value {value:?} could not be parsed: {reason}")]
    InvalidField {
        field: Field,
        value: String,
        reason: String,
    },
    #[error("cropped image encode error: {0}")]
    Encoding(#[from] image::ImageError),
    #[error("ocr failed: {0}")]
    Ocr(#[from] OcrError),
}

impl ScanError {
    /// Field the error is about, if it came from composition extraction
    pub fn field(&self) -> Option<Field> {
        match self {
            ScanError::FieldNotFound(field) | ScanError::InvalidField { field, .. } => {
                Some(*field)
            }
            _ => None,
        }
    }
}
