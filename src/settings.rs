use rock_vision::TesseractConfig;
use std::path::PathBuf;

/// Environment variables read at startup
pub const TESSERACT_VAR: &str = "SCAN_READER_TESSERACT";
pub const LANG_VAR: &str = "SCAN_READER_LANG";
pub const TESSDATA_VAR: &str = "SCAN_READER_TESSDATA";

/// Runtime settings. Only the OCR backend is configurable; HUD geometry and
/// matching thresholds are fixed.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub tesseract: TesseractConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source, falling back to the
    /// defaults for anything unset or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut tesseract = TesseractConfig::default();

        if let Some(command) = var(TESSERACT_VAR) {
            tesseract.command = PathBuf::from(command);
        }
        if let Some(language) = var(LANG_VAR) {
            tesseract.language = language;
        }
        tesseract.tessdata_dir = var(TESSDATA_VAR).map(PathBuf::from);

        Self { tesseract }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings.tesseract.command, PathBuf::from("tesseract"));
        assert_eq!(settings.tesseract.language, "eng");
        assert!(settings.tesseract.tessdata_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (TESSERACT_VAR, "/opt/tesseract/bin/tesseract"),
            (LANG_VAR, "eng+osd"),
            (TESSDATA_VAR, "/opt/tesseract/tessdata"),
        ]));
        assert_eq!(
            settings.tesseract.command,
            PathBuf::from("/opt/tesseract/bin/tesseract")
        );
        assert_eq!(settings.tesseract.language, "eng+osd");
        assert_eq!(
            settings.tesseract.tessdata_dir,
            Some(PathBuf::from("/opt/tesseract/tessdata"))
        );
    }

    #[test]
    fn test_blank_values_fall_back() {
        let settings = Settings::from_lookup(lookup(&[(TESSERACT_VAR, "  "), (LANG_VAR, "")]));
        assert_eq!(settings.tesseract.command, PathBuf::from("tesseract"));
        assert_eq!(settings.tesseract.language, "eng");
    }
}
