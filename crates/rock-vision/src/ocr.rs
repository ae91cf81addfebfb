use rock_capture::PixelRect;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Characters the HUD can render: upper-case letters, space, digits and the
/// punctuation used in labels and values.
pub const OCR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ 0123456789.%:()-";

/// One recognized token with its confidence (0-100) and bounding box, in the
/// coordinate space of the image handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub text: String,
    pub confidence: f32,
    pub bbox: PixelRect,
}

impl WordBox {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: PixelRect) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

/// Granularity of the boxes returned by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLevel {
    Block,
    Paragraph,
    Line,
    Word,
}

impl PageLevel {
    /// Row level used in Tesseract's TSV output
    fn tsv_level(self) -> u8 {
        match self {
            PageLevel::Block => 2,
            PageLevel::Paragraph => 3,
            PageLevel::Line => 4,
            PageLevel::Word => 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("failed to run tesseract: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("tesseract exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },
    #[error("ocr session i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected tesseract output: {0}")]
    Output(String),
}

/// Text recognition over an encoded PNG.
pub trait OcrEngine {
    fn recognize(
        &self,
        png: &[u8],
        whitelist: &str,
        level: PageLevel,
    ) -> Result<Vec<WordBox>, OcrError>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(
        &self,
        png: &[u8],
        whitelist: &str,
        level: PageLevel,
    ) -> Result<Vec<WordBox>, OcrError> {
        (**self).recognize(png, whitelist, level)
    }
}

/// How to invoke the Tesseract executable
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub command: PathBuf,
    pub language: String,
    pub tessdata_dir: Option<PathBuf>,
    /// Page segmentation mode
    pub psm: u8,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            tessdata_dir: None,
            psm: 3, // Fully automatic page segmentation
        }
    }
}

/// [`OcrEngine`] backed by the `tesseract` command line tool.
///
/// Every call opens its own [`TesseractSession`], so nothing is shared
/// between calls and the engine can be used from several places at once.
#[derive(Debug, Clone, Default)]
pub struct Tesseract {
    config: TesseractConfig,
}

impl Tesseract {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    /// Check if the executable is installed and accessible
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for Tesseract {
    fn recognize(
        &self,
        png: &[u8],
        whitelist: &str,
        level: PageLevel,
    ) -> Result<Vec<WordBox>, OcrError> {
        let session = TesseractSession::open()?;
        session.run(&self.config, png, whitelist)?;
        let tsv = session.read_tsv()?;
        parse_tsv(&tsv, level)
    }
}

/// Scratch space for a single recognition call. The directory, and the
/// input/output files in it, are removed when the session is dropped.
struct TesseractSession {
    dir: TempDir,
}

impl TesseractSession {
    fn open() -> Result<Self, OcrError> {
        let dir = tempfile::Builder::new().prefix("scan_reader_ocr").tempdir()?;
        debug!(dir = %dir.path().display(), "ocr session opened");
        Ok(Self { dir })
    }

    fn input_path(&self) -> PathBuf {
        self.dir.path().join("input.png")
    }

    /// Tesseract appends the `.tsv` extension itself
    fn output_base(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    fn run(&self, config: &TesseractConfig, png: &[u8], whitelist: &str) -> Result<(), OcrError> {
        let input = self.input_path();
        std::fs::write(&input, png)?;

        let mut cmd = Command::new(&config.command);
        cmd.arg(&input).arg(self.output_base());
        if let Some(dir) = &config.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.arg("-l")
            .arg(&config.language)
            .arg("--psm")
            .arg(config.psm.to_string())
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", whitelist))
            .arg("tsv");

        let output = cmd.output().map_err(OcrError::Spawn)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), %stderr, "tesseract failed");
            return Err(OcrError::Failed {
                status: output.status.code(),
                stderr,
            });
        }
        Ok(())
    }

    fn read_tsv(&self) -> Result<String, OcrError> {
        Ok(std::fs::read_to_string(
            self.output_base().with_extension("tsv"),
        )?)
    }

    #[cfg(test)]
    fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Drop for TesseractSession {
    fn drop(&mut self) {
        debug!(dir = %self.dir.path().display(), "ocr session released");
    }
}

/// A level-5 (word) row of Tesseract's TSV output
struct TsvWord<'a> {
    block: u32,
    par: u32,
    line: u32,
    bbox: PixelRect,
    confidence: f32,
    text: &'a str,
}

fn field<T: FromStr>(fields: &[&str], idx: usize) -> Option<T> {
    fields.get(idx)?.trim().parse().ok()
}

fn parse_word_row(row: &str) -> Option<TsvWord<'_>> {
    // level, page_num, block_num, par_num, line_num, word_num,
    // left, top, width, height, conf, text
    let fields: Vec<&str> = row.split('\t').collect();
    if fields.len() < 11 || field::<u8>(&fields, 0)? != PageLevel::Word.tsv_level() {
        return None;
    }

    let confidence: f32 = field(&fields, 10)?;
    let text = fields.get(11).copied().map(str::trim).unwrap_or("");
    if confidence < 0.0 || text.is_empty() {
        return None;
    }

    Some(TsvWord {
        block: field(&fields, 2)?,
        par: field(&fields, 3)?,
        line: field(&fields, 4)?,
        bbox: PixelRect::from_origin_size(
            field(&fields, 6)?,
            field(&fields, 7)?,
            field(&fields, 8)?,
            field(&fields, 9)?,
        ),
        confidence,
        text,
    })
}

/// Parses Tesseract TSV output into boxes at the requested level.
///
/// Only word rows carry text and confidence, so coarser levels are rebuilt
/// from them: words sharing a block/paragraph/line are joined with a space,
/// their boxes unioned and their confidences averaged.
pub fn parse_tsv(tsv: &str, level: PageLevel) -> Result<Vec<WordBox>, OcrError> {
    let mut rows = tsv.lines();
    match rows.next() {
        None => return Ok(Vec::new()),
        Some(header) if header.starts_with("level") => {}
        Some(header) => return Err(OcrError::Output(format!("missing TSV header: {header:?}"))),
    }

    let mut groups: Vec<((u32, u32, u32), Vec<TsvWord<'_>>)> = Vec::new();
    for word in rows.filter_map(parse_word_row) {
        let key = match level {
            PageLevel::Block => (word.block, 0, 0),
            PageLevel::Paragraph => (word.block, word.par, 0),
            PageLevel::Line => (word.block, word.par, word.line),
            PageLevel::Word => {
                groups.push(((0, 0, 0), vec![word]));
                continue;
            }
        };
        match groups.last_mut() {
            Some((last, words)) if *last == key => words.push(word),
            _ => groups.push((key, vec![word])),
        }
    }

    Ok(groups
        .into_iter()
        .map(|(_, words)| {
            let text = words.iter().map(|w| w.text).collect::<Vec<_>>().join(" ");
            let confidence =
                words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32;
            let bbox = words
                .iter()
                .fold(PixelRect::default(), |acc, w| acc.union(&w.bbox));
            WordBox::new(text, confidence, bbox)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn sample_tsv() -> String {
        [
            HEADER,
            "1\t1\t0\t0\t0\t0\t0\t0\t260\t220\t-1\t",
            "2\t1\t1\t0\t0\t0\t10\t5\t200\t60\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t5\t120\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t5\t50\t20\t90.5\tMASS:",
            "5\t1\t1\t1\t1\t2\t70\t6\t60\t19\t89.5\t4500",
            "4\t1\t1\t1\t2\t0\t10\t40\t180\t20\t-1\t",
            "5\t1\t1\t1\t2\t1\t10\t40\t110\t20\t80\tRESISTANCE:",
            "5\t1\t1\t1\t2\t2\t130\t41\t60\t19\t70\t20%",
            "5\t1\t1\t1\t2\t3\t195\t41\t5\t19\t95\t ",
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_tsv_lines() {
        let boxes = parse_tsv(&sample_tsv(), PageLevel::Line).unwrap();
        assert_eq!(boxes.len(), 2);

        assert_eq!(boxes[0].text, "MASS: 4500");
        assert_eq!(boxes[0].confidence, 90.0);
        assert_eq!(boxes[0].bbox, PixelRect::new(10, 5, 130, 25));

        assert_eq!(boxes[1].text, "RESISTANCE: 20%");
        assert_eq!(boxes[1].confidence, 75.0);
        assert_eq!(boxes[1].bbox, PixelRect::new(10, 40, 190, 60));
    }

    #[test]
    fn test_parse_tsv_words() {
        let boxes = parse_tsv(&sample_tsv(), PageLevel::Word).unwrap();
        let words: Vec<_> = boxes.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(words, ["MASS:", "4500", "RESISTANCE:", "20%"]);
        assert_eq!(boxes[1].bbox, PixelRect::new(70, 6, 130, 25));
    }

    #[test]
    fn test_parse_tsv_blocks() {
        let boxes = parse_tsv(&sample_tsv(), PageLevel::Block).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].text, "MASS: 4500 RESISTANCE: 20%");
        assert_eq!(boxes[0].bbox, PixelRect::new(10, 5, 190, 60));
    }

    #[test]
    fn test_parse_tsv_empty_and_malformed() {
        assert!(parse_tsv("", PageLevel::Line).unwrap().is_empty());
        assert!(parse_tsv(HEADER, PageLevel::Line).unwrap().is_empty());
        assert!(matches!(
            parse_tsv("Error opening data file", PageLevel::Line),
            Err(OcrError::Output(_))
        ));

        // Rows with unparsable numbers are skipped
        let tsv = format!("{HEADER}\n5\t1\t1\t1\t1\t1\tx\t5\t50\t20\t90\tMASS:");
        assert!(parse_tsv(&tsv, PageLevel::Line).unwrap().is_empty());
    }

    #[test]
    fn test_default_config_uses_automatic_segmentation() {
        let config = TesseractConfig::default();
        assert_eq!(config.psm, 3);
        assert_eq!(config.language, "eng");
        assert!(config.tessdata_dir.is_none());
    }

    #[test]
    fn test_session_is_released_on_drop() {
        let session = TesseractSession::open().unwrap();
        let dir = session.path().to_path_buf();
        std::fs::write(session.input_path(), b"png").unwrap();
        assert!(dir.exists());
        drop(session);
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_executable_is_spawn_error() {
        let engine = Tesseract::new(TesseractConfig {
            command: PathBuf::from("/nonexistent/tesseract-binary"),
            ..TesseractConfig::default()
        });
        assert!(!engine.is_available());
        let err = engine
            .recognize(b"not used", OCR_WHITELIST, PageLevel::Line)
            .unwrap_err();
        assert!(matches!(err, OcrError::Spawn(_)));
    }
}
