use anyhow::Result;
use image::RgbaImage;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use rock_capture::load_screenshot;
use rock_state::RockComposition;
use rock_vision::{OcrEngine, ScanError};

/// Screenshots processed by a run, in order
pub const DEFAULT_SCREENSHOTS: [&str; 6] = [
    "screenshot-1.png",
    "screenshot-2.png",
    "screenshot-3.png",
    "screenshot-4.png",
    "screenshot-5.png",
    "screenshot-6.png",
];

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub failed: usize,
}

/// Manages the screenshot → anchor → composition pipeline, one image at a time
pub struct Pipeline<E> {
    engine: E,
}

impl<E: OcrEngine> Pipeline<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Read the composition off a single decoded screenshot.
    pub fn scan_screenshot(&self, frame: &RgbaImage) -> Result<RockComposition, ScanError> {
        rock_vision::read_rock(frame, &self.engine)
    }

    /// Process `paths` in order, writing one record per screenshot to `out`.
    ///
    /// A screenshot that cannot be read is reported and skipped. A file that
    /// cannot be loaded or decoded aborts the whole run.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P], out: &mut impl Write) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for path in paths {
            let path = path.as_ref();
            let frame = load_screenshot(path)?;

            match self.scan_screenshot(&frame) {
                Ok(comp) => {
                    info!(filename = %path.display(), composition = %comp, "composition read");
                    writeln!(out, "{}: {}", path.display(), comp)?;
                    summary.scanned += 1;
                }
                Err(e) => {
                    warn!(
                        filename = %path.display(),
                        field = ?e.field(),
                        error = %e,
                        "scan failed"
                    );
                    writeln!(out, "{}: {}", path.display(), e)?;
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
