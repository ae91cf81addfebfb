use std::cell::RefCell;
use std::collections::VecDeque;

use crate::ocr::{OcrEngine, OcrError, PageLevel, WordBox, OCR_WHITELIST};

/// Engine that replays canned boxes, one response per call, and records the
/// size of every crop it was handed.
pub(crate) struct ScriptedEngine {
    responses: RefCell<VecDeque<Vec<WordBox>>>,
    crops: RefCell<Vec<(u32, u32)>>,
}

impl ScriptedEngine {
    pub(crate) fn new(responses: Vec<Vec<WordBox>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            crops: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn crops(&self) -> Vec<(u32, u32)> {
        self.crops.borrow().clone()
    }
}

impl OcrEngine for ScriptedEngine {
    fn recognize(
        &self,
        png: &[u8],
        whitelist: &str,
        level: PageLevel,
    ) -> Result<Vec<WordBox>, OcrError> {
        assert_eq!(whitelist, OCR_WHITELIST);
        assert_eq!(level, PageLevel::Line);

        let crop = image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .expect("engine is handed a PNG");
        self.crops.borrow_mut().push((crop.width(), crop.height()));

        Ok(self.responses.borrow_mut().pop_front().unwrap_or_default())
    }
}
