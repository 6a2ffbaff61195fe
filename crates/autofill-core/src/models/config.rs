//! Configuration structures for extraction and form filling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AutofillError;

/// Main configuration for the autofill pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutofillConfig {
    /// PDF text acquisition configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Question-answering model configuration.
    pub qa: QaConfig,

    /// Form filling configuration.
    pub form: FormConfig,

    /// Browser launch configuration.
    pub browser: BrowserConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// PDF text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images before OCR.
    pub render_dpi: u32,

    /// Number of leading pages sent to OCR.
    pub ocr_max_pages: u32,

    /// Fragments whose trimmed length is not above this are discarded.
    pub min_fragment_length: usize,

    /// OCR runs when the text layers produced fewer characters than this.
    pub ocr_trigger_length: usize,

    /// Directory holding the PDFium library; the system path is searched
    /// when unset or when loading from it fails.
    pub pdfium_dir: Option<PathBuf>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            ocr_max_pages: 3,
            min_fragment_length: 50,
            ocr_trigger_length: 200,
            pdfium_dir: None,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR when the text layers are insufficient.
    pub enabled: bool,

    /// Language hint passed to the recognizer.
    pub language: String,

    /// Keep `[UNK]` markers in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "eng".to_string(),
            keep_unk: false,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Ask the question-answering model when line heuristics find nothing.
    pub use_qa_fallback: bool,

    /// Minimum answer score to accept a name.
    pub name_min_score: f32,

    /// Minimum answer score to accept an address.
    pub address_min_score: f32,

    /// Number of leading characters passed to the model as context.
    pub qa_context_chars: usize,

    /// The model is only asked when the text is longer than this.
    pub qa_min_text_length: usize,

    /// Extracted addresses are truncated to this many characters.
    pub address_max_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            use_qa_fallback: true,
            name_min_score: 0.3,
            address_min_score: 0.2,
            qa_context_chars: 2000,
            qa_min_text_length: 50,
            address_max_length: 200,
        }
    }
}

/// Question-answering model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Maximum tokens fed to the model (question + context).
    pub max_sequence_length: usize,

    /// Longest answer span considered, in tokens.
    pub max_answer_tokens: usize,

    /// Number of CPU threads for inference.
    pub num_threads: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            max_sequence_length: 384,
            max_answer_tokens: 30,
            num_threads: 4,
        }
    }
}

/// Form filling timings and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Navigation timeout.
    pub page_load_timeout_secs: u64,

    /// Pause after navigation before inspecting the page.
    pub settle_ms: u64,

    /// How long to wait for the first question group to appear.
    pub question_wait_secs: u64,

    /// Timeout for a single control interaction.
    pub action_timeout_ms: u64,

    /// Delay between simulated keystrokes.
    pub keystroke_delay_ms: u64,

    /// Pause after scrolling a control into view.
    pub scroll_settle_ms: u64,

    /// Pause after focusing or clicking a control.
    pub focus_settle_ms: u64,

    /// Pause after clearing a control.
    pub clear_settle_ms: u64,

    /// Pause after typing or selecting.
    pub input_settle_ms: u64,

    /// Pause before the final screenshot.
    pub screenshot_delay_ms: u64,

    /// Directory for screenshots.
    pub output_dir: PathBuf,

    /// File name of the screenshot taken after filling.
    pub screenshot_name: String,

    /// File name of the screenshot taken when the session fails.
    pub error_screenshot_name: String,

    /// Keep the browser open after filling until the user closes it.
    pub hold_open: bool,

    /// Interval between liveness checks while holding the browser open.
    pub liveness_poll_ms: u64,

    /// Upper bound on the hold, if any.
    pub max_hold_secs: Option<u64>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            page_load_timeout_secs: 60,
            settle_ms: 3000,
            question_wait_secs: 10,
            action_timeout_ms: 3000,
            keystroke_delay_ms: 50,
            scroll_settle_ms: 500,
            focus_settle_ms: 300,
            clear_settle_ms: 200,
            input_settle_ms: 500,
            screenshot_delay_ms: 2000,
            output_dir: PathBuf::from("outputs"),
            screenshot_name: "filled_form.png".to_string(),
            error_screenshot_name: "error.png".to_string(),
            hold_open: true,
            liveness_poll_ms: 1000,
            max_hold_secs: None,
        }
    }
}

impl FormConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.output_dir.join(&self.screenshot_name)
    }

    pub fn error_screenshot_path(&self) -> PathBuf {
        self.output_dir.join(&self.error_screenshot_name)
    }

    /// Settings with every pause set to zero, for tests and dry runs.
    pub fn without_delays(mut self) -> Self {
        self.settle_ms = 0;
        self.keystroke_delay_ms = 0;
        self.scroll_settle_ms = 0;
        self.focus_settle_ms = 0;
        self.clear_settle_ms = 0;
        self.input_settle_ms = 0;
        self.screenshot_delay_ms = 0;
        self.question_wait_secs = 0;
        self
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window.
    pub headless: bool,

    /// Viewport width.
    pub window_width: u32,

    /// Viewport height.
    pub window_height: u32,

    /// User agent override.
    pub user_agent: Option<String>,

    /// Extra command-line switches for Chromium.
    pub args: Vec<String>,

    /// Explicit Chromium executable; autodetected when unset.
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1280,
            window_height: 1024,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            ),
            args: vec![
                "--disable-blink-features=AutomationControlled".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--no-sandbox".to_string(),
            ],
            executable: None,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// OCR text detection model file name.
    pub detection_model: String,

    /// OCR text recognition model file name.
    pub recognition_model: String,

    /// OCR character dictionary file name.
    pub dictionary: String,

    /// Question-answering ONNX model file name.
    pub qa_model: String,

    /// Question-answering `tokenizer.json` file name.
    pub qa_tokenizer: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            qa_model: "qa_model.onnx".to_string(),
            qa_tokenizer: "qa_tokenizer.json".to_string(),
        }
    }
}

impl AutofillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AutofillError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| AutofillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}
