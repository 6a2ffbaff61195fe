//! Form inspection, label matching and control filling over a page driver.
//!
//! The driver traits describe the handful of operations the filler needs
//! from a rendered page. `autofill-browser` implements them for Chromium;
//! tests implement them in memory.

mod filler;
mod inspector;
mod matcher;
mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use filler::FieldFiller;
pub use inspector::FormInspector;
pub use matcher::FieldMatcher;
pub use session::{normalize_form_url, FormFillSession, SessionState};

use std::path::Path;

use crate::error::DriverError;

/// Selector for one question group.
pub const QUESTION_SELECTOR: &str = r#"[role="listitem"]"#;

/// Selector for a question's heading.
pub const HEADING_SELECTOR: &str = r#"[role="heading"]"#;

/// Label selectors tried when a group has no usable heading.
pub const LABEL_FALLBACK_SELECTORS: &[&str] = &[
    ".freebirdFormviewerComponentsQuestionBaseTitle",
    ".freebirdFormviewerViewItemsItemItemTitle",
    "[data-item-id] > div > div > div",
    r#"div[dir="auto"]"#,
];

/// Typeable controls, in the order they are tried.
pub const TEXT_INPUT_SELECTORS: &[&str] = &[
    r#"input[type="text"]"#,
    r#"input[type="email"]"#,
    r#"input[type="tel"]"#,
    r#"input[type="number"]"#,
    "input[aria-label]",
    "textarea",
];

/// Clickable choices matched by their text.
pub const CHOICE_SELECTORS: &[&str] = &["label", r#"[role="radio"]"#, r#"[role="checkbox"]"#];

pub const DROPDOWN_SELECTOR: &str = "select";

pub const EDITABLE_SELECTOR: &str = r#"[contenteditable="true"]"#;

/// Controls whose value is written directly as a last resort.
pub const SCRIPT_WRITE_SELECTOR: &str = "input, textarea";

/// A loaded page that can be navigated, queried and captured.
#[allow(async_fn_in_trait)]
pub trait FormPage {
    type Element: FormElement;

    /// Navigate and wait for the document to load.
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// All elements matching a CSS selector, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    /// Write a PNG screenshot to `path`.
    async fn screenshot(&self, path: &Path, full_page: bool) -> Result<(), DriverError>;

    /// Whether the page still responds. Returns `false` once the user
    /// closes the window.
    async fn is_alive(&self) -> bool;

    /// Close the page and its browser.
    async fn close(&self) -> Result<(), DriverError>;
}

/// An element of a [`FormPage`].
#[allow(async_fn_in_trait)]
pub trait FormElement: Sized {
    /// Descendants matching a CSS selector, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DriverError>;

    /// Rendered text content.
    async fn inner_text(&self) -> Result<String, DriverError>;

    async fn is_visible(&self) -> Result<bool, DriverError>;

    async fn scroll_into_view(&self) -> Result<(), DriverError>;

    async fn click(&self) -> Result<(), DriverError>;

    /// Remove the current value or content.
    async fn clear(&self) -> Result<(), DriverError>;

    /// Send a single keystroke.
    async fn type_char(&self, ch: char) -> Result<(), DriverError>;

    /// Current value of an input, or text of an editable region.
    async fn input_value(&self) -> Result<String, DriverError>;

    /// Select the option whose label equals `label`. Returns `false` when no
    /// such option exists.
    async fn select_option_by_label(&self, label: &str) -> Result<bool, DriverError>;

    /// Assign `value` in page context and dispatch bubbling `input` and
    /// `change` events.
    async fn set_value_by_script(&self, value: &str) -> Result<(), DriverError>;
}

/// A question region of the form with its derived label.
#[derive(Debug, Clone)]
pub struct QuestionGroup<E> {
    /// Position among all question regions on the page (1-indexed).
    pub index: usize,
    /// Label with asterisks and surrounding whitespace removed.
    pub label: String,
    pub element: E,
}
