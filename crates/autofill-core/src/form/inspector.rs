//! Question group enumeration and label derivation.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{
    FormElement, FormPage, QuestionGroup, HEADING_SELECTOR, LABEL_FALLBACK_SELECTORS,
    QUESTION_SELECTOR,
};
use crate::error::DriverError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Finds the question groups of a loaded form.
#[derive(Debug, Clone)]
pub struct FormInspector {
    wait: Duration,
}

impl FormInspector {
    /// Inspector that waits up to `wait` for the first question to render.
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }

    /// Every question group with a usable label, in page order.
    ///
    /// Groups whose label is missing or shorter than two characters are
    /// dropped. A page without question groups yields an empty list.
    pub async fn enumerate<P: FormPage>(&self, page: &P) -> Result<Vec<QuestionGroup<P::Element>>, DriverError> {
        let elements = self.wait_for_questions(page).await?;
        info!("Found {} question regions", elements.len());

        let mut groups = Vec::with_capacity(elements.len());
        for (i, element) in elements.into_iter().enumerate() {
            let index = i + 1;
            match derive_label(&element).await {
                Some(label) if label.chars().count() >= 2 => {
                    debug!("[{}] {}", index, label);
                    groups.push(QuestionGroup { index, label, element });
                }
                _ => debug!("[{}] no usable label, skipping", index),
            }
        }

        Ok(groups)
    }

    async fn wait_for_questions<P: FormPage>(&self, page: &P) -> Result<Vec<P::Element>, DriverError> {
        let deadline = Instant::now() + self.wait;
        loop {
            let elements = page.query_all(QUESTION_SELECTOR).await?;
            if !elements.is_empty() {
                return Ok(elements);
            }
            if Instant::now() >= deadline {
                warn!("No question regions appeared within {:?}", self.wait);
                return Ok(elements);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Heading text, or the first fallback selector with more than one character.
async fn derive_label<E: FormElement>(element: &E) -> Option<String> {
    let heading = first_text(element, HEADING_SELECTOR).await;
    if let Some(text) = heading.filter(|t| !t.is_empty()) {
        return Some(clean_label(&text));
    }

    for selector in LABEL_FALLBACK_SELECTORS {
        let text = first_text(element, selector).await;
        if let Some(text) = text.filter(|t| t.chars().count() > 1) {
            return Some(clean_label(&text));
        }
    }

    None
}

async fn first_text<E: FormElement>(element: &E, selector: &str) -> Option<String> {
    let first = match element.query_all(selector).await {
        Ok(found) => found.into_iter().next()?,
        Err(e) => {
            debug!("Label query {} failed: {}", selector, e);
            return None;
        }
    };

    match first.inner_text().await {
        Ok(text) => Some(text.trim().to_string()),
        Err(e) => {
            debug!("Could not read label text: {}", e);
            None
        }
    }
}

fn clean_label(text: &str) -> String {
    text.replace('*', "").trim().to_string()
}
