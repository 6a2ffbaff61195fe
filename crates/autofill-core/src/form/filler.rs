//! Control manipulation strategies for one question group.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{
    FormElement, CHOICE_SELECTORS, DROPDOWN_SELECTOR, EDITABLE_SELECTOR, SCRIPT_WRITE_SELECTOR,
    TEXT_INPUT_SELECTORS,
};
use crate::error::DriverError;
use crate::models::config::FormConfig;
use crate::models::report::FillStrategy;

/// Applies a value to a question group by trying, in order: text inputs,
/// matching choices, dropdowns, editable regions, and a direct script write.
///
/// Every driver call is bounded by the action timeout. A failing candidate
/// is logged and the next candidate or strategy is tried.
#[derive(Debug, Clone)]
pub struct FieldFiller {
    config: FormConfig,
}

impl FieldFiller {
    pub fn new(config: FormConfig) -> Self {
        Self { config }
    }

    /// Fill `group` with `value`, returning the strategy that succeeded.
    pub async fn fill<E: FormElement>(&self, group: &E, value: &str) -> Option<FillStrategy> {
        if self.fill_text_inputs(group, value).await {
            return Some(FillStrategy::TextInput);
        }
        if self.fill_choice(group, value).await {
            return Some(FillStrategy::Choice);
        }
        if self.fill_dropdown(group, value).await {
            return Some(FillStrategy::Dropdown);
        }
        if self.fill_editable(group, value).await {
            return Some(FillStrategy::EditableRegion);
        }
        if self.fill_by_script(group, value).await {
            return Some(FillStrategy::ScriptWrite);
        }

        debug!("All fill strategies failed");
        None
    }

    async fn fill_text_inputs<E: FormElement>(&self, group: &E, value: &str) -> bool {
        for selector in TEXT_INPUT_SELECTORS {
            for input in self.visible(group, selector).await {
                trace!("Typing into {}", selector);
                match self.type_into(&input, value).await {
                    Ok(()) => return true,
                    Err(e) => warn!("Text input {} failed: {}", selector, e),
                }
            }
        }
        false
    }

    async fn fill_choice<E: FormElement>(&self, group: &E, value: &str) -> bool {
        let wanted = value.to_lowercase();

        for selector in CHOICE_SELECTORS {
            for choice in self.candidates(group, selector).await {
                let text = match self.guard("read choice", choice.inner_text()).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Could not read {}: {}", selector, e);
                        continue;
                    }
                };
                if !text.trim().to_lowercase().contains(&wanted) {
                    continue;
                }

                match self.guard("click choice", choice.click()).await {
                    Ok(()) => {
                        self.pause(self.config.focus_settle_ms).await;
                        return true;
                    }
                    Err(e) => warn!("Choice click failed: {}", e),
                }
            }
        }
        false
    }

    async fn fill_dropdown<E: FormElement>(&self, group: &E, value: &str) -> bool {
        for dropdown in self.candidates(group, DROPDOWN_SELECTOR).await {
            match self.guard("select option", dropdown.select_option_by_label(value)).await {
                Ok(true) => {
                    self.pause(self.config.focus_settle_ms).await;
                    return true;
                }
                Ok(false) => debug!("No option labelled {:?}", value),
                Err(e) => warn!("Dropdown selection failed: {}", e),
            }
        }
        false
    }

    async fn fill_editable<E: FormElement>(&self, group: &E, value: &str) -> bool {
        for region in self.visible(group, EDITABLE_SELECTOR).await {
            match self.type_into(&region, value).await {
                Ok(()) => return true,
                Err(e) => warn!("Editable region failed: {}", e),
            }
        }
        false
    }

    async fn fill_by_script<E: FormElement>(&self, group: &E, value: &str) -> bool {
        for input in self.visible(group, SCRIPT_WRITE_SELECTOR).await {
            match self.guard("script write", input.set_value_by_script(value)).await {
                Ok(()) => {
                    self.pause(self.config.focus_settle_ms).await;
                    return true;
                }
                Err(e) => warn!("Script write failed: {}", e),
            }
        }
        false
    }

    /// Scroll, focus, clear, then type character by character.
    async fn type_into<E: FormElement>(&self, element: &E, value: &str) -> Result<(), DriverError> {
        self.guard("scroll", element.scroll_into_view()).await?;
        self.pause(self.config.scroll_settle_ms).await;

        self.guard("click", element.click()).await?;
        self.pause(self.config.focus_settle_ms).await;

        self.guard("clear", element.clear()).await?;
        self.pause(self.config.clear_settle_ms).await;

        for ch in value.chars() {
            self.guard("type", element.type_char(ch)).await?;
            self.pause(self.config.keystroke_delay_ms).await;
        }
        self.pause(self.config.input_settle_ms).await;

        match self.guard("read value", element.input_value()).await {
            Ok(actual) if actual == value => trace!("Verified value {:?}", actual),
            Ok(actual) => debug!("Value reads {:?} after typing {:?}", actual, value),
            Err(e) => debug!("Could not verify value: {}", e),
        }
        Ok(())
    }

    async fn candidates<E: FormElement>(&self, group: &E, selector: &str) -> Vec<E> {
        match self.guard("query", group.query_all(selector)).await {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Query {} failed: {}", selector, e);
                Vec::new()
            }
        }
    }

    async fn visible<E: FormElement>(&self, group: &E, selector: &str) -> Vec<E> {
        let mut visible = Vec::new();
        for element in self.candidates(group, selector).await {
            match self.guard("visibility", element.is_visible()).await {
                Ok(true) => visible.push(element),
                Ok(false) => {}
                Err(e) => debug!("Visibility check on {} failed: {}", selector, e),
            }
        }
        visible
    }

    async fn guard<T>(
        &self,
        action: &'static str,
        fut: impl Future<Output = Result<T, DriverError>>,
    ) -> Result<T, DriverError> {
        let limit = self.config.action_timeout();
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DriverError::Timeout {
                action,
                millis: self.config.action_timeout_ms,
            })?
    }

    async fn pause(&self, millis: u64) {
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}
