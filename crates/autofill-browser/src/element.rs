//! [`FormElement`] over a chromiumoxide element handle.

use chromiumoxide::element::Element;
use serde_json::Value;

use autofill_core::{DriverError, FormElement};

use crate::{protocol_error, scripts};

/// A DOM element on a [`crate::ChromePage`].
pub struct ChromeElement {
    inner: Element,
}

impl ChromeElement {
    pub(crate) fn new(inner: Element) -> Self {
        Self { inner }
    }

    async fn call(&self, function: impl Into<String>) -> Result<Option<Value>, DriverError> {
        let returns = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(protocol_error)?;

        if let Some(details) = returns.exception_details {
            return Err(DriverError::Script(details.text));
        }
        Ok(returns.result.value)
    }

    async fn call_bool(&self, function: impl Into<String>) -> Result<bool, DriverError> {
        match self.call(function).await? {
            Some(Value::Bool(b)) => Ok(b),
            other => Err(DriverError::Script(format!("expected a boolean, got {:?}", other))),
        }
    }
}

impl FormElement for ChromeElement {
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DriverError> {
        let found = self.inner.find_elements(selector).await.map_err(protocol_error)?;
        Ok(found.into_iter().map(Self::new).collect())
    }

    async fn inner_text(&self) -> Result<String, DriverError> {
        let text = self.inner.inner_text().await.map_err(protocol_error)?;
        Ok(text.unwrap_or_default())
    }

    async fn is_visible(&self) -> Result<bool, DriverError> {
        self.call_bool(scripts::IS_VISIBLE).await
    }

    async fn scroll_into_view(&self) -> Result<(), DriverError> {
        self.inner
            .scroll_into_view()
            .await
            .map_err(|e| DriverError::NotInteractable(e.to_string()))?;
        Ok(())
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.inner
            .click()
            .await
            .map_err(|e| DriverError::NotInteractable(e.to_string()))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), DriverError> {
        self.call(scripts::CLEAR).await?;
        Ok(())
    }

    async fn type_char(&self, ch: char) -> Result<(), DriverError> {
        self.inner
            .type_str(ch.to_string())
            .await
            .map_err(protocol_error)?;
        Ok(())
    }

    async fn input_value(&self) -> Result<String, DriverError> {
        match self.call(scripts::INPUT_VALUE).await? {
            Some(Value::String(s)) => Ok(s),
            Some(Value::Null) | None => Ok(String::new()),
            Some(other) => Ok(other.to_string()),
        }
    }

    async fn select_option_by_label(&self, label: &str) -> Result<bool, DriverError> {
        self.call_bool(scripts::select_option_by_label(label)).await
    }

    async fn set_value_by_script(&self, value: &str) -> Result<(), DriverError> {
        self.call(scripts::set_value(value)).await?;
        Ok(())
    }
}
