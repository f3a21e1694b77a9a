//! Chromium-backed element handle

use async_trait::async_trait;
use chromiumoxide::element::Element;
use serde_json::Value;
use storefront_core_types::{DriverError, ElementHandle};

use crate::errors::{classify_message, map_cdp_error};

const VISIBLE_JS: &str = "function() { \
    const style = window.getComputedStyle(this); \
    const rect = this.getBoundingClientRect(); \
    return style.display !== 'none' && style.visibility !== 'hidden' \
        && rect.width > 0 && rect.height > 0; }";

const ENABLED_JS: &str =
    "function() { return !this.disabled && !this.closest('fieldset[disabled]'); }";

const VALUE_JS: &str =
    "function() { return this.value === undefined || this.value === null ? '' : String(this.value); }";

const VALIDATION_JS: &str = "function() { return this.validationMessage || null; }";

const CLEAR_JS: &str = "function() { \
    this.value = ''; \
    this.dispatchEvent(new Event('input', { bubbles: true })); }";

/// Returns false when no option carries the requested value.
fn select_js(value: &str) -> Result<String, DriverError> {
    let literal = serde_json::to_string(value)
        .map_err(|err| DriverError::Protocol(format!("encode option value: {}", err)))?;
    Ok(format!(
        "function() {{ \
            const option = Array.from(this.options || []).find(o => o.value === {literal}); \
            if (!option) {{ return false; }} \
            this.value = option.value; \
            this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
            this.dispatchEvent(new Event('change', {{ bubbles: true }})); \
            return true; }}",
        literal = literal
    ))
}

pub struct ChromiumElement {
    element: Element,
    label: String,
}

impl ChromiumElement {
    pub(crate) fn new(element: Element, label: String) -> Self {
        Self { element, label }
    }

    async fn eval(&self, function: &str) -> Result<Option<Value>, DriverError> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(map_cdp_error)?;
        if let Some(details) = returns.exception_details {
            return Err(classify_message(details.text));
        }
        Ok(returns.result.value)
    }

    async fn eval_bool(&self, function: &str) -> Result<bool, DriverError> {
        Ok(matches!(self.eval(function).await?, Some(Value::Bool(true))))
    }
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn is_visible(&self) -> Result<bool, DriverError> {
        self.eval_bool(VISIBLE_JS).await
    }

    async fn is_enabled(&self) -> Result<bool, DriverError> {
        self.eval_bool(ENABLED_JS).await
    }

    async fn text(&self) -> Result<String, DriverError> {
        Ok(self
            .element
            .inner_text()
            .await
            .map_err(map_cdp_error)?
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.element.attribute(name).await.map_err(map_cdp_error)
    }

    async fn input_value(&self) -> Result<String, DriverError> {
        match self.eval(VALUE_JS).await? {
            Some(Value::String(value)) => Ok(value),
            _ => Ok(String::new()),
        }
    }

    async fn validation_message(&self) -> Result<Option<String>, DriverError> {
        match self.eval(VALIDATION_JS).await? {
            Some(Value::String(message)) if !message.is_empty() => Ok(Some(message)),
            _ => Ok(None),
        }
    }

    async fn scroll_into_view(&self) -> Result<(), DriverError> {
        self.element
            .scroll_into_view()
            .await
            .map_err(map_cdp_error)?;
        Ok(())
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.element.click().await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn fill(&self, value: &str) -> Result<(), DriverError> {
        self.element.focus().await.map_err(map_cdp_error)?;
        self.eval(CLEAR_JS).await?;
        self.element.type_str(value).await.map_err(map_cdp_error)?;
        Ok(())
    }

    async fn select_option(&self, value: &str) -> Result<(), DriverError> {
        if self.eval_bool(&select_js(value)?).await? {
            Ok(())
        } else {
            Err(DriverError::NotInteractable(format!(
                "{} has no option with value '{}'",
                self.label, value
            )))
        }
    }

    async fn hover(&self) -> Result<(), DriverError> {
        self.element.hover().await.map_err(map_cdp_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_value_is_embedded_as_a_json_literal() {
        let js = select_js("it's \"quoted\"").unwrap();
        assert!(js.contains(r#"o.value === "it's \"quoted\"""#));
        assert!(js.contains("new Event('change'"));
    }
}
