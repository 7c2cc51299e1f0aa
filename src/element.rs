use chromiumoxide::element::Element as CrElement;

use crate::error::{Error, Result};

const CLEAR_JS: &str = r#"function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

const CHOOSE_JS: &str = r#"function() {
    this.selected = true;
    const select = this.closest('select');
    if (select) {
        select.value = this.value;
        select.dispatchEvent(new Event('input', { bubbles: true }));
        select.dispatchEvent(new Event('change', { bubbles: true }));
    }
}"#;

const TAG_NAME_JS: &str = "function() { return this.tagName.toLowerCase(); }";

/// Wrapper around a chromiumoxide Element, providing a simplified API.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Click this element (scrolls into view first).
    pub async fn click(&self) -> Result<()> {
        self.inner.click().await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Focus this element and type text into it.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.focus().await.map_err(Error::CdpError)?;
        self.inner.type_str(text).await.map_err(Error::CdpError)?;
        Ok(())
    }

    /// Reset the value of an input or textarea.
    pub async fn clear(&self) -> Result<()> {
        self.inner
            .call_js_fn(CLEAR_JS, false)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    /// Mark this `<option>` selected and notify the owning `<select>`.
    pub async fn choose(&self) -> Result<()> {
        self.inner
            .call_js_fn(CHOOSE_JS, false)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    /// Get the inner text of this element. Missing text reads as empty.
    pub async fn inner_text(&self) -> Result<String> {
        let text = self.inner.inner_text().await.map_err(Error::CdpError)?;
        Ok(text.unwrap_or_default())
    }

    /// Get the value of an attribute on this element.
    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner.attribute(name).await.map_err(Error::CdpError)
    }

    pub async fn tag_name(&self) -> Result<String> {
        let returns = self
            .inner
            .call_js_fn(TAG_NAME_JS, false)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        returns
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| Error::JsError("tagName did not return a string".into()))
    }

    /// Find all descendant elements matching the given CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self
            .inner
            .find_elements(selector)
            .await
            .map_err(Error::CdpError)?;
        Ok(els.into_iter().map(Element::new).collect())
    }
}
