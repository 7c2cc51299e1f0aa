//! The browser boundary the form pipeline is written against.
//!
//! Field collection, context extraction and filling only ever talk to a
//! [`WebSession`]. The Chromium binding lives in [`crate::browser`]; tests
//! drive the same code through an in-memory DOM.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// One tab's worth of page state plus the operations the pipeline needs.
#[async_trait]
pub trait WebSession: Send + Sync {
    /// Handle to an element on the current page.
    type Element: Send + Sync;

    /// Navigate to `url` and wait for the load to finish.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Find the first element matching a CSS selector, polling until
    /// `timeout` elapses. A zero timeout makes exactly one attempt.
    async fn locate(&self, selector: &str, timeout: Duration) -> Result<Self::Element>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Rendered text of the element.
    async fn read_text(&self, element: &Self::Element) -> Result<String>;

    async fn read_attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Lower-case tag name, e.g. `"select"`.
    async fn tag_name(&self, element: &Self::Element) -> Result<String>;

    /// Empty a text control's current value.
    async fn clear(&self, element: &Self::Element) -> Result<()>;

    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// All descendants of `element` matching a CSS selector, in document order.
    async fn children(&self, element: &Self::Element, selector: &str) -> Result<Vec<Self::Element>>;

    /// Make an `<option>` the selected choice of its `<select>`.
    async fn choose(&self, option: &Self::Element) -> Result<()>;

    /// Tear the session down. Consumes the session.
    async fn close(self) -> Result<()>;
}

/// Opens fresh sessions, one per event.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: WebSession;

    async fn launch(&self) -> Result<Self::Session>;
}
