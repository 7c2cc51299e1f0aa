//! Parsed-HTML page implementing `WebSession`, plus canned completions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ego_tree::NodeId;
use event_autofill::{Completion, Error, Result, SessionLauncher, WebSession};
use scraper::{ElementRef, Html, Selector};

/// Registration page shared by the fake-session tests and the Chrome tests.
pub const REGISTRATION_PAGE: &str = r#"<html><body>
<h1>Rust Denver Meetup</h1>
<div class="event-description">Talks and pizza</div>
<button class="luma-button primary" onclick="document.getElementById('f').style.display='block'">Request to Join</button>
<form id="f" class="registration-form-container" style="display:none">
  <label for="name">Name *</label><input id="name" name="name" type="text" value="prefilled">
  <label for="role">Role</label>
  <select id="role" name="role">
    <option value="">Select an option</option>
    <option value="eng">Engineer</option>
    <option value="mgr">Manager</option>
    <option value="other">Other</option>
  </select>
  <label for="nowhere">Orphan</label>
</form>
</body></html>"#;

/// A parsed document plus the state a browser keeps outside the markup.
///
/// Node ids are stable because the same markup always parses to the same
/// tree, so the document is re-parsed per query instead of being held.
#[derive(Debug, Clone, Default)]
pub struct FakeDom {
    markup: String,
    /// Current value of text controls that have been edited.
    values: HashMap<NodeId, String>,
    /// Chosen option per select.
    selected: HashMap<NodeId, NodeId>,
}

impl FakeDom {
    pub fn new(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            ..Self::default()
        }
    }

    fn parse(&self) -> Html {
        Html::parse_document(&self.markup)
    }

    fn with_element<T>(&self, id: NodeId, f: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let html = self.parse();
        html.tree.get(id).and_then(ElementRef::wrap).map(f)
    }

    /// Elements matching `selector`, in document order. With a scope, only
    /// descendants of that element are considered.
    pub fn select(&self, scope: Option<NodeId>, selector: &str) -> Result<Vec<NodeId>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| Error::ElementNotFound(format!("invalid selector {selector:?}: {e:?}")))?;
        let html = self.parse();
        let ids = match scope {
            None => html.select(&parsed).map(node_id).collect(),
            Some(id) => match html.tree.get(id).and_then(ElementRef::wrap) {
                Some(element) => element.select(&parsed).map(node_id).collect(),
                None => Vec::new(),
            },
        };
        Ok(ids)
    }

    /// First element matching `selector`. Panics when there is none.
    pub fn find(&self, selector: &str) -> NodeId {
        self.select(None, selector)
            .ok()
            .and_then(|ids| ids.into_iter().next())
            .unwrap_or_else(|| panic!("no element matches {selector}"))
    }

    pub fn text_of(&self, id: NodeId) -> String {
        self.with_element(id, |el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    pub fn tag_of(&self, id: NodeId) -> String {
        self.with_element(id, |el| el.value().name().to_string())
            .unwrap_or_default()
    }

    pub fn attr_of(&self, id: NodeId, name: &str) -> Option<String> {
        self.with_element(id, |el| el.value().attr(name).map(str::to_string))
            .flatten()
    }

    /// Edited value, else the `value` attribute from the markup.
    pub fn value_of(&self, id: NodeId) -> String {
        match self.values.get(&id) {
            Some(value) => value.clone(),
            None => self.attr_of(id, "value").unwrap_or_default(),
        }
    }

    pub fn selected_option_text(&self, select: NodeId) -> Option<String> {
        self.selected
            .get(&select)
            .map(|&option| self.text_of(option).trim().to_string())
    }

    fn owning_select(&self, option: NodeId) -> Option<NodeId> {
        self.with_element(option, |el| {
            (*el)
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "select")
                .map(node_id)
        })
        .flatten()
    }
}

fn node_id(element: ElementRef<'_>) -> NodeId {
    (*element).id()
}

/// Session over a shared `FakeDom`. Navigation only records the URL.
pub struct FakeSession {
    pub dom: Arc<Mutex<FakeDom>>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<AtomicUsize>,
    /// Elements whose typing fails, to simulate a broken control.
    pub broken: Vec<NodeId>,
}

impl FakeSession {
    pub fn new(dom: FakeDom) -> Self {
        Self {
            dom: Arc::new(Mutex::new(dom)),
            visited: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
            broken: Vec::new(),
        }
    }

    pub fn dom(&self) -> std::sync::MutexGuard<'_, FakeDom> {
        self.dom.lock().unwrap()
    }

    fn with_dom<T>(&self, f: impl FnOnce(&mut FakeDom) -> T) -> T {
        f(&mut self.dom.lock().unwrap())
    }
}

#[async_trait]
impl WebSession for FakeSession {
    type Element = NodeId;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn locate(&self, selector: &str, timeout: Duration) -> Result<NodeId> {
        self.with_dom(|dom| dom.select(None, selector))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Timeout(format!("selector {selector} after {timeout:?}")))
    }

    async fn click(&self, _element: &NodeId) -> Result<()> {
        Ok(())
    }

    async fn read_text(&self, element: &NodeId) -> Result<String> {
        Ok(self.with_dom(|dom| dom.text_of(*element)))
    }

    async fn read_attribute(&self, element: &NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.with_dom(|dom| dom.attr_of(*element, name)))
    }

    async fn tag_name(&self, element: &NodeId) -> Result<String> {
        Ok(self.with_dom(|dom| dom.tag_of(*element)))
    }

    async fn clear(&self, element: &NodeId) -> Result<()> {
        self.with_dom(|dom| dom.values.insert(*element, String::new()));
        Ok(())
    }

    async fn type_text(&self, element: &NodeId, text: &str) -> Result<()> {
        if self.broken.contains(element) {
            return Err(Error::JsError("element is detached".into()));
        }
        self.with_dom(|dom| {
            let value = dom.value_of(*element) + text;
            dom.values.insert(*element, value);
        });
        Ok(())
    }

    async fn children(&self, element: &NodeId, selector: &str) -> Result<Vec<NodeId>> {
        self.with_dom(|dom| dom.select(Some(*element), selector))
    }

    async fn choose(&self, option: &NodeId) -> Result<()> {
        self.with_dom(|dom| match dom.owning_select(*option) {
            Some(select) => {
                dom.selected.insert(select, *option);
                Ok(())
            }
            None => Err(Error::JsError("option is not inside a select".into())),
        })
    }

    async fn close(self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out sessions over clones of one page, sharing counters and the
/// most recent DOM so tests can inspect what was filled.
pub struct FakeLauncher {
    pub page: FakeDom,
    pub last_dom: Arc<Mutex<Option<Arc<Mutex<FakeDom>>>>>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub launched: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new(page: FakeDom) -> Self {
        Self {
            page,
            last_dom: Arc::new(Mutex::new(None)),
            visited: Arc::new(Mutex::new(Vec::new())),
            launched: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        let session = FakeSession {
            dom: Arc::new(Mutex::new(self.page.clone())),
            visited: Arc::clone(&self.visited),
            closed: Arc::clone(&self.closed),
            broken: Vec::new(),
        };
        *self.last_dom.lock().unwrap() = Some(Arc::clone(&session.dom));
        Ok(session)
    }
}

/// Replies with a fixed body, or fails when `reply` is `None`.
pub struct CannedCompletion {
    pub reply: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl CannedCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Completion for CannedCompletion {
    async fn complete_json(&self, _system: &str, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| Error::Completion("connection refused".into()))
    }
}

/// [`REGISTRATION_PAGE`] with its form, name input and role select.
pub fn registration_page() -> (FakeDom, NodeId, NodeId, NodeId) {
    let dom = FakeDom::new(REGISTRATION_PAGE);
    let form = dom.find("form.registration-form-container");
    let name = dom.find("#name");
    let role = dom.find("#role");
    (dom, form, name, role)
}
