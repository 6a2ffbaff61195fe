//! In-memory page driver for filler and session tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{FormElement, FormPage, QUESTION_SELECTOR};
use crate::error::DriverError;

#[derive(Default)]
struct ElementState {
    text: String,
    hidden: bool,
    children: HashMap<&'static str, Vec<MockElement>>,
    options: Vec<String>,
    failing: Vec<&'static str>,
    hanging: Vec<&'static str>,
    value: Mutex<String>,
    clicks: AtomicUsize,
    script_writes: Mutex<Vec<String>>,
}

/// Element with scripted text, children and failure points.
#[derive(Clone, Default)]
pub(crate) struct MockElement {
    state: Arc<ElementState>,
}

impl MockElement {
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(mut self, f: impl FnOnce(&mut ElementState)) -> Self {
        let state = Arc::get_mut(&mut self.state).expect("mock element is shared while building");
        f(state);
        self
    }

    pub fn text(self, text: &str) -> Self {
        let text = text.to_string();
        self.edit(|s| s.text = text)
    }

    pub fn hidden(self) -> Self {
        self.edit(|s| s.hidden = true)
    }

    pub fn child(self, selector: &'static str, child: MockElement) -> Self {
        self.edit(|s| s.children.entry(selector).or_default().push(child))
    }

    pub fn options(self, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        self.edit(|s| s.options = options)
    }

    /// Make `action` return an error.
    pub fn failing(self, action: &'static str) -> Self {
        self.edit(|s| s.failing.push(action))
    }

    /// Make `action` never complete.
    pub fn hanging(self, action: &'static str) -> Self {
        self.edit(|s| s.hanging.push(action))
    }

    pub fn value(&self) -> String {
        self.state.value.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> usize {
        self.state.clicks.load(Ordering::SeqCst)
    }

    pub fn script_writes(&self) -> Vec<String> {
        self.state.script_writes.lock().unwrap().clone()
    }

    async fn act(&self, action: &'static str) -> Result<(), DriverError> {
        if self.state.hanging.contains(&action) {
            std::future::pending::<()>().await;
        }
        if self.state.failing.contains(&action) {
            return Err(DriverError::NotInteractable(action.to_string()));
        }
        Ok(())
    }
}

impl FormElement for MockElement {
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>, DriverError> {
        self.act("query_all").await?;
        Ok(self.state.children.get(selector).cloned().unwrap_or_default())
    }

    async fn inner_text(&self) -> Result<String, DriverError> {
        self.act("inner_text").await?;
        Ok(self.state.text.clone())
    }

    async fn is_visible(&self) -> Result<bool, DriverError> {
        self.act("is_visible").await?;
        Ok(!self.state.hidden)
    }

    async fn scroll_into_view(&self) -> Result<(), DriverError> {
        self.act("scroll_into_view").await
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.act("click").await?;
        self.state.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), DriverError> {
        self.act("clear").await?;
        self.state.value.lock().unwrap().clear();
        Ok(())
    }

    async fn type_char(&self, ch: char) -> Result<(), DriverError> {
        self.act("type_char").await?;
        self.state.value.lock().unwrap().push(ch);
        Ok(())
    }

    async fn input_value(&self) -> Result<String, DriverError> {
        self.act("input_value").await?;
        Ok(self.value())
    }

    async fn select_option_by_label(&self, label: &str) -> Result<bool, DriverError> {
        self.act("select_option_by_label").await?;
        let found = self.state.options.iter().any(|o| o == label);
        if found {
            *self.state.value.lock().unwrap() = label.to_string();
        }
        Ok(found)
    }

    async fn set_value_by_script(&self, value: &str) -> Result<(), DriverError> {
        self.act("set_value_by_script").await?;
        self.state.script_writes.lock().unwrap().push(value.to_string());
        *self.state.value.lock().unwrap() = value.to_string();
        Ok(())
    }
}

/// Page holding a fixed list of question groups.
#[derive(Default)]
pub(crate) struct MockPage {
    groups: Vec<MockElement>,
    goto_fails: bool,
    goto_hangs: bool,
    /// Number of liveness checks answered with `true`.
    alive_polls: AtomicUsize,
    pub visited: Mutex<Vec<String>>,
    pub screenshots: Mutex<Vec<PathBuf>>,
    pub closed: AtomicBool,
}

impl MockPage {
    pub fn new(groups: Vec<MockElement>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    pub fn failing_navigation(mut self) -> Self {
        self.goto_fails = true;
        self
    }

    pub fn hanging_navigation(mut self) -> Self {
        self.goto_hangs = true;
        self
    }

    pub fn alive_for(self, polls: usize) -> Self {
        self.alive_polls.store(polls, Ordering::SeqCst);
        self
    }
}

impl FormPage for MockPage {
    type Element = MockElement;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.visited.lock().unwrap().push(url.to_string());
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        if self.goto_fails {
            return Err(DriverError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        if self.goto_hangs {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<MockElement>, DriverError> {
        if selector == QUESTION_SELECTOR {
            Ok(self.groups.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn screenshot(&self, path: &Path, _full_page: bool) -> Result<(), DriverError> {
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        self.alive_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A question group whose heading reads `label`.
pub(crate) fn question(label: &str) -> MockElement {
    MockElement::new().child(super::HEADING_SELECTOR, MockElement::new().text(label))
}
