//! Mock driver for unit testing
//!
//! Renders a fixed set of elements per query and records every call, so tests
//! can assert on what the page object asked the browser to do.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{DriverError, Result};
use crate::keys::{Keys, Keystroke};
use crate::webdriver::{By, ElementHandle, ScriptArg, WebDriver};

/// One recorded driver interaction
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    FindElements(By),
    FindElement(By),
    Click(ElementHandle),
    SendKeys(ElementHandle, Keys),
    GetAttribute(ElementHandle, String),
    NavigateBack,
    ActiveElement,
    ExecuteScript { source: String, args: Vec<ScriptArg> },
}

#[derive(Debug, Default)]
struct MockState {
    elements: HashMap<By, Vec<ElementHandle>>,
    attributes: HashMap<(ElementHandle, String), String>,
    active: Option<ElementHandle>,
    script_result: Value,
    calls: Vec<DriverCall>,
}

#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `by` match `count` fresh elements, returned in order.
    ///
    /// Handles are named `"{query}#{n}"` so they stay distinguishable.
    pub fn render(&self, by: By, count: usize) -> Vec<ElementHandle> {
        let handles: Vec<_> = (0..count)
            .map(|n| ElementHandle::new(format!("{}#{n}", by.query())))
            .collect();
        self.render_handles(by, handles.clone());
        handles
    }

    /// Make `by` match exactly these handles
    pub fn render_handles(&self, by: By, handles: Vec<ElementHandle>) {
        self.state().elements.insert(by, handles);
    }

    pub fn set_attribute(&self, element: &ElementHandle, name: &str, value: &str) {
        self.state()
            .attributes
            .insert((element.clone(), name.to_string()), value.to_string());
    }

    pub fn set_active(&self, element: ElementHandle) {
        self.state().active = Some(element);
    }

    /// Value every later `execute_script` returns (`null` until set)
    pub fn set_script_result(&self, value: Value) {
        self.state().script_result = value;
    }

    /// Full call history
    pub fn calls(&self) -> Vec<DriverCall> {
        self.state().calls.clone()
    }

    /// Elements clicked, in order
    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::Click(element) => Some(element.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every keystroke sent to `element`, concatenated across calls
    pub fn keystrokes(&self, element: &ElementHandle) -> Vec<Keystroke> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::SendKeys(target, keys) if target == element => Some(keys),
                _ => None,
            })
            .flat_map(|keys| keys.strokes().iter().copied())
            .collect()
    }

    /// Queries issued through `find_elements` / `find_element`
    pub fn queries(&self) -> Vec<By> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::FindElements(by) | DriverCall::FindElement(by) => Some(by.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DriverCall) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl WebDriver for MockDriver {
    async fn find_elements(&self, by: &By) -> Result<Vec<ElementHandle>> {
        let mut state = self.state();
        state.calls.push(DriverCall::FindElements(by.clone()));
        Ok(state.elements.get(by).cloned().unwrap_or_default())
    }

    async fn find_element(&self, by: &By) -> Result<ElementHandle> {
        let mut state = self.state();
        state.calls.push(DriverCall::FindElement(by.clone()));
        state
            .elements
            .get(by)
            .and_then(|handles| handles.first().cloned())
            .ok_or_else(|| DriverError::NoSuchElement {
                query: by.to_string(),
            })
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.record(DriverCall::Click(element.clone()));
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, keys: &Keys) -> Result<()> {
        self.record(DriverCall::SendKeys(element.clone(), keys.clone()));
        Ok(())
    }

    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let mut state = self.state();
        state
            .calls
            .push(DriverCall::GetAttribute(element.clone(), name.to_string()));
        Ok(state
            .attributes
            .get(&(element.clone(), name.to_string()))
            .cloned())
    }

    async fn navigate_back(&self) -> Result<()> {
        self.record(DriverCall::NavigateBack);
        Ok(())
    }

    async fn active_element(&self) -> Result<ElementHandle> {
        let mut state = self.state();
        state.calls.push(DriverCall::ActiveElement);
        state.active.clone().ok_or_else(|| DriverError::NoSuchElement {
            query: "document.activeElement".to_string(),
        })
    }

    async fn execute_script(&self, source: &str, args: &[ScriptArg]) -> Result<Value> {
        let mut state = self.state();
        state.calls.push(DriverCall::ExecuteScript {
            source: source.to_string(),
            args: args.to_vec(),
        });
        Ok(state.script_result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;

    #[tokio::test]
    async fn test_unrendered_query_is_empty() {
        let driver = MockDriver::new();
        let found = tokio_test::assert_ok!(driver.find_elements(&By::css(".nope")).await);
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_find_element_returns_first_rendered() {
        let driver = MockDriver::new();
        let handles = driver.render(By::xpath("//li"), 3);

        let first = driver.find_element(&By::xpath("//li")).await.unwrap();
        assert_eq!(first, handles[0]);

        let missing = driver.find_element(&By::xpath("//ol")).await;
        assert!(matches!(missing, Err(DriverError::NoSuchElement { .. })));
    }

    #[tokio::test]
    async fn test_records_interactions() {
        let driver = MockDriver::new();
        let input = driver.render(By::css("input"), 1).remove(0);

        driver.click(&input).await.unwrap();
        driver.send_keys(&input, &Keys::from("hi")).await.unwrap();
        driver.send_keys(&input, &Keys::from(Key::Enter)).await.unwrap();

        assert_eq!(driver.clicks(), vec![input.clone()]);
        assert_eq!(
            driver.keystrokes(&input),
            vec![
                Keystroke::Char('h'),
                Keystroke::Char('i'),
                Keystroke::Key(Key::Enter)
            ]
        );
        assert_eq!(driver.queries(), Vec::<By>::new());
    }

    #[tokio::test]
    async fn test_attributes_and_active_element() {
        let driver = MockDriver::new();
        assert!(driver.active_element().await.is_err());

        let input = ElementHandle::new("new-todo");
        driver.set_active(input.clone());
        driver.set_attribute(&input, "id", "new-todo");

        let active = driver.active_element().await.unwrap();
        assert_eq!(
            driver.get_attribute(&active, "id").await.unwrap().as_deref(),
            Some("new-todo")
        );
        assert_eq!(driver.get_attribute(&active, "class").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_script_result_and_recorded_args() {
        let driver = MockDriver::new();
        let label = ElementHandle::new("label-0");
        assert_eq!(driver.execute_script("return 1;", &[]).await.unwrap(), Value::Null);

        driver.set_script_result(serde_json::json!("ab"));
        let value = driver
            .execute_script("return arguments[0].value;", &[label.clone().into()])
            .await
            .unwrap();

        assert_eq!(value, serde_json::json!("ab"));
        assert_eq!(
            driver.calls().last(),
            Some(&DriverCall::ExecuteScript {
                source: "return arguments[0].value;".to_string(),
                args: vec![ScriptArg::Element(label)],
            })
        );
    }
}
