//! CdpDriver - WebDriver semantics on top of raw CDP
//!
//! Element handles are `Runtime` remote object ids. Lookups snapshot matches
//! into a JS array and unpack it with `Runtime.getProperties`, so a handle
//! always points at a node that matched at query time.
//!
//! Every handle lives in one object group, released on navigation. Handles
//! never outlive `goto` or `navigate_back`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use super::client::CDPClient;
use super::protocol::{
    EvaluateResult, NavigationEntry, NavigationHistory, ObjectId, PropertyDescriptor, RemoteObject,
};
use super::session::{CDPSession, DEFAULT_DOMAINS};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};
use crate::keys::{KeyRun, Keys};
use crate::webdriver::{By, ElementHandle, ScriptArg, WebDriver};

const CLICK_FUNCTION: &str =
    "function() { this.scrollIntoView({ block: 'center' }); this.click(); }";

const FOCUS_FUNCTION: &str = "function() { this.focus(); }";

const GET_ATTRIBUTE_FUNCTION: &str = "function(name) { return this.getAttribute(name); }";

/// Object group holding every element handle this driver hands out
const HANDLE_GROUP: &str = "page-object-handles";

/// Driver for one Chrome tab
pub struct CdpDriver {
    config: DriverConfig,
    client: Arc<CDPClient>,
    session: CDPSession,
}

impl CdpDriver {
    /// Connect to the browser and open a fresh tab
    pub async fn connect(config: DriverConfig) -> Result<Self> {
        let client = CDPClient::connect(&config.cdp_url, config.command_timeout()).await?;

        let created = client
            .send_request(
                "Target.createTarget",
                Some(json!({ "url": "about:blank" })),
                None,
            )
            .await?;
        let target_id = created["targetId"]
            .as_str()
            .ok_or_else(|| {
                DriverError::InvalidResponse("Target.createTarget without targetId".to_string())
            })?
            .to_string();

        let session = CDPSession::attach(client.clone(), target_id, DEFAULT_DOMAINS).await?;
        tracing::info!(driver = %config.id, target = %session.target_id, "Driver ready");

        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Navigate and wait until the document finished loading
    pub async fn goto(&self, url: &Url) -> Result<()> {
        tracing::debug!(driver = %self.config.id, url = %url, "Navigating");
        self.release_handles().await;
        let result = self.session.navigate(url.as_str()).await?;
        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            return Err(DriverError::InvalidResponse(format!(
                "navigation to {} failed: {}",
                url, error
            )));
        }
        self.wait_for_load().await
    }

    /// Parse and navigate in one step
    pub async fn goto_str(&self, url: &str) -> Result<()> {
        self.goto(&Url::parse(url)?).await
    }

    /// Drop every element handle handed out so far
    pub async fn release_handles(&self) {
        self.session.release_object_group(HANDLE_GROUP).await;
    }

    /// Close the tab and the connection
    pub async fn close(&self) -> Result<()> {
        self.session.close_target().await?;
        self.client.close().await?;
        Ok(())
    }

    async fn wait_for_load(&self) -> Result<()> {
        let poll = async {
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(50));
            loop {
                interval.tick().await;
                let state = self.evaluate_value("document.readyState").await?;
                if state.as_str() == Some("complete") {
                    return Ok::<(), DriverError>(());
                }
            }
        };

        match tokio::time::timeout(self.config.load_timeout(), poll).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::InvalidResponse(format!(
                "page did not finish loading within {:?}",
                self.config.load_timeout()
            ))),
        }
    }

    async fn evaluate_value(&self, expression: &str) -> Result<Value> {
        let result = check(self.session.evaluate(expression, true, None).await?)?;
        Ok(result.value.unwrap_or(Value::Null))
    }

    /// Turn a remote JS array of nodes into handles, in array order
    async fn unpack_array(&self, array_id: ObjectId) -> Result<Vec<ElementHandle>> {
        let properties = self.session.get_properties(&array_id).await;
        self.session.release_object(&array_id).await;

        Ok(handles_in_order(properties?.result))
    }
}

/// Array elements of a `getProperties` listing, ordered by index.
/// Non-index properties (`length`, `__proto__`) and primitives are skipped.
fn handles_in_order(properties: Vec<PropertyDescriptor>) -> Vec<ElementHandle> {
    let mut indexed: Vec<(usize, ElementHandle)> = properties
        .into_iter()
        .filter_map(|prop| {
            let index = prop.name.parse::<usize>().ok()?;
            let object_id = prop.value?.object_id?;
            Some((index, ElementHandle::new(object_id)))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    indexed.into_iter().map(|(_, handle)| handle).collect()
}

/// Entry before the current one, `None` on the first entry
fn previous_entry(history: &NavigationHistory) -> Option<&NavigationEntry> {
    history
        .current_index
        .checked_sub(1)
        .and_then(|index| history.entries.get(index))
}

/// Fold a JS exception into [`DriverError::Script`]
fn check(result: EvaluateResult) -> Result<RemoteObject> {
    match result.exception_details {
        Some(details) => Err(DriverError::Script(details.message())),
        None => Ok(result.result),
    }
}

/// Expression producing an array of every node matching `by`
fn lookup_expression(by: &By) -> Result<String> {
    let query = serde_json::to_string(by.query())?;
    Ok(match by {
        By::XPath(_) => format!(
            "(() => {{ const r = document.evaluate({query}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
             for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
             return out; }})()"
        ),
        By::Css(_) => format!("Array.from(document.querySelectorAll({query}))"),
    })
}

fn call_argument(arg: &ScriptArg) -> Value {
    match arg {
        ScriptArg::Element(element) => json!({ "objectId": element.id() }),
        ScriptArg::Value(value) => json!({ "value": value }),
    }
}

#[async_trait]
impl WebDriver for CdpDriver {
    async fn find_elements(&self, by: &By) -> Result<Vec<ElementHandle>> {
        let expression = lookup_expression(by)?;
        let array = check(
            self.session
                .evaluate(&expression, false, Some(HANDLE_GROUP))
                .await?,
        )?;

        let handles = match array.object_id {
            Some(array_id) => self.unpack_array(array_id).await?,
            None => Vec::new(),
        };
        tracing::trace!(query = %by, found = handles.len(), "find_elements");
        Ok(handles)
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        check(
            self.session
                .call_function_on(element.id(), CLICK_FUNCTION, Vec::new(), true)
                .await?,
        )?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, keys: &Keys) -> Result<()> {
        check(
            self.session
                .call_function_on(element.id(), FOCUS_FUNCTION, Vec::new(), true)
                .await?,
        )?;

        for run in keys.runs() {
            match run {
                KeyRun::Text(text) => {
                    self.session
                        .send("Input.insertText", Some(json!({ "text": text })))
                        .await?;
                }
                KeyRun::Key(key) => {
                    // rawKeyDown for editing keys, keyDown when the key also types text
                    let down_type = if key.text().is_some() {
                        "keyDown"
                    } else {
                        "rawKeyDown"
                    };
                    let mut down = json!({
                        "type": down_type,
                        "key": key.name(),
                        "code": key.name(),
                        "windowsVirtualKeyCode": key.virtual_key_code(),
                    });
                    if let Some(text) = key.text() {
                        down["text"] = json!(text);
                    }
                    self.session.send("Input.dispatchKeyEvent", Some(down)).await?;
                    self.session
                        .send(
                            "Input.dispatchKeyEvent",
                            Some(json!({
                                "type": "keyUp",
                                "key": key.name(),
                                "code": key.name(),
                                "windowsVirtualKeyCode": key.virtual_key_code(),
                            })),
                        )
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let result = check(
            self.session
                .call_function_on(
                    element.id(),
                    GET_ATTRIBUTE_FUNCTION,
                    vec![json!({ "value": name })],
                    true,
                )
                .await?,
        )?;
        Ok(result
            .value
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn navigate_back(&self) -> Result<()> {
        let history: NavigationHistory = self
            .session
            .send_typed("Page.getNavigationHistory", None)
            .await?;

        // Already at the first entry: nothing to go back to
        let Some(previous) = previous_entry(&history) else {
            return Ok(());
        };

        tracing::debug!(driver = %self.config.id, url = %previous.url, "Navigating back");
        self.release_handles().await;
        self.session
            .send(
                "Page.navigateToHistoryEntry",
                Some(json!({ "entryId": previous.id })),
            )
            .await?;
        Ok(())
    }

    async fn active_element(&self) -> Result<ElementHandle> {
        let active = check(
            self.session
                .evaluate("document.activeElement", false, Some(HANDLE_GROUP))
                .await?,
        )?;
        active
            .object_id
            .map(ElementHandle::new)
            .ok_or_else(|| DriverError::NoSuchElement {
                query: "document.activeElement".to_string(),
            })
    }

    async fn execute_script(&self, source: &str, args: &[ScriptArg]) -> Result<Value> {
        let declaration = format!("function() {{ {source} }}");

        // callFunctionOn needs a receiver; use `globalThis` so `this` matches a
        // plain WebDriver script.
        let global = check(self.session.evaluate("globalThis", false, None).await?)?;
        let receiver = global.object_id.ok_or_else(|| {
            DriverError::InvalidResponse("globalThis has no object id".to_string())
        })?;

        let result = self
            .session
            .call_function_on(
                &receiver,
                &declaration,
                args.iter().map(call_argument).collect(),
                true,
            )
            .await;
        self.session.release_object(&receiver).await;

        Ok(check(result?)?.value.unwrap_or(Value::Null))
    }
}
