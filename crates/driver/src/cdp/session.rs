//! CDP Session - a flattened session attached to one page target
//!
//! All sessions share the client's WebSocket. This type adds the target context
//! and the few Runtime helpers the driver is built from.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::{CDPClient, Result};
use super::protocol::{
    AttachToTargetResult, EvaluateResult, GetPropertiesResult, ObjectId, SessionId, TargetId,
};

/// Domains a page object session needs
pub const DEFAULT_DOMAINS: &[&str] = &["Page", "Runtime"];

/// CDP Session bound to a specific target
#[derive(Clone)]
pub struct CDPSession {
    client: Arc<CDPClient>,

    /// Target this session is attached to
    pub target_id: TargetId,

    /// Session ID assigned by Chrome
    pub session_id: SessionId,
}

impl CDPSession {
    /// Attach to a target and enable `domains`
    pub async fn attach(
        client: Arc<CDPClient>,
        target_id: TargetId,
        domains: &[&str],
    ) -> Result<Self> {
        let result = client
            .send_request(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true,
                })),
                None,
            )
            .await?;

        let attach_result: AttachToTargetResult = serde_json::from_value(result)?;
        let session_id = attach_result.session_id;

        // Enable all domains in parallel
        let enable_futures: Vec<_> = domains
            .iter()
            .map(|domain| {
                let client = client.clone();
                let session_id = session_id.clone();
                async move {
                    client
                        .send_request(format!("{}.enable", domain), None, Some(session_id))
                        .await
                }
            })
            .collect();

        // Runtime is load-bearing; without it nothing below works
        for (domain, result) in domains
            .iter()
            .zip(futures_util::future::join_all(enable_futures).await)
        {
            if let Err(e) = result {
                tracing::warn!("Failed to enable {}: {}", domain, e);
                if *domain == "Runtime" {
                    return Err(e);
                }
            }
        }

        tracing::debug!(target_id = %target_id, session_id = %session_id, "Attached to target");

        Ok(Self {
            client,
            target_id,
            session_id,
        })
    }

    /// Send command within this session's context
    pub async fn send(&self, method: impl Into<String>, params: Option<Value>) -> Result<Value> {
        self.client
            .send_request(method, params, Some(self.session_id.clone()))
            .await
    }

    /// Send and decode the result into `T`
    pub async fn send_typed<T: DeserializeOwned>(
        &self,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> Result<T> {
        let value = self.send(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Navigate to URL
    pub async fn navigate(&self, url: &str) -> Result<Value> {
        self.send("Page.navigate", Some(json!({ "url": url }))).await
    }

    /// Evaluate JavaScript in the page's main world.
    ///
    /// Remote objects in the result (and properties read from them later)
    /// belong to `group`, if given, until [`release_object_group`](Self::release_object_group).
    pub async fn evaluate(
        &self,
        expression: &str,
        by_value: bool,
        group: Option<&str>,
    ) -> Result<EvaluateResult> {
        self.send_typed(
            "Runtime.evaluate",
            Some(evaluate_params(expression, by_value, group)),
        )
        .await
    }

    /// Call `declaration` with `this` bound to `object_id`
    pub async fn call_function_on(
        &self,
        object_id: &str,
        declaration: &str,
        arguments: Vec<Value>,
        by_value: bool,
    ) -> Result<EvaluateResult> {
        self.send_typed(
            "Runtime.callFunctionOn",
            Some(json!({
                "objectId": object_id,
                "functionDeclaration": declaration,
                "arguments": arguments,
                "returnByValue": by_value,
                "awaitPromise": true,
            })),
        )
        .await
    }

    /// Own properties of a remote object
    pub async fn get_properties(&self, object_id: &str) -> Result<GetPropertiesResult> {
        self.send_typed(
            "Runtime.getProperties",
            Some(json!({ "objectId": object_id, "ownProperties": true })),
        )
        .await
    }

    /// Let the page GC a remote object we no longer need
    pub async fn release_object(&self, object_id: &ObjectId) {
        if let Err(e) = self
            .send("Runtime.releaseObject", Some(json!({ "objectId": object_id })))
            .await
        {
            tracing::debug!("Failed to release {}: {}", object_id, e);
        }
    }

    /// Release every remote object created in `group`
    pub async fn release_object_group(&self, group: &str) {
        if let Err(e) = self
            .send("Runtime.releaseObjectGroup", Some(json!({ "objectGroup": group })))
            .await
        {
            tracing::debug!("Failed to release group {}: {}", group, e);
        }
    }

    /// Close the target this session is attached to
    pub async fn close_target(&self) -> Result<()> {
        self.client
            .send_request(
                "Target.closeTarget",
                Some(json!({ "targetId": &self.target_id })),
                None,
            )
            .await?;
        Ok(())
    }
}

fn evaluate_params(expression: &str, by_value: bool, group: Option<&str>) -> Value {
    let mut params = json!({
        "expression": expression,
        "returnByValue": by_value,
        "awaitPromise": true,
    });
    if let Some(group) = group {
        params["objectGroup"] = json!(group);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_domains_are_page_and_runtime() {
        assert_eq!(DEFAULT_DOMAINS, ["Page", "Runtime"]);
    }

    #[test]
    fn test_evaluate_params_with_group() {
        let params = evaluate_params("document.activeElement", false, Some("handles"));
        assert_eq!(
            params,
            json!({
                "expression": "document.activeElement",
                "returnByValue": false,
                "awaitPromise": true,
                "objectGroup": "handles",
            })
        );
    }

    #[test]
    fn test_evaluate_params_without_group() {
        let params = evaluate_params("document.readyState", true, None);
        assert!(params.get("objectGroup").is_none());
        assert_eq!(params["returnByValue"], json!(true));
    }
}
